use std::collections::HashMap;

/// Separates the publisher key from a section in a source id ("thehindu:front").
pub const SOURCE_KEY_DELIMITER: char = ':';

/// Publisher key -> logo path, injected at startup.
#[derive(Debug, Clone, Default)]
pub struct LogoTable {
    logos: HashMap<String, String>,
}

impl LogoTable {
    pub fn new(logos: HashMap<String, String>) -> Self {
        Self { logos }
    }

    pub fn get(&self, publisher: &str) -> Option<&str> {
        self.logos.get(publisher).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.logos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logos.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImageResolver {
    logos: LogoTable,
}

impl ImageResolver {
    pub fn new(logos: LogoTable) -> Self {
        Self { logos }
    }

    /// Resolve the display image for an item.
    ///
    /// A real image URL is returned unchanged. Missing images and favicon
    /// placeholders fall back to the publisher logo, or `None` when the
    /// publisher has no logo.
    pub fn resolve(&self, raw_image_url: Option<&str>, source_key: &str) -> Option<String> {
        if let Some(url) = raw_image_url {
            if !url.trim().is_empty() && !looks_like_favicon(url) {
                return Some(url.to_string());
            }
        }

        self.logos
            .get(publisher_key(source_key))
            .map(str::to_string)
    }
}

/// The part of a source id before the first delimiter.
pub fn publisher_key(source_key: &str) -> &str {
    source_key
        .split(SOURCE_KEY_DELIMITER)
        .next()
        .unwrap_or(source_key)
}

pub fn looks_like_favicon(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    if lower.contains("favicon") {
        return true;
    }

    let path = lower
        .split(['?', '#'])
        .next()
        .unwrap_or(lower.as_str());
    path.ends_with(".ico")
}
