use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;

use anyhow::bail;
use serde::Deserialize;

use crate::image::LogoTable;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Per-feed deadline in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    pub feeds: Vec<FeedSource>,
    #[serde(default = "default_logos")]
    pub logos: HashMap<String, String>,
    #[serde(default)]
    pub markets: MarketsConfig,
}

/// Upstream quote service for the index ticker.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MarketsConfig {
    #[serde(default = "default_quote_url")]
    pub quote_url: String,
    /// How long a successful quote answer is reused
    #[serde(default = "default_quote_cache_secs")]
    pub cache_secs: u64,
}

impl Default for MarketsConfig {
    fn default() -> Self {
        Self {
            quote_url: default_quote_url(),
            cache_secs: default_quote_cache_secs(),
        }
    }
}

impl MarketsConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_secs)
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_quote_url() -> String {
    "https://query1.finance.yahoo.com/v7/finance/quote".to_string()
}

fn default_quote_cache_secs() -> u64 {
    60
}

fn default_logos() -> HashMap<String, String> {
    [
        "thehindu",
        "ndtv",
        "indiatoday",
        "news18",
        "mint",
        "hindustantimes",
        "toi",
        "indianexpress",
    ]
    .into_iter()
    .map(|key| (key.to_string(), format!("/logos/{}.png", key)))
    .collect()
}

/// One configured feed. `id` may carry a section after the delimiter,
/// e.g. `thehindu:front`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FeedSource {
    pub id: String,
    pub name: String,
    pub domain: String,
    pub url: String,
    /// Topic applied to items that carry no category of their own
    #[serde(default)]
    pub category: Option<String>,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let mut seen = HashSet::new();
        for feed in &self.feeds {
            if feed.id.trim().is_empty() {
                bail!("feed '{}' has an empty id", feed.name);
            }
            if !seen.insert(feed.id.as_str()) {
                bail!("duplicate feed id '{}'", feed.id);
            }
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn logo_table(&self) -> LogoTable {
        LogoTable::new(self.logos.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        assert_eq!(default_fetch_timeout_secs(), 10);
        assert_eq!(default_bind_addr(), "0.0.0.0:3000");
        assert_eq!(default_logos().len(), 8);
        assert_eq!(
            default_logos().get("thehindu").map(String::as_str),
            Some("/logos/thehindu.png")
        );
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
            bind_addr = "127.0.0.1:8080"
            fetch_timeout_secs = 4

            [[feeds]]
            id = "thehindu:front"
            name = "The Hindu"
            domain = "thehindu.com"
            url = "https://www.thehindu.com/feeder/default.rss"

            [[feeds]]
            id = "mint:markets"
            name = "Mint"
            domain = "livemint.com"
            url = "https://www.livemint.com/rss/markets"
            category = "markets"
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.fetch_timeout(), Duration::from_secs(4));
        assert_eq!(config.feeds.len(), 2);
        assert_eq!(config.feeds[0].id, "thehindu:front");
        assert_eq!(config.feeds[0].domain, "thehindu.com");
        assert_eq!(config.feeds[0].category, None);
        assert_eq!(config.feeds[1].category.as_deref(), Some("markets"));
    }

    #[test]
    fn test_defaults_applied() {
        let content = r#"
            [[feeds]]
            id = "ndtv"
            name = "NDTV"
            domain = "ndtv.com"
            url = "https://feeds.feedburner.com/ndtvnews-top-stories"
        "#;

        let config = Config::from_str(content).unwrap();

        assert_eq!(config.fetch_timeout_secs, 10);
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.logo_table().get("ndtv"), Some("/logos/ndtv.png"));
        assert_eq!(config.markets, MarketsConfig::default());
        assert_eq!(config.markets.cache_ttl(), Duration::from_secs(60));
    }

    #[test]
    fn test_markets_section() {
        let content = r#"
            feeds = []

            [markets]
            quote_url = "http://127.0.0.1:8081/quote"
        "#;

        let config = Config::from_str(content).unwrap();
        assert_eq!(config.markets.quote_url, "http://127.0.0.1:8081/quote");
        assert_eq!(config.markets.cache_secs, 60);
    }

    #[test]
    fn test_custom_logo_table_replaces_default() {
        let content = r#"
            feeds = []

            [logos]
            acme = "/img/acme.svg"
        "#;

        let config = Config::from_str(content).unwrap();
        let logos = config.logo_table();
        assert_eq!(logos.len(), 1);
        assert_eq!(logos.get("acme"), Some("/img/acme.svg"));
        assert_eq!(logos.get("ndtv"), None);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let result = Config::from_str("this is not valid toml {{{");
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_required_fields() {
        let content = r#"
            [[feeds]]
            id = "ndtv"
            name = "NDTV"
            # Missing domain and url
        "#;

        assert!(Config::from_str(content).is_err());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let content = r#"
            [[feeds]]
            id = "ndtv"
            name = "NDTV"
            domain = "ndtv.com"
            url = "https://a.example.com/rss"

            [[feeds]]
            id = "ndtv"
            name = "NDTV again"
            domain = "ndtv.com"
            url = "https://b.example.com/rss"
        "#;

        let err = Config::from_str(content).unwrap_err();
        assert!(err.to_string().contains("duplicate feed id"));
    }

    #[test]
    fn test_empty_id_rejected() {
        let content = r#"
            [[feeds]]
            id = " "
            name = "Blank"
            domain = "blank.com"
            url = "https://blank.example.com/rss"
        "#;

        assert!(Config::from_str(content).is_err());
    }

    #[test]
    fn test_empty_feeds_list() {
        let config = Config::from_str("feeds = []").unwrap();
        assert!(config.feeds.is_empty());
    }
}
