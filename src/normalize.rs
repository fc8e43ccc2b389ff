use chrono::{DateTime, Utc};
use feed_rs::model::Entry;

use crate::article::Article;
use crate::config::FeedSource;
use crate::image::ImageResolver;

/// Fields the normalizer reads from one parsed feed entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFeedItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub guid: Option<String>,
    pub summary: Option<String>,
    /// Parsed publish timestamp (RSS pubDate / Atom published)
    pub iso_date: Option<DateTime<Utc>>,
    /// Secondary date (Atom updated)
    pub pub_date: Option<DateTime<Utc>>,
    pub enclosure_url: Option<String>,
    pub media_content_url: Option<String>,
    pub category: Option<String>,
}

impl RawFeedItem {
    pub fn from_entry(entry: &Entry) -> Self {
        let link = entry
            .links
            .iter()
            .find(|l| !is_rel(l.rel.as_deref(), "enclosure"))
            .map(|l| l.href.clone());

        let guid = Some(entry.id.trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        Self {
            title: entry.title.as_ref().map(|t| t.content.clone()),
            link,
            guid,
            summary: entry.summary.as_ref().map(|t| t.content.clone()),
            iso_date: entry.published,
            pub_date: entry.updated,
            enclosure_url: enclosure_url(entry),
            media_content_url: media_content_url(entry),
            category: entry.categories.first().map(|c| c.term.clone()),
        }
    }
}

fn is_rel(rel: Option<&str>, expected: &str) -> bool {
    rel.map(|r| r.eq_ignore_ascii_case(expected)).unwrap_or(false)
}

fn is_image_type(media_type: &str) -> bool {
    media_type.to_ascii_lowercase().starts_with("image/")
}

// RSS <enclosure> and Atom rel="enclosure" links carrying an image type.
fn enclosure_url(entry: &Entry) -> Option<String> {
    let from_links = entry.links.iter().find(|l| {
        is_rel(l.rel.as_deref(), "enclosure")
            && l.media_type.as_deref().map(is_image_type).unwrap_or(false)
    });
    if let Some(link) = from_links {
        return Some(link.href.clone());
    }

    entry
        .media
        .iter()
        .flat_map(|m| m.content.iter())
        .find(|c| {
            c.content_type
                .as_ref()
                .map(|t| is_image_type(&t.to_string()))
                .unwrap_or(false)
        })
        .and_then(|c| c.url.as_ref())
        .map(|u| u.as_str().to_string())
}

// media:content of any type, then media:thumbnail.
fn media_content_url(entry: &Entry) -> Option<String> {
    let content = entry
        .media
        .iter()
        .flat_map(|m| m.content.iter())
        .find_map(|c| c.url.as_ref())
        .map(|u| u.as_str().to_string());

    content.or_else(|| {
        entry
            .media
            .iter()
            .flat_map(|m| m.thumbnails.iter())
            .map(|t| t.image.uri.clone())
            .find(|uri| !uri.is_empty())
    })
}

/// Map one feed's raw items onto articles, preserving feed order.
pub fn normalize(source: &FeedSource, items: &[RawFeedItem], resolver: &ImageResolver) -> Vec<Article> {
    items
        .iter()
        .map(|item| normalize_item(source, item, resolver))
        .collect()
}

pub fn normalize_item(source: &FeedSource, item: &RawFeedItem, resolver: &ImageResolver) -> Article {
    let link = item.link.clone().unwrap_or_default();
    let guid_or_link = item.guid.as_deref().unwrap_or(&link);

    let raw_image = item
        .enclosure_url
        .as_deref()
        .or(item.media_content_url.as_deref());

    Article {
        id: Article::article_id(&source.id, guid_or_link),
        title: item.title.clone().unwrap_or_default(),
        url: link.clone(),
        source_name: source.name.clone(),
        source_domain: source.domain.clone(),
        published_at: item.iso_date.or(item.pub_date),
        image_url: resolver.resolve(raw_image, &source.id),
        summary: item.summary.clone().filter(|s| !s.trim().is_empty()),
        sentiment: None,
        category: item.category.clone().or_else(|| source.category.clone()),
        bias_pct: None,
    }
}
