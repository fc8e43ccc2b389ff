use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sentiment;

/// One normalized feed item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// `{source_id}:{guid_or_link}`, stable across fetches of the same item.
    pub id: String,
    pub title: String,
    pub url: String,
    pub source_name: String,
    pub source_domain: String,
    pub published_at: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Precomputed polarity from an upstream classifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bias_pct: Option<BiasPct>,
}

impl Article {
    pub fn article_id(source_id: &str, guid_or_link: &str) -> String {
        format!("{}:{}", source_id, guid_or_link)
    }

    /// Text the scorer reads: title, a space, then the summary.
    pub fn sentiment_text(&self) -> String {
        format!("{} {}", self.title, self.summary.as_deref().unwrap_or(""))
    }

    /// Polarity in [-1, 1]. A finite precomputed value wins over the lexicon.
    pub fn polarity(&self) -> f64 {
        self.sentiment
            .and_then(sentiment::clamp_score)
            .unwrap_or_else(|| sentiment::score(&self.sentiment_text()))
    }
}

/// Left/Center/Right weights supplied from outside the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BiasPct {
    pub left: f64,
    pub center: f64,
    pub right: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub ok: bool,
    pub main: Option<Article>,
    pub daily: Vec<Article>,
}

impl AggregateResult {
    /// Lead story is the first article; the rest keep their order.
    pub fn from_articles(articles: Vec<Article>) -> Self {
        let mut articles = articles.into_iter();
        let main = articles.next();
        Self {
            ok: main.is_some(),
            main,
            daily: articles.collect(),
        }
    }

    pub fn empty() -> Self {
        Self::from_articles(Vec::new())
    }

    /// `main` followed by `daily`.
    pub fn all(&self) -> impl Iterator<Item = &Article> {
        self.main.iter().chain(self.daily.iter())
    }

    pub fn len(&self) -> usize {
        self.main.iter().count() + self.daily.len()
    }

    pub fn is_empty(&self) -> bool {
        self.main.is_none()
    }
}
