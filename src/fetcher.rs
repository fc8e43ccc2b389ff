use std::sync::Arc;
use std::time::Duration;

use feed_rs::parser::{self, ParseFeedError};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, info};

use crate::article::Article;
use crate::config::FeedSource;
use crate::image::ImageResolver;
use crate::normalize::{normalize, RawFeedItem};
use crate::report::FeedErrorReporter;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(StatusCode),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("malformed feed: {0}")]
    Malformed(#[from] ParseFeedError),
}

/// Coarse failure class used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedErrorKind {
    Unavailable,
    Malformed,
}

impl FeedErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedErrorKind::Unavailable => "unavailable",
            FeedErrorKind::Malformed => "malformed",
        }
    }
}

impl FeedError {
    pub fn kind(&self) -> FeedErrorKind {
        match self {
            FeedError::Request(_) | FeedError::Status(_) | FeedError::Timeout(_) => {
                FeedErrorKind::Unavailable
            }
            FeedError::Malformed(_) => FeedErrorKind::Malformed,
        }
    }
}

pub struct Fetcher {
    client: Client,
    resolver: ImageResolver,
    reporter: Arc<dyn FeedErrorReporter>,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(
        timeout: Duration,
        resolver: ImageResolver,
        reporter: Arc<dyn FeedErrorReporter>,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("BriefingNews/1.0 (RSS Aggregator)")
            .build()?;

        Ok(Self {
            client,
            resolver,
            reporter,
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Handle to the shared HTTP client. Clones share one connection pool.
    pub fn client(&self) -> Client {
        self.client.clone()
    }

    /// Fetch and normalize one feed. Failures are reported and yield no articles.
    pub async fn fetch(&self, source: &FeedSource) -> Vec<Article> {
        match self.try_fetch(source).await {
            Ok(articles) => {
                info!("Fetched {} articles from '{}'", articles.len(), source.id);
                articles
            }
            Err(e) => {
                self.reporter.report_feed_error(&source.id, &e);
                Vec::new()
            }
        }
    }

    pub async fn try_fetch(&self, source: &FeedSource) -> Result<Vec<Article>, FeedError> {
        debug!("Fetching feed: {} ({})", source.name, source.url);

        let items = tokio::time::timeout(self.timeout, self.fetch_items(&source.url))
            .await
            .map_err(|_| FeedError::Timeout(self.timeout))??;

        Ok(normalize(source, &items, &self.resolver))
    }

    async fn fetch_items(&self, url: &str) -> Result<Vec<RawFeedItem>, FeedError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status));
        }

        let bytes = response.bytes().await?;
        parse_items(&bytes)
    }
}

/// Parse an RSS/Atom document into raw items, in document order.
///
/// Entries without a guid keep an empty id so the link becomes their key;
/// feed-rs would otherwise hash the title into a synthetic id.
pub fn parse_items(bytes: &[u8]) -> Result<Vec<RawFeedItem>, FeedError> {
    let parsed = parser::Builder::new()
        .id_generator(|_links, _title, _uri| String::new())
        .build()
        .parse(bytes)?;
    Ok(parsed.entries.iter().map(RawFeedItem::from_entry).collect())
}
