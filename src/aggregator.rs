use std::sync::Arc;

use futures::future::join_all;
use tracing::{error, info};

use crate::article::{AggregateResult, Article};
use crate::config::FeedSource;
use crate::fetcher::Fetcher;

/// Fans the fetcher out over every source and merges the results.
pub struct Aggregator {
    fetcher: Arc<Fetcher>,
}

impl Aggregator {
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetch all sources concurrently and wait for every one of them.
    ///
    /// Each fetch is bounded by the fetcher's own deadline, so a stalled
    /// feed delays the barrier by at most that long. Results keep the
    /// configured source order, and items keep their feed order.
    pub async fn aggregate_all(&self, sources: &[FeedSource]) -> AggregateResult {
        let per_feed = self.fetch_grouped(sources).await;

        let fetched = per_feed.iter().filter(|articles| !articles.is_empty()).count();
        let merged: Vec<Article> = per_feed.into_iter().flatten().collect();

        info!(
            "Aggregated {} articles from {}/{} feeds",
            merged.len(),
            fetched,
            sources.len()
        );

        AggregateResult::from_articles(merged)
    }

    /// Per-source article lists, index-aligned with `sources`.
    pub async fn fetch_grouped(&self, sources: &[FeedSource]) -> Vec<Vec<Article>> {
        let tasks = sources.iter().map(|source| {
            let fetcher = self.fetcher.clone();
            let source = source.clone();
            tokio::spawn(async move { fetcher.fetch(&source).await })
        });

        join_all(tasks)
            .await
            .into_iter()
            .zip(sources)
            .map(|(joined, source)| match joined {
                Ok(articles) => articles,
                Err(e) => {
                    error!("Fetch task for '{}' did not complete: {}", source.id, e);
                    Vec::new()
                }
            })
            .collect()
    }
}
