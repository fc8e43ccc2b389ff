use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use briefing_news::aggregator::Aggregator;
use briefing_news::config::Config;
use briefing_news::fetcher::Fetcher;
use briefing_news::image::ImageResolver;
use briefing_news::markets::MarketsClient;
use briefing_news::report::TracingReporter;
use briefing_news::routes::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "briefing_news=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::var("FEEDS_CONFIG").unwrap_or_else(|_| "feeds.toml".to_string());
    let config = Config::load(&config_path)?;
    info!(
        "Loaded {} feeds and {} publisher logos from {}",
        config.feeds.len(),
        config.logo_table().len(),
        config_path
    );

    let fetcher = Fetcher::new(
        config.fetch_timeout(),
        ImageResolver::new(config.logo_table()),
        Arc::new(TracingReporter),
    )?;

    let markets = MarketsClient::new(
        fetcher.client(),
        config.markets.quote_url.clone(),
        config.markets.cache_ttl(),
    );

    let state = Arc::new(AppState {
        aggregator: Aggregator::new(Arc::new(fetcher)),
        sources: config.feeds.clone(),
        markets,
    });

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Server starting on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
