use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use tower_http::trace::TraceLayer;

use crate::aggregator::Aggregator;
use crate::article::AggregateResult;
use crate::config::FeedSource;
use crate::markets::{MarketsClient, StocksResponse};
use crate::ranking::{Briefing, BriefingOptions};

pub struct AppState {
    pub aggregator: Aggregator,
    pub sources: Vec<FeedSource>,
    pub markets: MarketsClient,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/news", get(news))
        .route("/api/briefing", get(briefing))
        .route("/api/stocks", get(stocks))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Every request re-fetches all feeds.
pub async fn news(State(state): State<Arc<AppState>>) -> Json<AggregateResult> {
    Json(state.aggregator.aggregate_all(&state.sources).await)
}

pub async fn briefing(
    State(state): State<Arc<AppState>>,
    Query(options): Query<BriefingOptions>,
) -> Json<Briefing> {
    let result = state.aggregator.aggregate_all(&state.sources).await;
    Json(Briefing::build(&result, &options))
}

pub async fn stocks(State(state): State<Arc<AppState>>) -> Json<StocksResponse> {
    Json(state.markets.stocks().await)
}

pub async fn health() -> impl IntoResponse {
    Html("OK")
}
