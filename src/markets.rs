//! Index ticker for the front page: NSE Nifty 50 and BSE Sensex quotes
//! from a Yahoo-style quote endpoint, reused for a short while.

use std::time::{Duration, Instant};

use reqwest::header::USER_AGENT;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

pub const NSE_SYMBOL: &str = "^NSEI";
pub const BSE_SYMBOL: &str = "^BSESN";

/// Upstream market states that count as an open session.
const LIVE_STATES: [&str; 3] = ["REGULAR", "OPEN", "TRADING"];

// The quote endpoint rejects non-browser agents.
const BROWSER_AGENT: &str = "Mozilla/5.0";

#[derive(Debug, Error)]
pub enum MarketsError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Quote fetch failed ({0})")]
    Status(StatusCode),
}

#[derive(Debug, Default, Deserialize)]
struct QuoteEnvelope {
    #[serde(rename = "quoteResponse", default)]
    quote_response: Option<QuoteResponse>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteResponse {
    #[serde(default)]
    result: Option<Vec<QuoteRow>>,
}

impl QuoteEnvelope {
    fn into_rows(self) -> Vec<QuoteRow> {
        self.quote_response
            .and_then(|r| r.result)
            .unwrap_or_default()
    }
}

/// One row of the upstream `quoteResponse.result` array.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRow {
    #[serde(default)]
    pub symbol: String,
    pub regular_market_price: Option<f64>,
    pub regular_market_change: Option<f64>,
    pub regular_market_change_percent: Option<f64>,
    pub regular_market_previous_close: Option<f64>,
    pub market_state: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketStatus {
    Live,
    Closed,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexQuote {
    pub price: Option<f64>,
    pub change: Option<f64>,
    pub percent: Option<f64>,
    pub status: MarketStatus,
}

impl IndexQuote {
    /// Build a quote from its upstream row. A missing row yields an
    /// unavailable quote with no numbers.
    pub fn from_row(row: Option<&QuoteRow>) -> Self {
        let Some(row) = row else {
            return Self {
                price: None,
                change: None,
                percent: None,
                status: MarketStatus::Unavailable,
            };
        };

        let price = row.regular_market_price;
        let previous_close = row.regular_market_previous_close;

        let change = row
            .regular_market_change
            .or_else(|| Some(price? - previous_close?));
        let percent = row.regular_market_change_percent.or_else(|| {
            let previous_close = previous_close.filter(|p| *p != 0.0)?;
            Some(change? / previous_close * 100.0)
        });

        let status = match (price, row.market_state.as_deref()) {
            (None, _) => MarketStatus::Unavailable,
            (Some(_), None) => MarketStatus::Live,
            (Some(_), Some(state)) => {
                if LIVE_STATES.contains(&state.to_ascii_uppercase().as_str()) {
                    MarketStatus::Live
                } else {
                    MarketStatus::Closed
                }
            }
        };

        Self {
            price,
            change,
            percent,
            status,
        }
    }
}

/// Body of `/api/stocks`: both indices on success, an error message otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StocksResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nse: Option<IndexQuote>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bse: Option<IndexQuote>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StocksResponse {
    pub fn from_rows(rows: &[QuoteRow]) -> Self {
        let find = |symbol: &str| rows.iter().find(|row| row.symbol == symbol);
        Self {
            ok: true,
            nse: Some(IndexQuote::from_row(find(NSE_SYMBOL))),
            bse: Some(IndexQuote::from_row(find(BSE_SYMBOL))),
            error: None,
        }
    }

    pub fn failed(error: &MarketsError) -> Self {
        Self {
            ok: false,
            nse: None,
            bse: None,
            error: Some(error.to_string()),
        }
    }
}

pub struct MarketsClient {
    client: Client,
    quote_url: String,
    ttl: Duration,
    cache: RwLock<Option<(Instant, StocksResponse)>>,
}

impl MarketsClient {
    pub fn new(client: Client, quote_url: impl Into<String>, ttl: Duration) -> Self {
        Self {
            client,
            quote_url: quote_url.into(),
            ttl,
            cache: RwLock::new(None),
        }
    }

    /// Current index quotes. Successful answers are reused until the cache
    /// ttl elapses; failures are never cached.
    pub async fn stocks(&self) -> StocksResponse {
        if let Some(cached) = self.cached().await {
            debug!("Serving cached index quotes");
            return cached;
        }

        match self.fetch_indices().await {
            Ok(fresh) => {
                *self.cache.write().await = Some((Instant::now(), fresh.clone()));
                fresh
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch index quotes");
                StocksResponse::failed(&e)
            }
        }
    }

    async fn cached(&self) -> Option<StocksResponse> {
        let cache = self.cache.read().await;
        cache
            .as_ref()
            .filter(|(at, _)| at.elapsed() < self.ttl)
            .map(|(_, response)| response.clone())
    }

    pub async fn fetch_indices(&self) -> Result<StocksResponse, MarketsError> {
        let symbols = [NSE_SYMBOL, BSE_SYMBOL].join(",");
        let response = self
            .client
            .get(&self.quote_url)
            .query(&[("symbols", symbols.as_str())])
            .header(USER_AGENT, BROWSER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketsError::Status(status));
        }

        let envelope: QuoteEnvelope = response.json().await?;
        Ok(StocksResponse::from_rows(&envelope.into_rows()))
    }
}
