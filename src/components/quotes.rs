use log::debug;
use reqwest::Client;
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;
use tokio::time::{timeout_at, Instant};

use crate::config::FetchConfig;
use crate::models::quotes::Quote;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("upstream did not answer within {0:?}")]
    Timeout(Duration),
    #[error("upstream transport error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("upstream response decode error: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Timeout(_) => "timeout",
            FetchError::Transport(_) => "transport",
            FetchError::Decode(_) => "decode",
        }
    }
}

/// Single-shot, deadline-bounded client for the upstream quote API.
pub struct QuoteFetcher {
    client: Client,
    config: FetchConfig,
}

impl QuoteFetcher {
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder().build().map_err(FetchError::Transport)?;

        Ok(QuoteFetcher { client, config })
    }

    pub fn pair(&self) -> &str {
        &self.config.pair
    }

    /// One GET against the upstream. The budget starts here and covers both
    /// the response headers and the body.
    pub async fn fetch_quote(&self) -> Result<Quote, FetchError> {
        let budget = self.config.budget;
        let deadline = Instant::now() + budget;
        let request = self.client.get(self.config.url.clone()).send();

        let response = match timeout_at(deadline, request).await {
            Err(_) => return Err(FetchError::Timeout(budget)),
            Ok(Err(e)) if e.is_timeout() => return Err(FetchError::Timeout(budget)),
            Ok(Err(e)) => return Err(FetchError::Transport(e)),
            Ok(Ok(response)) => response,
        };

        let response = response.error_for_status().map_err(FetchError::Transport)?;

        let body = match timeout_at(deadline, response.bytes()).await {
            Err(_) => return Err(FetchError::Timeout(budget)),
            Ok(Err(e)) if e.is_timeout() => return Err(FetchError::Timeout(budget)),
            Ok(Err(e)) => return Err(FetchError::Transport(e)),
            Ok(Ok(body)) => body,
        };

        let quote = parse_quote(&body, &self.config.pair)?;

        debug!("fetched {} bid={} ask={}", self.config.pair, quote.bid, quote.ask);

        Ok(quote)
    }
}

fn parse_quote(body: &[u8], pair: &str) -> Result<Quote, FetchError> {
    let mut envelope: Map<String, Value> =
        serde_json::from_slice(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    let value = envelope
        .remove(pair)
        .ok_or_else(|| FetchError::Decode(format!("no {} key in response", pair)))?;

    serde_json::from_value(value).map_err(|e| FetchError::Decode(e.to_string()))
}
