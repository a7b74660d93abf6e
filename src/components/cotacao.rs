use reqwest::Client;
use serde_json::{Map, Value};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

#[derive(Error, Debug)]
pub enum CotacaoError {
    #[error("quote server did not answer within {0:?}")]
    Timeout(Duration),
    #[error("HTTP request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("quote server answered {0}")]
    Status(reqwest::StatusCode),
    #[error("response has no {0} bid")]
    MissingBid(String),
    #[error("failed to write quote file: {0}")]
    Io(#[from] std::io::Error),
}

/// Asks the quote server for the current quote and returns its `bid`.
pub async fn fetch_bid(url: &str, pair: &str, budget: Duration) -> Result<String, CotacaoError> {
    let client = Client::new();
    let request = async {
        let response = client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(CotacaoError::Status(status));
        }

        Ok::<_, CotacaoError>(response.json::<Map<String, Value>>().await?)
    };

    let body = tokio::time::timeout(budget, request)
        .await
        .map_err(|_| CotacaoError::Timeout(budget))??;

    body.get(pair)
        .and_then(|quote| quote.get("bid"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| CotacaoError::MissingBid(pair.to_string()))
}

/// Appends `<label>: <bid>` as a new line, creating the file if needed.
pub async fn append_bid(path: &Path, label: &str, bid: &str) -> Result<(), CotacaoError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;

    file.write_all(format!("{}: {}\n", label, bid).as_bytes())
        .await?;
    file.flush().await?;

    Ok(())
}
