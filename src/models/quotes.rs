use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Currency pair quote exactly as served by the upstream API.
///
/// Every field is kept as the string the upstream sent, no numeric parsing.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub code: String,
    pub codein: String,
    pub name: String,
    pub high: String,
    pub low: String,
    #[serde(rename = "varBid")]
    pub var_bid: String,
    #[serde(rename = "pctChange")]
    pub pct_change: String,
    pub bid: String,
    pub ask: String,
    pub timestamp: String,
    pub create_date: String,
}

impl Quote {
    /// Wraps the quote back into the `{"<PAIR>": {...}}` envelope.
    pub fn to_envelope(&self, pair: &str) -> Result<Value, serde_json::Error> {
        let mut envelope = Map::new();

        envelope.insert(pair.to_string(), serde_json::to_value(self)?);

        Ok(Value::Object(envelope))
    }
}

/// Durable row written once per persisted quote.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub id: u64,
    #[serde(flatten)]
    pub quote: Quote,
    /// Unix milliseconds.
    pub created_at: u64,
    pub deleted_at: Option<u64>,
}

#[cfg(test)]
pub(crate) fn sample_quote() -> Quote {
    Quote {
        code: "USD".to_string(),
        codein: "BRL".to_string(),
        name: "US Dollar to Brazilian Real".to_string(),
        high: "5.50".to_string(),
        low: "5.40".to_string(),
        var_bid: "0.10".to_string(),
        pct_change: "1.85".to_string(),
        bid: "5.45".to_string(),
        ask: "5.55".to_string(),
        timestamp: "1718900000".to_string(),
        create_date: "2024-06-20 13:33:20".to_string(),
    }
}
