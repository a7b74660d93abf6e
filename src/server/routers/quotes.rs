use bytes::Bytes;
use http_body_util::Full;
use hyper::{header, http::HeaderValue, Response, StatusCode};
use log::{error, info, warn};

use super::status_response;
use crate::components::persister::PersistError;
use crate::server::AppState;

/// Fetch, then best-effort persist, then answer.
///
/// Only the fetch decides the status code. A failed or skipped persist is
/// logged and the caller still gets the quote.
pub async fn handle_get_quote(state: &AppState) -> Response<Full<Bytes>> {
    let pair = state.fetcher.pair();

    let quote = match state.fetcher.fetch_quote().await {
        Ok(quote) => quote,
        Err(e) => {
            error!("fetch {} failed ({}): {}", pair, e.kind(), e);

            return status_response(StatusCode::INTERNAL_SERVER_ERROR, Bytes::new());
        }
    };

    match state.persister.persist(&quote).await {
        Ok(ack) => info!("stored {} quote as record {}", pair, ack.id),
        Err(PersistError::Timeout(budget)) => {
            warn!("skipped storing {} quote, budget {:?} elapsed", pair, budget)
        }
        Err(PersistError::Storage(e)) => error!("failed to store {} quote: {}", pair, e),
    }

    let body = match quote
        .to_envelope(pair)
        .and_then(|envelope| serde_json::to_vec(&envelope))
    {
        Ok(body) => body,
        Err(e) => {
            error!("failed to encode {} quote: {}", pair, e);

            return status_response(StatusCode::INTERNAL_SERVER_ERROR, Bytes::new());
        }
    };

    let mut response = status_response(StatusCode::OK, Bytes::from(body));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );

    response
}
