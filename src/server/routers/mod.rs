use bytes::Bytes;
use http_body_util::Full;
use hyper::StatusCode;
use hyper::{Request, Response};
use std::sync::Arc;

use crate::config::server::QUOTE_ROUTE;
use crate::server::AppState;

pub mod quotes;

pub async fn route<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    match (req.method(), req.uri().path()) {
        (&hyper::Method::GET, QUOTE_ROUTE) => Ok(quotes::handle_get_quote(&state).await),
        _ => Ok(status_response(StatusCode::NOT_FOUND, Bytes::from("Not Found"))),
    }
}

pub(crate) fn status_response(status: StatusCode, body: Bytes) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;

    response
}
