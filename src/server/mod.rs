use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use log::{error, info};
use std::io;
use std::sync::Arc;
use tokio::net::TcpListener;

use routers::route;

use crate::{
    components::{
        persister::QuotePersister,
        quotes::{FetchError, QuoteFetcher},
    },
    config::Config,
    db::quotes::QuoteStore,
};

pub mod routers;

/// Everything a request needs. Shared read-only across connections.
pub struct AppState {
    pub fetcher: QuoteFetcher,
    pub persister: QuotePersister,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let fetcher = QuoteFetcher::new(config.fetch.clone())?;
        let store = Arc::new(QuoteStore::new(&config.db_path));
        let persister = QuotePersister::new(store, config.persist);

        Ok(AppState { fetcher, persister })
    }
}

pub async fn run_server(listener: TcpListener, state: Arc<AppState>) -> Result<(), io::Error> {
    info!("Listening on http://{}", listener.local_addr()?);

    loop {
        let (stream, _) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("Failed to accept connection: {:?}", e);

                continue;
            }
        };
        let state = Arc::clone(&state);

        tokio::task::spawn(async move {
            let service = service_fn(move |req| route(req, Arc::clone(&state)));

            if let Err(err) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                error!("Failed to serve connection: {:?}", err);
            }
        });
    }
}
