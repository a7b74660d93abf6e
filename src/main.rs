use log::{error, info};
use quote_relay::{
    config::Config,
    server::{run_server, AppState},
};
use simple_logger::SimpleLogger;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);

            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = SimpleLogger::new()
        .with_colors(true)
        .with_level(config.log_level)
        .init()
    {
        eprintln!("logger init failed: {}", e);

        return ExitCode::FAILURE;
    }

    info!(
        "quotes from {} ({}), fetch budget {:?}, persist {} budget {:?}, store {}",
        config.fetch.url,
        config.fetch.pair,
        config.fetch.budget,
        config.persist.policy,
        config.persist.budget,
        config.db_path.display(),
    );

    let state = match AppState::from_config(&config) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("failed to build quote fetcher: {}", e);

            return ExitCode::FAILURE;
        }
    };

    let listener = match TcpListener::bind(config.addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("failed to bind {}: {}", config.addr, e);

            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = run_server(listener, state).await {
        error!("server stopped: {}", e);

        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
