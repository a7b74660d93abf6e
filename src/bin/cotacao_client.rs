use log::{error, info, LevelFilter};
use quote_relay::{
    components::cotacao::{append_bid, fetch_bid},
    config::{client::BID_LABEL, ClientConfig},
};
use simple_logger::SimpleLogger;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = SimpleLogger::new()
        .with_colors(true)
        .with_level(LevelFilter::Info)
        .init()
    {
        eprintln!("logger init failed: {}", e);

        return ExitCode::FAILURE;
    }

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);

            return ExitCode::FAILURE;
        }
    };

    let bid = match fetch_bid(config.url.as_str(), &config.pair, config.budget).await {
        Ok(bid) => bid,
        Err(e) => {
            error!("cotacao: {}", e);

            return ExitCode::FAILURE;
        }
    };

    println!("{}", bid);

    if let Err(e) = append_bid(&config.file, BID_LABEL, &bid).await {
        error!("cotacao: {}", e);

        return ExitCode::FAILURE;
    }

    info!("appended bid {} to {}", bid, config.file.display());

    ExitCode::SUCCESS
}
