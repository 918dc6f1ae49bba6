mod audit;
mod config;
mod cross_slot;
mod data;
mod engine;
mod error;
mod policy;
mod same_slot;
mod schedule;
mod server;
mod swap;

#[cfg(test)]
mod properties;

use log::{error, info};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match config::AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };
    info!("Using {:?} capacity policy", config.policy);

    if let Err(e) = server::run_server(config).await {
        error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}
