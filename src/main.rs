//! Active FTP Server - Entry Point
//!
//! A minimal FTP server that only supports active-mode (PORT) transfers.

use clap::Parser;
use env_logger::{Builder, Env};
use log::{error, info};

use active_ftpd::server::{Cli, Server, ServerConfig};
use active_ftpd::transfer::LsListing;

#[tokio::main]
async fn main() {
    // RUST_LOG still wins over the default filter
    Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match ServerConfig::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Launching FTP server...");

    let server = match Server::bind(&config, LsListing).await {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e);
            std::process::exit(1);
        }
    };

    server.start().await;
}
