use somnia_project::client::{ChainClient, EvmChainClient};
use somnia_project::config::SomniaConfig;
use somnia_project::menu::{self, App, DialoguerPrompt};
use somnia_project::task::WorkflowContext;
use somnia_project::wallet::{WalletBoard, WalletState};

use anyhow::Result;
use clap::Parser;
use core_logic::{setup_logger, LogBook};
use dotenv::dotenv;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "chains/somnia/config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Keep guard alive for file logging
    let log_guard = setup_logger("somnia");
    dotenv().ok();

    let args = Args::parse();
    info!("Loading config from: {}", args.config);

    let config = match SomniaConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {}", e);
            return Err(e);
        }
    };

    let client = match EvmChainClient::connect(&config).await {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to initialize wallet: {}", e);
            return Err(e.into());
        }
    };
    info!("Connected to {} as {:?}", config.network_name, client.address());

    let log = LogBook::new();
    let wallet = WalletBoard::new(WalletState::empty(
        config.network_name.clone(),
        config.native_symbol.clone(),
    ));
    let ctx = WorkflowContext::from_config(&config, Arc::new(client), wallet, Arc::new(log))?;
    ctx.refresh_wallet().await;

    let app = App::new(ctx, Handle::current());
    let menu = tokio::task::spawn_blocking(move || menu::run(&app, &DialoguerPrompt::default()));

    tokio::select! {
        result = menu => {
            result??;
            info!("Exiting.");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, exiting.");
            drop(log_guard);
            // The menu thread is parked on stdin and would block runtime shutdown
            std::process::exit(0);
        }
    }

    Ok(())
}
