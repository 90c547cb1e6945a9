mod app;
mod components;
mod config;
mod data;
mod events;
mod theme;
mod utils;
mod wallet;

use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use tokio::sync::mpsc;

use crate::app::App;
use crate::config::{Config, PORTAL_ADDRESS};
use crate::data::portal::EthPortal;
use crate::data::PortalService;
use crate::wallet::Wallet;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let config = Config::parse();

    // Connect to the Ethereum node
    eprintln!("Connecting to {}...", config.rpc_url);
    let portal = EthPortal::connect(&config, PORTAL_ADDRESS).await?;
    let chain_id = portal.chain_id();
    eprintln!("Connected to chain {chain_id}");

    // Create event channel
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    // Send initial connected event
    let _ = event_tx.send(events::AppEvent::Connected(chain_id));

    // Create portal service and wallet binder
    let service = Arc::new(PortalService::new(portal, event_tx.clone()));
    let wallet = Wallet::from_config(&config);

    // Create app
    let mut app = App::new(service, wallet, PORTAL_ADDRESS, event_rx, config.tick_rate_ms);

    // Initialize terminal
    let terminal = ratatui::init();
    let result = app.run(terminal).await;

    // Restore terminal
    ratatui::restore();

    result
}
