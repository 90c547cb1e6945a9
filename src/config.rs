use std::path::PathBuf;

use alloy::primitives::{address, Address};
use clap::Parser;

/// The WavePortal deployment this client talks to. The contract is external
/// and immutable once deployed; only its address and interface are consumed.
pub const PORTAL_ADDRESS: Address = address!("2d4a89e63e68fDDC1384a2Cd7b28e8151Da2FE99");

#[derive(Parser, Debug)]
#[command(name = "waveportal-tui", about = "Terminal client for the WavePortal contract")]
pub struct Config {
    /// HTTP RPC endpoint URL
    #[arg(short, long, default_value = "https://ethereum-sepolia-rpc.publicnode.com")]
    pub rpc_url: String,

    /// WebSocket RPC endpoint URL for the live NewWave subscription
    #[arg(long, default_value = "wss://ethereum-sepolia-rpc.publicnode.com")]
    pub ws_url: String,

    /// Path to a JSON keystore holding the wave-signing key.
    /// Defaults to keystore.json in the app config directory when present.
    #[arg(long)]
    pub keystore: Option<PathBuf>,

    /// Keystore passphrase; when set the keystore unlocks without prompting
    #[arg(long, env = "WAVEPORTAL_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// File containing the keystore passphrase
    #[arg(long)]
    pub password_file: Option<PathBuf>,

    /// Raw hex private key, mainly for development against local nodes
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Tick rate in milliseconds for UI refresh
    #[arg(long, default_value = "100")]
    pub tick_rate_ms: u64,
}
