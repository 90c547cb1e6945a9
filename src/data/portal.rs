use std::time::Duration;

use alloy::network::{Ethereum, EthereumWallet, NetworkWallet};
use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder, WsConnect};
use alloy::rpc::types::Filter;
use alloy::sol;
use alloy::sol_types::SolEvent;
use color_eyre::eyre::{eyre, Result};
use futures::{FutureExt, StreamExt};
use tokio::sync::{mpsc, RwLock};

use crate::config::Config;
use crate::data::gateway::{PendingWave, PortalGateway, WaveSubscription};
use crate::data::types::WaveRecord;
use crate::events::AppEvent;

sol! {
    #[sol(rpc)]
    contract WavePortal {
        struct Wave {
            address waver;
            string message;
            uint256 timestamp;
        }

        event NewWave(address indexed from, uint256 timestamp, string message);

        function wave(string memory _message) external;
        function getTotalWaves() external view returns (uint256);
        function getAllWaves() external view returns (Wave[] memory);
    }
}

/// Gas allowance for a wave submission. Bounded so a reverting call cannot
/// burn more than this.
const WAVE_GAS_LIMIT: u64 = 300_000;

/// Production gateway: a typed handle to the fixed WavePortal address.
/// Reads and writes go through the signer-bound provider installed by
/// `bind`; the live feed runs on its own websocket connection.
pub struct EthPortal {
    address: Address,
    rpc_url: String,
    ws_url: String,
    chain_id: u64,
    bound: RwLock<Option<DynProvider>>,
}

impl EthPortal {
    /// Connect a read provider to verify the endpoint and learn the chain id.
    pub async fn connect(config: &Config, address: Address) -> Result<Self> {
        let url = config.rpc_url.parse()?;
        let provider = ProviderBuilder::new().on_http(url);
        let chain_id = provider.get_chain_id().await?;
        Ok(Self {
            address,
            rpc_url: config.rpc_url.clone(),
            ws_url: config.ws_url.clone(),
            chain_id,
            bound: RwLock::new(None),
        })
    }

    /// Chain id obtained at connection time.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn bound_provider(&self) -> Result<DynProvider> {
        self.bound
            .read()
            .await
            .clone()
            .ok_or_else(|| eyre!("no wallet account bound"))
    }
}

impl PortalGateway for EthPortal {
    async fn bind(&self, wallet: EthereumWallet) -> Result<Address> {
        let account = NetworkWallet::<Ethereum>::default_signer_address(&wallet);
        let url = self.rpc_url.parse()?;
        let provider = ProviderBuilder::new().wallet(wallet).on_http(url).erased();
        *self.bound.write().await = Some(provider);
        Ok(account)
    }

    async fn total_waves(&self) -> Result<u64> {
        let provider = self.bound_provider().await?;
        let portal = WavePortal::new(self.address, provider);
        let count = portal.getTotalWaves().call().await?._0;
        Ok(count.saturating_to())
    }

    async fn wave_history(&self) -> Result<Vec<WaveRecord>> {
        let provider = self.bound_provider().await?;
        let portal = WavePortal::new(self.address, provider);
        let waves = portal.getAllWaves().call().await?._0;
        Ok(waves.into_iter().map(wave_to_record).collect())
    }

    async fn submit_wave(&self, message: String) -> Result<PendingWave> {
        let provider = self.bound_provider().await?;
        let portal = WavePortal::new(self.address, provider);

        // First suspension point: acceptance into the pending pool.
        let pending = portal.wave(message).gas(WAVE_GAS_LIMIT).send().await?;
        let tx_hash = *pending.tx_hash();

        // Second suspension point: mining. A mined-but-reverted wave is a
        // failure, same as a transport drop.
        let confirmation = async move {
            let receipt = pending.get_receipt().await?;
            if receipt.status() {
                Ok(())
            } else {
                Err(eyre!("wave transaction reverted"))
            }
        }
        .boxed();

        Ok(PendingWave::new(tx_hash, confirmation))
    }

    fn subscribe_new_waves(&self, events: mpsc::UnboundedSender<AppEvent>) -> WaveSubscription {
        let (shutdown_tx, mut shutdown_rx) = mpsc::unbounded_channel::<()>();
        let ws_url = self.ws_url.clone();
        let address = self.address;

        tokio::spawn(async move {
            let mut backoff = Duration::from_secs(1);
            let max_backoff = Duration::from_secs(30);

            loop {
                match stream_waves(&ws_url, address, events.clone(), &mut shutdown_rx).await {
                    Ok(()) => {
                        // Clean shutdown requested
                        let _ = events.send(AppEvent::FeedDisconnected);
                        return;
                    }
                    Err(_) => {
                        let _ = events.send(AppEvent::FeedDisconnected);
                        // Exponential backoff reconnection
                        tokio::select! {
                            _ = tokio::time::sleep(backoff) => {
                                backoff = (backoff * 2).min(max_backoff);
                            }
                            _ = shutdown_rx.recv() => {
                                return;
                            }
                        }
                    }
                }
            }
        });

        WaveSubscription::new(shutdown_tx)
    }
}

/// Connect a websocket provider and forward decoded NewWave events until the
/// shutdown channel fires.
async fn stream_waves(
    ws_url: &str,
    address: Address,
    events: mpsc::UnboundedSender<AppEvent>,
    shutdown_rx: &mut mpsc::UnboundedReceiver<()>,
) -> Result<()> {
    let ws = WsConnect::new(ws_url.to_string());
    let provider = ProviderBuilder::new().on_ws(ws).await?;

    let filter = Filter::new()
        .address(address)
        .event_signature(WavePortal::NewWave::SIGNATURE_HASH);
    let sub = provider.subscribe_logs(&filter).await?;
    let mut stream = sub.into_stream();

    let _ = events.send(AppEvent::FeedConnected);

    loop {
        tokio::select! {
            Some(log) = stream.next() => {
                if let Ok(decoded) = WavePortal::NewWave::decode_log(&log.inner, true) {
                    let record = WaveRecord {
                        waver: decoded.data.from,
                        message: decoded.data.message,
                        timestamp: decoded.data.timestamp.saturating_to(),
                    };
                    let _ = events.send(AppEvent::NewWave(record));
                }
            }
            _ = shutdown_rx.recv() => {
                return Ok(());
            }
        }
    }
}

fn wave_to_record(wave: WavePortal::Wave) -> WaveRecord {
    WaveRecord {
        waver: wave.waver,
        message: wave.message,
        timestamp: wave.timestamp.saturating_to(),
    }
}
