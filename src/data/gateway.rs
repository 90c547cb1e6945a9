use alloy::network::EthereumWallet;
use alloy::primitives::{Address, B256};
use color_eyre::eyre::Result;
use futures::future::BoxFuture;
use std::future::Future;
use tokio::sync::mpsc;

use crate::data::types::WaveRecord;
use crate::events::AppEvent;

/// The contract proxy seam. The controller and `PortalService` only ever talk
/// to the chain through this trait, so tests can substitute an in-memory
/// implementation.
pub trait PortalGateway: Send + Sync + 'static {
    /// Construct a signer-bound handle for this account. Rebinding with the
    /// same wallet is idempotent.
    fn bind(&self, wallet: EthereumWallet) -> impl Future<Output = Result<Address>> + Send;

    /// Canonical wave counter.
    fn total_waves(&self) -> impl Future<Output = Result<u64>> + Send;

    /// Full wave history in chain log order.
    fn wave_history(&self) -> impl Future<Output = Result<Vec<WaveRecord>>> + Send;

    /// Submit a wave. Resolves once the transaction is accepted as pending;
    /// the returned handle carries the second suspension point (mining).
    fn submit_wave(&self, message: String) -> impl Future<Output = Result<PendingWave>> + Send;

    /// Start the live NewWave feed, delivering events into `events`. The
    /// returned handle must be disconnected before rebinding or disposal.
    fn subscribe_new_waves(&self, events: mpsc::UnboundedSender<AppEvent>) -> WaveSubscription;
}

/// A submitted, not-yet-mined wave: the transaction hash plus the pending
/// confirmation.
pub struct PendingWave {
    tx_hash: B256,
    confirmation: BoxFuture<'static, Result<()>>,
}

impl PendingWave {
    pub fn new(tx_hash: B256, confirmation: BoxFuture<'static, Result<()>>) -> Self {
        Self { tx_hash, confirmation }
    }

    pub fn tx_hash(&self) -> B256 {
        self.tx_hash
    }

    /// Wait for the wave to be mined. Errors on revert or transport failure.
    pub async fn confirmed(self) -> Result<()> {
        self.confirmation.await
    }
}

/// Handle to a live NewWave subscription. Exactly one of these exists per
/// bound contract proxy; dropping it shuts the feed down.
pub struct WaveSubscription {
    shutdown_tx: Option<mpsc::UnboundedSender<()>>,
}

impl WaveSubscription {
    pub fn new(shutdown_tx: mpsc::UnboundedSender<()>) -> Self {
        Self { shutdown_tx: Some(shutdown_tx) }
    }

    /// Shut down the feed task.
    pub fn disconnect(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for WaveSubscription {
    fn drop(&mut self) {
        self.disconnect();
    }
}
