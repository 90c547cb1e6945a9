pub mod gateway;
pub mod portal;
#[cfg(test)]
pub(crate) mod testing;
pub mod types;

use std::sync::{Arc, Mutex};

use alloy::network::EthereumWallet;
use tokio::sync::mpsc;

use crate::data::gateway::{PortalGateway, WaveSubscription};
use crate::events::AppEvent;

/// Chain orchestration for the controller. Every operation spawns a task and
/// reports its outcome as an `AppEvent`; the controller never blocks on the
/// chain.
pub struct PortalService<G> {
    gateway: Arc<G>,
    event_tx: mpsc::UnboundedSender<AppEvent>,
    subscription: Arc<Mutex<Option<WaveSubscription>>>,
}

impl<G: PortalGateway> PortalService<G> {
    pub fn new(gateway: G, event_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            gateway: Arc::new(gateway),
            event_tx,
            subscription: Arc::new(Mutex::new(None)),
        }
    }

    /// Bind the contract proxy to a freshly authorized account, then load the
    /// counter and history and start the live feed. Any previous feed is
    /// disconnected before the rebind so stale handlers cannot accumulate.
    pub fn bind_account(&self, wallet: EthereumWallet) {
        let gateway = Arc::clone(&self.gateway);
        let subscription = Arc::clone(&self.subscription);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            if let Ok(mut slot) = subscription.lock() {
                if let Some(mut old) = slot.take() {
                    old.disconnect();
                }
            }

            let account = match gateway.bind(wallet).await {
                Ok(account) => account,
                Err(e) => {
                    let _ = tx.send(AppEvent::Error(format!("wallet connect failed: {e}")));
                    return;
                }
            };
            let _ = tx.send(AppEvent::AccountBound(account));

            let sub = gateway.subscribe_new_waves(tx.clone());
            if let Ok(mut slot) = subscription.lock() {
                // A racing rebind may have installed its own feed already;
                // whichever handle is displaced gets disconnected.
                if let Some(mut stale) = slot.replace(sub) {
                    stale.disconnect();
                }
            }

            match gateway.wave_history().await {
                Ok(waves) => {
                    let _ = tx.send(AppEvent::WaveHistory(waves));
                }
                Err(e) => {
                    let _ = tx.send(AppEvent::Error(format!("failed to load waves: {e}")));
                }
            }

            match gateway.total_waves().await {
                Ok(total) => {
                    let _ = tx.send(AppEvent::TotalWaves(total));
                }
                Err(e) => {
                    let _ = tx.send(AppEvent::Error(format!("failed to load wave count: {e}")));
                }
            }
        });
    }

    /// Fetch the canonical counter and overwrite the local mirror. On failure
    /// the prior mirrored value stays in place.
    pub fn fetch_total_waves(&self) {
        let gateway = Arc::clone(&self.gateway);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            match gateway.total_waves().await {
                Ok(total) => {
                    let _ = tx.send(AppEvent::TotalWaves(total));
                }
                Err(e) => {
                    let _ = tx.send(AppEvent::Error(format!("failed to load wave count: {e}")));
                }
            }
        });
    }

    /// Re-fetch the full wave history.
    pub fn fetch_wave_history(&self) {
        let gateway = Arc::clone(&self.gateway);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            match gateway.wave_history().await {
                Ok(waves) => {
                    let _ = tx.send(AppEvent::WaveHistory(waves));
                }
                Err(e) => {
                    let _ = tx.send(AppEvent::Error(format!("failed to load waves: {e}")));
                }
            }
        });
    }

    /// Submit a wave with the given message. Reports `WaveAccepted` once the
    /// transaction is pending, then `WaveConfirmed` or `WaveFailed` once it
    /// is mined or dies. No automatic retry on any failure.
    pub fn submit_wave(&self, message: String) {
        let gateway = Arc::clone(&self.gateway);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            let pending = match gateway.submit_wave(message).await {
                Ok(pending) => pending,
                Err(e) => {
                    let _ = tx.send(AppEvent::WaveFailed(format!("wave not submitted: {e}")));
                    return;
                }
            };

            let hash = pending.tx_hash();
            let _ = tx.send(AppEvent::WaveAccepted(hash));

            match pending.confirmed().await {
                Ok(()) => {
                    let _ = tx.send(AppEvent::WaveConfirmed(hash));
                }
                Err(e) => {
                    let _ = tx.send(AppEvent::WaveFailed(format!("wave failed while mining: {e}")));
                }
            }
        });
    }

    /// Tear down the live feed. Called when the controller shuts down.
    pub fn unbind(&self) {
        if let Ok(mut slot) = self.subscription.lock() {
            if let Some(mut sub) = slot.take() {
                sub.disconnect();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use alloy::primitives::Address;
    use alloy::signers::local::PrivateKeySigner;

    use super::*;
    use crate::data::testing::FakeGateway;
    use crate::data::types::WaveRecord;

    fn test_wallet() -> EthereumWallet {
        EthereumWallet::from(PrivateKeySigner::random())
    }

    async fn next_event(rx: &mut mpsc::UnboundedReceiver<AppEvent>) -> AppEvent {
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("event channel closed")
    }

    /// Drain events until one matches, panicking if it never arrives.
    async fn wait_for(
        rx: &mut mpsc::UnboundedReceiver<AppEvent>,
        mut pred: impl FnMut(&AppEvent) -> bool,
    ) -> AppEvent {
        loop {
            let event = next_event(rx).await;
            if pred(&event) {
                return event;
            }
        }
    }

    fn seed_waves() -> Vec<WaveRecord> {
        vec![
            WaveRecord {
                waver: Address::from_slice(&[0x01; 20]),
                message: "hello".to_string(),
                timestamp: 1_700_000_000,
            },
            WaveRecord {
                waver: Address::from_slice(&[0x02; 20]),
                message: "gm".to_string(),
                timestamp: 1_700_000_060,
            },
        ]
    }

    #[tokio::test]
    async fn test_bind_loads_history_and_counter() {
        let fake = FakeGateway::with_state(2, seed_waves());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let service = PortalService::new(fake.clone(), tx);

        service.bind_account(test_wallet());

        let bound = wait_for(&mut rx, |e| matches!(e, AppEvent::AccountBound(_))).await;
        assert!(matches!(bound, AppEvent::AccountBound(a) if a == fake.account()));

        let history = wait_for(&mut rx, |e| matches!(e, AppEvent::WaveHistory(_))).await;
        match history {
            AppEvent::WaveHistory(waves) => assert_eq!(waves.len(), 2),
            _ => unreachable!(),
        }

        let total = wait_for(&mut rx, |e| matches!(e, AppEvent::TotalWaves(_))).await;
        assert!(matches!(total, AppEvent::TotalWaves(2)));

        assert_eq!(fake.active_subscriptions(), 1);
    }

    #[tokio::test]
    async fn test_rebind_leaves_exactly_one_live_subscription() {
        let fake = FakeGateway::with_state(0, Vec::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let service = PortalService::new(fake.clone(), tx);

        service.bind_account(test_wallet());
        wait_for(&mut rx, |e| matches!(e, AppEvent::TotalWaves(_))).await;

        service.bind_account(test_wallet());
        wait_for(&mut rx, |e| matches!(e, AppEvent::TotalWaves(_))).await;

        assert_eq!(fake.active_subscriptions(), 1);

        // A wave emitted now must come through once, not once per bind.
        fake.emit_wave(WaveRecord {
            waver: Address::from_slice(&[0x03; 20]),
            message: "after rebind".to_string(),
            timestamp: 1_700_000_120,
        });
        let event = wait_for(&mut rx, |e| matches!(e, AppEvent::NewWave(_))).await;
        assert!(matches!(event, AppEvent::NewWave(w) if w.message == "after rebind"));
        assert!(
            tokio::time::timeout(Duration::from_millis(50), rx.recv())
                .await
                .is_err(),
            "stale subscription delivered a duplicate event"
        );
    }

    #[tokio::test]
    async fn test_confirmed_submissions_reconcile_counter() {
        let fake = FakeGateway::with_state(0, Vec::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let service = PortalService::new(fake.clone(), tx);

        service.bind_account(test_wallet());
        wait_for(&mut rx, |e| matches!(e, AppEvent::TotalWaves(_))).await;

        for n in 1..=3u64 {
            service.submit_wave(format!("wave {n}"));
            wait_for(&mut rx, |e| matches!(e, AppEvent::WaveAccepted(_))).await;
            wait_for(&mut rx, |e| matches!(e, AppEvent::WaveConfirmed(_))).await;

            service.fetch_total_waves();
            let total = wait_for(&mut rx, |e| matches!(e, AppEvent::TotalWaves(_))).await;
            assert!(matches!(total, AppEvent::TotalWaves(t) if t == n));
        }

        assert_eq!(fake.canonical_total(), 3);
    }

    #[tokio::test]
    async fn test_rejected_submission_reports_failure_only() {
        let fake = FakeGateway::with_state(0, Vec::new());
        fake.fail_next_submit();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let service = PortalService::new(fake.clone(), tx);

        service.submit_wave("doomed".to_string());

        let event = next_event(&mut rx).await;
        assert!(matches!(event, AppEvent::WaveFailed(_)));
        assert_eq!(fake.canonical_total(), 0);
        assert!(fake.canonical_waves().is_empty());
    }

    #[tokio::test]
    async fn test_unbind_disconnects_feed() {
        let fake = FakeGateway::with_state(0, Vec::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let service = PortalService::new(fake.clone(), tx);

        service.bind_account(test_wallet());
        wait_for(&mut rx, |e| matches!(e, AppEvent::TotalWaves(_))).await;
        assert_eq!(fake.active_subscriptions(), 1);

        service.unbind();
        assert_eq!(fake.active_subscriptions(), 0);
    }
}
