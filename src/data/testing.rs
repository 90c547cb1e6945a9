//! In-memory gateway used to drive the service and controller in tests.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, B256};
use color_eyre::eyre::{eyre, Result};
use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use crate::data::gateway::{PendingWave, PortalGateway, WaveSubscription};
use crate::data::types::WaveRecord;
use crate::events::AppEvent;

struct FakeSub {
    sink: mpsc::UnboundedSender<AppEvent>,
    shutdown: mpsc::UnboundedReceiver<()>,
    dead: bool,
}

struct FakeInner {
    account: Address,
    total: AtomicU64,
    waves: Mutex<Vec<WaveRecord>>,
    fail_next_submit: AtomicBool,
    submissions: AtomicU64,
    subs: Mutex<Vec<FakeSub>>,
}

/// Fake contract proxy with a canonical counter and wave list. Submissions
/// mutate canonical state only at confirmation time, mirroring the chain.
#[derive(Clone)]
pub struct FakeGateway(Arc<FakeInner>);

impl FakeGateway {
    pub fn with_state(total: u64, waves: Vec<WaveRecord>) -> Self {
        Self(Arc::new(FakeInner {
            account: Address::repeat_byte(0xAA),
            total: AtomicU64::new(total),
            waves: Mutex::new(waves),
            fail_next_submit: AtomicBool::new(false),
            submissions: AtomicU64::new(0),
            subs: Mutex::new(Vec::new()),
        }))
    }

    pub fn account(&self) -> Address {
        self.0.account
    }

    pub fn canonical_total(&self) -> u64 {
        self.0.total.load(Ordering::SeqCst)
    }

    pub fn canonical_waves(&self) -> Vec<WaveRecord> {
        self.0.waves.lock().unwrap().clone()
    }

    pub fn fail_next_submit(&self) {
        self.0.fail_next_submit.store(true, Ordering::SeqCst);
    }

    /// How many times `submit_wave` was reached, including rejected attempts.
    pub fn submission_attempts(&self) -> u64 {
        self.0.submissions.load(Ordering::SeqCst)
    }

    /// Subscriptions whose shutdown channel has not fired.
    pub fn active_subscriptions(&self) -> usize {
        let mut subs = self.0.subs.lock().unwrap();
        prune(&mut subs);
        subs.iter().filter(|s| !s.dead).count()
    }

    /// Deliver a live event through every subscription that is still active.
    pub fn emit_wave(&self, record: WaveRecord) {
        let mut subs = self.0.subs.lock().unwrap();
        prune(&mut subs);
        for sub in subs.iter().filter(|s| !s.dead) {
            let _ = sub.sink.send(AppEvent::NewWave(record.clone()));
        }
    }
}

fn prune(subs: &mut [FakeSub]) {
    for sub in subs.iter_mut().filter(|s| !s.dead) {
        match sub.shutdown.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => sub.dead = true,
            Err(TryRecvError::Empty) => {}
        }
    }
}

impl PortalGateway for FakeGateway {
    async fn bind(&self, _wallet: EthereumWallet) -> Result<Address> {
        Ok(self.0.account)
    }

    async fn total_waves(&self) -> Result<u64> {
        Ok(self.canonical_total())
    }

    async fn wave_history(&self) -> Result<Vec<WaveRecord>> {
        Ok(self.canonical_waves())
    }

    async fn submit_wave(&self, message: String) -> Result<PendingWave> {
        let n = self.0.submissions.fetch_add(1, Ordering::SeqCst) + 1;
        if self.0.fail_next_submit.swap(false, Ordering::SeqCst) {
            return Err(eyre!("user rejected signing"));
        }

        let record = WaveRecord {
            waver: self.0.account,
            message,
            timestamp: 1_700_000_000 + n * 60,
        };
        let hash = B256::repeat_byte(n as u8);

        let inner = Arc::clone(&self.0);
        let confirmation = async move {
            inner.total.fetch_add(1, Ordering::SeqCst);
            inner.waves.lock().unwrap().push(record);
            Ok(())
        }
        .boxed();

        Ok(PendingWave::new(hash, confirmation))
    }

    fn subscribe_new_waves(&self, events: mpsc::UnboundedSender<AppEvent>) -> WaveSubscription {
        let (shutdown_tx, shutdown_rx) = mpsc::unbounded_channel();
        let _ = events.send(AppEvent::FeedConnected);
        self.0.subs.lock().unwrap().push(FakeSub {
            sink: events,
            shutdown: shutdown_rx,
            dead: false,
        });
        WaveSubscription::new(shutdown_tx)
    }
}
