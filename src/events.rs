use alloy::primitives::{Address, B256};

use crate::data::types::WaveRecord;

/// Events sent from background chain tasks to the main app loop
#[derive(Debug)]
pub enum AppEvent {
    /// Read provider reachable; payload is the chain id
    Connected(u64),

    /// A signer-bound contract proxy is in place for this account
    AccountBound(Address),

    // Reads
    TotalWaves(u64),
    WaveHistory(Vec<WaveRecord>),

    // Live subscription
    NewWave(WaveRecord),
    FeedConnected,
    FeedDisconnected,

    // Submission lifecycle
    WaveAccepted(B256),
    WaveConfirmed(B256),
    WaveFailed(String),

    // Status
    Error(String),
}
