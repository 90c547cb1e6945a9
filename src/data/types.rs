use alloy::primitives::Address;

/// One wave stored by the portal contract. Records are immutable and listed
/// in chain log order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveRecord {
    pub waver: Address,
    pub message: String,
    /// Epoch seconds as reported by the contract
    pub timestamp: u64,
}

impl WaveRecord {
    /// Identity used to reconcile the bulk history fetch with live events:
    /// the contract stamps one timestamp per wave, so sender plus timestamp
    /// identifies a wave.
    pub fn same_wave(&self, other: &WaveRecord) -> bool {
        self.waver == other.waver && self.timestamp == other.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(byte: u8, timestamp: u64) -> WaveRecord {
        WaveRecord {
            waver: Address::from_slice(&[byte; 20]),
            message: "gm".to_string(),
            timestamp,
        }
    }

    #[test]
    fn test_same_wave_matches_on_sender_and_timestamp() {
        let a = record(0x01, 100);
        let mut b = record(0x01, 100);
        b.message = "different text".to_string();
        assert!(a.same_wave(&b));
    }

    #[test]
    fn test_same_wave_differs_on_sender() {
        assert!(!record(0x01, 100).same_wave(&record(0x02, 100)));
    }

    #[test]
    fn test_same_wave_differs_on_timestamp() {
        assert!(!record(0x01, 100).same_wave(&record(0x01, 101)));
    }
}
