use std::sync::Mutex;
use std::time::{Duration, Instant};

use trunkline_core::TrunkGroup;

pub const MAX_TRUNK_GROUPS: usize = 64;

/// Back-off delay after the peer reports all circuits busy: two seconds per
/// hundred calls in use, clamped to 1..=10 seconds.
pub fn congestion_delay(in_use: u32) -> Duration {
    let delay = (in_use / 100) * 2;
    Duration::from_secs(delay.clamp(1, 10) as u64)
}

/// Per-trunk-group congestion back-off. An entry holds the expiry of the
/// current back-off window; no entry means the group is open.
pub struct CongestionTable {
    timeouts: Mutex<[Option<Instant>; MAX_TRUNK_GROUPS]>,
}

impl CongestionTable {
    pub fn new() -> Self {
        Self {
            timeouts: Mutex::new([None; MAX_TRUNK_GROUPS]),
        }
    }

    /// True while the trunk group is backing off. Expired windows are
    /// cleared on the way out.
    pub fn check(&self, tg: TrunkGroup) -> bool {
        if tg >= MAX_TRUNK_GROUPS {
            return false;
        }
        let mut timeouts = self.timeouts.lock().expect("congestion mutex blocked");
        match timeouts[tg] {
            Some(expiry) if Instant::now() >= expiry => {
                timeouts[tg] = None;
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    pub fn backoff(&self, tg: TrunkGroup, delay: Duration) {
        if tg >= MAX_TRUNK_GROUPS {
            return;
        }
        let mut timeouts = self.timeouts.lock().expect("congestion mutex blocked");
        timeouts[tg] = Some(Instant::now() + delay);
    }
}

impl Default for CongestionTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_clamp() {
        assert_eq!(congestion_delay(0), Duration::from_secs(1));
        assert_eq!(congestion_delay(99), Duration::from_secs(1));
        assert_eq!(congestion_delay(250), Duration::from_secs(4));
        assert_eq!(congestion_delay(10_000), Duration::from_secs(10));
    }

    #[test]
    fn test_backoff_expires() {
        let table = CongestionTable::new();
        assert!(!table.check(0));
        table.backoff(0, Duration::from_millis(30));
        assert!(table.check(0));
        // Other trunk groups are unaffected
        assert!(!table.check(1));
        std::thread::sleep(Duration::from_millis(40));
        assert!(!table.check(0));
    }
}
