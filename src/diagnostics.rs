//! Boot diagnostics.
//!
//! Stores the last few boot-guard verdicts in an NVS ring buffer under the
//! "bootlog" namespace. A technician attaching to a Safe-Mode device (radio
//! down, serial only) can read back how it got there: which resets were
//! watchdog-caused, how far the consecutive counter climbed, and when Safe
//! Mode latched.

use serde::{Deserialize, Serialize};

use crate::app::boot::BootState;
use crate::app::ports::{ResetCause, StoragePort};

const RING_SLOTS: usize = 4;
const NAMESPACE: &str = "bootlog";
const INDEX_KEY: &str = "idx";

/// One boot-guard verdict, persisted at every startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootEvent {
    pub cause: ResetCause,
    pub consecutive_reboots: u32,
    pub safe_mode: bool,
}

impl BootEvent {
    pub fn new(cause: ResetCause, state: BootState) -> Self {
        Self {
            cause,
            consecutive_reboots: state.consecutive_reboot_count,
            safe_mode: state.safe_mode,
        }
    }
}

/// NVS-backed ring buffer of [`BootEvent`]s.
#[derive(Default)]
pub struct BootLog {
    write_index: usize,
}

impl BootLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the write index from NVS, or default to 0.
    pub fn init(&mut self, nvs: &dyn StoragePort) {
        let mut buf = [0u8; 4];
        if let Ok(4) = nvs.read(NAMESPACE, INDEX_KEY, &mut buf) {
            self.write_index = u32::from_le_bytes(buf) as usize % RING_SLOTS;
        }
    }

    /// Append an event to the next ring slot and advance the index.
    /// Best-effort: a full or failing partition only costs history.
    pub fn record(&mut self, nvs: &mut dyn StoragePort, event: &BootEvent) {
        let slot_key = Self::slot_key(self.write_index);
        if let Ok(bytes) = postcard::to_allocvec(event) {
            let _ = nvs.write(NAMESPACE, &slot_key, &bytes);
        }

        self.write_index = (self.write_index + 1) % RING_SLOTS;
        let idx_bytes = (self.write_index as u32).to_le_bytes();
        let _ = nvs.write(NAMESPACE, INDEX_KEY, &idx_bytes);
    }

    /// Read all stored events (up to the ring capacity).
    pub fn read_all(&self, nvs: &dyn StoragePort) -> heapless::Vec<BootEvent, RING_SLOTS> {
        let mut events = heapless::Vec::new();
        for i in 0..RING_SLOTS {
            let mut buf = [0u8; 64];
            if let Ok(len) = nvs.read(NAMESPACE, &Self::slot_key(i), &mut buf) {
                if let Ok(event) = postcard::from_bytes::<BootEvent>(&buf[..len]) {
                    let _ = events.push(event);
                }
            }
        }
        events
    }

    /// Erase all stored events and reset the index.
    pub fn clear(&mut self, nvs: &mut dyn StoragePort) {
        for i in 0..RING_SLOTS {
            let _ = nvs.delete(NAMESPACE, &Self::slot_key(i));
        }
        let _ = nvs.delete(NAMESPACE, INDEX_KEY);
        self.write_index = 0;
    }

    fn slot_key(index: usize) -> heapless::String<16> {
        let mut s = heapless::String::new();
        let _ = core::fmt::Write::write_fmt(&mut s, format_args!("e{index}"));
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::nvs::NvsStorage;

    fn event(count: u32) -> BootEvent {
        BootEvent {
            cause: ResetCause::Watchdog,
            consecutive_reboots: count,
            safe_mode: count >= 5,
        }
    }

    #[test]
    fn records_and_reads_back() {
        let mut nvs = NvsStorage::new().unwrap();
        let mut log = BootLog::new();
        log.init(&nvs);

        log.record(&mut nvs, &event(1));
        log.record(&mut nvs, &event(2));

        let events = log.read_all(&nvs);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].consecutive_reboots, 1);
        assert_eq!(events[1].consecutive_reboots, 2);
    }

    #[test]
    fn ring_overwrites_oldest_slot() {
        let mut nvs = NvsStorage::new().unwrap();
        let mut log = BootLog::new();
        log.init(&nvs);

        for i in 1..=6 {
            log.record(&mut nvs, &event(i));
        }
        let events = log.read_all(&nvs);
        assert_eq!(events.len(), 4);
        // Slots now hold 5, 6, 3, 4 (ring order); the oldest two are gone.
        let counts: Vec<u32> = events.iter().map(|e| e.consecutive_reboots).collect();
        assert!(counts.contains(&5) && counts.contains(&6));
        assert!(!counts.contains(&1) && !counts.contains(&2));
    }

    #[test]
    fn write_index_survives_restart() {
        let mut nvs = NvsStorage::new().unwrap();
        let mut log = BootLog::new();
        log.init(&nvs);
        log.record(&mut nvs, &event(1));

        // A new BootLog over the same storage resumes at slot 1.
        let mut log2 = BootLog::new();
        log2.init(&nvs);
        log2.record(&mut nvs, &event(2));

        let events = log2.read_all(&nvs);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn clear_erases_everything() {
        let mut nvs = NvsStorage::new().unwrap();
        let mut log = BootLog::new();
        log.record(&mut nvs, &event(1));
        log.clear(&mut nvs);
        assert!(log.read_all(&nvs).is_empty());
    }

    #[test]
    fn safe_mode_flag_round_trips() {
        let mut nvs = NvsStorage::new().unwrap();
        let mut log = BootLog::new();
        log.record(&mut nvs, &event(5));
        let events = log.read_all(&nvs);
        assert!(events[0].safe_mode);
        assert_eq!(events[0].cause, ResetCause::Watchdog);
    }
}
