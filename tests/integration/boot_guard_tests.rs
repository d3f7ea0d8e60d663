//! Boot-loop guard across simulated reset sequences.
//!
//! Drives `boot::evaluate` the way real boots would: one call per reset,
//! with the counter cell persisting between calls the way the RTC scratch
//! words do across warm resets.

use crate::mock_hw::{MockBootCell, RecordingSink};
use hygrolink::app::boot;
use hygrolink::app::events::AppEvent;
use hygrolink::app::ports::ResetCause;

const THRESHOLD: u32 = 5;

/// Replay a sequence of resets through the guard, returning the verdicts.
fn replay(causes: &[ResetCause]) -> Vec<(u32, bool)> {
    let mut cell = MockBootCell::new(ResetCause::PowerOn, 0);
    let mut verdicts = Vec::new();
    for &cause in causes {
        cell.cause = cause;
        let mut sink = RecordingSink::new();
        let state = boot::evaluate(&mut cell, THRESHOLD, &mut sink);
        verdicts.push((state.consecutive_reboot_count, state.safe_mode));
    }
    verdicts
}

#[test]
fn kth_watchdog_reset_counts_k() {
    let causes = [ResetCause::Watchdog; 8];
    let verdicts = replay(&causes);
    for (i, (count, safe)) in verdicts.iter().enumerate() {
        let k = (i + 1) as u32;
        assert_eq!(*count, k, "after reset {k}");
        assert_eq!(*safe, k >= THRESHOLD, "safe mode after reset {k}");
    }
}

#[test]
fn safe_mode_latches_until_a_non_watchdog_reset() {
    let verdicts = replay(&[
        ResetCause::Watchdog,
        ResetCause::Watchdog,
        ResetCause::Watchdog,
        ResetCause::Watchdog,
        ResetCause::Watchdog, // -> safe mode
        ResetCause::Watchdog, // stays
        ResetCause::Software, // human intervention clears it
        ResetCause::Watchdog,
    ]);
    assert_eq!(verdicts[4], (5, true));
    assert_eq!(verdicts[5], (6, true));
    assert_eq!(verdicts[6], (0, false));
    assert_eq!(verdicts[7], (1, false));
}

#[test]
fn cold_boot_always_starts_clean() {
    let verdicts = replay(&[
        ResetCause::Watchdog,
        ResetCause::Watchdog,
        ResetCause::PowerOn,
    ]);
    assert_eq!(verdicts[2], (0, false));
}

#[test]
fn interleaved_causes_never_accumulate() {
    let verdicts = replay(&[
        ResetCause::Watchdog,
        ResetCause::PowerOn,
        ResetCause::Watchdog,
        ResetCause::Other,
        ResetCause::Watchdog,
    ]);
    // Every watchdog run is length 1; safe mode is never reached.
    assert!(verdicts.iter().all(|(_, safe)| !safe));
    assert_eq!(verdicts.last(), Some(&(1, false)));
}

#[test]
fn guard_emits_a_started_event() {
    let mut cell = MockBootCell::new(ResetCause::Watchdog, 4);
    let mut sink = RecordingSink::new();
    let state = boot::evaluate(&mut cell, THRESHOLD, &mut sink);
    assert!(state.safe_mode);
    assert!(matches!(
        sink.events.as_slice(),
        [AppEvent::Started {
            consecutive_reboots: 5,
            safe_mode: true,
        }]
    ));
}
