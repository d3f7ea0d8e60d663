//! Boot-loop guard.
//!
//! Runs exactly once at startup, before the radio is allowed up. Reads the
//! persisted consecutive-reboot counter, updates it according to the reset
//! cause, and decides whether this boot enters Safe Mode.
//!
//! ```text
//!   watchdog reset   → counter += 1
//!   any other reset  → counter  = 0
//!   safe_mode        = counter >= threshold
//! ```
//!
//! Safe Mode is terminal for this boot: the radio is powered down and no
//! recovery is attempted, trading availability for a locally inspectable
//! device. Only a non-watchdog reset (human intervention) leaves it.

use log::{info, warn};

use super::ports::{BootCounterPort, EventSink, ResetCause};
use crate::app::events::AppEvent;

/// Boot-loop verdict, fixed for the lifetime of this boot.
///
/// Invariant: `safe_mode == (consecutive_reboot_count >= threshold)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootState {
    pub consecutive_reboot_count: u32,
    pub safe_mode: bool,
}

/// Evaluate the boot-loop guard and persist the updated counter.
///
/// Must run before the watchdog is armed so that a reset during evaluation
/// itself cannot corrupt the count mid-update — the store is a single word
/// write.
pub fn evaluate(
    counter: &mut impl BootCounterPort,
    threshold: u32,
    sink: &mut impl EventSink,
) -> BootState {
    let cause = counter.reset_cause();
    let count = match cause {
        ResetCause::Watchdog => counter.load().saturating_add(1),
        _ => 0,
    };
    counter.store(count);

    let safe_mode = count >= threshold;
    if safe_mode {
        warn!(
            "boot guard: {count} consecutive watchdog reboots (cause {cause:?}) — entering Safe Mode"
        );
    } else {
        info!("boot guard: reset cause {cause:?}, consecutive reboots {count}");
    }

    sink.emit(&AppEvent::Started {
        consecutive_reboots: count,
        safe_mode,
    });

    BootState {
        consecutive_reboot_count: count,
        safe_mode,
    }
}
