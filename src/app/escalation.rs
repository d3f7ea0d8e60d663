//! Deadline-based last-resort reboot escalation.
//!
//! The watchdog catches a loop that stops running; it cannot catch a loop
//! that runs forever while the *environment* (access point or broker)
//! refuses to recover. The escalator closes that gap: if connectivity has
//! not been fully healthy for longer than the deadline, it requests one
//! unconditional reboot.
//!
//! Never fires in Safe Mode — Safe Mode is already the "stop trying, wait
//! for a human" terminal state, and rebooting out of it would restart the
//! very loop the boot counter exists to stop.

use core::fmt;

/// Why the escalator requested a reboot. Logged verbatim before the reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebootReason {
    /// Connectivity stayed unhealthy past the no-recovery deadline.
    NoRecoveryDeadline,
}

impl fmt::Display for RebootReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRecoveryDeadline => write!(f, "no recovery within deadline"),
        }
    }
}

/// Stateless deadline check, evaluated once per tick.
pub struct DeadlineEscalator {
    deadline_ms: u64,
}

impl DeadlineEscalator {
    pub const fn new(deadline_ms: u64) -> Self {
        Self { deadline_ms }
    }

    /// Request a reboot iff strictly more than the deadline has elapsed
    /// since the last fully-healthy tick, and the device is not in Safe
    /// Mode.
    pub fn check(
        &self,
        now_ms: u64,
        last_known_good_ms: u64,
        safe_mode: bool,
    ) -> Option<RebootReason> {
        if safe_mode {
            return None;
        }
        if now_ms.saturating_sub(last_known_good_ms) > self.deadline_ms {
            Some(RebootReason::NoRecoveryDeadline)
        } else {
            None
        }
    }
}
