//! Outbound supervisor events.
//!
//! The [`NodeService`](super::service::NodeService) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them — in production they become serial log lines,
//! in tests they are collected and asserted on.

use crate::app::escalation::RebootReason;
use crate::app::measurement::Payload;
use crate::error::BrokerError;

/// Structured events emitted by the supervisor core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Boot evaluation finished (carries the boot-loop verdict).
    Started {
        consecutive_reboots: u32,
        safe_mode: bool,
    },

    /// Safe Mode powered the radio down; no recovery will be attempted.
    RadioDisabled,

    /// A previously healthy session was observed degraded at tick start.
    SessionLost,

    /// Link and session are both healthy again after a recovery attempt.
    Recovered,

    /// This tick's recovery attempt failed; the loop will back off.
    RecoveryFailed { link_up: bool },

    /// The sensor transaction failed; the failure marker will be published.
    SensorFailed,

    /// A payload was handed to the broker client.
    Published { payload: Payload },

    /// The broker client refused the publish; no retry.
    PublishRejected(BrokerError),

    /// The escalator requested the last-resort reboot.
    RebootRequested(RebootReason),
}
