//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured supervisor events to the
//! ESP-IDF logger (UART / USB-CDC in production). The log lines plus the
//! published topic are the node's entire user-visible surface.

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started {
                consecutive_reboots,
                safe_mode,
            } => {
                info!(
                    "BOOT  | consecutive_reboots={consecutive_reboots} safe_mode={safe_mode}"
                );
            }
            AppEvent::RadioDisabled => {
                warn!("RADIO | powered down (safe mode)");
            }
            AppEvent::SessionLost => {
                warn!("LINK  | session degraded");
            }
            AppEvent::Recovered => {
                info!("LINK  | recovered");
            }
            AppEvent::RecoveryFailed { link_up } => {
                warn!("LINK  | recovery failed (link_up={link_up})");
            }
            AppEvent::SensorFailed => {
                warn!("SENSE | measurement failed");
            }
            AppEvent::Published { payload } => {
                info!("PUB   | {payload}");
            }
            AppEvent::PublishRejected(e) => {
                warn!("PUB   | rejected: {e}");
            }
            AppEvent::RebootRequested(reason) => {
                error!("BOOT  | reboot requested: {reason}");
            }
        }
    }
}
