//! Port traits — the hexagonal boundary between the supervisor and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ NodeService (domain)
//! ```
//!
//! Driven adapters (watchdog, Wi-Fi, broker client, sensor, storage)
//! implement these traits. The [`NodeService`](super::service::NodeService)
//! consumes them via generics, so the supervisor never touches hardware
//! directly and every failure policy can be exercised on the host.

use crate::app::events::AppEvent;
use crate::app::measurement::Measurement;
use crate::error::{BrokerError, NetError, StorageError};

// ───────────────────────────────────────────────────────────────
// Boot counter port (driven adapter: persistent scratch cell)
// ───────────────────────────────────────────────────────────────

/// Why the chip last reset, as reported by the platform.
///
/// Only [`Watchdog`](ResetCause::Watchdog) feeds the boot-loop counter;
/// every other cause resets it. Serializable so the boot-event ring can
/// persist it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ResetCause {
    /// Cold boot / power applied. The scratch cell contents are undefined.
    PowerOn,
    /// The hardware deadman timer fired.
    Watchdog,
    /// Software-requested restart (e.g. flash tooling).
    Software,
    /// External reset pin, brownout, or anything else.
    Other,
}

/// One unsigned counter cell that survives a watchdog-triggered warm reset
/// and is cleared (or garbage, guarded by the adapter) on cold power-up.
pub trait BootCounterPort {
    /// Cause of the reset that led to this boot.
    fn reset_cause(&self) -> ResetCause;

    /// Read the persisted consecutive-reboot counter.
    fn load(&self) -> u32;

    /// Persist the counter immediately. The cell is assumed always
    /// available on this platform; there is no failure path.
    fn store(&mut self, count: u32);
}

// ───────────────────────────────────────────────────────────────
// Watchdog port (driven adapter: hardware deadman timer)
// ───────────────────────────────────────────────────────────────

/// The tick-path view of the deadman timer. Arming and the force-reset
/// escape hatch stay on the concrete driver — the supervisor only ever
/// needs to prove liveness.
pub trait WatchdogPort {
    /// Acknowledge the deadman timer. Must be called at least once per
    /// timeout interval or the device hard-resets.
    fn feed(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Network port (driven adapter: wireless link)
// ───────────────────────────────────────────────────────────────

/// Station-mode wireless link. `connect` is synchronous and bounded by the
/// stack's own association timeout; `link_up` is a cheap fresh query.
pub trait NetworkPort {
    /// Associate with the configured access point. Blocks up to the
    /// collaborator timeout.
    fn connect(&mut self) -> Result<(), NetError>;

    /// Latest link-layer status. Never cached by callers across ticks.
    fn link_up(&self) -> bool;

    /// Power the radio up or down. Safe Mode powers it down for good.
    fn set_radio_enabled(&mut self, enabled: bool);
}

// ───────────────────────────────────────────────────────────────
// Broker port (driven adapter: MQTT session)
// ───────────────────────────────────────────────────────────────

/// The logical broker session, distinct from link-layer connectivity.
pub trait BrokerPort {
    /// Issue a session-establishment request. Returns once the request is
    /// accepted by the client stack; the CONNACK may land later via the
    /// status callback.
    fn connect(&mut self) -> Result<(), BrokerError>;

    /// Latest session status. Backed by a word-atomic flag that the
    /// client's asynchronous status callback also writes; callers must
    /// re-read it at every tick start, never cache the previous verdict.
    fn session_established(&self) -> bool;

    /// Fire-and-forget publish to the fixed topic, QoS 0, not retained.
    /// Completion is reported asynchronously and only logged.
    fn publish(&mut self, payload: &[u8]) -> Result<(), BrokerError>;
}

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: one measurement per tick. A failed bus transaction is
/// reported through the sentinel value, not an error — a bad reading is
/// not a health-affecting event.
pub trait SensorPort {
    fn read(&mut self) -> Measurement;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage for the boot-event ring.
///
/// Keys are namespaced; writes are atomic (the ESP-IDF NVS API guarantees
/// this natively, the in-memory simulation trivially).
pub trait StoragePort {
    /// Read a value. Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key. Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The supervisor emits structured [`AppEvent`]s through this port.
/// Adapters decide where they go (serial log in production, a `Vec` in
/// tests).
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}
