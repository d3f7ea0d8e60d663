//! Measurement model and payload construction.
//!
//! A [`Measurement`] is created fresh each tick by the sensor collaborator,
//! consumed immediately to build a [`Payload`], and never persisted. The
//! payload is a bounded text buffer: either the fixed failure marker or a
//! human-readable reading formatted to one decimal place.

use core::fmt::Write as _;

/// Sentinel written into both fields when the bus transaction fails.
pub const FAIL_SENTINEL: f32 = -100.0;

/// Fixed payload text published when the measurement failed.
pub const FAILURE_MARKER: &str = "failed";

/// Upper bound on the formatted payload. "Temp=-99.9°C Hum=100.0%" is
/// 24 bytes; 64 leaves headroom for any float widening.
pub const PAYLOAD_CAP: usize = 64;

/// Bounded payload buffer, created and destroyed within one tick.
pub type Payload = heapless::String<PAYLOAD_CAP>;

// ───────────────────────────────────────────────────────────────
// Measurement
// ───────────────────────────────────────────────────────────────

/// One temperature/humidity sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

impl Measurement {
    /// The value a failed bus transaction decodes to.
    pub const FAILED: Self = Self {
        temperature_c: FAIL_SENTINEL,
        humidity_pct: FAIL_SENTINEL,
    };

    pub const fn new(temperature_c: f32, humidity_pct: f32) -> Self {
        Self {
            temperature_c,
            humidity_pct,
        }
    }

    /// Classify this reading under the given failure policy.
    pub fn is_failed(&self, policy: FailurePolicy) -> bool {
        match policy {
            FailurePolicy::SentinelOnly => {
                self.humidity_pct == FAIL_SENTINEL || self.temperature_c <= FAIL_SENTINEL
            }
            FailurePolicy::NonPositive => {
                self.temperature_c <= 0.0 || self.humidity_pct <= 0.0
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Failure policy
// ───────────────────────────────────────────────────────────────

/// How a raw reading is classified as failed.
///
/// Two predicates exist in the field. `SentinelOnly` treats only the
/// transaction-failure sentinel as a failure and is the shipped default;
/// `NonPositive` additionally rejects any reading at or below zero, which
/// misclassifies legitimate freezing-point temperatures (and a true 0.0 %
/// humidity) as failures. It is kept selectable for deployments that want
/// the stricter plausibility filter indoors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Failed iff the reading carries the bus-failure sentinel.
    SentinelOnly,
    /// Failed if either sub-reading is at or below zero.
    NonPositive,
}

// ───────────────────────────────────────────────────────────────
// Payload construction
// ───────────────────────────────────────────────────────────────

/// Build the publish payload for one measurement.
///
/// Deterministic: a failed reading always yields [`FAILURE_MARKER`],
/// independent of prior tick state.
pub fn build_payload(m: &Measurement, policy: FailurePolicy) -> Payload {
    let mut out = Payload::new();
    if m.is_failed(policy) {
        // Infallible: marker is far under capacity.
        let _ = out.push_str(FAILURE_MARKER);
        return out;
    }
    if write!(
        out,
        "Temp={:.1}\u{00b0}C Hum={:.1}%",
        m.temperature_c, m.humidity_pct
    )
    .is_err()
    {
        // Capacity overflow cannot happen for in-range floats; fall back to
        // the marker rather than publishing a truncated reading.
        out.clear();
        let _ = out.push_str(FAILURE_MARKER);
    }
    out
}
