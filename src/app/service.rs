//! Node service — per-tick orchestration of the resilience supervisor.
//!
//! ```text
//!  WatchdogPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!  NetworkPort  ──▶ │        NodeService           │
//!  BrokerPort   ◀──▶│  BootGuard verdict           │
//!  SensorPort   ──▶ │  ConnectivitySupervisor      │
//!                   │  DeadlineEscalator           │
//!                   └──────────────────────────────┘
//! ```
//!
//! One call to [`NodeService::tick`] is one loop iteration:
//! feed the watchdog → supervise connectivity → check escalation → read the
//! sensor → build the payload → fire-and-forget publish. The caller owns
//! the sleeps and the actual reset; the service reports what the tick did
//! through [`TickOutcome`] so the whole policy is host-testable.

use log::{error, info};

use super::boot::BootState;
use super::connectivity::ConnectivitySupervisor;
use super::escalation::{DeadlineEscalator, RebootReason};
use super::events::AppEvent;
use super::measurement::{build_payload, FailurePolicy};
use super::ports::{BrokerPort, EventSink, NetworkPort, SensorPort, WatchdogPort};
use crate::config::NodeConfig;

/// What one tick did, and therefore what the caller does next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Full tick: a payload was submitted (or its submission was rejected
    /// and logged). Sleep one tick period.
    Published,
    /// Connectivity was unhealthy and recovery failed (or Safe Mode holds
    /// the radio down). The sensor was not read. Sleep the retry backoff.
    BackedOff,
    /// The escalator fired. The caller must force the reset; control does
    /// not meaningfully continue.
    RebootRequested(RebootReason),
}

/// Owns the supervisor state machine and drives one tick at a time.
pub struct NodeService {
    boot: BootState,
    connectivity: ConnectivitySupervisor,
    escalator: DeadlineEscalator,
    policy: FailurePolicy,
    tick_count: u64,
    /// Once the escalator has fired, every further tick reports the same
    /// verdict without re-running the cycle.
    reboot_latched: Option<RebootReason>,
}

impl NodeService {
    /// `now_ms` seeds the last-known-good timestamp: the deadline counts
    /// from boot, not from an arbitrary epoch.
    pub fn new(boot: BootState, config: &NodeConfig, now_ms: u64) -> Self {
        Self {
            boot,
            connectivity: ConnectivitySupervisor::new(boot.safe_mode, now_ms),
            escalator: DeadlineEscalator::new(config.no_recovery_deadline_ms),
            policy: config.failure_policy,
            tick_count: 0,
            reboot_latched: None,
        }
    }

    /// The boot-loop verdict this service was started with.
    pub fn boot_state(&self) -> BootState {
        self.boot
    }

    /// Ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Timestamp of the most recent fully-healthy tick.
    pub fn last_known_good_ms(&self) -> u64 {
        self.connectivity.last_known_good_ms()
    }

    /// Run one tick of the sample-and-publish loop.
    pub fn tick(
        &mut self,
        now_ms: u64,
        watchdog: &mut impl WatchdogPort,
        net: &mut impl NetworkPort,
        broker: &mut impl BrokerPort,
        sensor: &mut impl SensorPort,
        sink: &mut impl EventSink,
    ) -> TickOutcome {
        if let Some(reason) = self.reboot_latched {
            return TickOutcome::RebootRequested(reason);
        }

        self.tick_count += 1;

        // 1. Prove liveness before anything that can block.
        watchdog.feed();

        // 2. Health check + repair.
        let link = self.connectivity.supervise(now_ms, net, broker, sink);

        // 3. Last-resort escalation. Evaluated on unhealthy ticks too —
        //    persistent failure must reboot even when every recovery
        //    attempt fails outright. (Never in Safe Mode.)
        if let Some(reason) = self.escalator.check(
            now_ms,
            self.connectivity.last_known_good_ms(),
            self.boot.safe_mode,
        ) {
            error!("escalation: requesting reboot ({reason})");
            sink.emit(&AppEvent::RebootRequested(reason));
            self.reboot_latched = Some(reason);
            return TickOutcome::RebootRequested(reason);
        }

        if !link.is_usable() {
            return TickOutcome::BackedOff;
        }

        // 4–5. One fresh measurement, one payload.
        let measurement = sensor.read();
        if measurement.is_failed(self.policy) {
            sink.emit(&AppEvent::SensorFailed);
        }
        let payload = build_payload(&measurement, self.policy);

        // 6. Fire-and-forget publish; completion is logged from the
        //    client's callback, never awaited.
        match broker.publish(payload.as_bytes()) {
            Ok(()) => {
                info!("publish: {payload}");
                sink.emit(&AppEvent::Published { payload });
            }
            Err(e) => {
                error!("publish rejected: {e}");
                sink.emit(&AppEvent::PublishRejected(e));
            }
        }

        TickOutcome::Published
    }
}
