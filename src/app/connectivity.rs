//! Connectivity-recovery state machine.
//!
//! Maintains `{link, broker-session}` health and performs recovery attempts.
//! The derived state is `Up` iff both flags are true; everything else is a
//! flavour of `Down` that this tick may try to repair.
//!
//! Both flags are re-read fresh at the start of every supervision call —
//! the session flag in particular has a second writer (the broker client's
//! asynchronous status callback), so a verdict cached from the previous
//! tick could mask a silent degrade. A reconnect racing a late status event
//! from the previous session costs at most one extra retry tick.

use log::{info, warn};

use super::events::AppEvent;
use super::ports::{BrokerPort, EventSink, NetworkPort};

/// Health of the path to the broker, derived fresh each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No usable path and no recovery succeeded this tick.
    Down,
    /// Recovery calls were accepted this tick but the session CONNACK has
    /// not been observed yet; the next tick re-reads the real flag.
    Establishing,
    /// Link and session are both healthy.
    Up,
}

impl LinkState {
    /// `Down` means this tick skips sensing and publishing entirely.
    pub fn is_usable(self) -> bool {
        !matches!(self, Self::Down)
    }
}

/// The one piece of supervisor state that matters across ticks.
#[derive(Debug, Clone, Copy)]
pub struct ConnectivityState {
    pub link_up: bool,
    pub session_established: bool,
    /// Timestamp of the most recent tick at which both flags were true.
    pub last_known_good_ms: u64,
}

/// Supervises link + session health once per tick.
pub struct ConnectivitySupervisor {
    state: ConnectivityState,
    safe_mode: bool,
    /// Set once Safe Mode has powered the radio down.
    radio_off: bool,
    /// Whether the previous supervision call ended `Up` (for degrade logs).
    was_up: bool,
}

impl ConnectivitySupervisor {
    /// `now_ms` seeds `last_known_good` so the no-recovery deadline is
    /// measured from boot, not from the epoch.
    pub fn new(safe_mode: bool, now_ms: u64) -> Self {
        Self {
            state: ConnectivityState {
                link_up: false,
                session_established: false,
                last_known_good_ms: now_ms,
            },
            safe_mode,
            radio_off: false,
            was_up: false,
        }
    }

    /// Timestamp of the most recent fully-healthy tick.
    pub fn last_known_good_ms(&self) -> u64 {
        self.state.last_known_good_ms
    }

    /// Snapshot of the current connectivity flags (test/inspection aid).
    pub fn state(&self) -> ConnectivityState {
        self.state
    }

    /// Evaluate health at the top of a tick and repair it if necessary.
    ///
    /// In Safe Mode the radio is powered down on the first call and every
    /// call reports `Down` without attempting recovery. Otherwise an
    /// unhealthy tick attempts, in order, link association and session
    /// establishment; success of both updates `last_known_good`.
    pub fn supervise(
        &mut self,
        now_ms: u64,
        net: &mut impl NetworkPort,
        broker: &mut impl BrokerPort,
        sink: &mut impl EventSink,
    ) -> LinkState {
        if self.safe_mode {
            if !self.radio_off {
                net.set_radio_enabled(false);
                self.radio_off = true;
                warn!("safe mode: radio powered down, recovery disabled");
                sink.emit(&AppEvent::RadioDisabled);
            }
            return LinkState::Down;
        }

        // Fresh flags at tick start; the session flag may have been cleared
        // by the status callback since the previous tick.
        self.state.link_up = net.link_up();
        self.state.session_established = broker.session_established();

        if self.state.link_up && self.state.session_established {
            self.state.last_known_good_ms = now_ms;
            self.was_up = true;
            return LinkState::Up;
        }

        if self.was_up {
            self.was_up = false;
            warn!(
                "connectivity degraded (link_up={}, session={})",
                self.state.link_up, self.state.session_established
            );
            sink.emit(&AppEvent::SessionLost);
        }

        match self.attempt_recovery(net, broker) {
            Ok(()) => {
                // Both steps accepted: this tick counts as recovered and
                // proceeds. The CONNACK may still be in flight, so re-read
                // the flag to distinguish Up from Establishing.
                self.state.link_up = true;
                self.state.session_established = broker.session_established();
                self.state.last_known_good_ms = now_ms;
                self.was_up = self.state.session_established;
                info!("connectivity restored");
                sink.emit(&AppEvent::Recovered);
                if self.state.session_established {
                    LinkState::Up
                } else {
                    LinkState::Establishing
                }
            }
            Err(()) => {
                sink.emit(&AppEvent::RecoveryFailed {
                    link_up: self.state.link_up,
                });
                LinkState::Down
            }
        }
    }

    /// Association, then session establishment. Each step is a blocking
    /// call bounded by the collaborator's own timeout.
    fn attempt_recovery(
        &mut self,
        net: &mut impl NetworkPort,
        broker: &mut impl BrokerPort,
    ) -> Result<(), ()> {
        if let Err(e) = net.connect() {
            warn!("recovery: association failed ({e})");
            return Err(());
        }
        self.state.link_up = true;

        if let Err(e) = broker.connect() {
            warn!("recovery: session establishment failed ({e})");
            return Err(());
        }
        Ok(())
    }
}
