//! Mock hardware adapters for integration tests.
//!
//! Every port the supervisor drives gets a scriptable stand-in that records
//! its call history, so tests can assert on the full tick-by-tick behavior
//! without touching real peripherals.

use hygrolink::app::events::AppEvent;
use hygrolink::app::measurement::Measurement;
use hygrolink::app::ports::{
    BootCounterPort, BrokerPort, EventSink, NetworkPort, ResetCause, SensorPort, WatchdogPort,
};
use hygrolink::error::{BrokerError, NetError};

// ── Watchdog ──────────────────────────────────────────────────

#[derive(Default)]
pub struct MockWatchdog {
    pub feeds: u64,
}

impl WatchdogPort for MockWatchdog {
    fn feed(&mut self) {
        self.feeds += 1;
    }
}

// ── Network ───────────────────────────────────────────────────

#[derive(Default)]
pub struct MockNet {
    pub link: bool,
    pub connect_ok: bool,
    pub connect_calls: u32,
    pub radio_calls: Vec<bool>,
}

impl MockNet {
    pub fn healthy() -> Self {
        Self {
            link: true,
            connect_ok: true,
            ..Default::default()
        }
    }

    pub fn dead() -> Self {
        Self::default()
    }
}

impl NetworkPort for MockNet {
    fn connect(&mut self) -> Result<(), NetError> {
        self.connect_calls += 1;
        if self.connect_ok {
            self.link = true;
            Ok(())
        } else {
            Err(NetError::AssociationFailed)
        }
    }

    fn link_up(&self) -> bool {
        self.link
    }

    fn set_radio_enabled(&mut self, enabled: bool) {
        self.radio_calls.push(enabled);
        if !enabled {
            self.link = false;
        }
    }
}

// ── Broker ────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockBroker {
    pub session: bool,
    pub connect_ok: bool,
    pub publish_ok: bool,
    pub connect_calls: u32,
    pub published: Vec<Vec<u8>>,
}

impl MockBroker {
    pub fn healthy() -> Self {
        Self {
            session: true,
            connect_ok: true,
            publish_ok: true,
            ..Default::default()
        }
    }

    pub fn dead() -> Self {
        Self::default()
    }
}

impl BrokerPort for MockBroker {
    fn connect(&mut self) -> Result<(), BrokerError> {
        self.connect_calls += 1;
        if self.connect_ok {
            self.session = true;
            Ok(())
        } else {
            Err(BrokerError::ConnectFailed)
        }
    }

    fn session_established(&self) -> bool {
        self.session
    }

    fn publish(&mut self, payload: &[u8]) -> Result<(), BrokerError> {
        self.published.push(payload.to_vec());
        if self.publish_ok {
            Ok(())
        } else {
            Err(BrokerError::PublishFailed)
        }
    }
}

// ── Sensor ────────────────────────────────────────────────────

pub struct MockSensor {
    pub value: Measurement,
    pub reads: u32,
}

impl MockSensor {
    pub fn reading(temperature_c: f32, humidity_pct: f32) -> Self {
        Self {
            value: Measurement::new(temperature_c, humidity_pct),
            reads: 0,
        }
    }

    pub fn failing() -> Self {
        Self {
            value: Measurement::FAILED,
            reads: 0,
        }
    }
}

impl SensorPort for MockSensor {
    fn read(&mut self) -> Measurement {
        self.reads += 1;
        self.value
    }
}

// ── Boot counter cell ─────────────────────────────────────────

pub struct MockBootCell {
    pub cause: ResetCause,
    pub value: u32,
}

impl MockBootCell {
    pub fn new(cause: ResetCause, value: u32) -> Self {
        Self { cause, value }
    }
}

impl BootCounterPort for MockBootCell {
    fn reset_cause(&self) -> ResetCause {
        self.cause
    }

    fn load(&self) -> u32 {
        self.value
    }

    fn store(&mut self, count: u32) {
        self.value = count;
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rendered(&self) -> Vec<String> {
        self.events.iter().map(|e| format!("{e:?}")).collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
