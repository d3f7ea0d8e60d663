//! End-to-end supervisor scenarios: the full tick pipeline from watchdog
//! feed through connectivity repair, escalation, sensing, and publish,
//! driven tick-by-tick with a synthetic clock.

use crate::mock_hw::{MockBroker, MockNet, MockSensor, MockWatchdog, RecordingSink};
use hygrolink::app::boot::BootState;
use hygrolink::app::escalation::RebootReason;
use hygrolink::app::events::AppEvent;
use hygrolink::app::service::{NodeService, TickOutcome};
use hygrolink::config::NodeConfig;

const TICK_MS: u64 = 1_000;

fn service(safe_mode: bool) -> NodeService {
    let boot = BootState {
        consecutive_reboot_count: if safe_mode { 5 } else { 0 },
        safe_mode,
    };
    NodeService::new(boot, &NodeConfig::default(), 0)
}

// ── Steady-state operation ────────────────────────────────────

#[test]
fn steady_state_publishes_every_tick_and_tracks_health() {
    let mut wdt = MockWatchdog::default();
    let mut net = MockNet::healthy();
    let mut broker = MockBroker::healthy();
    let mut sensor = MockSensor::reading(23.44, 41.96);
    let mut sink = RecordingSink::new();
    let mut svc = service(false);

    for i in 1..=60u64 {
        let now = i * TICK_MS;
        assert_eq!(
            svc.tick(now, &mut wdt, &mut net, &mut broker, &mut sensor, &mut sink),
            TickOutcome::Published
        );
        // While Up every tick, last_known_good equals the current tick's
        // timestamp (monotonically non-decreasing).
        assert_eq!(svc.last_known_good_ms(), now);
    }

    assert_eq!(wdt.feeds, 60);
    assert_eq!(sensor.reads, 60);
    assert_eq!(broker.published.len(), 60);
    assert!(broker
        .published
        .iter()
        .all(|p| p == b"Temp=23.4\xc2\xb0C Hum=42.0%"));
    // Healthy steady state never re-associates or re-connects.
    assert_eq!(net.connect_calls, 0);
    assert_eq!(broker.connect_calls, 0);
    // And the escalator never fires.
    assert!(!sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::RebootRequested(_))));
}

#[test]
fn sensor_failure_publishes_marker_without_slowing_down() {
    let mut wdt = MockWatchdog::default();
    let mut net = MockNet::healthy();
    let mut broker = MockBroker::healthy();
    let mut sensor = MockSensor::failing();
    let mut sink = RecordingSink::new();
    let mut svc = service(false);

    for i in 1..=5u64 {
        assert_eq!(
            svc.tick(i * TICK_MS, &mut wdt, &mut net, &mut broker, &mut sensor, &mut sink),
            TickOutcome::Published,
            "failed reading is not a health event"
        );
    }
    assert_eq!(broker.published.len(), 5);
    assert!(broker.published.iter().all(|p| p == b"failed"));
    assert_eq!(
        sink.events
            .iter()
            .filter(|e| matches!(e, AppEvent::SensorFailed))
            .count(),
        5
    );
}

#[test]
fn publish_rejection_does_not_accumulate_retries() {
    let mut wdt = MockWatchdog::default();
    let mut net = MockNet::healthy();
    let mut broker = MockBroker::healthy();
    broker.publish_ok = false;
    let mut sensor = MockSensor::reading(20.0, 50.0);
    let mut sink = RecordingSink::new();
    let mut svc = service(false);

    for i in 1..=4u64 {
        let _ = svc.tick(i * TICK_MS, &mut wdt, &mut net, &mut broker, &mut sensor, &mut sink);
    }
    // Exactly one submission per tick regardless of the previous outcome.
    assert_eq!(broker.published.len(), 4);
}

// ── Recovery ──────────────────────────────────────────────────

#[test]
fn drop_and_recovery_cycle() {
    let mut wdt = MockWatchdog::default();
    let mut net = MockNet::healthy();
    let mut broker = MockBroker::healthy();
    let mut sensor = MockSensor::reading(20.0, 50.0);
    let mut sink = RecordingSink::new();
    let mut svc = service(false);

    // Healthy tick.
    assert_eq!(
        svc.tick(1_000, &mut wdt, &mut net, &mut broker, &mut sensor, &mut sink),
        TickOutcome::Published
    );

    // Link drops; association keeps failing for three ticks.
    net.link = false;
    net.connect_ok = false;
    for i in 2..=4u64 {
        assert_eq!(
            svc.tick(i * TICK_MS, &mut wdt, &mut net, &mut broker, &mut sensor, &mut sink),
            TickOutcome::BackedOff
        );
    }
    assert_eq!(sensor.reads, 1, "no sensor reads while unhealthy");
    assert_eq!(svc.last_known_good_ms(), 1_000);

    // Association heals.
    net.connect_ok = true;
    assert_eq!(
        svc.tick(5_000, &mut wdt, &mut net, &mut broker, &mut sensor, &mut sink),
        TickOutcome::Published
    );
    assert_eq!(svc.last_known_good_ms(), 5_000);
    assert!(sink.events.iter().any(|e| matches!(e, AppEvent::Recovered)));
}

#[test]
fn silent_session_degrade_triggers_reconnect_next_tick() {
    let mut wdt = MockWatchdog::default();
    let mut net = MockNet::healthy();
    let mut broker = MockBroker::healthy();
    let mut sensor = MockSensor::reading(20.0, 50.0);
    let mut sink = RecordingSink::new();
    let mut svc = service(false);

    let _ = svc.tick(1_000, &mut wdt, &mut net, &mut broker, &mut sensor, &mut sink);

    // Broker status callback clears the flag between ticks.
    broker.session = false;
    broker.connect_ok = true;

    assert_eq!(
        svc.tick(2_000, &mut wdt, &mut net, &mut broker, &mut sensor, &mut sink),
        TickOutcome::Published,
        "reconnect succeeds within the same tick"
    );
    assert_eq!(broker.connect_calls, 1);
    assert!(sink.events.iter().any(|e| matches!(e, AppEvent::SessionLost)));
}

// ── Deadline escalation ───────────────────────────────────────

#[test]
fn full_outage_escalates_once_after_the_deadline() {
    let mut wdt = MockWatchdog::default();
    let mut net = MockNet::dead();
    let mut broker = MockBroker::dead();
    let mut sensor = MockSensor::reading(20.0, 50.0);
    let mut sink = RecordingSink::new();
    let mut svc = service(false);

    let mut outcome = TickOutcome::BackedOff;
    let mut ticks = 0u64;
    while outcome == TickOutcome::BackedOff {
        ticks += 1;
        outcome = svc.tick(ticks * TICK_MS, &mut wdt, &mut net, &mut broker, &mut sensor, &mut sink);
    }

    assert_eq!(outcome, TickOutcome::RebootRequested(RebootReason::NoRecoveryDeadline));
    // Strictly past the 300 s deadline, at 1 s cadence.
    assert_eq!(ticks, 301);
    assert_eq!(sensor.reads, 0);
    assert!(broker.published.is_empty());

    // Exactly one reboot request was emitted.
    let requests: Vec<_> = sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::RebootRequested(_)))
        .collect();
    assert_eq!(requests.len(), 1);

    // The reason renders to a loggable string.
    assert_eq!(
        RebootReason::NoRecoveryDeadline.to_string(),
        "no recovery within deadline"
    );
}

#[test]
fn session_only_outage_also_escalates() {
    // Link stays up but the broker never accepts a session: the deadline
    // must still apply — "healthy" means link AND session.
    let mut wdt = MockWatchdog::default();
    let mut net = MockNet::healthy();
    let mut broker = MockBroker::dead();
    let mut sensor = MockSensor::reading(20.0, 50.0);
    let mut sink = RecordingSink::new();
    let mut svc = service(false);

    let mut last = TickOutcome::BackedOff;
    for i in 1..=301u64 {
        last = svc.tick(i * TICK_MS, &mut wdt, &mut net, &mut broker, &mut sensor, &mut sink);
    }
    assert!(matches!(last, TickOutcome::RebootRequested(_)));
}

// ── Safe Mode ─────────────────────────────────────────────────

#[test]
fn safe_mode_is_inert_but_watchdog_protected() {
    let mut wdt = MockWatchdog::default();
    let mut net = MockNet::healthy();
    let mut broker = MockBroker::healthy();
    let mut sensor = MockSensor::reading(20.0, 50.0);
    let mut sink = RecordingSink::new();
    let mut svc = service(true);

    // Far past the no-recovery deadline.
    for i in 1..=400u64 {
        assert_eq!(
            svc.tick(i * TICK_MS, &mut wdt, &mut net, &mut broker, &mut sensor, &mut sink),
            TickOutcome::BackedOff
        );
    }

    // Radio was explicitly powered down exactly once; no association or
    // session attempts ever happen.
    assert_eq!(net.radio_calls, vec![false]);
    assert_eq!(net.connect_calls, 0);
    assert_eq!(broker.connect_calls, 0);
    // The escalator never fires in Safe Mode.
    assert!(!sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::RebootRequested(_))));
    // But the deadman timer is still fed on every tick.
    assert_eq!(wdt.feeds, 400);
    assert_eq!(sensor.reads, 0);
}
