//! Hygrolink Firmware — Main Entry Point
//!
//! Hexagonal architecture around a single cooperative tick loop:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  RtcBootCell     WifiAdapter    MqttAdapter    NvsStorage    │
//! │  (BootCounter)   (Network)      (Broker)       (Storage)     │
//! │  SensorHub       LogEventSink   MonotonicClock               │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ────────────────────    │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │            NodeService (resilience supervisor)         │  │
//! │  │  BootGuard · Connectivity · DeadlineEscalator          │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! │                                                              │
//! │  Watchdog (deadman) · StatusLed                              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{info, warn};

use hygrolink::adapters::boot_cell::RtcBootCell;
use hygrolink::adapters::log_sink::LogEventSink;
use hygrolink::adapters::mqtt::MqttAdapter;
use hygrolink::adapters::nvs::NvsStorage;
use hygrolink::adapters::time::MonotonicClock;
use hygrolink::adapters::wifi::WifiAdapter;
use hygrolink::app::boot;
use hygrolink::app::ports::BootCounterPort;
use hygrolink::app::service::{NodeService, TickOutcome};
use hygrolink::config::NodeConfig;
use hygrolink::diagnostics::{BootEvent, BootLog};
use hygrolink::drivers::status_led::StatusLed;
use hygrolink::drivers::watchdog::Watchdog;
use hygrolink::sensors::aht20::Aht20;
use hygrolink::sensors::SensorHub;

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::units::FromValueType;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    let config = NodeConfig::default();
    info!("╔══════════════════════════════════════╗");
    info!("║  Hygrolink v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Boot guard ─────────────────────────────────────────
    // Runs before anything that can block or fail; the verdict gates
    // whether the radio is allowed up at all.
    let mut sink = LogEventSink::new();
    let mut boot_cell = RtcBootCell::new();
    let reset_cause = boot_cell.reset_cause();
    let boot_state = boot::evaluate(&mut boot_cell, config.safe_reboot_threshold, &mut sink);

    // ── 3. Deadman timer — armed in every mode, Safe Mode included ──
    let mut watchdog = Watchdog::new();
    watchdog.arm(config.watchdog_timeout_ms, true);

    // ── 4. Boot-event ring (best-effort diagnostics) ──────────
    let mut boot_log = BootLog::new();
    let mut nvs = match NvsStorage::new() {
        Ok(nvs) => Some(nvs),
        Err(e) => {
            warn!("NVS init failed ({e}); boot history disabled this session");
            None
        }
    };
    if let Some(nvs) = nvs.as_mut() {
        boot_log.init(nvs);
        boot_log.record(nvs, &BootEvent::new(reset_cause, boot_state));
        for event in boot_log.read_all(nvs) {
            info!(
                "boot history: cause={:?} consecutive={} safe_mode={}",
                event.cause, event.consecutive_reboots, event.safe_mode
            );
        }
    }

    // ── 5. Peripherals and adapters ───────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;

    let i2c_config = I2cConfig::new().baudrate(100.kHz().into());
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio16, // SDA
        peripherals.pins.gpio17, // SCL
        &i2c_config,
    )?;
    let mut sensor = SensorHub::new(Aht20::new(i2c, FreeRtos));

    let mut wifi = WifiAdapter::new(peripherals.modem, sysloop, nvs_partition, &config)?;
    let mut mqtt = MqttAdapter::new(&config);
    let mut led = StatusLed::new();
    let clock = MonotonicClock::new();

    // ── 6. Supervisor ─────────────────────────────────────────
    let mut service = NodeService::new(boot_state, &config, clock.now_ms());

    if boot_state.safe_mode {
        warn!("SAFE MODE: radio will be disabled; waiting for human intervention");
    }
    info!(
        "entering sample-and-publish loop (tick {} ms, topic '{}')",
        config.tick_period_ms, config.topic
    );

    // ── 7. Sample-and-publish loop ────────────────────────────
    // No terminal state: exits only via hardware reset (watchdog or
    // deadline escalation) or holds inert in Safe Mode.
    loop {
        let outcome = service.tick(
            clock.now_ms(),
            &mut watchdog,
            &mut wifi,
            &mut mqtt,
            &mut sensor,
            &mut sink,
        );

        led.set(matches!(outcome, TickOutcome::Published));

        match outcome {
            TickOutcome::Published => FreeRtos::delay_ms(config.tick_period_ms),
            TickOutcome::BackedOff => FreeRtos::delay_ms(config.retry_backoff_ms),
            TickOutcome::RebootRequested(reason) => {
                // Does not return: parks unfed until the deadman resets us,
                // which re-enters the boot guard with a watchdog cause.
                watchdog.force_reset(&reason.to_string());
            }
        }
    }
}
