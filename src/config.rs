//! Compile-time node configuration.
//!
//! Unlike runtime-tunable systems there is no NVS-backed config layer here:
//! every value is fixed at build time. Credentials and broker coordinates can
//! be overridden through environment variables at compile time
//! (`HYGROLINK_WIFI_SSID`, `HYGROLINK_WIFI_PASS`, `HYGROLINK_BROKER_HOST`);
//! everything else is a firmware constant.

use crate::app::measurement::FailurePolicy;

/// Everything the node needs to know at boot. One instance, built once in
/// `main()`, borrowed everywhere else.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    // --- Wireless ---
    pub wifi_ssid: &'static str,
    pub wifi_password: &'static str,
    /// Bound on a single association attempt (enforced by the Wi-Fi stack).
    pub wifi_connect_timeout_ms: u32,

    // --- Broker ---
    pub broker_host: &'static str,
    pub broker_port: u16,
    pub topic: &'static str,
    pub client_id: &'static str,
    pub keep_alive_secs: u16,
    /// Retained last-will message published by the broker on session loss.
    pub will_message: &'static str,
    /// Optional broker credentials; anonymous when unset.
    pub broker_username: Option<&'static str>,
    pub broker_password: Option<&'static str>,

    // --- Resilience thresholds ---
    /// Hardware deadman timeout; the loop must feed within this interval.
    pub watchdog_timeout_ms: u32,
    /// Consecutive watchdog-caused reboots before Safe Mode.
    pub safe_reboot_threshold: u32,
    /// Unhealthy-connectivity duration before the last-resort reboot.
    pub no_recovery_deadline_ms: u64,

    // --- Timing ---
    /// Nominal sample-and-publish period.
    pub tick_period_ms: u32,
    /// Sleep before retrying a tick whose recovery attempt failed.
    pub retry_backoff_ms: u32,

    // --- Sensor policy ---
    /// How a raw reading is classified as a failed measurement.
    pub failure_policy: FailurePolicy,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            wifi_ssid: option_env!("HYGROLINK_WIFI_SSID").unwrap_or("hygrolink-lab"),
            wifi_password: option_env!("HYGROLINK_WIFI_PASS").unwrap_or(""),
            wifi_connect_timeout_ms: 30_000,

            broker_host: option_env!("HYGROLINK_BROKER_HOST").unwrap_or("192.168.1.10"),
            broker_port: 1883,
            topic: "hygrolink/aht20",
            client_id: "hygrolink-01",
            keep_alive_secs: 30,
            will_message: "offline",
            broker_username: option_env!("HYGROLINK_BROKER_USER"),
            broker_password: option_env!("HYGROLINK_BROKER_PASS"),

            watchdog_timeout_ms: 8_000,
            safe_reboot_threshold: 5,
            no_recovery_deadline_ms: 300_000,

            tick_period_ms: 1_000,
            retry_backoff_ms: 1_000,

            failure_policy: FailurePolicy::SentinelOnly,
        }
    }
}
