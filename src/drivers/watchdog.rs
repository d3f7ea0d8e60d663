//! Task Watchdog Timer (TWDT) driver.
//!
//! Wraps the ESP-IDF TWDT API. The timer is armed once at boot — in every
//! mode, Safe Mode included — and the main loop must call `feed()` on every
//! tick or the device is unconditionally hard-reset by hardware. There is no
//! cancellation: this is the last line of defense against software lockups.
//!
//! `force_reset()` is the deadline escalator's exit: it parks the task with
//! feeding stopped so that the ensuing reset is attributed to the watchdog.
//! Keeping the attribution uniform matters — repeated escalation reboots
//! must advance the boot-loop counter just like lockup reboots do.

use crate::app::ports::WatchdogPort;
use log::{error, info};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
    /// Host-side feed counter, visible to tests.
    #[cfg(not(target_os = "espidf"))]
    feeds: u64,
}

impl Watchdog {
    /// Create the driver without arming the timer. Call [`arm`] from the
    /// boot guard path before the first blocking operation.
    ///
    /// [`arm`]: Watchdog::arm
    pub fn new() -> Self {
        Self {
            #[cfg(target_os = "espidf")]
            subscribed: false,
            #[cfg(not(target_os = "espidf"))]
            feeds: 0,
        }
    }

    /// Arm the deadman timer and subscribe the current task.
    ///
    /// `pause_on_debug` keeps the timer halted while a debugger has the
    /// core stopped, so single-stepping does not reset the board.
    pub fn arm(&mut self, timeout_ms: u32, pause_on_debug: bool) {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: reconfigure/add are called once from the main task
            // before any other TWDT interaction.
            unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK {
                    log::warn!("TWDT reconfigure returned {ret} (may already be configured)");
                }

                let ret = esp_task_wdt_add(core::ptr::null_mut());
                self.subscribed = ret == ESP_OK;
                if self.subscribed {
                    info!(
                        "watchdog: armed ({timeout_ms} ms, pause_on_debug={pause_on_debug}, panic on trigger)"
                    );
                } else {
                    log::warn!("watchdog: failed to subscribe ({ret})");
                }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            info!("watchdog(sim): armed ({timeout_ms} ms, pause_on_debug={pause_on_debug})");
        }
    }

    /// Acknowledge the timer. Must be called at least once per timeout.
    pub fn feed(&mut self) {
        #[cfg(target_os = "espidf")]
        {
            if self.subscribed {
                // SAFETY: plain FFI call, no preconditions beyond subscription.
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            self.feeds += 1;
        }
    }

    /// Number of feeds recorded by the simulation backend.
    #[cfg(not(target_os = "espidf"))]
    pub fn feed_count(&self) -> u64 {
        self.feeds
    }

    /// Stop feeding and wait for the hardware reset to take effect.
    ///
    /// The spin is bounded by the armed timeout: the TWDT fires within one
    /// period and resets the chip with a watchdog-attributed cause.
    pub fn force_reset(&mut self, reason: &str) -> ! {
        error!("watchdog: reboot requested: {reason}");

        #[cfg(target_os = "espidf")]
        {
            loop {
                core::hint::spin_loop();
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            // Divergence is modelled as a panic so any host test that
            // accidentally reaches this path fails loudly instead of
            // hanging the test runner.
            panic!("watchdog force-reset: {reason}");
        }
    }
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchdogPort for Watchdog {
    fn feed(&mut self) {
        Watchdog::feed(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_backend_counts_feeds() {
        let mut wdt = Watchdog::new();
        wdt.arm(8_000, true);
        wdt.feed();
        wdt.feed();
        assert_eq!(wdt.feed_count(), 2);
    }

    #[test]
    #[should_panic(expected = "watchdog force-reset")]
    fn sim_force_reset_diverges() {
        let mut wdt = Watchdog::new();
        wdt.force_reset("test");
    }
}
