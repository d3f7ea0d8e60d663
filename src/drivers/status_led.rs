//! On-board status LED driver.
//!
//! One GPIO, one bit of meaning: lit while the path to the broker is fully
//! healthy, dark otherwise (and permanently dark in Safe Mode, where the
//! radio is down).
//!
//! On ESP-IDF the pin is configured as a push-pull output via raw sys
//! calls; on the host the state is tracked in-memory only.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// GPIO number of the status LED.
#[cfg(target_os = "espidf")]
const LED_GPIO: i32 = 2;

pub struct StatusLed {
    lit: bool,
}

impl StatusLed {
    pub fn new() -> Self {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: one-shot GPIO configuration from the main task.
            unsafe {
                gpio_reset_pin(LED_GPIO);
                gpio_set_direction(LED_GPIO, gpio_mode_t_GPIO_MODE_OUTPUT);
                gpio_set_level(LED_GPIO, 0);
            }
        }
        Self { lit: false }
    }

    /// Reflect connectivity health. Idempotent; only real edges touch the
    /// pin.
    pub fn set(&mut self, lit: bool) {
        if lit == self.lit {
            return;
        }
        self.lit = lit;

        #[cfg(target_os = "espidf")]
        // SAFETY: pin was configured as output in `new`.
        unsafe {
            gpio_set_level(LED_GPIO, u32::from(lit));
        }
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}

impl Default for StatusLed {
    fn default() -> Self {
        Self::new()
    }
}
