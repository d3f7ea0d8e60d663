//! Persistent reboot-counter cell.
//!
//! Implements [`BootCounterPort`] on top of RTC slow memory: a `.rtc_noinit`
//! word pair survives any warm reset — watchdog resets included — and holds
//! garbage only after power loss. A magic word distinguishes the two, so a
//! cold boot can never replay a stale count. The reset cause comes from
//! `esp_reset_reason()`.
//!
//! On the host the cell is a pair of process-wide atomics with an
//! injectable reset cause so boot sequences can be scripted in tests.

use crate::app::ports::{BootCounterPort, ResetCause};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// Marks the scratch words as written by this firmware since power-up.
const CELL_MAGIC: u32 = 0x4859_4C4B; // "HYLK"

// ───────────────────────────────────────────────────────────────
// Device backend: RTC noinit scratch words
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod backend {
    use super::CELL_MAGIC;
    use core::ptr::addr_of_mut;

    // Survives watchdog/software resets; undefined after power loss.
    // The loader skips this section during RTC RAM initialisation.
    #[unsafe(link_section = ".rtc_noinit")]
    static mut BOOT_SCRATCH: [u32; 2] = [0, 0];

    pub fn load() -> u32 {
        // SAFETY: read/written only from the single main task, once at boot,
        // before any other task is spawned.
        unsafe {
            let cell = addr_of_mut!(BOOT_SCRATCH);
            if (*cell)[0] == CELL_MAGIC {
                (*cell)[1]
            } else {
                0
            }
        }
    }

    pub fn store(count: u32) {
        // SAFETY: see `load`.
        unsafe {
            let cell = addr_of_mut!(BOOT_SCRATCH);
            (*cell)[1] = count;
            (*cell)[0] = CELL_MAGIC;
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Host backend: injectable atomics
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod backend {
    use super::CELL_MAGIC;
    use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

    static SIM_MAGIC: AtomicU32 = AtomicU32::new(0);
    static SIM_COUNT: AtomicU32 = AtomicU32::new(0);
    static SIM_CAUSE: AtomicU8 = AtomicU8::new(0);

    pub fn load() -> u32 {
        if SIM_MAGIC.load(Ordering::Relaxed) == CELL_MAGIC {
            SIM_COUNT.load(Ordering::Relaxed)
        } else {
            0
        }
    }

    pub fn store(count: u32) {
        SIM_COUNT.store(count, Ordering::Relaxed);
        SIM_MAGIC.store(CELL_MAGIC, Ordering::Relaxed);
    }

    pub fn cause_raw() -> u8 {
        SIM_CAUSE.load(Ordering::Relaxed)
    }

    /// Test hook: simulate the next boot's reset cause
    /// (0 = power-on, 1 = watchdog, 2 = software, 3 = other).
    pub fn sim_set_reset_cause(raw: u8) {
        SIM_CAUSE.store(raw, Ordering::Relaxed);
    }

    /// Test hook: simulate power loss (invalidates the magic word).
    pub fn sim_power_cycle() {
        SIM_MAGIC.store(0, Ordering::Relaxed);
        SIM_CAUSE.store(0, Ordering::Relaxed);
    }
}

#[cfg(not(target_os = "espidf"))]
pub use backend::{sim_power_cycle, sim_set_reset_cause};

// ───────────────────────────────────────────────────────────────
// Adapter
// ───────────────────────────────────────────────────────────────

pub struct RtcBootCell {
    cause: ResetCause,
}

impl RtcBootCell {
    /// Snapshot the reset cause once; it does not change during a boot.
    pub fn new() -> Self {
        Self {
            cause: read_reset_cause(),
        }
    }
}

impl Default for RtcBootCell {
    fn default() -> Self {
        Self::new()
    }
}

impl BootCounterPort for RtcBootCell {
    fn reset_cause(&self) -> ResetCause {
        self.cause
    }

    fn load(&self) -> u32 {
        backend::load()
    }

    fn store(&mut self, count: u32) {
        backend::store(count);
    }
}

#[cfg(target_os = "espidf")]
fn read_reset_cause() -> ResetCause {
    // SAFETY: plain FFI query, no preconditions.
    let raw = unsafe { esp_reset_reason() };
    #[allow(non_upper_case_globals)]
    match raw {
        esp_reset_reason_t_ESP_RST_POWERON => ResetCause::PowerOn,
        esp_reset_reason_t_ESP_RST_TASK_WDT
        | esp_reset_reason_t_ESP_RST_INT_WDT
        | esp_reset_reason_t_ESP_RST_WDT => ResetCause::Watchdog,
        esp_reset_reason_t_ESP_RST_SW => ResetCause::Software,
        _ => ResetCause::Other,
    }
}

#[cfg(not(target_os = "espidf"))]
fn read_reset_cause() -> ResetCause {
    match backend::cause_raw() {
        1 => ResetCause::Watchdog,
        2 => ResetCause::Software,
        3 => ResetCause::Other,
        _ => ResetCause::PowerOn,
    }
}
