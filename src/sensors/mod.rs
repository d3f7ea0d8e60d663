//! Sensor subsystem — the AHT20 driver and the [`SensorPort`] hub.
//!
//! The hub owns the bus driver and converts its `Result` into the
//! sentinel-carrying [`Measurement`] the supervisor consumes: a failed bus
//! transaction is not an error to the tick loop, just a failed reading.

pub mod aht20;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::warn;

use crate::app::measurement::Measurement;
use crate::app::ports::SensorPort;
use aht20::Aht20;

/// Aggregates the (single) sensor driver behind [`SensorPort`].
pub struct SensorHub<I2C, D> {
    aht20: Aht20<I2C, D>,
}

impl<I2C: I2c, D: DelayNs> SensorHub<I2C, D> {
    pub fn new(aht20: Aht20<I2C, D>) -> Self {
        Self { aht20 }
    }
}

impl<I2C: I2c, D: DelayNs> SensorPort for SensorHub<I2C, D> {
    fn read(&mut self) -> Measurement {
        match self.aht20.sample() {
            Ok(m) => m,
            Err(e) => {
                warn!("aht20: {e}");
                Measurement::FAILED
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::aht20::tests_support::{NopDelay, ScriptedI2c};

    #[test]
    fn hub_maps_bus_failure_to_sentinel() {
        let bus = ScriptedI2c::failing();
        let mut hub = SensorHub::new(Aht20::new(bus, NopDelay));
        assert_eq!(hub.read(), Measurement::FAILED);
    }

    #[test]
    fn hub_passes_good_frames_through() {
        let bus = ScriptedI2c::with_frame([0x1C, 0x6A, 0x7E, 0x83, 0x4E, 0x10]);
        let mut hub = SensorHub::new(Aht20::new(bus, NopDelay));
        let m = hub.read();
        assert!((m.humidity_pct - 41.603_088).abs() < 1e-3);
        assert!((m.temperature_c - (-8.686_829)).abs() < 1e-3);
    }
}
