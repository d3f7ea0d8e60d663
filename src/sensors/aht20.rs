//! AHT20 temperature/humidity sensor driver.
//!
//! Generic over the `embedded-hal` 1.0 `I2c` and `DelayNs` traits, so the
//! same driver runs against the ESP-IDF I2C master on device and a scripted
//! bus in tests.
//!
//! One sample is one bus round-trip: write the measurement trigger command,
//! wait the conversion time, read the 6-byte frame. The 20-bit raw values
//! are packed across bytes 1..=5 (byte 0 is the status byte):
//!
//! ```text
//!   humidity    = raw_h * 100 / 2^20            (%RH)
//!   temperature = raw_t * 200 / 2^20 - 50       (°C)
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::app::measurement::Measurement;
use crate::error::SensorError;

/// Fixed 7-bit bus address of the AHT20.
const I2C_ADDR: u8 = 0x38;

/// Trigger-measurement command (0xAC + the two fixed parameter bytes).
const CMD_TRIGGER: [u8; 3] = [0xAC, 0x33, 0x00];

/// Conversion time between trigger and read-back.
const MEASUREMENT_DELAY_MS: u32 = 80;

/// Full-scale divisor for the 20-bit raw fields.
const RAW_FULL_SCALE: f32 = 1_048_576.0; // 2^20

pub struct Aht20<I2C, D> {
    i2c: I2C,
    delay: D,
}

impl<I2C: I2c, D: DelayNs> Aht20<I2C, D> {
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self { i2c, delay }
    }

    /// Perform one measurement transaction.
    ///
    /// The bus timeout lives inside the I2C driver; from the caller's
    /// perspective this is a bounded synchronous call.
    pub fn sample(&mut self) -> Result<Measurement, SensorError> {
        self.i2c
            .write(I2C_ADDR, &CMD_TRIGGER)
            .map_err(|_| SensorError::BusTransaction)?;

        self.delay.delay_ms(MEASUREMENT_DELAY_MS);

        let mut frame = [0u8; 6];
        self.i2c
            .read(I2C_ADDR, &mut frame)
            .map_err(|_| SensorError::BusTransaction)?;

        Ok(decode_frame(&frame))
    }
}

/// Decode a raw 6-byte measurement frame.
///
/// Byte 0 is the status byte and does not participate in the conversion.
pub fn decode_frame(frame: &[u8; 6]) -> Measurement {
    let raw_h = (u32::from(frame[1]) << 12) | (u32::from(frame[2]) << 4) | (u32::from(frame[3]) >> 4);
    let raw_t =
        (u32::from(frame[3] & 0x0F) << 16) | (u32::from(frame[4]) << 8) | u32::from(frame[5]);

    let humidity_pct = (raw_h as f32) * 100.0 / RAW_FULL_SCALE;
    let temperature_c = (raw_t as f32) * 200.0 / RAW_FULL_SCALE - 50.0;

    Measurement::new(temperature_c, humidity_pct)
}

// ───────────────────────────────────────────────────────────────
// Test support
// ───────────────────────────────────────────────────────────────

/// Scripted I2C bus and no-op delay for host tests. Public so the hub and
/// integration tests can reuse them.
#[cfg(any(test, not(target_os = "espidf")))]
pub mod tests_support {
    use embedded_hal::delay::DelayNs;
    use embedded_hal::i2c::{self, ErrorType, I2c, Operation};

    #[derive(Debug)]
    pub struct ScriptedError;

    impl i2c::Error for ScriptedError {
        fn kind(&self) -> i2c::ErrorKind {
            i2c::ErrorKind::Other
        }
    }

    impl core::fmt::Display for ScriptedError {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            write!(f, "scripted bus error")
        }
    }

    /// Replays a fixed frame (or a NAK) for every transaction.
    pub struct ScriptedI2c {
        frame: Option<[u8; 6]>,
    }

    impl ScriptedI2c {
        pub fn with_frame(frame: [u8; 6]) -> Self {
            Self { frame: Some(frame) }
        }

        pub fn failing() -> Self {
            Self { frame: None }
        }
    }

    impl ErrorType for ScriptedI2c {
        type Error = ScriptedError;
    }

    impl I2c for ScriptedI2c {
        fn transaction(
            &mut self,
            _address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            let Some(frame) = self.frame else {
                return Err(ScriptedError);
            };
            for op in operations {
                if let Operation::Read(buf) = op {
                    let n = buf.len().min(frame.len());
                    buf[..n].copy_from_slice(&frame[..n]);
                }
            }
            Ok(())
        }
    }

    pub struct NopDelay;

    impl DelayNs for NopDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }
}
