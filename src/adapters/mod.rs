//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements        | Connects to                    |
//! |--------------|-------------------|--------------------------------|
//! | `boot_cell`  | BootCounterPort   | RTC scratch RAM + reset reason |
//! | `wifi`       | NetworkPort       | ESP-IDF Wi-Fi STA              |
//! | `mqtt`       | BrokerPort        | ESP-IDF MQTT client            |
//! | `nvs`        | StoragePort       | NVS / in-memory store          |
//! | `log_sink`   | EventSink         | Serial log output              |
//! | `time`       | —                 | ESP32 monotonic timer          |

pub mod boot_cell;
pub mod log_sink;
pub mod mqtt;
pub mod nvs;
pub mod time;
pub mod wifi;
