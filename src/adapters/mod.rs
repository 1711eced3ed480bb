//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements          | Connects to                     |
//! |--------------|---------------------|---------------------------------|
//! | `battery`    | BatteryPort         | ADC1 + sense-enable GPIO        |
//! | `board`      | Clock/Button/Display/Battery/PowerPort | bundles the above |
//! | `button`     | ButtonPort          | Active-low GPIO                 |
//! | `display`    | DisplayPort         | Serial log                      |
//! | `link`       | NetworkPort + BrokerPort | bundles `wifi` and `mqtt`  |
//! | `log_sink`   | EventSink           | Serial log output               |
//! | `mqtt`       | BrokerPort          | ESP-IDF MQTT client             |
//! | `nvs`        | ConfigPort          | NVS / in-memory store           |
//! | `power`      | PowerPort           | Peripheral rail, deep sleep     |
//! | `rtc_memory` | RetainedMemoryPort  | RTC slow memory                 |
//! | `time`       | ClockPort           | RTC-backed system time          |
//! | `wifi`       | NetworkPort         | ESP-IDF WiFi STA                |

pub mod battery;
pub mod board;
pub mod button;
pub mod display;
pub mod link;
pub mod log_sink;
pub mod mqtt;
pub mod nvs;
pub mod power;
pub mod rtc_memory;
pub mod time;
pub mod wifi;
