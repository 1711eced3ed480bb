//! Device configuration.
//!
//! A single [`DeviceConfig`] value is built once at boot.  Defaults come from
//! build-time environment variables (`FEEDLOG_*`, see `build.rs`) and fall
//! back to the constants below; a validated blob in NVS may override them
//! (see [`ConfigPort`](crate::app::ports::ConfigPort)).

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

pub type Ssid = String<32>;
pub type Secret = String<64>;
pub type HostName = String<64>;
pub type Topic = String<64>;

/// Network credentials and optional static addressing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub ssid: Ssid,
    pub password: Secret,
    /// `None` selects DHCP.
    pub static_ip: Option<StaticIpConfig>,
}

/// Fixed IPv4 settings, used instead of DHCP to shorten the connect phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticIpConfig {
    pub address: [u8; 4],
    pub gateway: [u8; 4],
    pub subnet: [u8; 4],
    pub dns: [u8; 4],
}

impl StaticIpConfig {
    /// Prefix length of `subnet` (e.g. `255.255.255.0` → 24).
    pub fn prefix_len(&self) -> u8 {
        u32::from_be_bytes(self.subnet).leading_ones() as u8
    }
}

/// MQTT broker session parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerConfig {
    pub host: HostName,
    pub port: u16,
    pub client_name: String<32>,
    pub username: Option<String<32>>,
    pub password: Option<Secret>,
}

/// The two well-known topics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicConfig {
    /// Retained current-time topic; digits of the payload form a compact date-time.
    pub time_request: Topic,
    /// Retained status topic this device publishes to.
    pub status: Topic,
}

/// Every wall-clock bound used by the wake cycle, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// A further press within this span of the previous one extends the gesture.
    pub coalescing_window_ms: u32,
    /// Extra time the cycle stays awake after the window before resolving.
    pub coalescing_slack_ms: u32,
    pub wifi_timeout_ms: u32,
    pub broker_timeout_ms: u32,
    pub sync_timeout_ms: u32,
    /// A single press held at least this long becomes a different command.
    pub long_press_ms: u32,
    /// Granularity of every cooperative wait loop.
    pub poll_interval_ms: u32,
}

/// Battery sense calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryConfig {
    /// ADC full-scale reference voltage.
    pub reference_voltage: f32,
    /// Additive calibration offset applied after scaling.
    pub calibration_offset: f32,
    /// Resistive divider ratio between the cell and the ADC pin.
    pub divider_ratio: f32,
    pub sample_count: u8,
    pub settle_ms: u32,
}

/// Complete device configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub network: NetworkConfig,
    pub broker: BrokerConfig,
    pub topics: TopicConfig,
    pub timing: TimingConfig,
    pub battery: BatteryConfig,
    /// Raise the log level to `Debug`.
    pub verbose: bool,
    /// Adding to a full log clears it first instead of being ignored.
    pub auto_clear_when_full: bool,
}

// ── Defaults ──────────────────────────────────────────────────

pub const DEFAULT_COALESCING_WINDOW_MS: u32 = 200;
pub const DEFAULT_COALESCING_SLACK_MS: u32 = 50;
pub const DEFAULT_WIFI_TIMEOUT_MS: u32 = 10_000;
pub const DEFAULT_BROKER_TIMEOUT_MS: u32 = 5_000;
pub const DEFAULT_SYNC_TIMEOUT_MS: u32 = 5_000;
pub const DEFAULT_LONG_PRESS_MS: u32 = 1_000;
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 10;

const DEFAULT_MQTT_PORT: u16 = 1883;
const DEFAULT_TIME_TOPIC: &str = "feedlog/time";
const DEFAULT_STATUS_TOPIC: &str = "feedlog/status";
const DEFAULT_CLIENT_NAME: &str = "feedlog";

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            coalescing_window_ms: DEFAULT_COALESCING_WINDOW_MS,
            coalescing_slack_ms: DEFAULT_COALESCING_SLACK_MS,
            wifi_timeout_ms: DEFAULT_WIFI_TIMEOUT_MS,
            broker_timeout_ms: DEFAULT_BROKER_TIMEOUT_MS,
            sync_timeout_ms: DEFAULT_SYNC_TIMEOUT_MS,
            long_press_ms: DEFAULT_LONG_PRESS_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            reference_voltage: 3.3,
            calibration_offset: 0.0,
            divider_ratio: 2.0, // 100k / 100k
            sample_count: 10,
            settle_ms: 10,
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        let static_ip = match (
            option_env!("FEEDLOG_STATIC_IP").and_then(parse_ipv4),
            option_env!("FEEDLOG_GATEWAY").and_then(parse_ipv4),
            option_env!("FEEDLOG_SUBNET").and_then(parse_ipv4),
        ) {
            (Some(address), Some(gateway), Some(subnet)) => Some(StaticIpConfig {
                address,
                gateway,
                subnet,
                dns: option_env!("FEEDLOG_DNS")
                    .and_then(parse_ipv4)
                    .unwrap_or(gateway),
            }),
            _ => None,
        };

        Self {
            network: NetworkConfig {
                ssid: truncated(option_env!("FEEDLOG_WIFI_SSID").unwrap_or("")),
                password: truncated(option_env!("FEEDLOG_WIFI_PASS").unwrap_or("")),
                static_ip,
            },
            broker: BrokerConfig {
                host: truncated(option_env!("FEEDLOG_MQTT_HOST").unwrap_or("")),
                port: option_env!("FEEDLOG_MQTT_PORT")
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(DEFAULT_MQTT_PORT),
                client_name: truncated(
                    option_env!("FEEDLOG_MQTT_CLIENT").unwrap_or(DEFAULT_CLIENT_NAME),
                ),
                username: option_env!("FEEDLOG_MQTT_USER")
                    .filter(|u| !u.is_empty())
                    .map(truncated),
                password: option_env!("FEEDLOG_MQTT_PASS")
                    .filter(|p| !p.is_empty())
                    .map(truncated),
            },
            topics: TopicConfig {
                time_request: truncated(
                    option_env!("FEEDLOG_TOPIC_TIME").unwrap_or(DEFAULT_TIME_TOPIC),
                ),
                status: truncated(
                    option_env!("FEEDLOG_TOPIC_STATUS").unwrap_or(DEFAULT_STATUS_TOPIC),
                ),
            },
            timing: TimingConfig::default(),
            battery: BatteryConfig::default(),
            verbose: false,
            auto_clear_when_full: false,
        }
    }
}

impl DeviceConfig {
    /// Full span the cycle stays awake waiting for further presses.
    pub fn coalescing_wait_ms(&self) -> u32 {
        self.timing
            .coalescing_window_ms
            .saturating_add(self.timing.coalescing_slack_ms)
    }

    /// Level filter selected by the `verbose` flag.
    pub fn log_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }
}

/// Range-check a configuration before it is persisted or used.
pub fn validate_config(cfg: &DeviceConfig) -> Result<(), ConfigError> {
    let t = &cfg.timing;
    if !(50..=2_000).contains(&t.coalescing_window_ms) {
        return Err(ConfigError::ValidationFailed(
            "coalescing_window_ms must be 50–2000",
        ));
    }
    if t.coalescing_slack_ms > 1_000 {
        return Err(ConfigError::ValidationFailed(
            "coalescing_slack_ms must be 0–1000",
        ));
    }
    for timeout in [t.wifi_timeout_ms, t.broker_timeout_ms, t.sync_timeout_ms] {
        if !(100..=60_000).contains(&timeout) {
            return Err(ConfigError::ValidationFailed(
                "network timeouts must be 100–60000 ms",
            ));
        }
    }
    if t.long_press_ms <= t.coalescing_window_ms {
        return Err(ConfigError::ValidationFailed(
            "long_press_ms must exceed coalescing_window_ms",
        ));
    }
    if t.poll_interval_ms == 0 || t.poll_interval_ms > t.coalescing_window_ms {
        return Err(ConfigError::ValidationFailed(
            "poll_interval_ms must be 1..=coalescing_window_ms",
        ));
    }
    let b = &cfg.battery;
    if !(1..=64).contains(&b.sample_count) {
        return Err(ConfigError::ValidationFailed("sample_count must be 1–64"));
    }
    if !(b.divider_ratio >= 1.0 && b.divider_ratio <= 16.0) {
        return Err(ConfigError::ValidationFailed("divider_ratio must be 1–16"));
    }
    if !(b.reference_voltage > 0.0 && b.reference_voltage <= 5.0) {
        return Err(ConfigError::ValidationFailed(
            "reference_voltage must be 0–5 V",
        ));
    }
    if !b.calibration_offset.is_finite() || b.calibration_offset.abs() > 1.0 {
        return Err(ConfigError::ValidationFailed(
            "calibration_offset must be within ±1 V",
        ));
    }
    if cfg.broker.port == 0 {
        return Err(ConfigError::ValidationFailed("broker port must be non-zero"));
    }
    if cfg.topics.time_request.is_empty() || cfg.topics.status.is_empty() {
        return Err(ConfigError::ValidationFailed("topics must be non-empty"));
    }
    Ok(())
}

/// Copy `s` into a fixed-capacity string, dropping whatever does not fit.
fn truncated<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Parse dotted-quad IPv4 text.
pub fn parse_ipv4(s: &str) -> Option<[u8; 4]> {
    let mut out = [0u8; 4];
    let mut parts = s.trim().split('.');
    for octet in &mut out {
        *octet = parts.next()?.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}
