//! Port traits — the hexagonal boundary between the wake-cycle core and the board.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ WakeCycleController / SyncSession (domain)
//! ```
//!
//! Driven adapters (RTC memory, clock, button, radio, broker, display,
//! battery, power rails) implement these traits.  The domain consumes them
//! via generics, so the whole cycle runs on the host against fakes with no
//! real time passing.
//!
//! ## Timing model
//!
//! There is no executor.  Every wait in the core is a bounded loop that
//! checks a condition, consults [`ClockPort::now_ms`] against a deadline, and
//! calls [`ClockPort::delay_ms`] to yield.  On the device the delay hands
//! the CPU to the Wi-Fi and MQTT tasks so handshakes and retained-message
//! delivery progress; a test clock simply advances its counter.

use heapless::{String, Vec};

use crate::config::{BrokerConfig, DeviceConfig, NetworkConfig};
use crate::error::CommsError;
use crate::feeding_log::CompactDateTime;
use crate::persist::record::RECORD_LEN;

/// Largest inbound MQTT payload the core will look at.
pub const MAX_INBOUND_PAYLOAD: usize = 64;

// ───────────────────────────────────────────────────────────────
// Retained memory port (RTC slow memory, survives deep sleep)
// ───────────────────────────────────────────────────────────────

/// Fixed-size memory that keeps its contents while the main core is powered
/// down.  Content is raw bytes; integrity checking is the caller's job.
pub trait RetainedMemoryPort {
    /// Copy the retained image into `buf`.
    fn read(&self, buf: &mut [u8; RECORD_LEN]) -> Result<(), StorageError>;

    /// Replace the whole retained image.  A subsequent `read` must observe
    /// either the previous image or this one, never a mix.
    fn write(&mut self, data: &[u8; RECORD_LEN]) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic milliseconds plus a cooperative delay.
pub trait ClockPort {
    /// Milliseconds on a clock that keeps running across deep sleep.
    /// Wraps at `u32::MAX`; callers use wrapping arithmetic.
    fn now_ms(&mut self) -> u32;

    /// Yield for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Button port
// ───────────────────────────────────────────────────────────────

pub trait ButtonPort {
    /// Current debounced level: `true` while the button is held.
    fn is_pressed(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Network and broker ports (driven adapter: domain ↔ radio)
// ───────────────────────────────────────────────────────────────

/// Station-mode network link.
pub trait NetworkPort {
    /// Power the radio and start associating.  Returns immediately;
    /// completion is observed through [`NetworkPort::is_up`].
    fn begin(&mut self, config: &NetworkConfig) -> Result<(), CommsError>;

    /// Associated and holding an address.
    fn is_up(&mut self) -> bool;

    /// Drive any driver-internal processing.
    fn poll_network(&mut self);

    /// Disconnect and power the radio down.  Safe to call in any state.
    fn shutdown(&mut self);
}

/// A message delivered by the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String<64>,
    pub payload: Vec<u8, MAX_INBOUND_PAYLOAD>,
}

/// Publish/subscribe session.
pub trait BrokerPort {
    /// Start the session handshake.  Returns immediately; completion is
    /// observed through [`BrokerPort::is_open`].
    fn open(&mut self, config: &BrokerConfig) -> Result<(), CommsError>;

    fn is_open(&mut self) -> bool;

    fn subscribe(&mut self, topic: &str) -> Result<(), CommsError>;

    /// Drive client-internal processing (keep-alive, inbound delivery).
    fn poll_broker(&mut self);

    /// Oldest undelivered inbound message, if any.
    fn take_message(&mut self) -> Option<InboundMessage>;

    /// Fire-and-forget retained publish.
    fn publish_retained(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError>;

    /// Tear the session down.  Safe to call in any state.
    fn close(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Display port (rendering lives outside the core)
// ───────────────────────────────────────────────────────────────

pub trait DisplayPort {
    /// Show the log summary: entry count and most recent entry.
    fn present(&mut self, feeding_count: u8, latest: CompactDateTime);

    /// Show a battery reading.
    fn present_battery(&mut self, voltage: f32);

    fn present_connecting(&mut self);
    fn present_connect_success(&mut self);
    fn present_connect_failure(&mut self);

    /// Put the panel into its retained-image sleep before power-down.
    fn dismiss(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Battery port
// ───────────────────────────────────────────────────────────────

pub trait BatteryPort {
    /// Enable the sense circuit, average several ADC readings, convert to
    /// volts, and disable the sense circuit again.
    fn sample_battery_voltage(&mut self) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Power port
// ───────────────────────────────────────────────────────────────

pub trait PowerPort {
    /// Switch the peripheral rail (display, sense divider) on.
    fn peripherals_on(&mut self);

    fn peripherals_off(&mut self);

    /// Suspend the main core until the next button press.  On the device
    /// this does not return.
    fn enter_deep_sleep(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists deploy-time configuration overrides.
///
/// Implementations MUST validate with
/// [`validate_config`](crate::config::validate_config) before persisting.
pub trait ConfigPort {
    /// Stored configuration, or [`DeviceConfig::default()`] when none exists.
    fn load(&self) -> Result<DeviceConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &DeviceConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from storage backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Backing memory is not available on this boot.
    Unavailable,
    /// Generic I/O error.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "storage unavailable"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
