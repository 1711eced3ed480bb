//! Unified error types for the FeedLog firmware.
//!
//! Nothing inside the wake cycle is fatal: every variant here has a local
//! fallback in the code that observes it.  The types exist so that ports
//! can report *what* went wrong and the cycle can log it before degrading.
//! All variants are `Copy` so they can be passed around without allocation.

use core::fmt;

use crate::app::ports::{ConfigError, StorageError};

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible bootstrap operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Wi-Fi or broker interaction failed.
    Comms(CommsError),
    /// Retained or non-volatile storage failed.
    Storage(StorageError),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

/// Failures reported by [`NetworkPort`](crate::app::ports::NetworkPort) and
/// [`BrokerPort`](crate::app::ports::BrokerPort).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// Station did not associate / get an address within `wifi_timeout_ms`.
    WifiTimeout,
    /// The Wi-Fi driver rejected the configuration or failed to start.
    WifiFailed,
    /// Broker session handshake did not complete within `broker_timeout_ms`.
    BrokerTimeout,
    /// The broker client could not be created.
    BrokerFailed,
    SubscribeFailed,
    PublishFailed,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WifiTimeout => write!(f, "WiFi connect timed out"),
            Self::WifiFailed => write!(f, "WiFi start failed"),
            Self::BrokerTimeout => write!(f, "broker handshake timed out"),
            Self::BrokerFailed => write!(f, "broker client failed"),
            Self::SubscribeFailed => write!(f, "MQTT subscribe failed"),
            Self::PublishFailed => write!(f, "MQTT publish failed"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::NotFound => Self::Config("config not found"),
            ConfigError::Corrupted => Self::Config("config corrupted"),
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
            ConfigError::IoError => Self::Config("config I/O error"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
