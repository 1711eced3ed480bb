//! FeedLog firmware library.
//!
//! A battery-powered button logger: every press reboots the device out of
//! deep sleep, the reboots are coalesced into a gesture through a
//! checksummed record in RTC memory, and the gesture drives a four-entry
//! feeding log that is time-stamped and reported over MQTT.
//!
//! The wake-cycle core ([`app`], [`gesture`], [`feeding_log`], [`persist`],
//! [`sync`]) is pure logic behind port traits.  All ESP-IDF-specific code
//! is guarded by `#[cfg(target_os = "espidf")]` within [`adapters`] and
//! [`drivers`].

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod feeding_log;
pub mod gesture;
pub mod persist;
pub mod sync;

pub mod adapters;
pub mod drivers;
pub mod pins;
