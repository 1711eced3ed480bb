//! State that survives deep sleep.
//!
//! A single 28-byte record lives in RTC slow memory.  [`record`] defines
//! its byte layout, [`crc`] the checksum guarding it, and [`store`] the
//! load/save contract on top of a
//! [`RetainedMemoryPort`](crate::app::ports::RetainedMemoryPort).

pub mod crc;
pub mod record;
pub mod store;

pub use record::PersistedState;
pub use store::IntegrityStore;
