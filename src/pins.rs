//! GPIO / peripheral pin assignments for the feeding-logger board.
//!
//! Single source of truth: every adapter and `main.rs` reference this module
//! rather than hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Button
// ---------------------------------------------------------------------------

/// Momentary switch to ground, external pull-up.  Must be an RTC-capable
/// pin: it is also the ext0 deep-sleep wake source.
///
/// The switch also pulses EN through an RC network, so a press while the
/// chip is awake restarts it.  RTC slow memory survives that reset.
pub const BUTTON_GPIO: i32 = 4;
/// Level that wakes the chip (button pressed).
pub const BUTTON_WAKE_LEVEL: i32 = 0;

// ---------------------------------------------------------------------------
// Battery sense
// ---------------------------------------------------------------------------

/// Digital output: HIGH connects the battery divider to the ADC.
pub const BATTERY_SENSE_EN_GPIO: i32 = 25;
/// Divider midpoint on ADC1 channel 6 (GPIO 34 on ESP32).
pub const BATTERY_ADC_GPIO: i32 = 34;
pub const BATTERY_ADC_CHANNEL: u32 = 6;

// ---------------------------------------------------------------------------
// Peripheral rail
// ---------------------------------------------------------------------------

/// Digital output: HIGH powers the display panel and sense divider.
pub const PERIPHERAL_POWER_GPIO: i32 = 26;
