//! Wire formats on the two topics.
//!
//! - Time topic: the digits of the payload, concatenated in order, form a
//!   compact date-time.  Every other byte is skipped.
//! - Status topic: a retained JSON object with a fixed field order and
//!   separator style:
//!   `{"count":2, "datetime":240102, "battery-voltage":3.87}`

use core::fmt::Write;

use heapless::String;

use crate::feeding_log::CompactDateTime;

/// Capacity of a rendered status payload.
pub const STATUS_PAYLOAD_CAP: usize = 128;

/// Build a compact date-time from the digit characters of `payload`.
///
/// A payload with no digits, or whose digits overflow `u32`, yields
/// [`CompactDateTime::UNKNOWN`].
pub fn parse_time_payload(payload: &[u8]) -> CompactDateTime {
    let mut value: u32 = 0;
    let mut seen_digit = false;
    for &b in payload {
        if !b.is_ascii_digit() {
            continue;
        }
        seen_digit = true;
        value = match value
            .checked_mul(10)
            .and_then(|v| v.checked_add((b - b'0') as u32))
        {
            Some(v) => v,
            None => return CompactDateTime::UNKNOWN,
        };
    }
    if seen_digit {
        CompactDateTime::new(value)
    } else {
        CompactDateTime::UNKNOWN
    }
}

/// Snapshot published after a log change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusPayload {
    pub count: u8,
    pub latest: CompactDateTime,
    pub battery_voltage: f32,
}

impl StatusPayload {
    pub fn render(&self) -> String<STATUS_PAYLOAD_CAP> {
        // A non-finite reading would not be valid JSON.
        let voltage = if self.battery_voltage.is_finite() {
            self.battery_voltage
        } else {
            0.0
        };
        let mut out = String::new();
        // Even f32::MAX at two decimals fits in STATUS_PAYLOAD_CAP.
        let _ = write!(
            out,
            "{{\"count\":{}, \"datetime\":{}, \"battery-voltage\":{:.2}}}",
            self.count,
            self.latest.raw(),
            voltage
        );
        out
    }
}
