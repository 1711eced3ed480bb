//! Byte-exact layout of the retained record.
//!
//! | Offset | Size | Field               |
//! |-------:|-----:|---------------------|
//! | 0      | 4    | checksum            |
//! | 4      | 4    | last_wake_ms        |
//! | 8      | 16   | feedings\[4\]       |
//! | 24     | 1    | feeding count       |
//! | 25     | 1    | pending presses     |
//! | 26     | 2    | padding (reserved)  |
//!
//! All multi-byte fields are little-endian.  The checksum covers bytes
//! `4..28`, padding included.

use crate::feeding_log::{FEEDING_LOG_CAPACITY, FeedingLog};

use super::crc::crc32_mpeg2;

pub const RECORD_LEN: usize = 28;

const CHECKSUM: core::ops::Range<usize> = 0..4;
const LAST_WAKE: core::ops::Range<usize> = 4..8;
const FEEDINGS_AT: usize = 8;
const COUNT_AT: usize = 24;
const PENDING_AT: usize = 25;

/// The record held in RTC memory.  The checksum is not a field: it is
/// derived from the other fields on every [`encode`](Self::encode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PersistedState {
    /// Clock reading at the last wake, in milliseconds.
    pub last_wake_ms: u32,
    /// Presses seen in the gesture that has not been resolved yet.
    pub pending_presses: u8,
    pub feeding_log: FeedingLog,
}

impl PersistedState {
    /// Serialise with a freshly computed checksum.
    pub fn encode(&self) -> [u8; RECORD_LEN] {
        let mut buf = [0u8; RECORD_LEN];
        buf[LAST_WAKE].copy_from_slice(&self.last_wake_ms.to_le_bytes());
        for (i, slot) in self.feeding_log.raw_slots().iter().enumerate() {
            let at = FEEDINGS_AT + i * 4;
            buf[at..at + 4].copy_from_slice(&slot.to_le_bytes());
        }
        buf[COUNT_AT] = self.feeding_log.len();
        buf[PENDING_AT] = self.pending_presses;
        let crc = checksum_of(&buf);
        buf[CHECKSUM].copy_from_slice(&crc.to_le_bytes());
        buf
    }

    /// Decode a stored image.  `None` when the checksum disagrees or the
    /// feeding count exceeds the log capacity.
    pub fn decode(buf: &[u8; RECORD_LEN]) -> Option<Self> {
        if stored_checksum(buf) != checksum_of(buf) {
            return None;
        }
        let mut slots = [0u32; FEEDING_LOG_CAPACITY];
        for (i, slot) in slots.iter_mut().enumerate() {
            *slot = read_u32(buf, FEEDINGS_AT + i * 4);
        }
        let feeding_log = FeedingLog::from_raw(slots, buf[COUNT_AT])?;
        Some(Self {
            last_wake_ms: read_u32(buf, LAST_WAKE.start),
            pending_presses: buf[PENDING_AT],
            feeding_log,
        })
    }
}

/// Checksum over everything after the checksum field.
pub fn checksum_of(buf: &[u8; RECORD_LEN]) -> u32 {
    crc32_mpeg2(&buf[CHECKSUM.end..])
}

pub fn stored_checksum(buf: &[u8; RECORD_LEN]) -> u32 {
    read_u32(buf, CHECKSUM.start)
}

fn read_u32(buf: &[u8; RECORD_LEN], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}
