//! Fixed-capacity feeding log.
//!
//! Up to [`FEEDING_LOG_CAPACITY`] timestamps, most recent at index 0.
//! Ordering holds only by construction: inserts go to the front, removals
//! come from the front, nothing re-sorts.  Slots past `count` are kept
//! zeroed.  The log never persists itself; every caller that mutates it
//! writes the record back immediately.

use core::fmt;

pub const FEEDING_LOG_CAPACITY: usize = 4;

/// Decimal-packed timestamp: `date * 10_000 + time`, where `date` is
/// `YYMMDD` and `time` is `HHMM`.  [`CompactDateTime::UNKNOWN`] marks an
/// unresolved timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CompactDateTime(u32);

impl CompactDateTime {
    /// Sentinel for "no entry" / "time not learned".
    pub const UNKNOWN: Self = Self(99_999_999);

    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn from_parts(date: u32, time: u32) -> Self {
        Self(date * 10_000 + time)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn is_known(self) -> bool {
        self.0 != Self::UNKNOWN.0
    }

    /// The `YYMMDD` component.
    pub const fn date(self) -> u32 {
        self.0 / 10_000
    }

    /// The `HHMM` component.
    pub const fn time(self) -> u32 {
        self.0 % 10_000
    }
}

impl fmt::Display for CompactDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_known() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "unknown")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedingLog {
    entries: [CompactDateTime; FEEDING_LOG_CAPACITY],
    count: u8,
}

impl Default for FeedingLog {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl FeedingLog {
    pub const EMPTY: Self = Self {
        entries: [CompactDateTime(0); FEEDING_LOG_CAPACITY],
        count: 0,
    };

    pub fn new() -> Self {
        Self::EMPTY
    }

    /// Rebuild a log from its stored slots.  Returns `None` when `count`
    /// exceeds the capacity; slots past `count` are zeroed.
    pub fn from_raw(slots: [u32; FEEDING_LOG_CAPACITY], count: u8) -> Option<Self> {
        if count as usize > FEEDING_LOG_CAPACITY {
            return None;
        }
        let mut log = Self::EMPTY;
        for (dst, src) in log.entries.iter_mut().zip(slots).take(count as usize) {
            *dst = CompactDateTime(src);
        }
        log.count = count;
        Some(log)
    }

    /// All slots in storage order, including the zeroed tail.
    pub fn raw_slots(&self) -> [u32; FEEDING_LOG_CAPACITY] {
        self.entries.map(CompactDateTime::raw)
    }

    /// Insert at the front.  Returns `false` (and changes nothing) when full.
    pub fn insert_front(&mut self, value: CompactDateTime) -> bool {
        let n = self.count as usize;
        if n == FEEDING_LOG_CAPACITY {
            return false;
        }
        self.entries.copy_within(0..n, 1);
        self.entries[0] = value;
        self.count += 1;
        true
    }

    /// Drop the most recent entry.  No-op on an empty log.
    pub fn remove_front(&mut self) -> Option<CompactDateTime> {
        let n = self.count as usize;
        if n == 0 {
            return None;
        }
        let removed = self.entries[0];
        self.entries.copy_within(1..n, 0);
        self.entries[n - 1] = CompactDateTime(0);
        self.count -= 1;
        Some(removed)
    }

    pub fn clear(&mut self) {
        *self = Self::EMPTY;
    }

    /// Most recent entry, or [`CompactDateTime::UNKNOWN`] when empty.
    pub fn latest(&self) -> CompactDateTime {
        if self.count > 0 {
            self.entries[0]
        } else {
            CompactDateTime::UNKNOWN
        }
    }

    pub fn len(&self) -> u8 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count as usize == FEEDING_LOG_CAPACITY
    }

    /// Live entries, most recent first.
    pub fn entries(&self) -> &[CompactDateTime] {
        &self.entries[..self.count as usize]
    }
}
