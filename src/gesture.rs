//! Multi-press gesture reconstruction across reboots.
//!
//! Every press restarts the firmware from scratch, so a double click is two
//! independent wake cycles.  They agree on a press count only through the
//! retained record and the clock:
//!
//! ```text
//!  wake ─▶ load ─▶ Δ = now - last_wake ─▶ Δ < window && valid ? count+1 : 1
//!       ─▶ last_wake = now ─▶ save ─▶ stay awake (window + slack)
//!       ─▶ reload ─▶ count is the gesture ─▶ count = 0 ─▶ save
//! ```
//!
//! A later press inside the window reboots the device and its cycle takes
//! over the same counter.  The cycle that survives its full wait is the one
//! that resolves the gesture.

use crate::persist::PersistedState;

/// A resolved gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Single,
    /// One press held past the long-press threshold.
    SingleHeld,
    Double,
    Triple,
    Quadruple,
    /// Any other count, including 0 (record lost between wake and resolve).
    Other(u8),
}

impl Gesture {
    pub fn from_count(count: u8, held: bool) -> Self {
        match (count, held) {
            (1, true) => Self::SingleHeld,
            (1, false) => Self::Single,
            (2, _) => Self::Double,
            (3, _) => Self::Triple,
            (4, _) => Self::Quadruple,
            (n, _) => Self::Other(n),
        }
    }

    pub fn press_count(self) -> u8 {
        match self {
            Self::Single | Self::SingleHeld => 1,
            Self::Double => 2,
            Self::Triple => 3,
            Self::Quadruple => 4,
            Self::Other(n) => n,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GestureAccumulator {
    window_ms: u32,
}

impl GestureAccumulator {
    pub fn new(window_ms: u32) -> Self {
        Self { window_ms }
    }

    pub fn window_ms(&self) -> u32 {
        self.window_ms
    }

    /// `true` when `now_ms` falls inside the window opened at `last_ms`.
    /// A clock that went backwards wraps to a huge delta and lands outside.
    pub fn within_window(&self, last_ms: u32, now_ms: u32) -> bool {
        now_ms.wrapping_sub(last_ms) < self.window_ms
    }

    /// Record a wake.  Returns the record to persist immediately.
    pub fn register_wake(&self, loaded: PersistedState, valid: bool, now_ms: u32) -> PersistedState {
        let mut next = loaded;
        next.pending_presses = if valid && self.within_window(loaded.last_wake_ms, now_ms) {
            loaded.pending_presses.saturating_add(1)
        } else {
            1
        };
        next.last_wake_ms = now_ms;
        next
    }

    /// Take the pending count as the gesture and reset it.
    pub fn resolve(&self, current: PersistedState) -> (u8, PersistedState) {
        let mut next = current;
        next.pending_presses = 0;
        (current.pending_presses, next)
    }
}
