//! Sync session states.
//!
//! ```text
//! Idle ─▶ Connecting ─▶ Connected ─▶ AwaitingTime ─▶ TimeKnown ─┐
//!              │                           └──────▶ TimeTimeout ─┤
//!              └──────▶ Failed ──────────────────────────────────┤
//!                                                                ▼
//!                                MutatingLog ─▶ Publishing ─▶ Disconnected
//! ```
//!
//! Remove and clear mutate before connecting, so their trace runs
//! `Idle → MutatingLog → Connecting → … → Disconnected`.

use heapless::Vec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SyncState {
    Idle = 0,
    Connecting = 1,
    Connected = 2,
    Failed = 3,
    AwaitingTime = 4,
    TimeKnown = 5,
    TimeTimeout = 6,
    MutatingLog = 7,
    Publishing = 8,
    Disconnected = 9,
}

impl SyncState {
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
            Self::Failed => "Failed",
            Self::AwaitingTime => "AwaitingTime",
            Self::TimeKnown => "TimeKnown",
            Self::TimeTimeout => "TimeTimeout",
            Self::MutatingLog => "MutatingLog",
            Self::Publishing => "Publishing",
            Self::Disconnected => "Disconnected",
        }
    }
}

/// Longest possible path through one session, plus headroom.
const TRACE_CAP: usize = 12;

/// Every state a session passed through, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTrace {
    states: Vec<SyncState, TRACE_CAP>,
}

impl Default for SyncTrace {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncTrace {
    pub fn new() -> Self {
        let mut states = Vec::new();
        let _ = states.push(SyncState::Idle);
        Self { states }
    }

    pub fn push(&mut self, state: SyncState) {
        // A full trace drops the newest state; sessions never get that long.
        let _ = self.states.push(state);
    }

    pub fn current(&self) -> SyncState {
        self.states.last().copied().unwrap_or(SyncState::Idle)
    }

    pub fn states(&self) -> &[SyncState] {
        &self.states
    }

    pub fn contains(&self, state: SyncState) -> bool {
        self.states.contains(&state)
    }
}
