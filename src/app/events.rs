//! Outbound application events.
//!
//! The [`WakeCycleController`](super::service::WakeCycleController) emits
//! these through the [`EventSink`](super::ports::EventSink) port.

use crate::feeding_log::CompactDateTime;
use crate::gesture::Gesture;
use crate::sync::SyncOutcome;

use super::commands::FeedingCommand;

/// Structured events emitted by the wake cycle.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The cycle started; `record_valid` is false on cold boot or corruption.
    Woke { now_ms: u32, record_valid: bool },

    /// This wake was counted and persisted.
    PressRegistered { pending: u8 },

    /// The coalescing wait ended and a command was chosen.
    GestureResolved {
        gesture: Gesture,
        command: FeedingCommand,
    },

    /// The feeding log was mutated and persisted.
    LogChanged { count: u8, latest: CompactDateTime },

    /// A command finished.
    CommandFinished(SyncOutcome),

    /// About to enter deep sleep.
    Sleeping,
}
