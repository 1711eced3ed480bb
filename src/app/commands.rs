//! Commands selected by a resolved gesture.
//!
//! | Gesture          | Command          | Network |
//! |------------------|------------------|---------|
//! | single           | `AddFeeding`     | yes (time + publish) |
//! | single, held     | `QueryBattery`   | no      |
//! | double           | `RemoveFeeding`  | publish |
//! | triple           | `ShowStatus`     | no      |
//! | quadruple        | `ClearFeedings`  | publish |
//! | anything else    | `ShowStatus`     | no      |
//!
//! Counts without a dedicated command (0, 5 and up) fall back to
//! `ShowStatus`: the panel is refreshed, the log is left alone.

use crate::gesture::Gesture;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedingCommand {
    /// Learn the time and log a feeding.
    AddFeeding,
    /// Drop the most recent feeding.
    RemoveFeeding,
    /// Drop every feeding.
    ClearFeedings,
    /// Sample and show the battery voltage.
    QueryBattery,
    /// Redisplay the log.
    ShowStatus,
}

impl From<Gesture> for FeedingCommand {
    fn from(gesture: Gesture) -> Self {
        match gesture {
            Gesture::Single => Self::AddFeeding,
            Gesture::SingleHeld => Self::QueryBattery,
            Gesture::Double => Self::RemoveFeeding,
            Gesture::Quadruple => Self::ClearFeedings,
            Gesture::Triple | Gesture::Other(_) => Self::ShowStatus,
        }
    }
}

impl FeedingCommand {
    /// Whether the command may bring the radio up.
    pub fn uses_network(self) -> bool {
        matches!(
            self,
            Self::AddFeeding | Self::RemoveFeeding | Self::ClearFeedings
        )
    }

    /// Whether the command needs the authoritative time.
    pub fn needs_time(self) -> bool {
        self == Self::AddFeeding
    }
}
