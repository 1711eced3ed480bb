//! Time synchronisation and status publishing.
//!
//! [`SyncSession`] runs one command against the feeding log, bringing the
//! radio up only when the command needs it and always tearing it down
//! again.  [`payload`] holds the two wire formats, [`state`] the state
//! identities and the per-session transition trace.

pub mod payload;
pub mod session;
pub mod state;

pub use session::{SyncOutcome, SyncSession};
pub use state::{SyncState, SyncTrace};
