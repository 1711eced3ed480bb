//! Checksum-guarded load/save over retained memory.
//!
//! Corruption and "never initialised" look the same and both resolve to a
//! fresh default record.  Nothing here returns an error: a failed read is
//! an untrusted record, a failed write is logged and the cycle goes on.

use log::{debug, warn};

use crate::app::ports::RetainedMemoryPort;

use super::record::{PersistedState, RECORD_LEN};

pub struct IntegrityStore<M> {
    memory: M,
}

impl<M: RetainedMemoryPort> IntegrityStore<M> {
    pub fn new(memory: M) -> Self {
        Self { memory }
    }

    /// Read and verify the record.
    ///
    /// Returns the decoded record and `true`, or the default record and
    /// `false` when the image is unreadable, fails its checksum, or holds
    /// more feedings than the log can.
    pub fn load(&self) -> (PersistedState, bool) {
        let mut buf = [0u8; RECORD_LEN];
        if let Err(e) = self.memory.read(&mut buf) {
            warn!("store: retained read failed ({}), starting fresh", e);
            return (PersistedState::default(), false);
        }
        match PersistedState::decode(&buf) {
            Some(state) => (state, true),
            None => {
                debug!("store: retained record untrusted, starting fresh");
                (PersistedState::default(), false)
            }
        }
    }

    /// Recompute the checksum and overwrite the whole record.
    pub fn save(&mut self, state: &PersistedState) {
        let buf = state.encode();
        if let Err(e) = self.memory.write(&buf) {
            warn!("store: retained write failed ({})", e);
        }
    }

    pub fn memory(&self) -> &M {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    pub fn into_inner(self) -> M {
        self.memory
    }
}
