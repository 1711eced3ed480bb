//! Fuzz target: retained record decoding
//!
//! Feeds arbitrary 28-byte images to `IntegrityStore::load` and checks:
//! - No panics under arbitrary bytes
//! - An accepted record never holds more than 4 feedings
//! - An accepted record re-encodes to a record that decodes to itself
//! - A rejected image loads as the empty default
//!
//! cargo fuzz run fuzz_record_decode

#![no_main]

use feedlog::app::ports::{RetainedMemoryPort, StorageError};
use feedlog::feeding_log::FEEDING_LOG_CAPACITY;
use feedlog::persist::record::RECORD_LEN;
use feedlog::persist::{IntegrityStore, PersistedState};
use libfuzzer_sys::fuzz_target;

struct Image([u8; RECORD_LEN]);

impl RetainedMemoryPort for Image {
    fn read(&self, buf: &mut [u8; RECORD_LEN]) -> Result<(), StorageError> {
        *buf = self.0;
        Ok(())
    }

    fn write(&mut self, data: &[u8; RECORD_LEN]) -> Result<(), StorageError> {
        self.0 = *data;
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    let mut image = [0u8; RECORD_LEN];
    let n = data.len().min(RECORD_LEN);
    image[..n].copy_from_slice(&data[..n]);

    let store = IntegrityStore::new(Image(image));
    let (state, valid) = store.load();

    if valid {
        assert!(state.feeding_log.len() as usize <= FEEDING_LOG_CAPACITY);
        assert_eq!(PersistedState::decode(&state.encode()), Some(state));
    } else {
        assert_eq!(state, PersistedState::default());
    }
});
