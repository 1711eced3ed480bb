//! RTC slow-memory adapter.
//!
//! Implements [`RetainedMemoryPort`] over a 28-byte static that survives
//! deep sleep.
//!
//! - **`target_os = "espidf"`**: the image lives in `.rtc.data`.  Contents
//!   after a power-on reset are unspecified; the checksum sorts that out.
//! - **all other targets**: a plain in-process buffer, so a host "reboot"
//!   is just a second controller built over the same [`RtcMemory`].

use crate::app::ports::{RetainedMemoryPort, StorageError};
use crate::persist::record::RECORD_LEN;

#[cfg(target_os = "espidf")]
#[unsafe(link_section = ".rtc.data")]
static mut RTC_RECORD: [u8; RECORD_LEN] = [0; RECORD_LEN];

/// Handle to the retained record.  Only one should exist per boot.
pub struct RtcMemory {
    #[cfg(not(target_os = "espidf"))]
    image: [u8; RECORD_LEN],
}

impl Default for RtcMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl RtcMemory {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            image: [0; RECORD_LEN],
        }
    }

    /// Host-side helper: raw access for corruption tests.
    #[cfg(not(target_os = "espidf"))]
    pub fn image_mut(&mut self) -> &mut [u8; RECORD_LEN] {
        &mut self.image
    }
}

impl RetainedMemoryPort for RtcMemory {
    #[cfg(target_os = "espidf")]
    fn read(&self, buf: &mut [u8; RECORD_LEN]) -> Result<(), StorageError> {
        // SAFETY: single-threaded access during the wake cycle; the record
        // is only touched through this handle.
        *buf = unsafe { core::ptr::read_volatile(&raw const RTC_RECORD) };
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn write(&mut self, data: &[u8; RECORD_LEN]) -> Result<(), StorageError> {
        // SAFETY: as above.  Nothing else runs between the write and the
        // next read, so readers never observe a partial image.
        unsafe { core::ptr::write_volatile(&raw mut RTC_RECORD, *data) };
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn read(&self, buf: &mut [u8; RECORD_LEN]) -> Result<(), StorageError> {
        *buf = self.image;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn write(&mut self, data: &[u8; RECORD_LEN]) -> Result<(), StorageError> {
        self.image = *data;
        Ok(())
    }
}
