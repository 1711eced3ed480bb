//! ESP32 clock adapter.
//!
//! Implements [`ClockPort`] for the wake cycle.
//!
//! - **`target_os = "espidf"`**: reads the RTC-backed system time via
//!   `gettimeofday()`, which keeps counting through deep sleep; `esp_timer`
//!   restarts at zero on every wake.  Delays go through FreeRTOS so the
//!   Wi-Fi and MQTT tasks get the CPU.
//! - **`not(target_os = "espidf")`**: `std::time::Instant` plus
//!   `std::thread::sleep` for host-side simulation.

use crate::app::ports::ClockPort;

pub struct Esp32Clock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Esp32Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32Clock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds on the RTC clock, truncated to `u32`.
    #[cfg(target_os = "espidf")]
    pub fn millis(&self) -> u32 {
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, core::ptr::null_mut()) } != 0 {
            // Fall back to time since this boot; coalescing then degrades to
            // "every press is a new gesture".
            return (unsafe { esp_idf_svc::sys::esp_timer_get_time() } / 1_000) as u32;
        }
        (tv.tv_sec as i64)
            .wrapping_mul(1_000)
            .wrapping_add(tv.tv_usec as i64 / 1_000) as u32
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn millis(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }
}

impl ClockPort for Esp32Clock {
    fn now_ms(&mut self) -> u32 {
        self.millis()
    }

    #[cfg(target_os = "espidf")]
    fn delay_ms(&mut self, ms: u32) {
        esp_idf_hal::delay::FreeRtos::delay_ms(ms);
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}
