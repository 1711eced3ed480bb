//! Power adapter: peripheral rail and deep sleep.
//!
//! - **`target_os = "espidf"`**: arms ext0 on the button pin and calls
//!   `esp_deep_sleep_start()`, which never returns.  RTC slow memory (and
//!   with it the retained record) stays powered.
//! - **all other targets**: records the request and returns, so a host test
//!   can run the next "boot" itself.

use embedded_hal::digital::OutputPin;
use log::{info, warn};

use crate::app::ports::PowerPort;
use crate::drivers::hw_init;

pub struct PowerManager<R> {
    rail: R,
    sleep_requests: u32,
}

impl<R: OutputPin> PowerManager<R> {
    pub fn new(rail: R) -> Self {
        Self {
            rail,
            sleep_requests: 0,
        }
    }

    /// Number of times deep sleep was requested (host builds return from it).
    pub fn sleep_requests(&self) -> u32 {
        self.sleep_requests
    }

    #[cfg(target_os = "espidf")]
    fn platform_sleep(&mut self) {
        // SAFETY: no Rust state is relied on after this call; the chip
        // resets on wake.
        unsafe { esp_idf_svc::sys::esp_deep_sleep_start() };
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_sleep(&mut self) {
        info!("power(sim): deep sleep requested");
    }
}

impl<R: OutputPin> PowerPort for PowerManager<R> {
    fn peripherals_on(&mut self) {
        if self.rail.set_high().is_err() {
            warn!("power: rail enable failed");
        }
    }

    fn peripherals_off(&mut self) {
        if self.rail.set_low().is_err() {
            warn!("power: rail disable failed");
        }
    }

    fn enter_deep_sleep(&mut self) {
        self.sleep_requests += 1;
        if let Err(e) = hw_init::arm_button_wake() {
            // Without ext0 only a reset wakes the chip.
            warn!("power: {}; sleeping anyway", e);
        }
        info!("power: entering deep sleep");
        self.platform_sleep();
    }
}
