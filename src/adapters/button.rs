//! Button adapter.
//!
//! Active-low momentary switch with external pull-up.  The press that woke
//! the chip is already over by the time this runs (it caused the boot); the
//! adapter only answers "is it still down", which drives long-press
//! detection during the coalescing wait.
//!
//! A level is reported as pressed once it has read low on
//! [`DEBOUNCE_SAMPLES`] consecutive polls, and released as soon as it
//! reads high.

use embedded_hal::digital::InputPin;

use crate::app::ports::ButtonPort;

pub const DEBOUNCE_SAMPLES: u8 = 2;

pub struct GpioButton<P> {
    pin: P,
    low_streak: u8,
}

impl<P: InputPin> GpioButton<P> {
    /// `pressed_at_boot` seeds the debounce so a button held through the
    /// wake is reported immediately.
    pub fn new(pin: P, pressed_at_boot: bool) -> Self {
        Self {
            pin,
            low_streak: if pressed_at_boot { DEBOUNCE_SAMPLES } else { 0 },
        }
    }
}

impl<P: InputPin> ButtonPort for GpioButton<P> {
    fn is_pressed(&mut self) -> bool {
        // A read error counts as released.
        let low = self.pin.is_low().unwrap_or(false);
        self.low_streak = if low {
            self.low_streak.saturating_add(1)
        } else {
            0
        };
        self.low_streak >= DEBOUNCE_SAMPLES
    }
}
