//! Board adapter: bridges the individual peripheral adapters to the single
//! `hw` borrow the wake cycle takes.
//!
//! Owns the clock, button, display, battery monitor and power manager and
//! forwards each port trait to the component that implements it.  This is
//! the only place the pieces are bundled; each stays testable on its own.

use crate::app::ports::{BatteryPort, ButtonPort, ClockPort, DisplayPort, PowerPort};
use crate::feeding_log::CompactDateTime;

pub struct BoardAdapter<C, B, D, V, P> {
    pub clock: C,
    pub button: B,
    pub display: D,
    pub battery: V,
    pub power: P,
}

impl<C, B, D, V, P> BoardAdapter<C, B, D, V, P> {
    pub fn new(clock: C, button: B, display: D, battery: V, power: P) -> Self {
        Self {
            clock,
            button,
            display,
            battery,
            power,
        }
    }
}

// ── ClockPort ─────────────────────────────────────────────────

impl<C: ClockPort, B, D, V, P> ClockPort for BoardAdapter<C, B, D, V, P> {
    fn now_ms(&mut self) -> u32 {
        self.clock.now_ms()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.clock.delay_ms(ms);
    }
}

// ── ButtonPort ────────────────────────────────────────────────

impl<C, B: ButtonPort, D, V, P> ButtonPort for BoardAdapter<C, B, D, V, P> {
    fn is_pressed(&mut self) -> bool {
        self.button.is_pressed()
    }
}

// ── DisplayPort ───────────────────────────────────────────────

impl<C, B, D: DisplayPort, V, P> DisplayPort for BoardAdapter<C, B, D, V, P> {
    fn present(&mut self, feeding_count: u8, latest: CompactDateTime) {
        self.display.present(feeding_count, latest);
    }

    fn present_battery(&mut self, voltage: f32) {
        self.display.present_battery(voltage);
    }

    fn present_connecting(&mut self) {
        self.display.present_connecting();
    }

    fn present_connect_success(&mut self) {
        self.display.present_connect_success();
    }

    fn present_connect_failure(&mut self) {
        self.display.present_connect_failure();
    }

    fn dismiss(&mut self) {
        self.display.dismiss();
    }
}

// ── BatteryPort ───────────────────────────────────────────────

impl<C, B, D, V: BatteryPort, P> BatteryPort for BoardAdapter<C, B, D, V, P> {
    fn sample_battery_voltage(&mut self) -> f32 {
        self.battery.sample_battery_voltage()
    }
}

// ── PowerPort ─────────────────────────────────────────────────

impl<C, B, D, V, P: PowerPort> PowerPort for BoardAdapter<C, B, D, V, P> {
    fn peripherals_on(&mut self) {
        self.power.peripherals_on();
    }

    fn peripherals_off(&mut self) {
        self.power.peripherals_off();
    }

    fn enter_deep_sleep(&mut self) {
        self.power.enter_deep_sleep();
    }
}
