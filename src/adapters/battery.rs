//! Battery voltage adapter.
//!
//! The cell is measured through a resistive divider that is only connected
//! while the sense-enable pin is high, so it draws nothing during deep
//! sleep.  A reading is the mean of several 12-bit ADC samples:
//!
//! ```text
//! volts = mean_raw / 4095 × reference_voltage × divider_ratio + calibration_offset
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{debug, warn};

use crate::app::ports::BatteryPort;
use crate::config::BatteryConfig;

/// Full-scale reading of the 12-bit ADC.
pub const ADC_FULL_SCALE: f32 = 4095.0;

/// Convert a mean raw reading to volts.
pub fn raw_to_voltage(mean_raw: f32, cfg: &BatteryConfig) -> f32 {
    mean_raw / ADC_FULL_SCALE * cfg.reference_voltage * cfg.divider_ratio
        + cfg.calibration_offset
}

pub struct BatteryMonitor<S, D, A> {
    sense_enable: S,
    delay: D,
    read_raw: A,
    config: BatteryConfig,
}

impl<S, D, A> BatteryMonitor<S, D, A>
where
    S: OutputPin,
    D: DelayNs,
    A: FnMut() -> u16,
{
    /// `read_raw` takes one sample from the divider's ADC channel.
    pub fn new(sense_enable: S, delay: D, read_raw: A, config: BatteryConfig) -> Self {
        Self {
            sense_enable,
            delay,
            read_raw,
            config,
        }
    }
}

impl<S, D, A> BatteryPort for BatteryMonitor<S, D, A>
where
    S: OutputPin,
    D: DelayNs,
    A: FnMut() -> u16,
{
    fn sample_battery_voltage(&mut self) -> f32 {
        if self.sense_enable.set_high().is_err() {
            warn!("battery: sense enable failed");
        }
        self.delay.delay_ms(self.config.settle_ms);

        let n = self.config.sample_count.max(1);
        let sum: u32 = (0..n).map(|_| u32::from((self.read_raw)())).sum();

        if self.sense_enable.set_low().is_err() {
            warn!("battery: sense disable failed");
        }

        let mean = sum as f32 / f32::from(n);
        let volts = raw_to_voltage(mean, &self.config);
        debug!("battery: mean raw {:.1} over {} -> {:.3} V", mean, n, volts);
        volts
    }
}
