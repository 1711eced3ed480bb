//! Console display adapter.
//!
//! Implements [`DisplayPort`] by writing each screen to the logger.  Panel
//! rendering is board-specific and lives outside this crate; this adapter
//! keeps the last screen so tests and the host build can inspect it.

use log::info;

use crate::app::ports::DisplayPort;
use crate::feeding_log::CompactDateTime;

/// Last thing put on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Screen {
    Blank,
    Log { count: u8, latest: CompactDateTime },
    Battery(f32),
    Connecting,
    Connected,
    ConnectFailed,
    Dismissed,
}

pub struct LogDisplay {
    screen: Screen,
}

impl Default for LogDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl LogDisplay {
    pub fn new() -> Self {
        Self {
            screen: Screen::Blank,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }
}

impl DisplayPort for LogDisplay {
    fn present(&mut self, feeding_count: u8, latest: CompactDateTime) {
        if latest.is_known() {
            info!(
                "DISPLAY | {} feeding(s), last {:06} {:04}",
                feeding_count,
                latest.date(),
                latest.time()
            );
        } else {
            info!("DISPLAY | {} feeding(s), last unknown", feeding_count);
        }
        self.screen = Screen::Log {
            count: feeding_count,
            latest,
        };
    }

    fn present_battery(&mut self, voltage: f32) {
        info!("DISPLAY | battery {:.2} V", voltage);
        self.screen = Screen::Battery(voltage);
    }

    fn present_connecting(&mut self) {
        info!("DISPLAY | connecting");
        self.screen = Screen::Connecting;
    }

    fn present_connect_success(&mut self) {
        info!("DISPLAY | connected");
        self.screen = Screen::Connected;
    }

    fn present_connect_failure(&mut self) {
        info!("DISPLAY | offline");
        self.screen = Screen::ConnectFailed;
    }

    fn dismiss(&mut self) {
        self.screen = Screen::Dismissed;
    }
}
