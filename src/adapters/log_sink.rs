//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing each wake-cycle event to the
//! ESP-IDF logger (UART / USB-CDC in production).

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Woke {
                now_ms,
                record_valid,
            } => {
                info!(
                    "BOOT | t={}ms record={}",
                    now_ms,
                    if *record_valid { "valid" } else { "fresh" }
                );
            }
            AppEvent::PressRegistered { pending } => {
                info!("GESTURE | press #{} registered", pending);
            }
            AppEvent::GestureResolved { gesture, command } => {
                info!(
                    "GESTURE | {} press(es) {:?} -> {:?}",
                    gesture.press_count(),
                    gesture,
                    command
                );
            }
            AppEvent::LogChanged { count, latest } => {
                info!("LOG | {} entries, latest {}", count, latest);
            }
            AppEvent::CommandFinished(outcome) => {
                info!(
                    "SYNC | {:?} connected={} time={} published={} battery={:?}",
                    outcome.command,
                    outcome.connected,
                    outcome.learned_time,
                    outcome.published,
                    outcome.battery_voltage
                );
            }
            AppEvent::Sleeping => {
                info!("SLEEP | entering deep sleep");
            }
        }
    }
}
