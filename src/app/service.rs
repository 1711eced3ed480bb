//! Wake-cycle controller, the hexagonal core.
//!
//! [`WakeCycleController`] runs exactly once per boot.  It owns the
//! integrity store and the gesture accumulator; all I/O flows through port
//! traits injected at the call site, so the whole cycle runs on the host
//! against mock adapters.
//!
//! ```text
//!  RetainedMemoryPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                         │   WakeCycleController     │
//!  Clock/Button/Battery ─▶│ Store · Gesture · Session │ ──▶ Display/Power
//!                         └──────────────────────────┘
//!                                      │
//!                              Network/Broker ports
//! ```

use log::{debug, info};

use crate::config::DeviceConfig;
use crate::feeding_log::FeedingLog;
use crate::gesture::{Gesture, GestureAccumulator};
use crate::persist::{IntegrityStore, PersistedState};
use crate::sync::{SyncOutcome, SyncSession};

use super::commands::FeedingCommand;
use super::events::AppEvent;
use super::ports::{
    BatteryPort, BrokerPort, ButtonPort, ClockPort, DisplayPort, EventSink, NetworkPort,
    PowerPort, RetainedMemoryPort,
};

/// Summary of one wake cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// The retained record passed its integrity check at wake.
    pub record_valid: bool,
    /// Press count persisted by this wake.
    pub pending_at_wake: u8,
    pub gesture: Gesture,
    pub command: FeedingCommand,
    pub outcome: SyncOutcome,
}

/// Result of [`WakeCycleController::register_press`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeRecord {
    pub now_ms: u32,
    /// Button still down when the cycle started.
    pub pressed: bool,
    pub record_valid: bool,
    /// Press count persisted by this wake.
    pub pending: u8,
}

pub struct WakeCycleController<M> {
    config: DeviceConfig,
    store: IntegrityStore<M>,
    gestures: GestureAccumulator,
}

impl<M: RetainedMemoryPort> WakeCycleController<M> {
    pub fn new(config: DeviceConfig, memory: M) -> Self {
        let gestures = GestureAccumulator::new(config.timing.coalescing_window_ms);
        Self {
            config,
            store: IntegrityStore::new(memory),
            gestures,
        }
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn store(&self) -> &IntegrityStore<M> {
        &self.store
    }

    pub fn into_memory(self) -> M {
        self.store.into_inner()
    }

    /// Run one full wake cycle, ending with a deep-sleep request.
    ///
    /// `hw` satisfies every board port at once so the cycle can hold a
    /// single mutable borrow for clock, button, display and power.
    pub fn run<H, L, S>(&mut self, hw: &mut H, link: &mut L, sink: &mut S) -> CycleReport
    where
        H: ClockPort + ButtonPort + DisplayPort + BatteryPort + PowerPort,
        L: NetworkPort + BrokerPort,
        S: EventSink,
    {
        let wake = self.register_press(hw, sink);
        self.complete(wake, hw, link, sink)
    }

    /// Count this wake's press and persist it.
    ///
    /// This is everything a boot does before its coalescing wait; a further
    /// press restarts the device after this point, so the save here is what
    /// the next boot observes.
    pub fn register_press<H, S>(&mut self, hw: &mut H, sink: &mut S) -> WakeRecord
    where
        H: ClockPort + ButtonPort,
        S: EventSink,
    {
        let now_ms = hw.now_ms();
        let pressed = hw.is_pressed();
        let (loaded, record_valid) = self.store.load();
        sink.emit(&AppEvent::Woke {
            now_ms,
            record_valid,
        });

        let registered = self.gestures.register_wake(loaded, record_valid, now_ms);
        self.store.save(&registered);
        sink.emit(&AppEvent::PressRegistered {
            pending: registered.pending_presses,
        });

        WakeRecord {
            now_ms,
            pressed,
            record_valid,
            pending: registered.pending_presses,
        }
    }

    /// Wait out the window, resolve the gesture, dispatch it and sleep.
    pub fn complete<H, L, S>(
        &mut self,
        wake: WakeRecord,
        hw: &mut H,
        link: &mut L,
        sink: &mut S,
    ) -> CycleReport
    where
        H: ClockPort + ButtonPort + DisplayPort + BatteryPort + PowerPort,
        L: NetworkPort + BrokerPort,
        S: EventSink,
    {
        let WakeRecord {
            pressed,
            record_valid,
            pending: pending_at_wake,
            ..
        } = wake;

        // Stay awake so a further press can reboot into the same gesture.
        let held = self.coalesce(hw, pressed && pending_at_wake == 1);

        // Whatever count is stored now is the gesture.
        let (current, _) = self.store.load();
        let (count, resolved) = self.gestures.resolve(current);
        self.store.save(&resolved);

        let gesture = Gesture::from_count(count, held && count == 1);
        let command = FeedingCommand::from(gesture);
        info!("cycle: {} press(es) -> {:?}", count, command);
        sink.emit(&AppEvent::GestureResolved { gesture, command });

        hw.peripherals_on();
        let mut log = resolved.feeding_log;
        let outcome = {
            let store = &mut self.store;
            let mut commit = |log: &FeedingLog| {
                store.save(&PersistedState {
                    feeding_log: *log,
                    ..resolved
                });
            };
            SyncSession::new(&self.config).run(command, &mut log, link, hw, &mut commit)
        };

        if outcome.log_changed {
            sink.emit(&AppEvent::LogChanged {
                count: log.len(),
                latest: log.latest(),
            });
        }
        sink.emit(&AppEvent::CommandFinished(outcome.clone()));

        hw.dismiss();
        hw.peripherals_off();
        sink.emit(&AppEvent::Sleeping);
        hw.enter_deep_sleep();

        CycleReport {
            record_valid,
            pending_at_wake,
            gesture,
            command,
            outcome,
        }
    }

    /// Idle for the coalescing window plus slack.
    ///
    /// When `track_hold` is set the button is sampled on every poll; the
    /// wait stretches to `long_press_ms` while it stays down.  Returns
    /// `true` if it was held that long.
    fn coalesce<H: ClockPort + ButtonPort>(&self, hw: &mut H, track_hold: bool) -> bool {
        let t = &self.config.timing;
        let base = self.config.coalescing_wait_ms();
        let start = hw.now_ms();
        let mut holding = track_hold;
        let mut held_long = false;

        loop {
            let elapsed = hw.now_ms().wrapping_sub(start);
            if holding {
                if !hw.is_pressed() {
                    debug!("cycle: released after {} ms", elapsed);
                    holding = false;
                } else if elapsed >= t.long_press_ms {
                    debug!("cycle: long press");
                    held_long = true;
                    holding = false;
                }
            }

            let deadline = if holding {
                base.max(t.long_press_ms)
            } else {
                base
            };
            if elapsed >= deadline {
                return held_long;
            }
            hw.delay_ms(t.poll_interval_ms.min(deadline - elapsed));
        }
    }
}
