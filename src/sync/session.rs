//! One command's worth of log mutation, time sync and status publishing.
//!
//! A session never fails: a radio that does not come up, a broker that does
//! not answer or a time topic that stays silent each degrade the session
//! (no publish, unknown timestamp) and it runs to completion.  Whenever the
//! radio was started it is torn down again before [`SyncSession::run`]
//! returns, whatever happened in between.

use log::{debug, info, warn};

use crate::app::commands::FeedingCommand;
use crate::app::ports::{BatteryPort, BrokerPort, ClockPort, DisplayPort, NetworkPort};
use crate::config::DeviceConfig;
use crate::error::CommsError;
use crate::feeding_log::{CompactDateTime, FeedingLog};

use super::payload::{StatusPayload, parse_time_payload};
use super::state::{SyncState, SyncTrace};

/// What a session did.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOutcome {
    pub command: FeedingCommand,
    /// The log was mutated (and committed).
    pub log_changed: bool,
    /// An add-feeding cleared the log first.
    pub cleared_before_add: Option<ClearReason>,
    /// Broker session reached `Connected`.
    pub connected: bool,
    /// Time learned from the time topic, or `UNKNOWN`.
    pub learned_time: CompactDateTime,
    /// A status message was handed to the broker.
    pub published: bool,
    pub battery_voltage: Option<f32>,
    pub trace: SyncTrace,
}

impl SyncOutcome {
    fn new(command: FeedingCommand) -> Self {
        Self {
            command,
            log_changed: false,
            cleared_before_add: None,
            connected: false,
            learned_time: CompactDateTime::UNKNOWN,
            published: false,
            battery_voltage: None,
            trace: SyncTrace::new(),
        }
    }
}

/// Why an add-feeding emptied the log before inserting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearReason {
    /// The learned date differs from the latest entry's date.
    DayRollover,
    /// The log was full and `auto_clear_when_full` is set.
    Full,
}

/// Result of [`record_feeding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedingAdd {
    pub inserted: bool,
    pub cleared: Option<ClearReason>,
}

/// Apply the add-feeding rule to `log`.
///
/// The log is cleared first when it is non-empty, both its latest entry and
/// `learned` are known, and their dates differ.  Otherwise a full log is
/// cleared only when `auto_clear_when_full` is set.  Then `learned` (which
/// may be `UNKNOWN`) goes to the front; a full log rejects it.
pub fn record_feeding(
    log: &mut FeedingLog,
    learned: CompactDateTime,
    auto_clear_when_full: bool,
) -> FeedingAdd {
    let latest = log.latest();
    let cleared = if !log.is_empty()
        && latest.is_known()
        && learned.is_known()
        && learned.date() != latest.date()
    {
        Some(ClearReason::DayRollover)
    } else if log.is_full() && auto_clear_when_full {
        Some(ClearReason::Full)
    } else {
        None
    };
    if cleared.is_some() {
        log.clear();
    }
    FeedingAdd {
        inserted: log.insert_front(learned),
        cleared,
    }
}

/// Poll `ready` until it returns `true` or `timeout_ms` elapses on `clock`.
/// Yields `poll_ms` between attempts.
pub fn wait_until<C: ClockPort>(
    clock: &mut C,
    timeout_ms: u32,
    poll_ms: u32,
    mut ready: impl FnMut() -> bool,
) -> bool {
    let start = clock.now_ms();
    loop {
        if ready() {
            return true;
        }
        if clock.now_ms().wrapping_sub(start) >= timeout_ms {
            return false;
        }
        clock.delay_ms(poll_ms);
    }
}

pub struct SyncSession<'a> {
    config: &'a DeviceConfig,
    trace: SyncTrace,
}

impl<'a> SyncSession<'a> {
    pub fn new(config: &'a DeviceConfig) -> Self {
        Self {
            config,
            trace: SyncTrace::new(),
        }
    }

    /// Execute `command`.
    ///
    /// `commit` is called with the log after every mutation so the caller
    /// can persist it before anything else happens.
    pub fn run<L, H, F>(
        mut self,
        command: FeedingCommand,
        log: &mut FeedingLog,
        link: &mut L,
        hw: &mut H,
        commit: &mut F,
    ) -> SyncOutcome
    where
        L: NetworkPort + BrokerPort,
        H: ClockPort + DisplayPort + BatteryPort,
        F: FnMut(&FeedingLog),
    {
        let mut out = SyncOutcome::new(command);

        match command {
            FeedingCommand::AddFeeding => self.add_feeding(&mut out, log, link, hw, commit),
            FeedingCommand::RemoveFeeding => {
                if log.is_empty() {
                    debug!("sync: remove on empty log, nothing to do");
                } else {
                    self.enter(SyncState::MutatingLog);
                    log.remove_front();
                    self.committed(&mut out, log, hw, commit);
                    self.report(&mut out, log, link, hw);
                }
            }
            FeedingCommand::ClearFeedings => {
                if log.is_empty() {
                    debug!("sync: clear on empty log, nothing to do");
                } else {
                    self.enter(SyncState::MutatingLog);
                    log.clear();
                    self.committed(&mut out, log, hw, commit);
                    self.report(&mut out, log, link, hw);
                }
            }
            FeedingCommand::QueryBattery => {
                let voltage = hw.sample_battery_voltage();
                info!("sync: battery {:.2} V", voltage);
                hw.present_battery(voltage);
                out.battery_voltage = Some(voltage);
            }
            FeedingCommand::ShowStatus => {
                hw.present(log.len(), log.latest());
            }
        }

        out.trace = self.trace;
        out
    }

    // ── Commands ──────────────────────────────────────────────

    fn add_feeding<L, H, F>(
        &mut self,
        out: &mut SyncOutcome,
        log: &mut FeedingLog,
        link: &mut L,
        hw: &mut H,
        commit: &mut F,
    ) where
        L: NetworkPort + BrokerPort,
        H: ClockPort + DisplayPort + BatteryPort,
        F: FnMut(&FeedingLog),
    {
        // Sample before the radio draws current.
        let voltage = hw.sample_battery_voltage();
        out.battery_voltage = Some(voltage);

        out.connected = self.connect(link, hw);
        if out.connected {
            out.learned_time = self.await_time(link, hw);
        }

        self.enter(SyncState::MutatingLog);
        let added = record_feeding(log, out.learned_time, self.config.auto_clear_when_full);
        out.cleared_before_add = added.cleared;
        if let Some(reason) = added.cleared {
            info!("sync: log cleared before add ({:?})", reason);
        }
        if added.inserted || added.cleared.is_some() {
            self.committed(out, log, hw, commit);
        } else {
            warn!("sync: log full, feeding not recorded");
            hw.present(log.len(), log.latest());
        }

        self.publish(out, log, link, voltage);
        self.disconnect(link);
    }

    /// Connect, publish the current log, disconnect.
    fn report<L, H>(&mut self, out: &mut SyncOutcome, log: &FeedingLog, link: &mut L, hw: &mut H)
    where
        L: NetworkPort + BrokerPort,
        H: ClockPort + DisplayPort + BatteryPort,
    {
        let voltage = hw.sample_battery_voltage();
        out.battery_voltage = Some(voltage);
        out.connected = self.connect(link, hw);
        self.publish(out, log, link, voltage);
        self.disconnect(link);
    }

    // ── Phases ────────────────────────────────────────────────

    fn committed<H, F>(&mut self, out: &mut SyncOutcome, log: &FeedingLog, hw: &mut H, commit: &mut F)
    where
        H: DisplayPort,
        F: FnMut(&FeedingLog),
    {
        commit(log);
        out.log_changed = true;
        info!("sync: log now {} entries, latest {}", log.len(), log.latest());
        hw.present(log.len(), log.latest());
    }

    fn connect<L, H>(&mut self, link: &mut L, hw: &mut H) -> bool
    where
        L: NetworkPort + BrokerPort,
        H: ClockPort + DisplayPort,
    {
        self.enter(SyncState::Connecting);
        hw.present_connecting();
        match self.try_connect(link, hw) {
            Ok(()) => {
                self.enter(SyncState::Connected);
                hw.present_connect_success();
                true
            }
            Err(e) => {
                warn!("sync: connect failed ({})", e);
                self.enter(SyncState::Failed);
                hw.present_connect_failure();
                false
            }
        }
    }

    fn try_connect<L, C>(&self, link: &mut L, clock: &mut C) -> Result<(), CommsError>
    where
        L: NetworkPort + BrokerPort,
        C: ClockPort,
    {
        let config = self.config;
        let t = &config.timing;

        link.begin(&config.network)?;
        let up = wait_until(clock, t.wifi_timeout_ms, t.poll_interval_ms, || {
            link.poll_network();
            link.is_up()
        });
        if !up {
            return Err(CommsError::WifiTimeout);
        }

        link.open(&config.broker)?;
        let open = wait_until(clock, t.broker_timeout_ms, t.poll_interval_ms, || {
            link.poll_broker();
            link.is_open()
        });
        if !open {
            return Err(CommsError::BrokerTimeout);
        }
        Ok(())
    }

    fn await_time<L, C>(&mut self, link: &mut L, clock: &mut C) -> CompactDateTime
    where
        L: BrokerPort,
        C: ClockPort,
    {
        let config = self.config;
        let topic = config.topics.time_request.as_str();
        self.enter(SyncState::AwaitingTime);

        if let Err(e) = link.subscribe(topic) {
            warn!("sync: subscribe to '{}' failed ({})", topic, e);
            self.enter(SyncState::TimeTimeout);
            return CompactDateTime::UNKNOWN;
        }

        let mut learned = CompactDateTime::UNKNOWN;
        let received = wait_until(
            clock,
            config.timing.sync_timeout_ms,
            config.timing.poll_interval_ms,
            || {
                link.poll_broker();
                while let Some(msg) = link.take_message() {
                    if msg.topic.as_str() == topic {
                        learned = parse_time_payload(&msg.payload);
                        return true;
                    }
                }
                false
            },
        );

        if learned.is_known() {
            info!("sync: time is {}", learned);
            self.enter(SyncState::TimeKnown);
        } else {
            if received {
                warn!("sync: time payload had no usable digits");
            } else {
                warn!("sync: no time within {} ms", config.timing.sync_timeout_ms);
            }
            self.enter(SyncState::TimeTimeout);
        }
        learned
    }

    fn publish<L: BrokerPort>(
        &mut self,
        out: &mut SyncOutcome,
        log: &FeedingLog,
        link: &mut L,
        voltage: f32,
    ) {
        self.enter(SyncState::Publishing);
        if !out.connected {
            debug!("sync: offline, publish skipped");
            return;
        }
        let payload = StatusPayload {
            count: log.len(),
            latest: log.latest(),
            battery_voltage: voltage,
        }
        .render();
        let topic = self.config.topics.status.as_str();
        match link.publish_retained(topic, payload.as_bytes()) {
            Ok(()) => {
                info!("sync: published {} -> '{}'", payload, topic);
                out.published = true;
            }
            Err(e) => warn!("sync: publish failed ({})", e),
        }
    }

    fn disconnect<L: NetworkPort + BrokerPort>(&mut self, link: &mut L) {
        link.close();
        link.shutdown();
        self.enter(SyncState::Disconnected);
    }

    fn enter(&mut self, next: SyncState) {
        debug!("sync: {} -> {}", self.trace.current().name(), next.name());
        self.trace.push(next);
    }
}
