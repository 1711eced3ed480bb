//! Mock adapters for integration tests.
//!
//! Every port call is recorded so tests can assert on the full history of a
//! wake cycle without real GPIO, radio or RTC memory.  Time only moves when
//! the core calls `delay_ms`, or when a test sets it between boots.

use std::collections::VecDeque;

use feedlog::app::events::AppEvent;
use feedlog::app::ports::{
    BatteryPort, BrokerPort, ButtonPort, ClockPort, DisplayPort, EventSink, InboundMessage,
    NetworkPort, PowerPort,
};
use feedlog::config::{BrokerConfig, NetworkConfig};
use feedlog::error::CommsError;
use feedlog::feeding_log::CompactDateTime;

// ── Display / power call record ───────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum BoardCall {
    Present { count: u8, latest: CompactDateTime },
    PresentBattery(f32),
    Connecting,
    ConnectSuccess,
    ConnectFailure,
    Dismiss,
    PeripheralsOn,
    PeripheralsOff,
    DeepSleep,
}

// ── MockBoard ─────────────────────────────────────────────────

pub struct MockBoard {
    pub now: u32,
    /// The button reads pressed while `now` is below this.
    pub release_at_ms: u32,
    pub voltage: f32,
    pub calls: Vec<BoardCall>,
}

#[allow(dead_code)]
impl MockBoard {
    /// A board woken at `now` by a short tap.
    pub fn woken_at(now: u32) -> Self {
        Self {
            now,
            release_at_ms: now.saturating_add(30),
            voltage: 3.87,
            calls: Vec::new(),
        }
    }

    /// A board woken at `now` whose button stays down for `hold_ms`.
    pub fn held_at(now: u32, hold_ms: u32) -> Self {
        Self {
            release_at_ms: now.saturating_add(hold_ms),
            ..Self::woken_at(now)
        }
    }

    pub fn last_present(&self) -> Option<(u8, CompactDateTime)> {
        self.calls.iter().rev().find_map(|c| match c {
            BoardCall::Present { count, latest } => Some((*count, *latest)),
            _ => None,
        })
    }

    pub fn count(&self, call: &BoardCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }
}

impl ClockPort for MockBoard {
    fn now_ms(&mut self) -> u32 {
        self.now
    }

    fn delay_ms(&mut self, ms: u32) {
        self.now = self.now.wrapping_add(ms);
    }
}

impl ButtonPort for MockBoard {
    fn is_pressed(&mut self) -> bool {
        self.now < self.release_at_ms
    }
}

impl DisplayPort for MockBoard {
    fn present(&mut self, count: u8, latest: CompactDateTime) {
        self.calls.push(BoardCall::Present { count, latest });
    }

    fn present_battery(&mut self, voltage: f32) {
        self.calls.push(BoardCall::PresentBattery(voltage));
    }

    fn present_connecting(&mut self) {
        self.calls.push(BoardCall::Connecting);
    }

    fn present_connect_success(&mut self) {
        self.calls.push(BoardCall::ConnectSuccess);
    }

    fn present_connect_failure(&mut self) {
        self.calls.push(BoardCall::ConnectFailure);
    }

    fn dismiss(&mut self) {
        self.calls.push(BoardCall::Dismiss);
    }
}

impl BatteryPort for MockBoard {
    fn sample_battery_voltage(&mut self) -> f32 {
        self.voltage
    }
}

impl PowerPort for MockBoard {
    fn peripherals_on(&mut self) {
        self.calls.push(BoardCall::PeripheralsOn);
    }

    fn peripherals_off(&mut self) {
        self.calls.push(BoardCall::PeripheralsOff);
    }

    fn enter_deep_sleep(&mut self) {
        self.calls.push(BoardCall::DeepSleep);
    }
}

// ── MockLink ──────────────────────────────────────────────────

/// Scriptable network + broker pair.
pub struct MockLink {
    /// Polls before the network reports up; `None` never comes up.
    pub wifi_polls_to_up: Option<u32>,
    /// Broker accepts the session.
    pub broker_reachable: bool,
    pub subscribe_fails: bool,
    pub publish_fails: bool,
    /// Retained message delivered on the subscribed topic right after
    /// subscribing.
    pub retained_time: Option<Vec<u8>>,

    pub began: u32,
    pub opened: u32,
    pub closed: u32,
    pub shut_down: u32,
    pub subscriptions: Vec<String>,
    pub published: Vec<(String, String)>,

    wifi_polls: u32,
    broker_open: bool,
    inbox: VecDeque<InboundMessage>,
}

#[allow(dead_code)]
impl MockLink {
    /// Everything works; the time topic holds `time`.
    pub fn online(time: &str) -> Self {
        Self {
            wifi_polls_to_up: Some(2),
            broker_reachable: true,
            retained_time: Some(time.as_bytes().to_vec()),
            ..Self::offline()
        }
    }

    /// The network never associates.
    pub fn offline() -> Self {
        Self {
            wifi_polls_to_up: None,
            broker_reachable: false,
            subscribe_fails: false,
            publish_fails: false,
            retained_time: None,
            began: 0,
            opened: 0,
            closed: 0,
            shut_down: 0,
            subscriptions: Vec::new(),
            published: Vec::new(),
            wifi_polls: 0,
            broker_open: false,
            inbox: VecDeque::new(),
        }
    }

    /// Network and broker up, nothing retained on the time topic.
    pub fn silent() -> Self {
        Self {
            retained_time: None,
            ..Self::online("")
        }
    }

    pub fn last_status(&self) -> Option<&str> {
        self.published.last().map(|(_, p)| p.as_str())
    }
}

impl NetworkPort for MockLink {
    fn begin(&mut self, _config: &NetworkConfig) -> Result<(), CommsError> {
        self.began += 1;
        self.wifi_polls = 0;
        Ok(())
    }

    fn is_up(&mut self) -> bool {
        matches!(self.wifi_polls_to_up, Some(n) if self.wifi_polls >= n)
    }

    fn poll_network(&mut self) {
        self.wifi_polls += 1;
    }

    fn shutdown(&mut self) {
        self.shut_down += 1;
        self.wifi_polls = 0;
    }
}

impl BrokerPort for MockLink {
    fn open(&mut self, _config: &BrokerConfig) -> Result<(), CommsError> {
        self.opened += 1;
        self.broker_open = self.broker_reachable;
        Ok(())
    }

    fn is_open(&mut self) -> bool {
        self.broker_open
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), CommsError> {
        if self.subscribe_fails || !self.broker_open {
            return Err(CommsError::SubscribeFailed);
        }
        self.subscriptions.push(topic.to_string());
        if let Some(payload) = &self.retained_time {
            let mut msg = InboundMessage {
                topic: heapless::String::new(),
                payload: heapless::Vec::new(),
            };
            let _ = msg.topic.push_str(topic);
            let _ = msg.payload.extend_from_slice(payload);
            self.inbox.push_back(msg);
        }
        Ok(())
    }

    fn poll_broker(&mut self) {}

    fn take_message(&mut self) -> Option<InboundMessage> {
        self.inbox.pop_front()
    }

    fn publish_retained(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
        if self.publish_fails || !self.broker_open {
            return Err(CommsError::PublishFailed);
        }
        self.published.push((
            topic.to_string(),
            String::from_utf8_lossy(payload).into_owned(),
        ));
        Ok(())
    }

    fn close(&mut self) {
        self.closed += 1;
        self.broker_open = false;
        self.inbox.clear();
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Variant names in emission order.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events
            .iter()
            .map(|e| match e {
                AppEvent::Woke { .. } => "Woke",
                AppEvent::PressRegistered { .. } => "PressRegistered",
                AppEvent::GestureResolved { .. } => "GestureResolved",
                AppEvent::LogChanged { .. } => "LogChanged",
                AppEvent::CommandFinished(_) => "CommandFinished",
                AppEvent::Sleeping => "Sleeping",
            })
            .collect()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
