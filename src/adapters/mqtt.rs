//! MQTT broker adapter.
//!
//! Implements [`BrokerPort`].  Inbound messages are queued by the client's
//! event callback and handed to the core one at a time through
//! [`BrokerPort::take_message`]; the queue is small because the core only
//! ever waits for a single retained time message.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `EspMqttClient` with a callback that
//!   tracks the session flag and fills the inbox.
//! - **all other targets**: an in-process broker that honours retained
//!   messages, for host-side tests.

use heapless::{Deque, String, Vec};
use log::{debug, info, warn};

use crate::app::ports::{BrokerPort, InboundMessage};
use crate::config::BrokerConfig;
use crate::error::CommsError;

#[cfg(target_os = "espidf")]
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

#[cfg(target_os = "espidf")]
use esp_idf_svc::mqtt::client::{
    Details, EspMqttClient, EventPayload, MqttClientConfiguration, QoS,
};

/// Inbound messages buffered between polls.
pub const INBOX_DEPTH: usize = 4;

type Inbox = Deque<InboundMessage, INBOX_DEPTH>;

/// Copy a delivery into an [`InboundMessage`]; `None` when either part
/// exceeds the fixed capacities.
pub fn inbound(topic: &str, data: &[u8]) -> Option<InboundMessage> {
    Some(InboundMessage {
        topic: String::try_from(topic).ok()?,
        payload: Vec::from_slice(data).ok()?,
    })
}

fn enqueue(inbox: &mut Inbox, topic: &str, data: &[u8]) {
    match inbound(topic, data) {
        Some(msg) => {
            if inbox.push_back(msg).is_err() {
                warn!("MQTT: inbox full, dropping message on '{}'", topic);
            }
        }
        None => warn!(
            "MQTT: dropping oversized message on '{}' ({} bytes)",
            topic,
            data.len()
        ),
    }
}

#[cfg(target_os = "espidf")]
#[derive(Default)]
struct Shared {
    connected: AtomicBool,
    inbox: Mutex<Inbox>,
}

pub struct MqttAdapter {
    #[cfg(target_os = "espidf")]
    client: Option<EspMqttClient<'static>>,
    #[cfg(target_os = "espidf")]
    shared: Arc<Shared>,

    #[cfg(not(target_os = "espidf"))]
    sim: SimBroker,
}

impl MqttAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new() -> Self {
        Self {
            client: None,
            shared: Arc::new(Shared::default()),
        }
    }

    /// Simulated broker; `reachable == false` never completes a handshake.
    #[cfg(not(target_os = "espidf"))]
    pub fn new(reachable: bool) -> Self {
        Self {
            sim: SimBroker {
                reachable,
                ..SimBroker::default()
            },
        }
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF client
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
impl Default for MqttAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "espidf")]
impl BrokerPort for MqttAdapter {
    fn open(&mut self, config: &BrokerConfig) -> Result<(), CommsError> {
        self.close();
        let url = format!("mqtt://{}:{}", config.host, config.port);
        let conf = MqttClientConfiguration {
            client_id: Some(config.client_name.as_str()),
            username: config.username.as_ref().map(|u| u.as_str()),
            password: config.password.as_ref().map(|p| p.as_str()),
            ..Default::default()
        };

        let shared = Arc::clone(&self.shared);
        let client = EspMqttClient::new_cb(&url, &conf, move |event| match event.payload() {
            EventPayload::Connected(_) => {
                shared.connected.store(true, Ordering::Release);
            }
            EventPayload::Disconnected => {
                shared.connected.store(false, Ordering::Release);
            }
            EventPayload::Received {
                topic: Some(topic),
                data,
                details: Details::Complete,
                ..
            } => {
                if let Ok(mut inbox) = shared.inbox.lock() {
                    enqueue(&mut inbox, topic, data);
                }
            }
            _ => {}
        })
        .map_err(|e| {
            warn!("MQTT: client start failed ({})", e);
            CommsError::BrokerFailed
        })?;

        info!("MQTT: connecting to {}", url);
        self.client = Some(client);
        Ok(())
    }

    fn is_open(&mut self) -> bool {
        self.client.is_some() && self.shared.connected.load(Ordering::Acquire)
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), CommsError> {
        let client = self.client.as_mut().ok_or(CommsError::SubscribeFailed)?;
        client.subscribe(topic, QoS::AtMostOnce).map_err(|e| {
            warn!("MQTT: subscribe '{}' failed ({})", topic, e);
            CommsError::SubscribeFailed
        })?;
        debug!("MQTT: subscribed to '{}'", topic);
        Ok(())
    }

    fn poll_broker(&mut self) {}

    fn take_message(&mut self) -> Option<InboundMessage> {
        self.shared.inbox.lock().ok()?.pop_front()
    }

    fn publish_retained(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
        let client = self.client.as_mut().ok_or(CommsError::PublishFailed)?;
        client
            .publish(topic, QoS::AtMostOnce, true, payload)
            .map_err(|e| {
                warn!("MQTT: publish '{}' failed ({})", topic, e);
                CommsError::PublishFailed
            })?;
        Ok(())
    }

    fn close(&mut self) {
        if self.client.take().is_some() {
            info!("MQTT: session closed");
        }
        self.shared.connected.store(false, Ordering::Release);
        if let Ok(mut inbox) = self.shared.inbox.lock() {
            inbox.clear();
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Simulated broker
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
#[derive(Default)]
struct SimBroker {
    reachable: bool,
    open: bool,
    retained: std::vec::Vec<InboundMessage>,
    subscriptions: std::vec::Vec<String<64>>,
    inbox: Inbox,
    /// Retained messages matched by a new subscription, delivered on the
    /// next poll.
    pending: std::vec::Vec<InboundMessage>,
}

#[cfg(not(target_os = "espidf"))]
impl MqttAdapter {
    /// Store a retained message as another client would.
    pub fn sim_retain(&mut self, topic: &str, payload: &[u8]) {
        let Some(msg) = inbound(topic, payload) else {
            return;
        };
        self.sim.retained.retain(|m| m.topic != msg.topic);
        self.sim.retained.push(msg);
    }

    /// Current retained message on `topic`, if any.
    pub fn sim_retained(&self, topic: &str) -> Option<&[u8]> {
        self.sim
            .retained
            .iter()
            .find(|m| m.topic.as_str() == topic)
            .map(|m| m.payload.as_slice())
    }
}

#[cfg(not(target_os = "espidf"))]
impl BrokerPort for MqttAdapter {
    fn open(&mut self, config: &BrokerConfig) -> Result<(), CommsError> {
        info!("MQTT(sim): connecting to {}:{}", config.host, config.port);
        self.sim.open = self.sim.reachable;
        Ok(())
    }

    fn is_open(&mut self) -> bool {
        self.sim.open
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), CommsError> {
        if !self.sim.open {
            return Err(CommsError::SubscribeFailed);
        }
        let name = String::try_from(topic).map_err(|_| CommsError::SubscribeFailed)?;
        self.sim.pending.extend(
            self.sim
                .retained
                .iter()
                .filter(|m| m.topic == name)
                .cloned(),
        );
        self.sim.subscriptions.push(name);
        debug!("MQTT(sim): subscribed to '{}'", topic);
        Ok(())
    }

    fn poll_broker(&mut self) {
        for msg in self.sim.pending.drain(..) {
            enqueue(&mut self.sim.inbox, msg.topic.as_str(), &msg.payload);
        }
    }

    fn take_message(&mut self) -> Option<InboundMessage> {
        self.sim.inbox.pop_front()
    }

    fn publish_retained(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
        if !self.sim.open {
            return Err(CommsError::PublishFailed);
        }
        let msg = inbound(topic, payload).ok_or(CommsError::PublishFailed)?;
        if self.sim.subscriptions.iter().any(|s| *s == msg.topic) {
            enqueue(&mut self.sim.inbox, topic, payload);
        }
        self.sim.retained.retain(|m| m.topic != msg.topic);
        self.sim.retained.push(msg);
        Ok(())
    }

    fn close(&mut self) {
        self.sim.open = false;
        self.sim.subscriptions.clear();
        self.sim.pending.clear();
        self.sim.inbox.clear();
    }
}
