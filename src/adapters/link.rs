//! Radio + broker bundle.
//!
//! [`SyncSession`](crate::sync::SyncSession) takes one `&mut` that satisfies
//! both [`NetworkPort`] and [`BrokerPort`]; this pairs the two adapters
//! behind a single borrow.

use crate::app::ports::{BrokerPort, InboundMessage, NetworkPort};
use crate::config::{BrokerConfig, NetworkConfig};
use crate::error::CommsError;

use super::mqtt::MqttAdapter;
use super::wifi::WifiAdapter;

pub struct NetworkLink {
    pub wifi: WifiAdapter,
    pub mqtt: MqttAdapter,
}

impl NetworkLink {
    pub fn new(wifi: WifiAdapter, mqtt: MqttAdapter) -> Self {
        Self { wifi, mqtt }
    }
}

impl NetworkPort for NetworkLink {
    fn begin(&mut self, config: &NetworkConfig) -> Result<(), CommsError> {
        self.wifi.begin(config)
    }

    fn is_up(&mut self) -> bool {
        self.wifi.is_up()
    }

    fn poll_network(&mut self) {
        self.wifi.poll_network();
    }

    fn shutdown(&mut self) {
        self.wifi.shutdown();
    }
}

impl BrokerPort for NetworkLink {
    fn open(&mut self, config: &BrokerConfig) -> Result<(), CommsError> {
        self.mqtt.open(config)
    }

    fn is_open(&mut self) -> bool {
        self.mqtt.is_open()
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), CommsError> {
        self.mqtt.subscribe(topic)
    }

    fn poll_broker(&mut self) {
        self.mqtt.poll_broker();
    }

    fn take_message(&mut self) -> Option<InboundMessage> {
        self.mqtt.take_message()
    }

    fn publish_retained(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
        self.mqtt.publish_retained(topic, payload)
    }

    fn close(&mut self) {
        self.mqtt.close();
    }
}
