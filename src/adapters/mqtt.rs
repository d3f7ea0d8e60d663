//! MQTT broker-session adapter.
//!
//! Implements [`BrokerPort`] over the ESP-IDF MQTT client. The session flag
//! is the one piece of state in the system with two writers: the client's
//! background task flips it from the connection-status callback, and
//! `connect()` clears it before issuing a fresh session request. It is a
//! word-level [`AtomicBool`]; the supervisor reads it fresh at every tick
//! start, so a late status event from a previous session costs at most one
//! retry tick.
//!
//! Publish completion is likewise delivered on the callback and only
//! logged — the tick never waits on broker latency.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use log::{info, warn};

use crate::app::ports::BrokerPort;
use crate::config::NodeConfig;
use crate::error::BrokerError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::mqtt::client::{
    EspMqttClient, EventPayload, LwtConfiguration, MqttClientConfiguration, QoS,
};

pub struct MqttAdapter {
    broker_url: String,
    topic: &'static str,
    client_id: &'static str,
    keep_alive_secs: u16,
    will_message: &'static str,
    username: Option<&'static str>,
    password: Option<&'static str>,
    /// Written by the status callback, cleared by `connect`, read by the
    /// supervisor. Never cached across ticks.
    session_up: Arc<AtomicBool>,
    #[cfg(target_os = "espidf")]
    client: Option<EspMqttClient<'static>>,
    #[cfg(not(target_os = "espidf"))]
    sim_published: Vec<Vec<u8>>,
}

impl MqttAdapter {
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            broker_url: format!("mqtt://{}:{}", config.broker_host, config.broker_port),
            topic: config.topic,
            client_id: config.client_id,
            keep_alive_secs: config.keep_alive_secs,
            will_message: config.will_message,
            username: config.broker_username,
            password: config.broker_password,
            session_up: Arc::new(AtomicBool::new(false)),
            #[cfg(target_os = "espidf")]
            client: None,
            #[cfg(not(target_os = "espidf"))]
            sim_published: Vec::new(),
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), BrokerError> {
        // Tear down any previous session before reconnecting; its status
        // callback is dropped with it.
        self.client = None;

        let conf = MqttClientConfiguration {
            client_id: Some(self.client_id),
            keep_alive_interval: Some(core::time::Duration::from_secs(u64::from(
                self.keep_alive_secs,
            ))),
            lwt: Some(LwtConfiguration {
                topic: self.topic,
                payload: self.will_message.as_bytes(),
                qos: QoS::AtLeastOnce,
                retain: true,
            }),
            username: self.username,
            password: self.password,
            ..Default::default()
        };

        let session_up = Arc::clone(&self.session_up);
        let client = EspMqttClient::new_cb(&self.broker_url, &conf, move |event| {
            match event.payload() {
                EventPayload::Connected(_) => {
                    info!("mqtt: session established");
                    session_up.store(true, Ordering::Release);
                }
                EventPayload::Disconnected => {
                    warn!("mqtt: session lost");
                    session_up.store(false, Ordering::Release);
                }
                EventPayload::Published(msg_id) => {
                    info!("mqtt: publish complete (msg_id={msg_id})");
                }
                EventPayload::Error(e) => {
                    warn!("mqtt: client error: {e}");
                }
                _ => {}
            }
        })
        .map_err(|e| {
            warn!("mqtt: connect to {} failed: {e}", self.broker_url);
            BrokerError::ConnectFailed
        })?;

        self.client = Some(client);
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), BrokerError> {
        info!(
            "mqtt(sim): session request to {} (client_id={}, keep_alive={}s, will='{}', auth={})",
            self.broker_url,
            self.client_id,
            self.keep_alive_secs,
            self.will_message,
            if self.username.is_some() && self.password.is_some() {
                "credentials"
            } else {
                "anonymous"
            }
        );
        self.session_up.store(true, Ordering::Release);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_publish(&mut self, payload: &[u8]) -> Result<(), BrokerError> {
        let Some(client) = self.client.as_mut() else {
            return Err(BrokerError::PublishFailed);
        };
        client
            .publish(self.topic, QoS::AtMostOnce, false, payload)
            .map(|_msg_id| ())
            .map_err(|e| {
                warn!("mqtt: publish enqueue failed: {e}");
                BrokerError::PublishFailed
            })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_publish(&mut self, payload: &[u8]) -> Result<(), BrokerError> {
        if !self.session_up.load(Ordering::Acquire) {
            warn!("mqtt(sim): publish refused, no session");
            return Err(BrokerError::PublishFailed);
        }
        self.sim_published.push(payload.to_vec());
        info!(
            "mqtt(sim): published {} bytes to '{}'",
            payload.len(),
            self.topic
        );
        Ok(())
    }

    /// Test hooks for the simulation backend.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_session(&self, up: bool) {
        self.session_up.store(up, Ordering::Release);
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_published(&self) -> &[Vec<u8>] {
        &self.sim_published
    }
}

impl BrokerPort for MqttAdapter {
    fn connect(&mut self) -> Result<(), BrokerError> {
        // Clear before the attempt so a stale "up" can never leak across
        // sessions; only the new session's CONNACK may set it again.
        self.session_up.store(false, Ordering::Release);
        info!("mqtt: establishing session with {}", self.broker_url);
        self.platform_connect()
    }

    fn session_established(&self) -> bool {
        self.session_up.load(Ordering::Acquire)
    }

    fn publish(&mut self, payload: &[u8]) -> Result<(), BrokerError> {
        self.platform_publish(payload)
    }
}
