//! Fire-and-forget command delivery to the primary daemon
//!
//! One short-lived loopback connection per command, write and close,
//! no reply. Durability lives in the daemon's own MQTT retry layer,
//! so the bridge stays connectionless and never pools or retries.

use std::io::Write;
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::command::{BrokerOptions, Command};
use crate::config::InstanceConfig;
use crate::error::{Error, Result};
use crate::health::HealthMonitor;

/// Ceiling on the connect and the write of a single send, so a wedged
/// daemon cannot hang the caller.
const SEND_TIMEOUT: Duration = Duration::from_secs(3);

/// Sends commands to the primary daemon of one instance.
pub struct CommandBridge {
    config: InstanceConfig,
    monitor: HealthMonitor,
}

impl CommandBridge {
    pub fn new(config: InstanceConfig) -> Self {
        let monitor = HealthMonitor::new(&config);
        Self { config, monitor }
    }

    /// Deliver one command.
    ///
    /// Refuses with [`Error::NotRunning`] unless both daemons are
    /// confirmed alive at call time. The check and the write are not
    /// atomic; a daemon dying in between surfaces as [`Error::Send`].
    pub fn send(&self, command: &Command) -> Result<()> {
        if !self.monitor.status().is_running() {
            return Err(Error::NotRunning);
        }

        let mut value = serde_json::to_value(command)?;
        if let Value::Object(fields) = &mut value {
            fields.insert("apikey".to_string(), Value::String(self.config.api_key.clone()));
        }
        let payload = value.to_string();

        let port = self.config.command_port;
        debug!("Sending {} for id {} to 127.0.0.1:{}", command.kind(), command.id(), port);

        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        let mut stream = TcpStream::connect_timeout(&addr, SEND_TIMEOUT)
            .map_err(|e| Error::Send { port, source: e })?;
        stream
            .set_write_timeout(Some(SEND_TIMEOUT))
            .map_err(|e| Error::Send { port, source: e })?;
        stream
            .write_all(payload.as_bytes())
            .map_err(|e| Error::Send { port, source: e })?;

        // Dropping the stream closes the connection; no reply is read.
        Ok(())
    }

    /// Connect a new broker client. The event callback URL for this
    /// instance is injected automatically.
    pub fn new_client(
        &self,
        id: impl Into<String>,
        hostname: impl Into<String>,
        options: &BrokerOptions,
    ) -> Result<()> {
        let command = Command::new_client(id, hostname, self.config.callback_url(), options);
        self.send(&command)
    }

    pub fn remove_client(&self, id: impl Into<String>) -> Result<()> {
        self.send(&Command::RemoveClient { id: id.into() })
    }

    /// Subscribe a client to a topic. An empty topic is accepted and
    /// ignored without contacting the daemon.
    pub fn subscribe(&self, id: impl Into<String>, topic: impl Into<String>, qos: u8) -> Result<()> {
        let topic = topic.into();
        if topic.is_empty() {
            return Ok(());
        }
        self.send(&Command::Subscribe {
            id: id.into(),
            topic,
            qos,
        })
    }

    /// Unsubscribe a client from a topic. An empty topic is accepted
    /// and ignored without contacting the daemon.
    pub fn unsubscribe(&self, id: impl Into<String>, topic: impl Into<String>) -> Result<()> {
        let topic = topic.into();
        if topic.is_empty() {
            return Ok(());
        }
        self.send(&Command::Unsubscribe {
            id: id.into(),
            topic,
        })
    }

    /// Publish a message through a client. An empty topic is accepted
    /// and ignored without contacting the daemon.
    pub fn publish(
        &self,
        id: impl Into<String>,
        topic: impl Into<String>,
        payload: impl Into<String>,
        qos: u8,
        retain: bool,
    ) -> Result<()> {
        let topic = topic.into();
        if topic.is_empty() {
            return Ok(());
        }
        self.send(&Command::Publish {
            id: id.into(),
            topic,
            payload: payload.into(),
            qos,
            retain,
        })
    }
}
