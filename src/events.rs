//! Inbound events pushed back by the daemon pair
//!
//! The bridge daemon delivers these as JSON objects tagged by `cmd`,
//! over the websocket callback handed out in `newMqttClient`. Session
//! open/close of that callback connection itself has no wire payload;
//! the transport layer reports it straight to the [`EventSink`].

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One asynchronous notification from the daemons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd")]
pub enum DaemonEvent {
    /// A broker client's MQTT connection came up.
    #[serde(rename = "brokerUp")]
    BrokerUp { id: String },
    /// A broker client's MQTT connection dropped.
    #[serde(rename = "brokerDown")]
    BrokerDown { id: String },
    /// A subscribed topic received a message.
    #[serde(rename = "messageIn")]
    MessageIn {
        id: String,
        topic: String,
        payload: String,
        qos: u8,
        retain: bool,
    },
}

impl DaemonEvent {
    /// Parse one wire event. Unknown `cmd` tags and missing fields
    /// are errors; the daemons never send partial events.
    pub fn parse(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Hand this event to a sink.
    pub fn dispatch(&self, sink: &impl EventSink) {
        match self {
            DaemonEvent::BrokerUp { id } => sink.on_broker_connect(id),
            DaemonEvent::BrokerDown { id } => sink.on_broker_disconnect(id),
            DaemonEvent::MessageIn {
                id,
                topic,
                payload,
                qos,
                retain,
            } => sink.on_message(id, topic, payload, *qos, *retain),
        }
    }
}

/// Receiver for everything the daemon pair reports back.
///
/// Every method is required. Callers that do not care about an event
/// implement it empty; there is no runtime probe for missing handlers.
pub trait EventSink {
    /// The bridge daemon opened its event session.
    fn on_daemon_connect(&self, id: &str);
    /// The bridge daemon's event session closed.
    fn on_daemon_disconnect(&self, id: &str);
    fn on_broker_connect(&self, id: &str);
    fn on_broker_disconnect(&self, id: &str);
    fn on_message(&self, id: &str, topic: &str, payload: &str, qos: u8, retain: bool);
}
