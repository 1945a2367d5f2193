//! Outbound command model for the primary daemon's wire protocol
//!
//! One JSON object per command, tagged by `cmd`. Field names follow
//! the daemon's wire vocabulary exactly (`clientid`, `lwtTopic`,
//! `tlssecure` as a "0"/"1" string), so the payloads drive an
//! unmodified daemon.

use serde::{Deserialize, Serialize};

/// TLS policy for a new broker client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsMode {
    /// TLS on; the caller supplies all certificate material.
    Custom,
    /// TLS on against system trust; no CA override, no client
    /// certificate.
    Enable,
    /// TLS off. Every TLS field is cleared on the wire so the daemon
    /// cannot inherit stale settings from a prior configuration.
    #[default]
    Disabled,
}

impl TlsMode {
    /// Interpret the tri-state the way daemon callers spell it:
    /// `"custom"` and `"enable"` are the two TLS-on modes, anything
    /// else disables TLS.
    pub fn parse(value: &str) -> Self {
        match value {
            "custom" => TlsMode::Custom,
            "enable" => TlsMode::Enable,
            _ => TlsMode::Disabled,
        }
    }

    pub fn enabled(&self) -> bool {
        !matches!(self, TlsMode::Disabled)
    }
}

/// Caller-facing connection parameters for a new broker client,
/// before the TLS policy and the port default are applied.
#[derive(Debug, Clone)]
pub struct BrokerOptions {
    /// Broker port. Unset or zero picks the MQTT convention for the
    /// resolved TLS state: 8883 with TLS, 1883 without.
    pub port: Option<u16>,
    pub tls: TlsMode,
    /// Validate the broker certificate (`tlssecure` on the wire).
    pub tls_secure: bool,
    pub tls_ca_file: String,
    pub tls_client_cert_file: String,
    pub tls_client_key_file: String,
    pub username: String,
    pub password: String,
    pub client_id: String,
    /// Register a last-will message on connect.
    pub lwt: bool,
    pub lwt_topic: String,
    pub lwt_online: String,
    pub lwt_offline: String,
}

impl Default for BrokerOptions {
    fn default() -> Self {
        Self {
            port: None,
            tls: TlsMode::Disabled,
            tls_secure: true,
            tls_ca_file: String::new(),
            tls_client_cert_file: String::new(),
            tls_client_key_file: String::new(),
            username: String::new(),
            password: String::new(),
            client_id: String::new(),
            lwt: false,
            lwt_topic: String::new(),
            lwt_online: String::new(),
            lwt_offline: String::new(),
        }
    }
}

/// Wire-ready broker settings, after policy resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerSettings {
    pub port: u16,
    pub tls: bool,
    #[serde(rename = "tlssecure")]
    pub tls_secure: String,
    #[serde(rename = "tlscafile")]
    pub tls_ca_file: String,
    #[serde(rename = "tlsclicertfile")]
    pub tls_client_cert_file: String,
    #[serde(rename = "tlsclikeyfile")]
    pub tls_client_key_file: String,
    pub username: String,
    pub password: String,
    #[serde(rename = "clientid")]
    pub client_id: String,
    pub lwt: bool,
    #[serde(rename = "lwtTopic")]
    pub lwt_topic: String,
    #[serde(rename = "lwtOnline")]
    pub lwt_online: String,
    #[serde(rename = "lwtOffline")]
    pub lwt_offline: String,
}

/// One instruction for the primary daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd")]
pub enum Command {
    #[serde(rename = "newMqttClient")]
    NewClient {
        id: String,
        hostname: String,
        /// Where the daemon pushes asynchronous events back.
        callback: String,
        #[serde(flatten)]
        broker: BrokerSettings,
    },
    #[serde(rename = "removeMqttClient")]
    RemoveClient { id: String },
    #[serde(rename = "subscribeTopic")]
    Subscribe { id: String, topic: String, qos: u8 },
    #[serde(rename = "unsubscribeTopic")]
    Unsubscribe { id: String, topic: String },
    #[serde(rename = "messageOut")]
    Publish {
        id: String,
        topic: String,
        payload: String,
        qos: u8,
        retain: bool,
    },
}

impl Command {
    /// Build a `newMqttClient` command, applying the TLS tri-state
    /// policy and the port default once, here.
    pub fn new_client(
        id: impl Into<String>,
        hostname: impl Into<String>,
        callback: impl Into<String>,
        options: &BrokerOptions,
    ) -> Self {
        let tls = options.tls;
        let mut broker = BrokerSettings {
            // Zero is "unset", same as absent.
            port: options
                .port
                .filter(|port| *port != 0)
                .unwrap_or(if tls.enabled() { 8883 } else { 1883 }),
            tls: tls.enabled(),
            tls_secure: flag(options.tls_secure),
            tls_ca_file: options.tls_ca_file.clone(),
            tls_client_cert_file: options.tls_client_cert_file.clone(),
            tls_client_key_file: options.tls_client_key_file.clone(),
            username: options.username.clone(),
            password: options.password.clone(),
            client_id: options.client_id.clone(),
            lwt: options.lwt,
            lwt_topic: options.lwt_topic.clone(),
            lwt_online: options.lwt_online.clone(),
            lwt_offline: options.lwt_offline.clone(),
        };

        match tls {
            TlsMode::Custom => {}
            TlsMode::Enable => broker.tls_ca_file.clear(),
            TlsMode::Disabled => {
                broker.tls_secure = flag(false);
                broker.tls_ca_file.clear();
                broker.tls_client_cert_file.clear();
                broker.tls_client_key_file.clear();
            }
        }

        Command::NewClient {
            id: id.into(),
            hostname: hostname.into(),
            callback: callback.into(),
            broker,
        }
    }

    /// Wire name of this command.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::NewClient { .. } => "newMqttClient",
            Command::RemoveClient { .. } => "removeMqttClient",
            Command::Subscribe { .. } => "subscribeTopic",
            Command::Unsubscribe { .. } => "unsubscribeTopic",
            Command::Publish { .. } => "messageOut",
        }
    }

    /// Target identity this command addresses.
    pub fn id(&self) -> &str {
        match self {
            Command::NewClient { id, .. }
            | Command::RemoveClient { id }
            | Command::Subscribe { id, .. }
            | Command::Unsubscribe { id, .. }
            | Command::Publish { id, .. } => id,
        }
    }
}

// The daemon reads this flag as a string.
fn flag(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}
