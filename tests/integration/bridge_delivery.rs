//! Command delivery from a file-loaded configuration
//!
//! Covers the config file -> bridge -> loopback wire path with a
//! listener standing in for the primary daemon, and the inbound
//! event path with payloads shaped like the daemon's own.

use std::cell::RefCell;
use std::fs;
use std::io::Read;
use std::net::TcpListener;

use serde_json::Value;
use tempfile::TempDir;

use tether::bridge::CommandBridge;
use tether::command::{BrokerOptions, TlsMode};
use tether::config::InstanceConfig;
use tether::error::Error;
use tether::events::{DaemonEvent, EventSink};

use super::helpers::*;

/// Write a config file, load it back, and return the parsed config.
fn load_from_file(temp: &TempDir, command_port: u16, event_port: u16) -> InstanceConfig {
    let path = temp.path().join("tether.toml");
    fs::write(
        &path,
        format!(
            r#"
instance = "itest"
api_key = "integration-key"
command_port = {command_port}
event_port = {event_port}
runtime_dir = "{}"

[primary]
program = "/bin/true"

[bridge]
program = "/bin/true"
"#,
            temp.path().display()
        ),
    )
    .expect("Failed to write config file");

    InstanceConfig::load(&path).expect("Failed to load config file")
}

/// Accept one connection and return its full payload.
fn receive_payload(listener: &TcpListener) -> Value {
    let (mut stream, _) = listener.accept().expect("Failed to accept");
    let mut raw = String::new();
    stream
        .read_to_string(&mut raw)
        .expect("Failed to read payload");
    serde_json::from_str(&raw).expect("Payload should be JSON")
}

#[test]
fn test_publish_from_file_loaded_config_reaches_the_wire() {
    let temp = TempDir::new().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let command_port = listener.local_addr().unwrap().port();

    let config = load_from_file(&temp, command_port, free_port());
    pretend_pair_running(&config);

    let bridge = CommandBridge::new(config);
    bridge
        .publish("living-room", "home/light", "on", 1, true)
        .expect("publish should be delivered");

    let payload = receive_payload(&listener);
    assert_eq!(payload["cmd"], "messageOut");
    assert_eq!(payload["id"], "living-room");
    assert_eq!(payload["topic"], "home/light");
    assert_eq!(payload["payload"], "on");
    assert_eq!(payload["qos"], 1);
    assert_eq!(payload["retain"], true);
    assert_eq!(payload["apikey"], "integration-key");
}

#[test]
fn test_new_client_callback_points_at_event_port_from_file() {
    let temp = TempDir::new().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let command_port = listener.local_addr().unwrap().port();
    let event_port = free_port();

    let config = load_from_file(&temp, command_port, event_port);
    pretend_pair_running(&config);

    let options = BrokerOptions {
        tls: TlsMode::Enable,
        ..BrokerOptions::default()
    };
    CommandBridge::new(config)
        .new_client("b1", "broker.example", &options)
        .expect("newClient should be delivered");

    let payload = receive_payload(&listener);
    assert_eq!(payload["cmd"], "newMqttClient");
    assert_eq!(payload["hostname"], "broker.example");
    assert_eq!(
        payload["callback"],
        format!("ws://127.0.0.1:{event_port}/itest")
    );
    assert_eq!(payload["tls"], true);
    assert_eq!(payload["port"], 8883);
}

#[test]
fn test_send_refusal_tracks_live_pid_state() {
    let temp = TempDir::new().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let command_port = listener.local_addr().unwrap().port();

    let config = load_from_file(&temp, command_port, free_port());
    let bridge = CommandBridge::new(config.clone());

    // Nothing running yet.
    let err = bridge.subscribe("b1", "a/topic", 1).unwrap_err();
    assert!(matches!(err, Error::NotRunning));

    // Both roles up: the same call goes through.
    pretend_pair_running(&config);
    bridge
        .subscribe("b1", "a/topic", 1)
        .expect("subscribe should be delivered");
    let payload = receive_payload(&listener);
    assert_eq!(payload["cmd"], "subscribeTopic");

    // Pair gone again: the gate re-checks on every call.
    for role in tether::config::DaemonRole::BOTH {
        fs::remove_file(config.pid_path(role)).unwrap();
    }
    let err = bridge.subscribe("b1", "a/topic", 1).unwrap_err();
    assert!(matches!(err, Error::NotRunning));
}

#[derive(Default)]
struct RecordingSink {
    calls: RefCell<Vec<String>>,
}

impl EventSink for RecordingSink {
    fn on_daemon_connect(&self, id: &str) {
        self.calls.borrow_mut().push(format!("daemon-up {id}"));
    }
    fn on_daemon_disconnect(&self, id: &str) {
        self.calls.borrow_mut().push(format!("daemon-down {id}"));
    }
    fn on_broker_connect(&self, id: &str) {
        self.calls.borrow_mut().push(format!("broker-up {id}"));
    }
    fn on_broker_disconnect(&self, id: &str) {
        self.calls.borrow_mut().push(format!("broker-down {id}"));
    }
    fn on_message(&self, id: &str, topic: &str, payload: &str, qos: u8, retain: bool) {
        self.calls
            .borrow_mut()
            .push(format!("message {id} {topic} {payload} {qos} {retain}"));
    }
}

#[test]
fn test_daemon_shaped_event_payloads_dispatch_to_sink() {
    let sink = RecordingSink::default();

    for raw in [
        r#"{"cmd":"brokerUp","id":"b1"}"#,
        r#"{"cmd":"messageIn","id":"b1","topic":"home/light","payload":"on","qos":1,"retain":false}"#,
        r#"{"cmd":"brokerDown","id":"b1"}"#,
    ] {
        DaemonEvent::parse(raw)
            .expect("daemon payload should parse")
            .dispatch(&sink);
    }

    let calls = sink.calls.borrow();
    assert_eq!(
        *calls,
        vec![
            "broker-up b1".to_string(),
            "message b1 home/light on 1 false".to_string(),
            "broker-down b1".to_string(),
        ]
    );
}
