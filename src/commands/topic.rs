//! Topic commands - subscription and publish operations

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

use crate::bridge::CommandBridge;
use crate::commands::load_config;

pub fn subscribe(
    config_path: Option<PathBuf>,
    id: String,
    topic: String,
    qos: u8,
) -> Result<()> {
    let config = load_config(config_path)?;
    if skip_empty(&topic) {
        return Ok(());
    }
    let bridge = CommandBridge::new(config);

    bridge.subscribe(&id, &topic, qos)?;

    println!(
        "{} Subscribed {} to {} (qos {})",
        "✓".green().bold(),
        id.bold(),
        topic.bold(),
        qos
    );
    Ok(())
}

pub fn unsubscribe(config_path: Option<PathBuf>, id: String, topic: String) -> Result<()> {
    let config = load_config(config_path)?;
    if skip_empty(&topic) {
        return Ok(());
    }
    let bridge = CommandBridge::new(config);

    bridge.unsubscribe(&id, &topic)?;

    println!(
        "{} Unsubscribed {} from {}",
        "✓".green().bold(),
        id.bold(),
        topic.bold()
    );
    Ok(())
}

pub fn publish(
    config_path: Option<PathBuf>,
    id: String,
    topic: String,
    payload: String,
    qos: u8,
    retain: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    if skip_empty(&topic) {
        return Ok(());
    }
    let bridge = CommandBridge::new(config);

    bridge.publish(&id, &topic, &payload, qos, retain)?;

    println!(
        "{} Published to {} via {}{}",
        "✓".green().bold(),
        topic.bold(),
        id.bold(),
        if retain { " (retained)" } else { "" }
    );
    Ok(())
}

/// Empty topics are dropped without contacting the daemon; the output
/// reports the skip rather than a send.
fn skip_empty(topic: &str) -> bool {
    if topic.is_empty() {
        println!("{} Empty topic, nothing sent", "─".dimmed());
        return true;
    }
    false
}
