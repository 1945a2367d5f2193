pub mod bridge;
pub mod command;
pub mod commands;
pub mod completions;
pub mod config;
pub mod error;
pub mod events;
pub mod health;
pub mod pidfile;
pub mod probe;
pub mod process;
pub mod supervisor;
