//! End-to-end tests for tether
//!
//! These tests drive the supervisor against real spawned processes:
//! small shell scripts that behave like the daemon pair, accepting
//! the standard argument tail and writing their own PID files.

pub mod helpers;
pub mod lifecycle;

pub use helpers::*;
