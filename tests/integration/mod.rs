//! Integration tests for the tether library
//!
//! These tests exercise the seams between configuration, PID-file
//! state, health reporting and command delivery, without launching
//! real daemon processes. Full-lifecycle coverage with spawned
//! daemons lives in the e2e suite.

pub mod bridge_delivery;
