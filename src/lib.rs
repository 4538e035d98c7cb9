//! Sensor monitoring service: polls a remote sensor endpoint and serves the
//! derived dashboard state (current values, charts, anomaly report).
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
