// Application layer - Polling, classification and normalization use cases
pub mod anomaly_classifier;
pub mod monitor_service;
pub mod normalizer;
pub mod poll_session;
pub mod sensor_source;
