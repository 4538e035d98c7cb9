// Domain layer - Sensor readings and the dashboard state derived from them
pub mod anomaly;
pub mod chart;
pub mod dashboard;
pub mod reading;
