// Anomaly domain models
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyEvent {
    pub timestamp: String,
    pub sensor_label: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
    pub severity: Severity,
    /// Signed change against the previous reading, for delta rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<f64>,
}

impl AnomalyEvent {
    pub fn new(
        timestamp: &str,
        sensor_label: &str,
        description: String,
        risk_level: &str,
        severity: Severity,
    ) -> Self {
        Self {
            timestamp: timestamp.to_string(),
            sensor_label: sensor_label.to_string(),
            description,
            risk_level: Some(risk_level.to_string()),
            severity,
            delta: None,
        }
    }

    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = Some(delta);
        self
    }
}

pub const DISCONNECTED_LOCATION: &str = "Sin Conexión";
pub const NO_PEAK_HOUR: &str = "--:--";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyReport {
    pub location: String,
    pub anomalies: Vec<AnomalyEvent>,
    pub total_critical: usize,
    pub total_warning: usize,
    pub total_info: usize,
    pub peak_hour: String,
}

impl AnomalyReport {
    pub fn new(location: String, anomalies: Vec<AnomalyEvent>, peak_hour: String) -> Self {
        let count = |severity: Severity| {
            anomalies
                .iter()
                .filter(|a| a.severity == severity)
                .count()
        };
        let total_critical = count(Severity::Critical);
        let total_warning = count(Severity::Warning);
        let total_info = count(Severity::Info);

        Self {
            location,
            anomalies,
            total_critical,
            total_warning,
            total_info,
            peak_hour,
        }
    }

    /// Report shown while the sensor endpoint cannot be reached.
    pub fn disconnected() -> Self {
        Self::new(
            DISCONNECTED_LOCATION.to_string(),
            Vec::new(),
            NO_PEAK_HOUR.to_string(),
        )
    }

    pub fn critical(&self) -> impl Iterator<Item = &AnomalyEvent> {
        self.anomalies
            .iter()
            .filter(|a| a.severity == Severity::Critical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_totals() {
        let events = vec![
            AnomalyEvent::new("t1", "Temp-ZB-01", "a".into(), "Alto", Severity::Critical),
            AnomalyEvent::new("t1", "Hum-ZB-02", "b".into(), "Medio", Severity::Warning),
            AnomalyEvent::new("t2", "HS-ZB-01", "c".into(), "Medio", Severity::Warning),
            AnomalyEvent::new("t2", "Lum-ZB-01", "d".into(), "Bajo", Severity::Info),
        ];
        let report = AnomalyReport::new("Zona B".into(), events, "14:00".into());

        assert_eq!(report.total_critical, 1);
        assert_eq!(report.total_warning, 2);
        assert_eq!(report.total_info, 1);
        assert_eq!(report.critical().count(), 1);
    }

    #[test]
    fn test_event_serializes_camel_case() {
        let event = AnomalyEvent::new("t", "Temp-ZB-02", "x".into(), "Medio", Severity::Warning)
            .with_delta(6.0);
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["sensorLabel"], "Temp-ZB-02");
        assert_eq!(value["riskLevel"], "Medio");
        assert_eq!(value["severity"], "warning");
        assert_eq!(value["delta"], 6.0);
    }

    #[test]
    fn test_disconnected_report() {
        let report = AnomalyReport::disconnected();
        assert_eq!(report.location, "Sin Conexión");
        assert!(report.anomalies.is_empty());
        assert_eq!(report.peak_hour, "--:--");
    }
}
