// Monitor service - Turns poll outcomes into dashboard state
use crate::application::anomaly_classifier::AnomalyClassifier;
use crate::application::normalizer::{self, fallback_series};
use crate::application::sensor_source::{PollError, SensorSource};
use crate::domain::anomaly::AnomalyReport;
use crate::domain::chart::{CurrentValues, OfflineFlags};
use crate::domain::dashboard::{ConnectionStatus, ConnectivityStatus, DashboardSnapshot};
use crate::domain::reading::SensorReading;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::watch;

/// Holds the transient dashboard and connectivity state.
///
/// The two views are fed by independent polls and never share a write path.
/// Each poll replaces its view wholesale, so a reader always sees the
/// outcome of exactly one poll.
#[derive(Clone)]
pub struct MonitorService {
    source: Arc<dyn SensorSource>,
    classifier: AnomalyClassifier,
    location: String,
    dashboard: Arc<watch::Sender<DashboardSnapshot>>,
    connectivity: Arc<watch::Sender<ConnectivityStatus>>,
}

impl MonitorService {
    pub fn new(
        source: Arc<dyn SensorSource>,
        classifier: AnomalyClassifier,
        location: String,
    ) -> Self {
        let now_ms = Utc::now().timestamp_millis();
        let (dashboard, _) = watch::channel(DashboardSnapshot::connecting(fallback_series(now_ms)));
        let (connectivity, _) = watch::channel(ConnectivityStatus::connecting());

        Self {
            source,
            classifier,
            location,
            dashboard: Arc::new(dashboard),
            connectivity: Arc::new(connectivity),
        }
    }

    /// Fetch readings once and publish the resulting dashboard snapshot.
    pub async fn poll_dashboard(&self) -> ConnectionStatus {
        let snapshot = match self.source.fetch_readings().await {
            Ok(readings) => self.connected_snapshot(&readings),
            Err(e) => {
                tracing::warn!("Dashboard poll failed: {}", e);
                self.disconnected_snapshot(&e)
            }
        };

        let status = snapshot.status;
        self.dashboard.send_replace(snapshot);
        status
    }

    /// Reachability check for the report view.
    pub async fn check_connectivity(&self) -> ConnectionStatus {
        let next = match self.source.check_connection().await {
            Ok(()) => ConnectivityStatus {
                status: ConnectionStatus::Connected,
                message: None,
            },
            Err(e) => {
                tracing::warn!("Connectivity check failed: {}", e);
                ConnectivityStatus {
                    status: ConnectionStatus::Disconnected,
                    message: Some(e.user_message()),
                }
            }
        };

        let status = next.status;
        let previous = self.connectivity.send_replace(next);
        if previous.status != status {
            tracing::info!("Sensor API connectivity: {:?} -> {:?}", previous.status, status);
        }
        status
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.dashboard.borrow().clone()
    }

    pub fn report(&self) -> AnomalyReport {
        self.dashboard.borrow().report.clone()
    }

    pub fn connectivity(&self) -> ConnectivityStatus {
        self.connectivity.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.dashboard.subscribe()
    }

    fn connected_snapshot(&self, readings: &[SensorReading]) -> DashboardSnapshot {
        let now_ms = Utc::now().timestamp_millis();
        let normalized = normalizer::normalize(readings, now_ms);
        let report = self.classifier.report(&self.location, readings);

        tracing::debug!(
            "Polled {} readings: {} anomalies ({} critical)",
            readings.len(),
            report.anomalies.len(),
            report.critical().count()
        );
        let offline = normalized.offline.offline_fields();
        if !offline.is_empty() {
            tracing::info!("Sensors offline in latest reading: {:?}", offline);
        }

        DashboardSnapshot {
            status: ConnectionStatus::Connected,
            current: normalized.current,
            offline: normalized.offline,
            chart: normalized.chart,
            report,
            error: None,
            updated_at_ms: Some(now_ms),
        }
    }

    fn disconnected_snapshot(&self, error: &PollError) -> DashboardSnapshot {
        let now_ms = Utc::now().timestamp_millis();
        DashboardSnapshot {
            status: ConnectionStatus::Disconnected,
            current: CurrentValues::zeroed(),
            offline: OfflineFlags::all_offline(),
            chart: fallback_series(now_ms),
            report: AnomalyReport::disconnected(),
            error: Some(error.user_message()),
            updated_at_ms: Some(now_ms),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::application::normalizer::FALLBACK_POINTS;
    use crate::domain::anomaly::Severity;
    use crate::domain::reading::SensorField;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted poll outcomes; repeats the last one when exhausted.
    pub(crate) struct ScriptedSource {
        outcomes: Mutex<VecDeque<Result<Vec<SensorReading>, PollError>>>,
    }

    impl ScriptedSource {
        pub(crate) fn new(outcomes: Vec<Result<Vec<SensorReading>, PollError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
            }
        }

        fn next(&self) -> Result<Vec<SensorReading>, PollError> {
            let mut outcomes = self.outcomes.lock().unwrap();
            if outcomes.len() > 1 {
                outcomes.pop_front().unwrap()
            } else {
                outcomes.front().cloned().unwrap_or(Err(PollError::EmptyPayload))
            }
        }
    }

    #[async_trait]
    impl SensorSource for ScriptedSource {
        async fn fetch_readings(&self) -> Result<Vec<SensorReading>, PollError> {
            self.next()
        }

        async fn check_connection(&self) -> Result<(), PollError> {
            self.next().map(|_| ())
        }
    }

    fn readings() -> Vec<SensorReading> {
        vec![
            SensorReading::new(
                Some(24.0),
                Some(55.0),
                Some(600.0),
                Some(40.0),
                "2025-04-15T08:00:00Z",
            ),
            SensorReading::new(Some(36.5), Some(54.0), Some(610.0), None, "2025-04-15T08:10:00Z"),
        ]
    }

    fn service(outcomes: Vec<Result<Vec<SensorReading>, PollError>>) -> MonitorService {
        MonitorService::new(
            Arc::new(ScriptedSource::new(outcomes)),
            AnomalyClassifier::default(),
            "Centro de Datos - Zona B".to_string(),
        )
    }

    #[tokio::test]
    async fn test_starts_connecting() {
        let service = service(vec![Ok(readings())]);
        let snapshot = service.snapshot();

        assert_eq!(snapshot.status, ConnectionStatus::Connecting);
        assert_eq!(snapshot.chart.len(), FALLBACK_POINTS);
        assert_eq!(service.connectivity().status, ConnectionStatus::Connecting);
    }

    #[tokio::test]
    async fn test_successful_poll_publishes_snapshot() {
        let service = service(vec![Ok(readings())]);

        assert_eq!(service.poll_dashboard().await, ConnectionStatus::Connected);
        let snapshot = service.snapshot();

        assert_eq!(snapshot.current.temperature, 36.5);
        assert_eq!(snapshot.current.soil_humidity, 0.0);
        assert!(snapshot.offline.soil_humidity);
        assert!(!snapshot.offline.temperature);
        assert_eq!(snapshot.offline.offline_fields(), [SensorField::SoilHumidity]);
        assert_eq!(snapshot.chart.len(), 2);
        assert!(snapshot.error.is_none());

        let report = service.report();
        assert_eq!(report.location, "Centro de Datos - Zona B");
        // 36.5°C is critical, +12.5°C jump is a warning
        assert_eq!(report.total_critical, 1);
        assert_eq!(report.total_warning, 1);
        assert_eq!(report.anomalies[0].severity, Severity::Critical);
    }

    #[tokio::test]
    async fn test_timeout_disconnects_and_zeroes_values() {
        let service = service(vec![Ok(readings()), Err(PollError::Timeout)]);

        service.poll_dashboard().await;
        assert_eq!(service.poll_dashboard().await, ConnectionStatus::Disconnected);

        let snapshot = service.snapshot();
        assert_eq!(snapshot.current, CurrentValues::zeroed());
        assert_eq!(snapshot.offline, OfflineFlags::all_offline());
        assert_eq!(snapshot.report, AnomalyReport::disconnected());
        assert_eq!(
            snapshot.error.as_deref(),
            Some("Sin Conexión. Tiempo de espera agotado. La API no respondió a tiempo.")
        );
    }

    #[tokio::test]
    async fn test_undated_reading_keeps_dashboard_connected() {
        let mut batch = readings();
        batch.insert(1, SensorReading::new(Some(40.0), None, None, None, ""));
        let service = service(vec![Ok(batch)]);

        assert_eq!(service.poll_dashboard().await, ConnectionStatus::Connected);
        let snapshot = service.snapshot();
        assert_eq!(snapshot.chart.len(), 2);
        // Still classified, listed after the dated events
        let timestamps: Vec<_> = snapshot
            .report
            .anomalies
            .iter()
            .map(|a| a.timestamp.as_str())
            .collect();
        assert_eq!(timestamps, ["2025-04-15T08:10:00Z", "", ""]);
        assert_eq!(snapshot.report.anomalies[1].severity, Severity::Critical);
    }

    #[tokio::test]
    async fn test_recovers_on_next_successful_poll() {
        let service = service(vec![
            Err(PollError::NetworkUnreachable("refused".into())),
            Ok(readings()),
        ]);

        assert_eq!(service.poll_dashboard().await, ConnectionStatus::Disconnected);
        assert_eq!(service.poll_dashboard().await, ConnectionStatus::Connected);
        assert!(service.snapshot().error.is_none());
    }

    #[tokio::test]
    async fn test_connectivity_is_independent_of_dashboard() {
        let service = service(vec![Err(PollError::HttpError(502)), Ok(readings())]);

        assert_eq!(service.check_connectivity().await, ConnectionStatus::Disconnected);
        assert_eq!(
            service.connectivity().message.as_deref(),
            Some("Sin Conexión. Error: Error en la conexión: 502")
        );
        // Dashboard untouched by the connectivity check
        assert_eq!(service.snapshot().status, ConnectionStatus::Connecting);

        assert_eq!(service.check_connectivity().await, ConnectionStatus::Connected);
        assert!(service.connectivity().message.is_none());
    }

    #[tokio::test]
    async fn test_subscribers_see_each_poll() {
        let service = service(vec![Ok(readings()), Err(PollError::EmptyPayload)]);
        let mut rx = service.subscribe();

        service.poll_dashboard().await;
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().status, ConnectionStatus::Connected);

        service.poll_dashboard().await;
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().status, ConnectionStatus::Disconnected);
    }
}
