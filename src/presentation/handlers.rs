// HTTP request handlers
use crate::infrastructure::chunked_json::stream_from_watch;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    Router,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::get,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(dashboard))
        .route("/dashboard/stream", get(stream_dashboard))
        .route("/anomalies", get(anomalies))
        .route("/status", get(connection_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Latest dashboard snapshot: cards, offline flags, chart and report
pub async fn dashboard(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let snapshot = state.monitor_service.snapshot();
    match json_response(&snapshot, accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Anomaly report for the latest successful poll
pub async fn anomalies(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let report = state.monitor_service.report();
    match json_response(&report, accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Result of the periodic connectivity check
pub async fn connection_status(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let status = state.monitor_service.connectivity();
    match json_response(&status, accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Push a frame every time the dashboard snapshot changes
pub async fn stream_dashboard(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let rx = state.monitor_service.subscribe();
    stream_from_watch(rx, accepts_brotli(&headers)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::anomaly_classifier::AnomalyClassifier;
    use crate::application::monitor_service::MonitorService;
    use crate::application::monitor_service::tests::ScriptedSource;
    use crate::application::sensor_source::PollError;
    use crate::domain::reading::SensorReading;

    async fn spawn_app(service: MonitorService) -> String {
        let state = Arc::new(AppState {
            monitor_service: service,
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn service(outcome: Result<Vec<SensorReading>, PollError>) -> MonitorService {
        MonitorService::new(
            Arc::new(ScriptedSource::new(vec![outcome])),
            AnomalyClassifier::default(),
            "Centro de Datos - Zona B".to_string(),
        )
    }

    #[tokio::test]
    async fn test_health_check() {
        let base = spawn_app(service(Err(PollError::Timeout))).await;
        let body = reqwest::get(format!("{}/healthz", base)).await.unwrap().text().await.unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_dashboard_and_anomalies_after_poll() {
        let service = service(Ok(vec![SensorReading::new(
            Some(37.0),
            Some(45.0),
            Some(700.0),
            Some(5.0),
            "2025-04-15T11:00:00Z",
        )]));
        service.poll_dashboard().await;
        let base = spawn_app(service).await;

        let dashboard: serde_json::Value = reqwest::get(format!("{}/dashboard", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(dashboard["status"], "connected");
        assert_eq!(dashboard["current"]["temperature"], 37.0);
        assert_eq!(dashboard["offline"]["soilHumidity"], false);

        let report: serde_json::Value = reqwest::get(format!("{}/anomalies", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(report["totalCritical"], 2);
        assert_eq!(report["peakHour"], "11:00");
    }

    #[tokio::test]
    async fn test_status_reports_disconnection() {
        let service = service(Err(PollError::NetworkUnreachable("refused".into())));
        service.check_connectivity().await;
        let base = spawn_app(service).await;

        let status: serde_json::Value = reqwest::get(format!("{}/status", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(status["status"], "disconnected");
        assert_eq!(status["message"], "Sin Conexión. API desconectada.");
    }
}
