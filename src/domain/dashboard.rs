// Dashboard domain model
use super::anomaly::AnomalyReport;
use super::chart::{ChartPoint, CurrentValues, OfflineFlags};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
}

/// Everything the dashboard view renders, replaced as a whole on every poll.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub status: ConnectionStatus,
    pub current: CurrentValues,
    pub offline: OfflineFlags,
    pub chart: Vec<ChartPoint>,
    pub report: AnomalyReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at_ms: Option<i64>,
}

impl DashboardSnapshot {
    /// State before the first poll has answered.
    pub fn connecting(chart: Vec<ChartPoint>) -> Self {
        Self {
            status: ConnectionStatus::Connecting,
            current: CurrentValues::zeroed(),
            offline: OfflineFlags::all_offline(),
            chart,
            report: AnomalyReport::disconnected(),
            error: None,
            updated_at_ms: None,
        }
    }
}

/// Result of the lightweight reachability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectivityStatus {
    pub status: ConnectionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ConnectivityStatus {
    pub fn connecting() -> Self {
        Self {
            status: ConnectionStatus::Connecting,
            message: None,
        }
    }
}
