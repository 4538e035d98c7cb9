use crate::application::anomaly_classifier::Thresholds;
use anyhow::Context;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_SOURCE_URL: &str = "http://3.226.1.115:8029/datos";
pub const DEFAULT_LOCATION: &str = "Centro de Datos - Zona B";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MonitorConfig {
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub polling: PollingSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub report: ReportSettings,
    #[serde(default)]
    pub thresholds: Thresholds,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SourceSettings {
    pub url: String,
    pub timeout_secs: u64,
    pub probe_timeout_secs: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            timeout_secs: 10,
            probe_timeout_secs: 5,
        }
    }
}

impl SourceSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PollingSettings {
    pub dashboard_interval_secs: u64,
    pub connectivity_interval_secs: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            dashboard_interval_secs: 10,
            connectivity_interval_secs: 30,
        }
    }
}

impl PollingSettings {
    pub fn dashboard_interval(&self) -> Duration {
        Duration::from_secs(self.dashboard_interval_secs)
    }

    pub fn connectivity_interval(&self) -> Duration {
        Duration::from_secs(self.connectivity_interval_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReportSettings {
    pub location: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            location: DEFAULT_LOCATION.to_string(),
        }
    }
}

impl MonitorConfig {
    /// Reject settings that would make every poll fail or spin.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.source.timeout_secs == 0 || self.source.probe_timeout_secs == 0 {
            anyhow::bail!("Request timeouts must be at least one second");
        }
        if self.polling.dashboard_interval_secs == 0
            || self.polling.connectivity_interval_secs == 0
        {
            anyhow::bail!("Polling intervals must be at least one second");
        }
        Ok(())
    }
}

/// Load `config/monitor.*` (optional) overlaid with `MONITOR__SECTION__KEY`
/// environment variables.
pub fn load_monitor_config() -> anyhow::Result<MonitorConfig> {
    load_from("config/monitor")
}

fn load_from(path: &str) -> anyhow::Result<MonitorConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            config::Environment::with_prefix("MONITOR")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to read monitor configuration")?;

    let config: MonitorConfig = settings
        .try_deserialize()
        .context("Invalid monitor configuration")?;

    config.validate()?;
    Ok(config)
}
