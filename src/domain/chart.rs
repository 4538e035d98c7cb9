// Chart and current-value domain models
use crate::domain::reading::{SensorField, SensorReading};
use serde::Serialize;

/// One displayed chart sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub label: String,
    pub temperature: f64,
    pub humidity: f64,
    pub luminosity: f64,
    pub soil_humidity: f64,
    pub timestamp_ms: i64,
}

impl ChartPoint {
    pub fn value(&self, field: SensorField) -> f64 {
        match field {
            SensorField::Temperature => self.temperature,
            SensorField::Humidity => self.humidity,
            SensorField::Luminosity => self.luminosity,
            SensorField::SoilHumidity => self.soil_humidity,
        }
    }

    pub fn value_mut(&mut self, field: SensorField) -> &mut f64 {
        match field {
            SensorField::Temperature => &mut self.temperature,
            SensorField::Humidity => &mut self.humidity,
            SensorField::Luminosity => &mut self.luminosity,
            SensorField::SoilHumidity => &mut self.soil_humidity,
        }
    }
}

/// Per-field "sensor offline" flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineFlags {
    pub temperature: bool,
    pub humidity: bool,
    pub luminosity: bool,
    pub soil_humidity: bool,
}

impl OfflineFlags {
    pub fn all_offline() -> Self {
        Self {
            temperature: true,
            humidity: true,
            luminosity: true,
            soil_humidity: true,
        }
    }

    pub fn from_reading(reading: &SensorReading) -> Self {
        Self {
            temperature: reading.temperature.is_none(),
            humidity: reading.humidity.is_none(),
            luminosity: reading.luminosity.is_none(),
            soil_humidity: reading.soil_humidity.is_none(),
        }
    }

    pub fn is_offline(&self, field: SensorField) -> bool {
        match field {
            SensorField::Temperature => self.temperature,
            SensorField::Humidity => self.humidity,
            SensorField::Luminosity => self.luminosity,
            SensorField::SoilHumidity => self.soil_humidity,
        }
    }

    pub fn offline_fields(&self) -> Vec<SensorField> {
        SensorField::ALL
            .into_iter()
            .filter(|&field| self.is_offline(field))
            .collect()
    }
}

/// Values shown on the dashboard cards. Offline sensors read as 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentValues {
    pub temperature: f64,
    pub humidity: f64,
    pub luminosity: f64,
    pub soil_humidity: f64,
}

impl CurrentValues {
    pub fn zeroed() -> Self {
        Self::default()
    }

    pub fn from_reading(reading: &SensorReading) -> Self {
        Self {
            temperature: reading.temperature.unwrap_or(0.0),
            humidity: reading.humidity.unwrap_or(0.0),
            luminosity: reading.luminosity.unwrap_or(0.0),
            soil_humidity: reading.soil_humidity.unwrap_or(0.0),
        }
    }
}
