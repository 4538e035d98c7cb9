// Anomaly classifier - Rule-based scan over the most recent readings
use crate::domain::anomaly::{AnomalyEvent, AnomalyReport, NO_PEAK_HOUR, Severity};
use crate::domain::reading::{SensorReading, parse_timestamp};
use serde::Deserialize;
use std::cmp::Reverse;

/// Readings scanned per poll.
pub const ANOMALY_WINDOW: usize = 24;

/// High temperature warning, °C.
pub const TEMP_WARNING_C: f64 = 30.0;
/// High temperature critical, °C.
pub const TEMP_CRITICAL_C: f64 = 35.0;
/// Relative humidity warning band, %.
pub const HUMIDITY_LOW_WARNING_PCT: f64 = 20.0;
pub const HUMIDITY_HIGH_WARNING_PCT: f64 = 80.0;
/// Relative humidity critical band, %.
pub const HUMIDITY_LOW_CRITICAL_PCT: f64 = 10.0;
pub const HUMIDITY_HIGH_CRITICAL_PCT: f64 = 90.0;
/// Daytime window for the light rule, inclusive hours.
pub const DAYLIGHT_START_HOUR: u32 = 9;
pub const DAYLIGHT_END_HOUR: u32 = 17;
/// Daytime luminosity, lux.
pub const LUMINOSITY_INFO_LUX: f64 = 100.0;
pub const LUMINOSITY_WARNING_LUX: f64 = 50.0;
/// Soil moisture, %.
pub const SOIL_DRY_WARNING_PCT: f64 = 20.0;
pub const SOIL_DRY_CRITICAL_PCT: f64 = 10.0;
pub const SOIL_SATURATED_WARNING_PCT: f64 = 90.0;
pub const SOIL_SATURATED_CRITICAL_PCT: f64 = 95.0;
/// Change between consecutive readings, °C and % respectively.
pub const TEMP_JUMP_C: f64 = 5.0;
pub const HUMIDITY_SWING_PCT: f64 = 15.0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub temp_warning_c: f64,
    pub temp_critical_c: f64,
    pub humidity_low_warning_pct: f64,
    pub humidity_high_warning_pct: f64,
    pub humidity_low_critical_pct: f64,
    pub humidity_high_critical_pct: f64,
    pub daylight_start_hour: u32,
    pub daylight_end_hour: u32,
    pub luminosity_info_lux: f64,
    pub luminosity_warning_lux: f64,
    pub soil_dry_warning_pct: f64,
    pub soil_dry_critical_pct: f64,
    pub soil_saturated_warning_pct: f64,
    pub soil_saturated_critical_pct: f64,
    pub temp_jump_c: f64,
    pub humidity_swing_pct: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            temp_warning_c: TEMP_WARNING_C,
            temp_critical_c: TEMP_CRITICAL_C,
            humidity_low_warning_pct: HUMIDITY_LOW_WARNING_PCT,
            humidity_high_warning_pct: HUMIDITY_HIGH_WARNING_PCT,
            humidity_low_critical_pct: HUMIDITY_LOW_CRITICAL_PCT,
            humidity_high_critical_pct: HUMIDITY_HIGH_CRITICAL_PCT,
            daylight_start_hour: DAYLIGHT_START_HOUR,
            daylight_end_hour: DAYLIGHT_END_HOUR,
            luminosity_info_lux: LUMINOSITY_INFO_LUX,
            luminosity_warning_lux: LUMINOSITY_WARNING_LUX,
            soil_dry_warning_pct: SOIL_DRY_WARNING_PCT,
            soil_dry_critical_pct: SOIL_DRY_CRITICAL_PCT,
            soil_saturated_warning_pct: SOIL_SATURATED_WARNING_PCT,
            soil_saturated_critical_pct: SOIL_SATURATED_CRITICAL_PCT,
            temp_jump_c: TEMP_JUMP_C,
            humidity_swing_pct: HUMIDITY_SWING_PCT,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnomalyClassifier {
    thresholds: Thresholds,
}

impl AnomalyClassifier {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Classify the last `ANOMALY_WINDOW` readings. Events come back newest first.
    pub fn classify(&self, readings: &[SensorReading]) -> Vec<AnomalyEvent> {
        let window = &readings[readings.len().saturating_sub(ANOMALY_WINDOW)..];
        let mut anomalies = Vec::new();

        for (index, reading) in window.iter().enumerate() {
            self.check_temperature(reading, &mut anomalies);
            self.check_humidity(reading, &mut anomalies);
            self.check_daylight(reading, &mut anomalies);
            self.check_soil(reading, &mut anomalies);

            if index > 0 {
                self.check_deltas(&window[index - 1], reading, &mut anomalies);
            }
        }

        // Stable: events from the same reading keep rule order. Unparsable
        // timestamps sink to the end.
        anomalies.sort_by_cached_key(|a| {
            Reverse(
                parse_timestamp(&a.timestamp)
                    .map(|t| t.epoch_ms)
                    .unwrap_or(i64::MIN),
            )
        });
        anomalies
    }

    /// Build the report view: totals per severity and the busiest hour.
    pub fn report(&self, location: &str, readings: &[SensorReading]) -> AnomalyReport {
        let anomalies = self.classify(readings);
        let peak_hour = peak_hour(&anomalies);
        AnomalyReport::new(location.to_string(), anomalies, peak_hour)
    }

    fn check_temperature(&self, reading: &SensorReading, out: &mut Vec<AnomalyEvent>) {
        let t = &self.thresholds;
        let Some(temperature) = reading.temperature else {
            return;
        };
        if temperature > t.temp_warning_c {
            let critical = temperature > t.temp_critical_c;
            out.push(AnomalyEvent::new(
                &reading.timestamp,
                "Temp-ZB-01",
                format!("Temperatura elevada ({}°C)", temperature),
                if critical { "Alto" } else { "Medio-Alto" },
                if critical { Severity::Critical } else { Severity::Warning },
            ));
        }
    }

    fn check_humidity(&self, reading: &SensorReading, out: &mut Vec<AnomalyEvent>) {
        let t = &self.thresholds;
        let Some(humidity) = reading.humidity else {
            return;
        };
        let low = humidity < t.humidity_low_warning_pct;
        if low || humidity > t.humidity_high_warning_pct {
            let critical =
                humidity < t.humidity_low_critical_pct || humidity > t.humidity_high_critical_pct;
            let description = if low {
                format!("Humedad baja ({}%)", humidity)
            } else {
                format!("Humedad excesiva ({}%)", humidity)
            };
            out.push(AnomalyEvent::new(
                &reading.timestamp,
                "Hum-ZB-02",
                description,
                if critical { "Alto" } else { "Medio" },
                if critical { Severity::Critical } else { Severity::Warning },
            ));
        }
    }

    fn check_daylight(&self, reading: &SensorReading, out: &mut Vec<AnomalyEvent>) {
        let t = &self.thresholds;
        let (Some(luminosity), Some(time)) = (reading.luminosity, reading.time()) else {
            return;
        };
        let daytime = (t.daylight_start_hour..=t.daylight_end_hour).contains(&time.hour);
        if daytime && luminosity < t.luminosity_info_lux {
            let warning = luminosity < t.luminosity_warning_lux;
            out.push(AnomalyEvent::new(
                &reading.timestamp,
                "Lum-ZB-01",
                format!("Luminosidad baja durante el día ({} lux)", luminosity),
                if warning { "Medio" } else { "Bajo" },
                if warning { Severity::Warning } else { Severity::Info },
            ));
        }
    }

    fn check_soil(&self, reading: &SensorReading, out: &mut Vec<AnomalyEvent>) {
        let t = &self.thresholds;
        let Some(soil) = reading.soil_humidity else {
            return;
        };
        if soil < t.soil_dry_warning_pct {
            let critical = soil < t.soil_dry_critical_pct;
            out.push(AnomalyEvent::new(
                &reading.timestamp,
                "HS-ZB-01",
                format!("Suelo seco ({}%)", soil),
                if critical { "Alto" } else { "Medio" },
                if critical { Severity::Critical } else { Severity::Warning },
            ));
        } else if soil > t.soil_saturated_warning_pct {
            let critical = soil > t.soil_saturated_critical_pct;
            out.push(AnomalyEvent::new(
                &reading.timestamp,
                "HS-ZB-01",
                format!("Suelo saturado ({}%)", soil),
                if critical { "Alto" } else { "Medio" },
                if critical { Severity::Critical } else { Severity::Warning },
            ));
        }
    }

    fn check_deltas(
        &self,
        previous: &SensorReading,
        reading: &SensorReading,
        out: &mut Vec<AnomalyEvent>,
    ) {
        let t = &self.thresholds;

        if let (Some(current), Some(prev)) = (reading.temperature, previous.temperature) {
            let delta = current - prev;
            if delta.abs() > t.temp_jump_c {
                out.push(
                    AnomalyEvent::new(
                        &reading.timestamp,
                        "Temp-ZB-02",
                        format!("Cambio brusco de temperatura (∆{:.1}°C)", delta),
                        "Medio",
                        Severity::Warning,
                    )
                    .with_delta(delta),
                );
            }
        }

        if let (Some(current), Some(prev)) = (reading.humidity, previous.humidity) {
            let delta = current - prev;
            if delta.abs() > t.humidity_swing_pct {
                out.push(
                    AnomalyEvent::new(
                        &reading.timestamp,
                        "Hum-ZB-03",
                        format!("Variación de humedad ∆{:.1}%", delta),
                        "Medio-Bajo",
                        Severity::Info,
                    )
                    .with_delta(delta),
                );
            }
        }
    }
}

/// Hour of day (`HH:00`) with the most anomalies; earliest hour wins ties.
fn peak_hour(anomalies: &[AnomalyEvent]) -> String {
    let mut per_hour = [0usize; 24];
    for anomaly in anomalies {
        if let Some(time) = parse_timestamp(&anomaly.timestamp) {
            per_hour[time.hour as usize] += 1;
        }
    }

    let mut best: Option<(usize, usize)> = None;
    for (hour, &count) in per_hour.iter().enumerate() {
        if count > 0 && best.is_none_or(|(_, c)| count > c) {
            best = Some((hour, count));
        }
    }

    match best {
        Some((hour, _)) => format!("{:02}:00", hour),
        None => NO_PEAK_HOUR.to_string(),
    }
}
