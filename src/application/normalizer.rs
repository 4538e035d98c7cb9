// Normalizer - Raw readings to chart series and card values
use crate::domain::chart::{ChartPoint, CurrentValues, OfflineFlags};
use crate::domain::reading::{SensorField, SensorReading};
use chrono::DateTime;

/// Readings considered for charting.
pub const CHART_WINDOW: usize = 12;
/// Points kept after downsampling.
pub const CHART_MAX_POINTS: usize = 6;
/// Size of the synthetic series used when there is nothing to plot.
pub const FALLBACK_POINTS: usize = 8;

/// Chart placeholders for offline sensors.
pub const DEFAULT_TEMPERATURE_C: f64 = 25.0;
pub const DEFAULT_HUMIDITY_PCT: f64 = 50.0;
pub const DEFAULT_LUMINOSITY_LUX: f64 = 500.0;
pub const DEFAULT_SOIL_HUMIDITY_PCT: f64 = 40.0;

const OSCILLATION_RATIO: f64 = 0.02;
const OSCILLATION_MIN: f64 = 0.1;
const HOUR_MS: i64 = 3_600_000;

#[derive(Debug, Clone)]
pub struct NormalizedReadings {
    pub current: CurrentValues,
    pub offline: OfflineFlags,
    pub chart: Vec<ChartPoint>,
}

pub fn normalize(readings: &[SensorReading], now_ms: i64) -> NormalizedReadings {
    NormalizedReadings {
        current: current_values(readings),
        offline: offline_flags(readings),
        chart: chart_series(readings, now_ms),
    }
}

/// A field is offline iff it is null in the latest reading.
pub fn offline_flags(readings: &[SensorReading]) -> OfflineFlags {
    readings
        .last()
        .map(OfflineFlags::from_reading)
        .unwrap_or_else(OfflineFlags::all_offline)
}

pub fn current_values(readings: &[SensorReading]) -> CurrentValues {
    readings
        .last()
        .map(CurrentValues::from_reading)
        .unwrap_or_else(CurrentValues::zeroed)
}

/// Build the displayed series from the last `CHART_WINDOW` readings.
/// Never returns an empty series.
pub fn chart_series(readings: &[SensorReading], now_ms: i64) -> Vec<ChartPoint> {
    let window = &readings[readings.len().saturating_sub(CHART_WINDOW)..];

    let mut points: Vec<ChartPoint> = window.iter().filter_map(to_chart_point).collect();
    if points.is_empty() {
        return fallback_series(now_ms);
    }

    points.sort_by_key(|p| p.timestamp_ms);
    let mut points = downsample(&points, CHART_MAX_POINTS);
    apply_oscillation(&mut points);
    points
}

/// Hourly synthetic series ending at `now_ms`.
pub fn fallback_series(now_ms: i64) -> Vec<ChartPoint> {
    let mut points: Vec<ChartPoint> = (0..FALLBACK_POINTS as i64)
        .rev()
        .map(|hours_ago| {
            let timestamp_ms = now_ms - hours_ago * HOUR_MS;
            ChartPoint {
                label: label_for_epoch(timestamp_ms),
                temperature: DEFAULT_TEMPERATURE_C,
                humidity: DEFAULT_HUMIDITY_PCT,
                luminosity: DEFAULT_LUMINOSITY_LUX,
                soil_humidity: DEFAULT_SOIL_HUMIDITY_PCT,
                timestamp_ms,
            }
        })
        .collect();

    apply_oscillation(&mut points);
    points
}

/// Even-stride selection down to `max_points`, keeping first and last.
pub fn downsample<T: Clone>(points: &[T], max_points: usize) -> Vec<T> {
    if points.len() <= max_points || max_points < 2 {
        return points.to_vec();
    }

    let stride = (points.len() - 1) as f64 / (max_points - 1) as f64;
    (0..max_points)
        .map(|i| {
            let idx = ((i as f64 * stride).round() as usize).min(points.len() - 1);
            points[idx].clone()
        })
        .collect()
}

fn to_chart_point(reading: &SensorReading) -> Option<ChartPoint> {
    let time = reading.time()?;
    Some(ChartPoint {
        label: format!("{:02}:{:02}", time.hour, time.minute),
        temperature: reading.temperature.unwrap_or(DEFAULT_TEMPERATURE_C),
        humidity: reading.humidity.unwrap_or(DEFAULT_HUMIDITY_PCT),
        luminosity: reading.luminosity.unwrap_or(DEFAULT_LUMINOSITY_LUX),
        soil_humidity: reading.soil_humidity.unwrap_or(DEFAULT_SOIL_HUMIDITY_PCT),
        timestamp_ms: time.epoch_ms,
    })
}

fn label_for_epoch(epoch_ms: i64) -> String {
    DateTime::from_timestamp_millis(epoch_ms)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

/// Nudge repeated values so flat lines stay distinguishable on a chart.
/// The offset for point `i` is `amplitude * sin(1.3 i + 0.5)`, which is never
/// zero and never repeats between neighbouring integers.
fn apply_oscillation(points: &mut [ChartPoint]) {
    for field in SensorField::ALL {
        let original: Vec<f64> = points.iter().map(|p| p.value(field)).collect();
        for i in 1..points.len() {
            if original[i] == original[i - 1] {
                let amplitude = (original[i].abs() * OSCILLATION_RATIO).max(OSCILLATION_MIN);
                *points[i].value_mut(field) += amplitude * (i as f64 * 1.3 + 0.5).sin();
            }
        }
    }
}
