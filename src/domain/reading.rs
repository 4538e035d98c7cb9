// Sensor reading domain model
use chrono::{DateTime, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize};

/// One timestamped sample as published by the sensor endpoint.
/// A `None` field means that sensor was offline at that instant.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SensorReading {
    #[serde(default, rename = "temperatura", alias = "temperature")]
    pub temperature: Option<f64>,
    #[serde(default, rename = "humedad", alias = "humidity")]
    pub humidity: Option<f64>,
    #[serde(default, rename = "luminosidad", alias = "luminosity")]
    pub luminosity: Option<f64>,
    #[serde(default, rename = "humedad_suelo", alias = "soil_humidity", alias = "soilHumidity")]
    pub soil_humidity: Option<f64>,
    /// Empty when the record carries no date; such readings stay out of the chart.
    #[serde(
        default,
        rename = "fecha",
        alias = "timestamp",
        deserialize_with = "null_as_empty"
    )]
    pub timestamp: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorField {
    Temperature,
    Humidity,
    Luminosity,
    SoilHumidity,
}

impl SensorField {
    pub const ALL: [SensorField; 4] = [
        SensorField::Temperature,
        SensorField::Humidity,
        SensorField::Luminosity,
        SensorField::SoilHumidity,
    ];
}

/// A reading timestamp resolved to epoch milliseconds plus the wall-clock
/// hour it was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadingTime {
    pub epoch_ms: i64,
    pub hour: u32,
    pub minute: u32,
}

impl SensorReading {
    pub fn new(
        temperature: Option<f64>,
        humidity: Option<f64>,
        luminosity: Option<f64>,
        soil_humidity: Option<f64>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            temperature,
            humidity,
            luminosity,
            soil_humidity,
            timestamp: timestamp.into(),
        }
    }

    pub fn value(&self, field: SensorField) -> Option<f64> {
        match field {
            SensorField::Temperature => self.temperature,
            SensorField::Humidity => self.humidity,
            SensorField::Luminosity => self.luminosity,
            SensorField::SoilHumidity => self.soil_humidity,
        }
    }

    pub fn time(&self) -> Option<ReadingTime> {
        parse_timestamp(&self.timestamp)
    }
}

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse the timestamp formats the endpoint is known to emit:
/// RFC 3339, RFC 2822 and naive ISO-like date-times (taken as UTC).
pub fn parse_timestamp(raw: &str) -> Option<ReadingTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(ReadingTime {
            epoch_ms: dt.timestamp_millis(),
            hour: dt.hour(),
            minute: dt.minute(),
        });
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(ReadingTime {
            epoch_ms: dt.timestamp_millis(),
            hour: dt.hour(),
            minute: dt.minute(),
        });
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| ReadingTime {
            epoch_ms: naive.and_utc().timestamp_millis(),
            hour: naive.hour(),
            minute: naive.minute(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_spanish_payload() {
        let json = r#"[
            {"temperatura": 24.5, "humedad": 55, "luminosidad": null,
             "humedad_suelo": 33.1, "fecha": "2025-04-15 10:00:00"}
        ]"#;
        let readings: Vec<SensorReading> = serde_json::from_str(json).unwrap();

        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].temperature, Some(24.5));
        assert_eq!(readings[0].humidity, Some(55.0));
        assert_eq!(readings[0].luminosity, None);
        assert_eq!(readings[0].soil_humidity, Some(33.1));
    }

    #[test]
    fn test_null_or_missing_date_decodes_as_empty() {
        let json = r#"[
            {"temperatura": 24.5, "fecha": null},
            {"humedad": 40},
            {"humedad": 41, "fecha": "2025-04-15 10:10:00"}
        ]"#;
        let readings: Vec<SensorReading> = serde_json::from_str(json).unwrap();

        assert_eq!(readings.len(), 3);
        assert_eq!(readings[0].timestamp, "");
        assert_eq!(readings[1].timestamp, "");
        assert!(readings[0].time().is_none());
        assert_eq!(readings[2].time().map(|t| t.hour), Some(10));
    }

    #[test]
    fn test_decode_english_payload_with_missing_fields() {
        let json = r#"{"temperature": 21.0, "timestamp": "2025-04-15T08:30:00Z"}"#;
        let reading: SensorReading = serde_json::from_str(json).unwrap();

        assert_eq!(reading.temperature, Some(21.0));
        assert_eq!(reading.humidity, None);
        assert_eq!(reading.soil_humidity, None);
        assert_eq!(reading.value(SensorField::Temperature), Some(21.0));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let rfc3339 = parse_timestamp("2025-04-15T10:15:00+02:00").unwrap();
        assert_eq!(rfc3339.hour, 10);
        assert_eq!(rfc3339.minute, 15);

        let rfc2822 = parse_timestamp("Tue, 15 Apr 2025 14:00:00 GMT").unwrap();
        assert_eq!(rfc2822.hour, 14);

        let naive = parse_timestamp("2025-04-15 10:15:00").unwrap();
        assert_eq!(naive.hour, 10);
        // Same instant as the +02:00 reading only if taken as UTC
        assert_eq!(naive.epoch_ms - rfc3339.epoch_ms, 2 * 3600 * 1000);

        assert!(parse_timestamp("not a date").is_none());
    }
}
