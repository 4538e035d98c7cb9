// HTTP sensor source - Polls the remote `/datos` endpoint
use crate::application::sensor_source::{PollError, SensorSource};
use crate::domain::reading::SensorReading;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpSensorSource {
    url: String,
    client: reqwest::Client,
    timeout: Duration,
    probe_timeout: Duration,
}

impl HttpSensorSource {
    pub fn new(url: String, timeout: Duration, probe_timeout: Duration) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
            timeout,
            probe_timeout,
        }
    }

    fn request(&self, timeout: Duration) -> reqwest::RequestBuilder {
        self.client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .header(CACHE_CONTROL, "no-cache")
            .timeout(timeout)
    }
}

fn classify_error(err: reqwest::Error) -> PollError {
    if err.is_timeout() {
        PollError::Timeout
    } else if err.is_decode() {
        PollError::InvalidPayload(err.to_string())
    } else if let Some(status) = err.status() {
        PollError::HttpError(status.as_u16())
    } else {
        PollError::NetworkUnreachable(err.to_string())
    }
}

#[async_trait]
impl SensorSource for HttpSensorSource {
    async fn fetch_readings(&self) -> Result<Vec<SensorReading>, PollError> {
        let response = self
            .request(self.timeout)
            .send()
            .await
            .map_err(classify_error)?;

        if !response.status().is_success() {
            return Err(PollError::HttpError(response.status().as_u16()));
        }

        let readings = response
            .json::<Vec<SensorReading>>()
            .await
            .map_err(classify_error)?;

        if readings.is_empty() {
            return Err(PollError::EmptyPayload);
        }

        tracing::debug!("Received {} readings from {}", readings.len(), self.url);
        Ok(readings)
    }

    async fn check_connection(&self) -> Result<(), PollError> {
        let response = self
            .request(self.probe_timeout)
            .send()
            .await
            .map_err(classify_error)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(PollError::HttpError(response.status().as_u16()))
        }
    }
}
