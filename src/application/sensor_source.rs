// Source trait for sensor readings
use crate::domain::reading::SensorReading;
use async_trait::async_trait;

/// Why a poll did not produce readings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollError {
    #[error("sensor API unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("sensor API did not answer in time")]
    Timeout,

    #[error("sensor API answered with status {0}")]
    HttpError(u16),

    #[error("no data received from sensor API")]
    EmptyPayload,

    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

impl PollError {
    /// Banner text shown while disconnected.
    pub fn user_message(&self) -> String {
        let detail = match self {
            PollError::NetworkUnreachable(_) => "API desconectada.".to_string(),
            PollError::Timeout => {
                "Tiempo de espera agotado. La API no respondió a tiempo.".to_string()
            }
            PollError::HttpError(status) => format!("Error: Error en la conexión: {}", status),
            PollError::EmptyPayload => "Error: No se recibieron datos de la API".to_string(),
            PollError::InvalidPayload(_) => {
                "Error: Datos inválidos recibidos de la API".to_string()
            }
        };
        format!("Sin Conexión. {}", detail)
    }
}

#[async_trait]
pub trait SensorSource: Send + Sync {
    /// Fetch the full reading history, oldest first. Never returns an empty list.
    async fn fetch_readings(&self) -> Result<Vec<SensorReading>, PollError>;

    /// Cheap reachability check; succeeds on any 2xx answer.
    async fn check_connection(&self) -> Result<(), PollError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(
            PollError::NetworkUnreachable("refused".into()).user_message(),
            "Sin Conexión. API desconectada."
        );
        assert_eq!(
            PollError::Timeout.user_message(),
            "Sin Conexión. Tiempo de espera agotado. La API no respondió a tiempo."
        );
        assert_eq!(
            PollError::HttpError(503).user_message(),
            "Sin Conexión. Error: Error en la conexión: 503"
        );
        assert_eq!(
            PollError::EmptyPayload.user_message(),
            "Sin Conexión. Error: No se recibieron datos de la API"
        );
        // Decoder detail stays in the logs
        assert_eq!(
            PollError::InvalidPayload("error decoding response body".into()).user_message(),
            "Sin Conexión. Error: Datos inválidos recibidos de la API"
        );
    }
}
