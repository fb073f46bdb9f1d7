//! Fetch-layer error types.

use skylark_core::{AppError, StorageError};
use thiserror::Error;

/// Everything a search, weather refresh or place lookup can fail with.
///
/// `Clone` so one terminal result can be handed to several observers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WeatherError {
    /// Network/connection failure before a response arrived.
    #[error("{endpoint} request failed: {message}")]
    Transport {
        endpoint: &'static str,
        message: String,
    },

    /// Envelope status other than `ok`; carries the literal status.
    #[error("{endpoint} response status is {status}")]
    RemoteStatus {
        endpoint: &'static str,
        status: String,
    },

    /// Transport succeeded but there was no usable body.
    #[error("{endpoint} response body is empty: {reason}")]
    EmptyBody {
        endpoint: &'static str,
        reason: String,
    },

    /// Nothing stored under the given key.
    #[error("Nothing saved under '{0}'")]
    NotFound(String),

    /// At least one half of the weather join failed.
    #[error("realtime response status is {realtime}, daily response status is {daily}")]
    Aggregate { realtime: String, daily: String },

    #[error("Storage error: {0}")]
    Storage(String),

    /// The background task panicked or was torn down.
    #[error("Background task failed: {0}")]
    Task(String),

    /// The observer gave up on the result.
    #[error("Request cancelled")]
    Cancelled,
}

impl WeatherError {
    pub(crate) fn transport(endpoint: &'static str, error: &reqwest::Error) -> Self {
        let message = if error.is_connect() {
            format!("connection failed: {}", error)
        } else if error.is_timeout() {
            format!("timed out: {}", error)
        } else {
            error.to_string()
        };
        Self::Transport { endpoint, message }
    }

    pub(crate) fn empty_body(endpoint: &'static str, reason: impl Into<String>) -> Self {
        Self::EmptyBody {
            endpoint,
            reason: reason.into(),
        }
    }

    /// The fragment used when this error is one side of a joined failure:
    /// the literal status for remote rejections, the full description otherwise.
    pub fn status_fragment(&self) -> String {
        match self {
            Self::RemoteStatus { status, .. } => status.clone(),
            other => other.to_string(),
        }
    }

    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "Unable to reach the weather service. Check your connection.",
            Self::RemoteStatus { .. } | Self::EmptyBody { .. } | Self::Aggregate { .. } => {
                "Weather data is unavailable right now. Please try again."
            }
            Self::NotFound(_) => "No place has been saved yet.",
            Self::Storage(_) => "Unable to access saved data. Please try again.",
            Self::Task(_) => "Something went wrong. Please try again.",
            Self::Cancelled => "The request was cancelled.",
        }
    }
}

impl From<StorageError> for WeatherError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error.to_string())
    }
}

impl From<WeatherError> for AppError {
    fn from(error: WeatherError) -> Self {
        AppError::Service {
            user_message: error.user_message(),
            message: error.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for WeatherError {
    fn from(error: tokio::task::JoinError) -> Self {
        if error.is_cancelled() {
            return Self::Cancelled;
        }
        match error.try_into_panic() {
            Ok(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "task panicked".to_string());
                Self::Task(message)
            }
            Err(error) => Self::Task(error.to_string()),
        }
    }
}
