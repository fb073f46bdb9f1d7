//! Centralized error types for the Skylark application.
//!
//! This module provides a typed error hierarchy that:
//! - Enables precise error handling throughout the codebase
//! - Provides user-friendly messages suitable for UI display
//! - Preserves full error context for debugging/logging
//!
//! Fetch-layer errors live next to the fetch code in `skylark-weather`.

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a UI-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure reported by a service crate, with its own UI text.
    #[error("Service error: {message}")]
    Service {
        message: String,
        user_message: &'static str,
    },

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Config(e) => e.user_message(),
            AppError::Storage(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Service { user_message, .. } => *user_message,
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }

    /// Recover the typed error behind an `anyhow` chain.
    ///
    /// Falls back to `Other` when the root is none of the core error types.
    pub fn classify(error: anyhow::Error) -> Self {
        let error = match error.downcast::<ConfigError>() {
            Ok(e) => return AppError::Config(e),
            Err(error) => error,
        };
        let error = match error.downcast::<StorageError>() {
            Ok(e) => return AppError::Storage(e),
            Err(error) => error,
        };
        match error.downcast::<std::io::Error>() {
            Ok(e) => AppError::Io(e),
            Err(error) => AppError::Other(error),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Configuration not found. Using defaults.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::MissingSetting(_) => "A required setting is missing. Check your settings.",
        }
    }
}

/// Preference storage errors (the key-value files under the config directory).
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },

    #[error("Stored data is corrupted: {0}")]
    Corrupted(String),
}

impl StorageError {
    pub fn user_message(&self) -> &'static str {
        match self {
            StorageError::Read { .. } => "Unable to read saved settings. Try restarting the app.",
            StorageError::Write { .. } => "Failed to save your selection. Please try again.",
            StorageError::Corrupted(_) => {
                "Saved data may be corrupted. Consider resetting app data."
            }
        }
    }
}
