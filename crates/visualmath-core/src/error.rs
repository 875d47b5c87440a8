//! Error types for the VisualMath core library.

use thiserror::Error;

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error types for VisualMath.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration loading or parsing error.
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A record violates a model invariant.
    #[error("Invalid {entity} {id}: {message}")]
    Invalid {
        entity: &'static str,
        id: i64,
        message: String,
    },

    /// File system I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic configuration crate error.
    #[error("Config crate error: {0}")]
    ConfigCrate(#[from] config::ConfigError),
}

impl CoreError {
    /// Create a new configuration error with a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source.
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new invariant violation for a lesson.
    pub fn invalid_lesson(id: i64, message: impl Into<String>) -> Self {
        Self::Invalid {
            entity: "lesson",
            id,
            message: message.into(),
        }
    }

    /// Create a new invariant violation for a task.
    pub fn invalid_task(id: i64, message: impl Into<String>) -> Self {
        Self::Invalid {
            entity: "task",
            id,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = CoreError::config("missing field");
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("missing field"));
    }

    #[test]
    fn test_invalid_lesson_error() {
        let err = CoreError::invalid_lesson(12, "title cannot be empty");
        assert_eq!(
            err.to_string(),
            "Invalid lesson 12: title cannot be empty"
        );
    }

    #[test]
    fn test_invalid_task_error() {
        let err = CoreError::invalid_task(7, "code cannot be empty");
        assert!(err.to_string().contains("task 7"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CoreError = io_err.into();
        assert!(err.to_string().contains("IO error"));
    }
}
