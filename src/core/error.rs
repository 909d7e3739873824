//! Error types for the logger

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// A sink rejected a rendered line
    #[error("Sink '{sink}' failed: {message}")]
    SinkError { sink: String, message: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a sink failure error
    pub fn sink(sink: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::SinkError {
            sink: sink.into(),
            message: message.into(),
        }
    }

    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::config("LoggerConfig", "unknown level");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerError::sink("notification", "notify-send not found");
        assert!(matches!(err, LoggerError::SinkError { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::config("LoggerConfig", "unknown level 'loud'");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for LoggerConfig: unknown level 'loud'"
        );

        let err = LoggerError::sink("file", "disk full");
        assert_eq!(err.to_string(), "Sink 'file' failed: disk full");

        assert_eq!(LoggerError::other("queue closed").to_string(), "queue closed");
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("opening log file", "cannot open", io_err);

        assert!(err.to_string().contains("opening log file"));
        assert!(err.to_string().contains("cannot open"));
    }
}
