//! Error types for the logger configuration system

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

    /// JSON deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// File handler error with path
    #[error("File handler error for '{path}': {message}")]
    FileHandlerError { path: String, message: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotationError { path: String, message: String },

    /// Text could not be encoded with the handler's encoding
    #[error("Cannot encode character {character:?} as {encoding}")]
    EncodingError { encoding: String, character: char },

    /// Network (syslog) error
    #[error("Network error for '{address}': {message}")]
    NetworkError { address: String, message: String },

    /// HTTP handler error
    #[error("HTTP error for '{url}': {message}")]
    HttpError { url: String, message: String },

    /// Formatter error with the offending template
    #[error("Formatter error ({template}): {message}")]
    FormatterError { template: String, message: String },

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

    /// Create a file handler error
    pub fn file_handler(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileHandlerError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotationError {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn encoding(encoding: impl Into<String>, character: char) -> Self {
        LoggerError::EncodingError {
            encoding: encoding.into(),
            character,
        }
    }

    /// Create a network error
    pub fn network(address: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::NetworkError {
            address: address.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP error
    pub fn http(url: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::HttpError {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a formatter error
    pub fn formatter(template: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FormatterError {
            template: template.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}
