//! Core logger types and traits

pub mod error;
pub mod formatter;
pub mod handler;
pub mod log_level;
pub mod log_record;
pub mod logger;
pub mod logger_registry;
pub mod metrics;
pub mod registry;
pub mod timestamp;

pub use error::{LoggerError, Result};
pub use formatter::{Field, Formatter, DEFAULT_FORMAT, DEFAULT_FORMATTER};
pub use handler::{shared, Handler, HandlerKind, SharedHandler};
pub use log_level::LogLevel;
pub use log_record::LogRecord;
pub use logger::{Logger, DEFAULT_LOGGER_LEVEL};
pub use logger_registry::LoggerRegistry;
pub use metrics::LoggerMetrics;
pub use registry::Registry;
pub use timestamp::TimestampFormat;
