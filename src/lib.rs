//! # Logger Config
//!
//! Named loggers assembled from registries of formatters and handlers.
//!
//! ## Features
//!
//! - **Registries**: ordered, keyed formatters and handlers seeded with sane defaults
//! - **Handlers**: console, rich console, file, size/time rotation, syslog and HTTP
//! - **Thread Safe**: loggers and handlers are shared across threads
//! - **Easy to Use**: one call to get a logger writing to console and file
//!
//! ```no_run
//! use logger_config::{info, LoggerConfig};
//!
//! let mut config = LoggerConfig::new(Some("app"), None).unwrap();
//! config.add_handler_logger("rotating_file").unwrap();
//!
//! let logger = config.get_current_logger();
//! info!(logger, "listening on port {}", 8080);
//! ```

pub mod config;
pub mod core;
pub mod handlers;
pub mod macros;

pub mod prelude {
    pub use crate::config::{LoggerConfig, LoggerConfigBuilder};
    pub use crate::core::{
        Formatter, Handler, HandlerKind, LogLevel, LogRecord, Logger, LoggerError, LoggerRegistry,
        Result, SharedHandler, TimestampFormat,
    };
    pub use crate::handlers::{ConsoleStream, FileOptions, HandlerConfig, SyslogAddress};
}

pub use config::{derive_log_dir, LoggerConfig, LoggerConfigBuilder, DEFAULT_MODULE_NAME};
pub use core::{
    shared, Formatter, Handler, HandlerKind, LogLevel, LogRecord, Logger, LoggerError,
    LoggerMetrics, LoggerRegistry, Registry, Result, SharedHandler, TimestampFormat,
    DEFAULT_FORMAT, DEFAULT_FORMATTER,
};
pub use handlers::{
    create_console_handler, create_file_handler, create_rich_console_handler,
    create_rotating_file_handler, create_syslog_handler, create_timed_rotating_file_handler,
    ConsoleHandler, ConsoleStream, FileHandler, FileOptions, HandlerConfig, RichConsoleHandler,
    RotatingFileHandler, RotationWhen, SocketKind, SyslogAddress, SyslogFacility, SyslogHandler,
    TimedRotatingFileHandler, TimedRotation,
};

#[cfg(feature = "http")]
pub use handlers::{create_http_handler, HttpHandler, HttpMethod, HttpOptions};
