//! Handler constructors
//!
//! One function per handler variant. Each takes the severity threshold and
//! formatter first, followed by the variant's own settings, and returns a
//! ready-to-attach handler.

use super::console::{ConsoleHandler, ConsoleStream};
use super::file::{FileHandler, FileOptions};
use super::rich_console::RichConsoleHandler;
use super::rotating_file::RotatingFileHandler;
use super::syslog::{SocketKind, SyslogAddress, SyslogFacility, SyslogHandler};
use super::timed_rotating_file::{TimedRotatingFileHandler, TimedRotation};
use crate::core::{Formatter, LogLevel, Result};
use std::path::PathBuf;

#[cfg(feature = "http")]
use super::http::{HttpHandler, HttpOptions};

pub use super::rotating_file::{DEFAULT_BACKUP_COUNT, DEFAULT_MAX_BYTES};

/// Console handler on stdout, stderr or a caller-supplied writer
pub fn create_console_handler(
    level: LogLevel,
    formatter: Formatter,
    stream: ConsoleStream,
) -> ConsoleHandler {
    ConsoleHandler::new(level, formatter, stream)
}

/// Colorized console handler; see [`RichConsoleHandler`]
pub fn create_rich_console_handler(
    level: LogLevel,
    formatter: Formatter,
    markup: bool,
    rich_tracebacks: bool,
) -> RichConsoleHandler {
    RichConsoleHandler::new(level, formatter)
        .with_markup(markup)
        .with_rich_tracebacks(rich_tracebacks)
}

/// Plain file handler
///
/// # Errors
///
/// Returns an error if the file cannot be created or opened
pub fn create_file_handler(
    level: LogLevel,
    formatter: Formatter,
    path: impl Into<PathBuf>,
    options: FileOptions,
) -> Result<FileHandler> {
    FileHandler::new(level, formatter, path, options)
}

/// Size-rotating file handler; [`DEFAULT_MAX_BYTES`] and
/// [`DEFAULT_BACKUP_COUNT`] are the usual settings
///
/// # Errors
///
/// Returns an error if the file cannot be created or opened
pub fn create_rotating_file_handler(
    level: LogLevel,
    formatter: Formatter,
    path: impl Into<PathBuf>,
    max_bytes: u64,
    backup_count: usize,
    options: FileOptions,
) -> Result<RotatingFileHandler> {
    RotatingFileHandler::new(level, formatter, path, max_bytes, backup_count, options)
}

/// Time-rotating file handler
///
/// # Errors
///
/// Returns an error for invalid rotation settings or if the file cannot be
/// created or opened
pub fn create_timed_rotating_file_handler(
    level: LogLevel,
    formatter: Formatter,
    path: impl Into<PathBuf>,
    rotation: TimedRotation,
    options: FileOptions,
) -> Result<TimedRotatingFileHandler> {
    TimedRotatingFileHandler::new(level, formatter, path, rotation, options)
}

/// Syslog handler
///
/// # Errors
///
/// Returns an error if the address does not resolve or a stream socket
/// cannot connect
pub fn create_syslog_handler(
    level: LogLevel,
    formatter: Formatter,
    address: SyslogAddress,
    facility: SyslogFacility,
    socket_kind: SocketKind,
) -> Result<SyslogHandler> {
    SyslogHandler::new(level, formatter, address, facility, socket_kind)
}

/// HTTP handler; `url` may be a path on `host` or an absolute URL
///
/// # Errors
///
/// Returns an error for an empty host or url, or unusable TLS settings
#[cfg(feature = "http")]
pub fn create_http_handler(
    level: LogLevel,
    formatter: Formatter,
    host: &str,
    url: &str,
    options: HttpOptions,
) -> Result<HttpHandler> {
    HttpHandler::new(level, formatter, host, url, options)
}
