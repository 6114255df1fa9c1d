//! Handler implementations and their constructors

pub mod config;
pub mod console;
pub mod factory;
pub mod file;
pub mod markup;
pub mod rich_console;
pub mod rotating_file;
pub mod syslog;
pub mod timed_rotating_file;

#[cfg(feature = "http")]
pub mod http;

pub use config::HandlerConfig;
pub use console::{ConsoleHandler, ConsoleStream, StreamTarget};
pub use factory::{
    create_console_handler, create_file_handler, create_rich_console_handler,
    create_rotating_file_handler, create_syslog_handler, create_timed_rotating_file_handler,
    DEFAULT_BACKUP_COUNT, DEFAULT_MAX_BYTES,
};
pub use file::{EncodingErrors, FileHandler, FileMode, FileOptions, TextEncoding};
pub use markup::render_markup;
pub use rich_console::RichConsoleHandler;
pub use rotating_file::RotatingFileHandler;
pub use syslog::{SocketKind, SyslogAddress, SyslogFacility, SyslogHandler, SYSLOG_UDP_PORT};
pub use timed_rotating_file::{RotationWhen, TimedRotatingFileHandler, TimedRotation};

#[cfg(feature = "http")]
pub use config::HttpCredentials;
#[cfg(feature = "http")]
pub use factory::create_http_handler;
#[cfg(feature = "http")]
pub use http::{HttpHandler, HttpMethod, HttpOptions, TlsOptions};
