//! Serializable handler descriptions
//!
//! [`HandlerConfig`] describes any handler variant as data, so handlers can
//! be declared in JSON, validated, and only then constructed.
//!
//! ```
//! use logger_config::core::{Formatter, Handler, LogLevel};
//! use logger_config::handlers::HandlerConfig;
//!
//! let config = HandlerConfig::from_json(r#"{"kind": "console", "stream": "stderr"}"#).unwrap();
//! let handler = config.build(LogLevel::Info, Formatter::default()).unwrap();
//! assert_eq!(handler.lock().name(), "console");
//! ```

use super::console::StreamTarget;
use super::factory;
use super::file::FileOptions;
use super::rotating_file::{DEFAULT_BACKUP_COUNT, DEFAULT_MAX_BYTES};
use super::syslog::{SocketKind, SyslogAddress, SyslogFacility};
use super::timed_rotating_file::TimedRotation;
use crate::core::{shared, Formatter, HandlerKind, LogLevel, LoggerError, Result, SharedHandler};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[cfg(feature = "http")]
use super::http::{HttpMethod, HttpOptions};

fn default_true() -> bool {
    true
}

fn default_max_bytes() -> u64 {
    DEFAULT_MAX_BYTES
}

fn default_backup_count() -> usize {
    DEFAULT_BACKUP_COUNT
}

fn default_syslog_address() -> String {
    SyslogAddress::default().to_string()
}

#[cfg(feature = "http")]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpCredentials {
    pub username: String,
    pub password: String,
}

/// One handler, described as data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HandlerConfig {
    Console {
        #[serde(default)]
        stream: StreamTarget,
    },
    RichConsole {
        #[serde(default = "default_true")]
        markup: bool,
        #[serde(default = "default_true")]
        rich_tracebacks: bool,
    },
    File {
        path: PathBuf,
        #[serde(default)]
        options: FileOptions,
    },
    RotatingFile {
        path: PathBuf,
        #[serde(default = "default_max_bytes")]
        max_bytes: u64,
        #[serde(default = "default_backup_count")]
        backup_count: usize,
        #[serde(default)]
        compress: bool,
        #[serde(default)]
        options: FileOptions,
    },
    TimedRotatingFile {
        path: PathBuf,
        #[serde(default)]
        rotation: TimedRotation,
        #[serde(default)]
        options: FileOptions,
    },
    Syslog {
        /// `host:port` or a Unix socket path
        #[serde(default = "default_syslog_address")]
        address: String,
        #[serde(default)]
        facility: SyslogFacility,
        #[serde(default)]
        socket: SocketKind,
    },
    #[cfg(feature = "http")]
    Http {
        host: String,
        url: String,
        #[serde(default)]
        method: HttpMethod,
        #[serde(default)]
        secure: bool,
        #[serde(default)]
        credentials: Option<HttpCredentials>,
        #[serde(default)]
        accept_invalid_certs: bool,
    },
}

impl HandlerConfig {
    /// Parse and validate a JSON description
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::InvalidConfiguration`] for malformed JSON,
    /// unknown kinds, or values that fail [`HandlerConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self> {
        let config: HandlerConfig =
            serde_json::from_str(json)
                .map_err(|e| LoggerError::config("HandlerConfig", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn kind(&self) -> HandlerKind {
        match self {
            HandlerConfig::Console { .. } => HandlerKind::Console,
            HandlerConfig::RichConsole { .. } => HandlerKind::RichConsole,
            HandlerConfig::File { .. } => HandlerKind::File,
            HandlerConfig::RotatingFile { .. } => HandlerKind::RotatingFile,
            HandlerConfig::TimedRotatingFile { .. } => HandlerKind::TimedRotatingFile,
            HandlerConfig::Syslog { .. } => HandlerKind::Syslog,
            #[cfg(feature = "http")]
            HandlerConfig::Http { .. } => HandlerKind::Http,
        }
    }

    fn check_path(component: &str, path: &std::path::Path) -> Result<()> {
        if path.as_os_str().is_empty() {
            return Err(LoggerError::config(component, "path must not be empty"));
        }
        Ok(())
    }

    /// Check values without touching the file system or network
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::InvalidConfiguration`] naming the offending
    /// handler kind.
    pub fn validate(&self) -> Result<()> {
        let component = self.kind().as_str();
        match self {
            HandlerConfig::Console { .. } | HandlerConfig::RichConsole { .. } => Ok(()),
            HandlerConfig::File { path, .. } | HandlerConfig::RotatingFile { path, .. } => {
                Self::check_path(component, path)
            }
            HandlerConfig::TimedRotatingFile { path, rotation, .. } => {
                Self::check_path(component, path)?;
                rotation.validate()
            }
            HandlerConfig::Syslog { address, .. } => address.parse::<SyslogAddress>().map(|_| ()),
            #[cfg(feature = "http")]
            HandlerConfig::Http { host, url, .. } => {
                let absolute = url.starts_with("http://") || url.starts_with("https://");
                if url.trim().is_empty() {
                    return Err(LoggerError::config(component, "url must not be empty"));
                }
                if !absolute && host.trim().is_empty() {
                    return Err(LoggerError::config(component, "host must not be empty"));
                }
                Ok(())
            }
        }
    }

    /// Validate, then construct the described handler
    ///
    /// # Errors
    ///
    /// Returns validation errors, or whatever the handler's constructor
    /// reports (unopenable file, unreachable stream socket, ...).
    pub fn build(&self, level: LogLevel, formatter: Formatter) -> Result<SharedHandler> {
        self.validate()?;
        let handler = match self {
            HandlerConfig::Console { stream } => {
                shared(factory::create_console_handler(level, formatter, (*stream).into()))
            }
            HandlerConfig::RichConsole {
                markup,
                rich_tracebacks,
            } => shared(factory::create_rich_console_handler(
                level,
                formatter,
                *markup,
                *rich_tracebacks,
            )),
            HandlerConfig::File { path, options } => shared(factory::create_file_handler(
                level,
                formatter,
                path.clone(),
                options.clone(),
            )?),
            HandlerConfig::RotatingFile {
                path,
                max_bytes,
                backup_count,
                compress,
                options,
            } => shared(
                factory::create_rotating_file_handler(
                    level,
                    formatter,
                    path.clone(),
                    *max_bytes,
                    *backup_count,
                    options.clone(),
                )?
                .with_compression(*compress),
            ),
            HandlerConfig::TimedRotatingFile {
                path,
                rotation,
                options,
            } => shared(factory::create_timed_rotating_file_handler(
                level,
                formatter,
                path.clone(),
                rotation.clone(),
                options.clone(),
            )?),
            HandlerConfig::Syslog {
                address,
                facility,
                socket,
            } => shared(factory::create_syslog_handler(
                level,
                formatter,
                address.parse()?,
                *facility,
                *socket,
            )?),
            #[cfg(feature = "http")]
            HandlerConfig::Http {
                host,
                url,
                method,
                secure,
                credentials,
                accept_invalid_certs,
            } => {
                let mut options = HttpOptions::new().with_method(*method).with_secure(*secure);
                options.tls.accept_invalid_certs = *accept_invalid_certs;
                if let Some(credentials) = credentials {
                    options =
                        options.with_credentials(&credentials.username, &credentials.password);
                }
                shared(factory::create_http_handler(level, formatter, host, url, options)?)
            }
        };
        Ok(handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Handler;
    use crate::handlers::{FileMode, RotationWhen};
    use tempfile::tempdir;

    #[test]
    fn test_defaults_per_variant() {
        let config = HandlerConfig::from_json(r#"{"kind": "rich_console"}"#).unwrap();
        assert_eq!(
            config,
            HandlerConfig::RichConsole {
                markup: true,
                rich_tracebacks: true
            }
        );

        let config =
            HandlerConfig::from_json(r#"{"kind": "rotating_file", "path": "app.log"}"#).unwrap();
        match config {
            HandlerConfig::RotatingFile {
                max_bytes,
                backup_count,
                compress,
                ..
            } => {
                assert_eq!(max_bytes, 100 * 1024);
                assert_eq!(backup_count, 1);
                assert!(!compress);
            }
            other => panic!("unexpected config: {:?}", other),
        }

        let config = HandlerConfig::from_json(r#"{"kind": "syslog"}"#).unwrap();
        assert_eq!(
            config,
            HandlerConfig::Syslog {
                address: "localhost:514".to_string(),
                facility: SyslogFacility::User,
                socket: SocketKind::Datagram,
            }
        );
    }

    #[test]
    fn test_nested_options() {
        let json = r#"{
            "kind": "timed_rotating_file",
            "path": "logs/app.log",
            "rotation": {"when": {"weekday": 2}, "backup_count": 4},
            "options": {"mode": "truncate", "delay": true}
        }"#;
        match HandlerConfig::from_json(json).unwrap() {
            HandlerConfig::TimedRotatingFile { rotation, options, .. } => {
                assert_eq!(rotation.when, RotationWhen::Weekday(2));
                assert_eq!(rotation.interval, 1);
                assert_eq!(rotation.backup_count, 4);
                assert_eq!(options.mode, FileMode::Truncate);
                assert!(options.delay);
            }
            other => panic!("unexpected config: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_descriptions() {
        for json in [
            "not json",
            r#"{"kind": "carrier_pigeon"}"#,
            r#"{"kind": "file"}"#,
            r#"{"kind": "file", "path": ""}"#,
            r#"{"kind": "timed_rotating_file", "path": "a.log", "rotation": {"interval": 0}}"#,
            r#"{"kind": "timed_rotating_file", "path": "a.log",
                "rotation": {"when": {"weekday": 7}}}"#,
            r#"{"kind": "timed_rotating_file", "path": "a.log",
                "rotation": {"interval": 3000000000}}"#,
            r#"{"kind": "timed_rotating_file", "path": "a.log",
                "rotation": {"when": "days", "interval": 1000000000}}"#,
            r#"{"kind": "syslog", "address": "host:0"}"#,
        ] {
            assert!(
                matches!(
                    HandlerConfig::from_json(json),
                    Err(LoggerError::InvalidConfiguration { .. })
                ),
                "accepted: {}",
                json
            );
        }
    }

    #[test]
    fn test_build_file_handler() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("built.log");
        let config = HandlerConfig::File {
            path: path.clone(),
            options: FileOptions::default(),
        };

        let handler = config
            .build(LogLevel::Warning, Formatter::new("{message}").unwrap())
            .unwrap();
        {
            let mut guard = handler.lock();
            assert_eq!(guard.kind(), HandlerKind::File);
            assert_eq!(guard.level(), LogLevel::Warning);
            guard
                .handle(&crate::core::LogRecord::new("c", LogLevel::Error, "written"))
                .unwrap();
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "written\n");
    }

    #[test]
    fn test_round_trip_through_json() {
        let config = HandlerConfig::RotatingFile {
            path: PathBuf::from("svc.log"),
            max_bytes: 2048,
            backup_count: 3,
            compress: true,
            options: FileOptions::default(),
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"kind\":\"rotating_file\""));
        assert_eq!(HandlerConfig::from_json(&json).unwrap(), config);
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_http_description() {
        let json = r#"{"kind": "http", "host": "collector:8080", "url": "/log",
                       "method": "POST", "credentials": {"username": "u", "password": "p"}}"#;
        let config = HandlerConfig::from_json(json).unwrap();
        assert_eq!(config.kind(), HandlerKind::Http);

        let handler = config.build(LogLevel::Error, Formatter::default()).unwrap();
        assert_eq!(handler.lock().kind(), HandlerKind::Http);

        let empty_host = r#"{"kind": "http", "host": "", "url": "/log"}"#;
        assert!(HandlerConfig::from_json(empty_host).is_err());
    }
}
