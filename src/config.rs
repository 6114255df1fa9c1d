//! Logger configuration
//!
//! [`LoggerConfig`] keeps two ordered registries, formatters and handlers,
//! seeded with a default formatter and `console` / `file` handlers, and
//! assembles a named [`Logger`] from whatever handlers are registered.
//!
//! # Example
//!
//! ```no_run
//! use logger_config::{LogLevel, LoggerConfig};
//!
//! let mut config = LoggerConfig::new(Some("billing"), Some(LogLevel::Info)).unwrap();
//! assert_eq!(config.get_all_handlers().map(|h| h.len()), Some(2));
//!
//! let logger = config.get_current_logger();
//! logger.info("invoice batch started");
//! ```

use crate::core::{
    shared, Formatter, Handler, LogLevel, Logger, LoggerError, LoggerRegistry, Registry, Result,
    SharedHandler, DEFAULT_FORMATTER,
};
use crate::handlers::{
    create_console_handler, create_file_handler, create_rich_console_handler,
    create_rotating_file_handler, create_syslog_handler, create_timed_rotating_file_handler,
    ConsoleStream, FileOptions, HandlerConfig, SocketKind, SyslogAddress, SyslogFacility,
    TimedRotation, DEFAULT_BACKUP_COUNT, DEFAULT_MAX_BYTES,
};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Module name used when none is given
pub const DEFAULT_MODULE_NAME: &str = "default_logger";

/// Environment variable consulted for the logger level
pub const DEFAULT_LEVEL_ENV_VAR: &str = "LOG_LEVEL";

/// Level used when neither an argument nor the environment provides one
pub const FALLBACK_LEVEL: LogLevel = LogLevel::Debug;

/// Directory name created under the working directory for log files
pub const DEFAULT_LOG_DIR_NAME: &str = "logs";

/// Registry key of the default console handler
pub const CONSOLE_HANDLER: &str = "console";

/// Registry key of the default file handler
pub const FILE_HANDLER: &str = "file";

/// Keys `add_handler_logger` can build on demand
pub const WELL_KNOWN_HANDLERS: [&str; 6] = [
    "console",
    "rich_console",
    "file",
    "rotating_file",
    "timed_rotating_file",
    "syslog",
];

/// Resolve the directory log files are written to.
///
/// An existing `requested` directory (relative paths are taken from the
/// working directory) is used as is; otherwise `<cwd>/logs` is created.
///
/// # Errors
///
/// Returns an error if the working directory is unavailable or the fallback
/// directory cannot be created.
pub fn derive_log_dir(requested: Option<&Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir().map_err(|e| {
        LoggerError::io_operation("resolve log directory", "current directory unavailable", e)
    })?;

    if let Some(requested) = requested {
        let candidate = if requested.is_absolute() {
            requested.to_path_buf()
        } else {
            cwd.join(requested)
        };
        if candidate.is_dir() {
            return Ok(candidate);
        }
    }

    let fallback = cwd.join(DEFAULT_LOG_DIR_NAME);
    std::fs::create_dir_all(&fallback).map_err(|e| {
        LoggerError::io_operation(
            "create log directory",
            format!("Failed to create directory '{}'", fallback.display()),
            e,
        )
    })?;
    Ok(fallback)
}

/// Builder for [`LoggerConfig`]
///
/// # Example
///
/// ```no_run
/// use logger_config::{LogLevel, LoggerConfig, LoggerRegistry};
/// use std::sync::Arc;
///
/// let config = LoggerConfig::builder()
///     .module_name("worker")
///     .level(LogLevel::Warning)
///     .log_dir("/var/log/worker")
///     .level_env_var("WORKER_LOG_LEVEL")
///     .registry(Arc::new(LoggerRegistry::new()))
///     .rich_console(true)
///     .build()
///     .unwrap();
/// ```
#[must_use = "call `build` to create the configuration"]
pub struct LoggerConfigBuilder {
    module_name: String,
    level: Option<LogLevel>,
    log_dir: Option<PathBuf>,
    level_env_var: String,
    registry: Option<Arc<LoggerRegistry>>,
    rich_console: bool,
    syslog_address: SyslogAddress,
    console_stream: Option<ConsoleStream>,
}

impl Default for LoggerConfigBuilder {
    fn default() -> Self {
        Self {
            module_name: DEFAULT_MODULE_NAME.to_string(),
            level: None,
            log_dir: None,
            level_env_var: DEFAULT_LEVEL_ENV_VAR.to_string(),
            registry: None,
            rich_console: false,
            syslog_address: SyslogAddress::default(),
            console_stream: None,
        }
    }
}

impl LoggerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = name.into();
        self
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    /// Directory for log files; ignored unless it already exists
    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Environment variable read by `setup_logger` when no level is given
    pub fn level_env_var(mut self, var: impl Into<String>) -> Self {
        self.level_env_var = var.into();
        self
    }

    /// Logger registry to draw loggers from instead of the global one
    pub fn registry(mut self, registry: Arc<LoggerRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Seed `console` with the colorized handler instead of the plain one
    pub fn rich_console(mut self, enabled: bool) -> Self {
        self.rich_console = enabled;
        self
    }

    /// Address used when `add_handler_logger("syslog")` builds a handler
    pub fn syslog_address(mut self, address: SyslogAddress) -> Self {
        self.syslog_address = address;
        self
    }

    /// Stream for the default `console` handler (stdout otherwise)
    pub fn console_stream(mut self, stream: ConsoleStream) -> Self {
        self.console_stream = Some(stream);
        self
    }

    /// # Errors
    ///
    /// Returns an error if the log directory cannot be resolved or the
    /// default log file cannot be opened.
    pub fn build(self) -> Result<LoggerConfig> {
        if self.module_name.trim().is_empty() {
            return Err(LoggerError::config("LoggerConfig", "module name must not be empty"));
        }

        let log_dir = derive_log_dir(self.log_dir.as_deref())?;
        let mut config = LoggerConfig {
            module_name: self.module_name,
            log_dir,
            level: self.level,
            level_env_var: self.level_env_var,
            registry: self.registry.unwrap_or_else(LoggerRegistry::global),
            rich_console: self.rich_console,
            syslog_address: self.syslog_address,
            formatters: Registry::new(),
            handlers: Registry::new(),
            logger: None,
        };

        config
            .formatters
            .insert(DEFAULT_FORMATTER, Formatter::default());

        let level = config.handler_level();
        let formatter = config.default_formatter();
        let console = match self.console_stream {
            Some(stream) if !config.rich_console => {
                shared(create_console_handler(level, formatter.clone(), stream))
            }
            Some(stream) => shared(
                create_rich_console_handler(level, formatter.clone(), true, true)
                    .with_stream(stream),
            ),
            None => config.build_well_known(CONSOLE_HANDLER)?,
        };
        config.handlers.insert(CONSOLE_HANDLER, console);
        let file = config.build_well_known(FILE_HANDLER)?;
        config.handlers.insert(FILE_HANDLER, file);

        Ok(config)
    }
}

/// Formatter and handler registries plus the logger assembled from them
pub struct LoggerConfig {
    module_name: String,
    log_dir: PathBuf,
    level: Option<LogLevel>,
    level_env_var: String,
    registry: Arc<LoggerRegistry>,
    rich_console: bool,
    syslog_address: SyslogAddress,
    formatters: Registry<Formatter>,
    handlers: Registry<SharedHandler>,
    logger: Option<Arc<Logger>>,
}

impl LoggerConfig {
    /// Configuration with default formatter and `console` / `file` handlers.
    ///
    /// `module_name` defaults to [`DEFAULT_MODULE_NAME`]; the file handler
    /// writes to `<log dir>/<module_name>.log`.
    ///
    /// # Errors
    ///
    /// Returns an error if the log directory or default log file cannot be
    /// created.
    pub fn new(module_name: Option<&str>, level: Option<LogLevel>) -> Result<Self> {
        let mut builder = LoggerConfigBuilder::new();
        if let Some(name) = module_name {
            builder = builder.module_name(name);
        }
        if let Some(level) = level {
            builder = builder.level(level);
        }
        builder.build()
    }

    pub fn builder() -> LoggerConfigBuilder {
        LoggerConfigBuilder::new()
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Path of the default file handler
    pub fn log_file_path(&self) -> PathBuf {
        self.log_dir.join(format!("{}.log", self.module_name))
    }

    /// Level given at construction, if any
    pub fn level(&self) -> Option<LogLevel> {
        self.level
    }

    pub fn registry(&self) -> &Arc<LoggerRegistry> {
        &self.registry
    }

    /// Level for `explicit`, falling back to the environment variable and
    /// finally [`FALLBACK_LEVEL`]
    ///
    /// A level given at construction counts as the explicit argument when
    /// `explicit` is `None`, so it also takes precedence over the environment.
    pub fn resolve_level(&self, explicit: Option<LogLevel>) -> LogLevel {
        explicit
            .or(self.level)
            .or_else(|| LogLevel::from_env(&self.level_env_var))
            .unwrap_or(FALLBACK_LEVEL)
    }

    fn handler_level(&self) -> LogLevel {
        self.resolve_level(None)
    }

    /// `DEFAULT_FORMATTER` if registered, else the built-in default template
    fn default_formatter(&self) -> Formatter {
        self.formatters
            .get(DEFAULT_FORMATTER)
            .cloned()
            .unwrap_or_default()
    }

    fn build_well_known(&self, key: &str) -> Result<SharedHandler> {
        let level = self.handler_level();
        let formatter = self.default_formatter();
        let stem = &self.module_name;

        let handler = match key {
            "console" if self.rich_console => {
                shared(create_rich_console_handler(level, formatter, true, true))
            }
            "console" => shared(create_console_handler(level, formatter, ConsoleStream::Stdout)),
            "rich_console" => shared(create_rich_console_handler(level, formatter, true, true)),
            "file" => shared(create_file_handler(
                level,
                formatter,
                self.log_file_path(),
                FileOptions::default(),
            )?),
            "rotating_file" => shared(create_rotating_file_handler(
                level,
                formatter,
                self.log_dir.join(format!("{}.rotating.log", stem)),
                DEFAULT_MAX_BYTES,
                DEFAULT_BACKUP_COUNT,
                FileOptions::default(),
            )?),
            "timed_rotating_file" => shared(create_timed_rotating_file_handler(
                level,
                formatter,
                self.log_dir.join(format!("{}.timed.log", stem)),
                TimedRotation::default(),
                FileOptions::default(),
            )?),
            "syslog" => shared(create_syslog_handler(
                level,
                formatter,
                self.syslog_address.clone(),
                SyslogFacility::default(),
                SocketKind::default(),
            )?),
            other => {
                return Err(LoggerError::config(
                    "LoggerConfig",
                    format!("no default handler for key '{}'", other),
                ))
            }
        };
        Ok(handler)
    }

    // ---- formatters ----

    /// All formatters, or `None` when the registry is empty
    pub fn get_all_formatters(&self) -> Option<&Registry<Formatter>> {
        if self.formatters.is_empty() {
            None
        } else {
            Some(&self.formatters)
        }
    }

    pub fn get_formatter(&self, key: &str) -> Option<&Formatter> {
        self.formatters.get(key)
    }

    /// Insert or replace a formatter, returning the one replaced.
    ///
    /// Handlers built earlier keep the formatter they were built with.
    pub fn update_formatters_list(
        &mut self,
        key: impl Into<String>,
        formatter: Formatter,
    ) -> Option<Formatter> {
        self.formatters.insert(key, formatter)
    }

    pub fn remove_formatter(&mut self, key: &str) -> bool {
        self.formatters.remove(key).is_some()
    }

    /// Remove every formatter, including the default
    pub fn reset_formatters_list(&mut self) {
        self.formatters.clear();
    }

    // ---- handler registry ----

    /// All handlers, or `None` when the registry is empty
    pub fn get_all_handlers(&self) -> Option<&Registry<SharedHandler>> {
        if self.handlers.is_empty() {
            None
        } else {
            Some(&self.handlers)
        }
    }

    pub fn get_handler(&self, key: &str) -> Option<SharedHandler> {
        self.handlers.get(key).cloned()
    }

    /// Register `handler` under `key`, replacing any previous entry.
    ///
    /// The new handler is not attached to the live logger; use
    /// [`add_handler_logger`](Self::add_handler_logger) for that. A replaced
    /// handler is detached.
    pub fn update_handlers_list<H: Handler + 'static>(
        &mut self,
        key: impl Into<String>,
        handler: H,
    ) -> SharedHandler {
        let handler = shared(handler);
        self.register_handler(key, Arc::clone(&handler));
        handler
    }

    /// Register an already shared handler under `key`
    pub fn register_handler(&mut self, key: impl Into<String>, handler: SharedHandler) {
        if let Some(replaced) = self.handlers.insert(key, handler) {
            if let Some(logger) = &self.logger {
                logger.remove_handler(&replaced);
            }
        }
    }

    /// Build a handler from its description and register it under `key`.
    ///
    /// The handler uses the configured level and the default formatter.
    ///
    /// # Errors
    ///
    /// Returns validation or construction errors from
    /// [`HandlerConfig::build`]; the registry is unchanged on error.
    pub fn update_handlers_from_config(
        &mut self,
        key: impl Into<String>,
        config: &HandlerConfig,
    ) -> Result<SharedHandler> {
        let handler = config.build(self.handler_level(), self.default_formatter())?;
        self.register_handler(key, Arc::clone(&handler));
        Ok(handler)
    }

    /// Remove `key` from the registry and detach it from the live logger.
    ///
    /// Returns `false` when `key` is not registered.
    pub fn remove_handler_logger(&mut self, key: &str) -> bool {
        match self.handlers.remove(key) {
            Some(handler) => {
                if let Some(logger) = &self.logger {
                    logger.remove_handler(&handler);
                }
                true
            }
            None => false,
        }
    }

    /// Remove every registry entry. Handlers already attached to the live
    /// logger stay attached.
    pub fn reset_handlers_list(&mut self) {
        self.handlers.clear();
    }

    /// Attach the handler registered under `key` to the live logger.
    ///
    /// An unregistered well-known key (see [`WELL_KNOWN_HANDLERS`]) is first
    /// built from defaults and registered. Returns `Ok(false)` for any other
    /// unknown key.
    ///
    /// # Errors
    ///
    /// Returns an error if a well-known handler cannot be constructed, e.g.
    /// an unresolvable syslog address.
    pub fn add_handler_logger(&mut self, key: &str) -> Result<bool> {
        let handler = match self.handlers.get(key) {
            Some(handler) => Arc::clone(handler),
            None if WELL_KNOWN_HANDLERS.contains(&key) => {
                let handler = self.build_well_known(key)?;
                self.handlers.insert(key, Arc::clone(&handler));
                handler
            }
            None => return Ok(false),
        };

        if let Some(logger) = &self.logger {
            logger.add_handler(handler);
        }
        Ok(true)
    }

    // ---- live logger ----

    /// Detach every handler from the live logger, leaving the registry as is.
    ///
    /// Returns `false` if no logger has been set up yet.
    pub fn reset_handlers_logger(&mut self) -> bool {
        match &self.logger {
            Some(logger) => {
                logger.clear_handlers();
                true
            }
            None => false,
        }
    }

    /// Get or create the named logger, set its level and attach every
    /// registered handler in registry order.
    ///
    /// Level resolution: `level`, then the level given at construction,
    /// then the level environment variable, then [`FALLBACK_LEVEL`].
    pub fn setup_logger(
        &mut self,
        module_name: Option<&str>,
        level: Option<LogLevel>,
    ) -> Arc<Logger> {
        let logger = self
            .registry
            .get_logger(module_name.unwrap_or(self.module_name.as_str()));
        logger.set_level(self.resolve_level(level));

        self.reset_handlers_logger();
        logger.clear_handlers();
        for handler in self.handlers.values() {
            logger.add_handler(Arc::clone(handler));
        }

        self.logger = Some(Arc::clone(&logger));
        logger
    }

    /// The live logger, set up on first use
    pub fn get_current_logger(&mut self) -> Arc<Logger> {
        match &self.logger {
            Some(logger) => Arc::clone(logger),
            None => self.setup_logger(None, None),
        }
    }
}

impl fmt::Debug for LoggerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerConfig")
            .field("module_name", &self.module_name)
            .field("log_dir", &self.log_dir)
            .field("level", &self.resolve_level(None))
            .field("formatters", &self.formatters.keys().collect::<Vec<_>>())
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("logger", &self.logger.as_ref().map(|l| l.name().to_string()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{HandlerKind, LogRecord};
    use crate::handlers::console::test_support::SharedBuffer;
    use crate::handlers::ConsoleHandler;
    use tempfile::{tempdir, TempDir};

    fn config_in(dir: &TempDir, module: &str) -> LoggerConfig {
        LoggerConfig::builder()
            .module_name(module)
            .log_dir(dir.path())
            .level_env_var("LOGGER_CONFIG_UNIT_TEST_UNSET")
            .registry(Arc::new(LoggerRegistry::new()))
            .console_stream(ConsoleStream::writer(SharedBuffer::default()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_fresh_config_defaults() {
        let dir = tempdir().unwrap();
        let config = config_in(&dir, "fresh");

        let formatters = config.get_all_formatters().unwrap();
        assert_eq!(formatters.keys().collect::<Vec<_>>(), vec![DEFAULT_FORMATTER]);

        let handlers = config.get_all_handlers().unwrap();
        assert_eq!(handlers.keys().collect::<Vec<_>>(), vec!["console", "file"]);
        assert_eq!(config.log_file_path(), dir.path().join("fresh.log"));
        assert!(config.log_file_path().exists());
        assert_eq!(config.resolve_level(None), LogLevel::Debug);
    }

    #[test]
    fn test_level_precedence() {
        let dir = tempdir().unwrap();
        std::env::set_var("LOGGER_CONFIG_UNIT_TEST_PRECEDENCE", "error");

        let from_env = LoggerConfig::builder()
            .log_dir(dir.path())
            .level_env_var("LOGGER_CONFIG_UNIT_TEST_PRECEDENCE")
            .registry(Arc::new(LoggerRegistry::new()))
            .console_stream(ConsoleStream::writer(SharedBuffer::default()))
            .build()
            .unwrap();
        assert_eq!(from_env.resolve_level(None), LogLevel::Error);
        assert_eq!(from_env.resolve_level(Some(LogLevel::Info)), LogLevel::Info);

        let constructed = LoggerConfig::builder()
            .log_dir(dir.path())
            .level(LogLevel::Warning)
            .level_env_var("LOGGER_CONFIG_UNIT_TEST_PRECEDENCE")
            .registry(Arc::new(LoggerRegistry::new()))
            .console_stream(ConsoleStream::writer(SharedBuffer::default()))
            .build()
            .unwrap();
        assert_eq!(constructed.resolve_level(None), LogLevel::Warning);
        assert_eq!(constructed.resolve_level(Some(LogLevel::Debug)), LogLevel::Debug);
    }

    #[test]
    fn test_derive_log_dir_falls_back() {
        let dir = tempdir().unwrap();
        assert_eq!(derive_log_dir(Some(dir.path())).unwrap(), dir.path());

        let missing = dir.path().join("does-not-exist");
        let derived = derive_log_dir(Some(&missing)).unwrap();
        assert!(derived.ends_with(DEFAULT_LOG_DIR_NAME));
        assert!(derived.is_dir());
    }

    #[test]
    fn test_formatter_crud() {
        let dir = tempdir().unwrap();
        let mut config = config_in(&dir, "formatters");
        let short = Formatter::new("{levelname}: {message}").unwrap();

        assert!(config.update_formatters_list("short", short.clone()).is_none());
        assert_eq!(config.get_formatter("short"), Some(&short));
        assert!(config.get_formatter("missing").is_none());

        assert!(config.remove_formatter("short"));
        assert!(!config.remove_formatter("short"));

        config.reset_formatters_list();
        assert!(config.get_all_formatters().is_none());
    }

    #[test]
    fn test_remove_handler_detaches_from_logger() {
        let dir = tempdir().unwrap();
        let mut config = config_in(&dir, "remove");
        let logger = config.get_current_logger();
        let file = config.get_handler("file").unwrap();
        assert!(logger.has_handler(&file));

        assert!(!config.remove_handler_logger("absent"));
        assert_eq!(config.get_all_handlers().unwrap().len(), 2);

        assert!(config.remove_handler_logger("file"));
        assert!(config.get_handler("file").is_none());
        assert!(!logger.has_handler(&file));
        assert_eq!(logger.handler_count(), 1);
    }

    #[test]
    fn test_replacing_handler_detaches_old_one() {
        let dir = tempdir().unwrap();
        let mut config = config_in(&dir, "replace");
        let logger = config.get_current_logger();
        let old = config.get_handler("console").unwrap();

        let buffer = SharedBuffer::default();
        let new = config.update_handlers_list(
            "console",
            ConsoleHandler::new(
                LogLevel::Debug,
                Formatter::default(),
                ConsoleStream::writer(buffer),
            ),
        );

        assert!(!logger.has_handler(&old));
        assert!(!logger.has_handler(&new));
        assert!(config.add_handler_logger("console").unwrap());
        assert!(logger.has_handler(&new));
        assert_eq!(
            config.get_all_handlers().unwrap().keys().collect::<Vec<_>>(),
            vec!["console", "file"]
        );
    }

    #[test]
    fn test_add_well_known_and_unknown_keys() {
        let dir = tempdir().unwrap();
        let mut config = config_in(&dir, "adder");
        let logger = config.get_current_logger();

        assert!(!config.add_handler_logger("carrier_pigeon").unwrap());
        assert!(config.add_handler_logger("rotating_file").unwrap());

        let rotating = config.get_handler("rotating_file").unwrap();
        assert_eq!(rotating.lock().kind(), HandlerKind::RotatingFile);
        assert!(logger.has_handler(&rotating));
        assert_eq!(config.get_all_handlers().unwrap().len(), 3);

        // Adding again attaches the same object once
        assert!(config.add_handler_logger("rotating_file").unwrap());
        assert_eq!(logger.handler_count(), 3);
    }

    #[test]
    fn test_add_uses_builtin_format_after_formatter_reset() {
        let dir = tempdir().unwrap();
        let mut config = config_in(&dir, "nofmt");
        config.reset_formatters_list();

        assert!(config.add_handler_logger("timed_rotating_file").unwrap());
        let handler = config.get_handler("timed_rotating_file").unwrap();
        assert_eq!(handler.lock().formatter(), &Formatter::default());
    }

    #[test]
    fn test_reset_handlers() {
        let dir = tempdir().unwrap();
        let mut config = config_in(&dir, "reset");
        assert!(!config.reset_handlers_logger());

        let logger = config.get_current_logger();
        assert!(config.reset_handlers_logger());
        assert_eq!(logger.handler_count(), 0);
        assert_eq!(config.get_all_handlers().unwrap().len(), 2);

        config.setup_logger(None, None);
        assert_eq!(logger.handler_count(), 2);

        config.reset_handlers_list();
        assert!(config.get_all_handlers().is_none());
        assert_eq!(logger.handler_count(), 2);
    }

    #[test]
    fn test_setup_logger_levels_and_names() {
        let dir = tempdir().unwrap();
        let mut config = config_in(&dir, "levels");

        let logger = config.setup_logger(None, Some(LogLevel::Error));
        assert_eq!(logger.name(), "levels");
        assert_eq!(logger.level(), LogLevel::Error);

        let other = config.setup_logger(Some("levels.child"), None);
        assert_eq!(other.name(), "levels.child");
        assert_eq!(other.level(), LogLevel::Debug);
        // The previous logger no longer carries the registry's handlers
        assert_eq!(logger.handler_count(), 0);
        assert_eq!(other.handler_count(), 2);
    }

    #[test]
    fn test_current_logger_is_stable() {
        let dir = tempdir().unwrap();
        let mut config = config_in(&dir, "stable");

        let first = config.get_current_logger();
        let second = config.get_current_logger();
        assert!(Arc::ptr_eq(&first, &second));

        let a = first.handlers();
        let b = second.handlers();
        assert_eq!(a.len(), b.len());
        assert!(a.iter().zip(b.iter()).all(|(x, y)| Arc::ptr_eq(x, y)));
    }

    #[test]
    fn test_update_from_config() {
        let dir = tempdir().unwrap();
        let mut config = config_in(&dir, "fromcfg");
        let description = HandlerConfig::File {
            path: dir.path().join("audit.log"),
            options: FileOptions::default(),
        };

        let handler = config.update_handlers_from_config("audit", &description).unwrap();
        assert!(Arc::ptr_eq(&handler, &config.get_handler("audit").unwrap()));

        let bad = HandlerConfig::File {
            path: PathBuf::new(),
            options: FileOptions::default(),
        };
        assert!(config.update_handlers_from_config("bad", &bad).is_err());
        assert!(config.get_handler("bad").is_none());
    }

    #[test]
    fn test_console_stream_receives_default_format() {
        let dir = tempdir().unwrap();
        let buffer = SharedBuffer::default();
        let mut config = LoggerConfig::builder()
            .module_name("stream")
            .log_dir(dir.path())
            .registry(Arc::new(LoggerRegistry::new()))
            .console_stream(ConsoleStream::writer(buffer.clone()))
            .level(LogLevel::Debug)
            .build()
            .unwrap();

        let logger = config.get_current_logger();
        logger.log_record(LogRecord::new("stream", LogLevel::Debug, "bug is found"));
        let output = buffer.contents();
        assert!(output.starts_with("stream_"));
        assert!(output.contains("LEVEL: DEBUG"));
        assert!(output.ends_with("MESSAGE: bug is found\n"));
    }

    #[test]
    fn test_empty_module_name_rejected() {
        assert!(LoggerConfig::builder().module_name("  ").build().is_err());
    }

    #[test]
    fn test_debug_output() {
        let dir = tempdir().unwrap();
        let config = config_in(&dir, "dbg");
        let debug = format!("{:?}", config);
        assert!(debug.contains("dbg"));
        assert!(debug.contains("DEFAULT_FORMATTER"));
    }
}
