//! Handler trait for log output destinations

use super::{error::Result, formatter::Formatter, log_level::LogLevel, log_record::LogRecord};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Which output destination a handler writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerKind {
    Console,
    RichConsole,
    File,
    RotatingFile,
    TimedRotatingFile,
    Syslog,
    Http,
}

impl HandlerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandlerKind::Console => "console",
            HandlerKind::RichConsole => "rich_console",
            HandlerKind::File => "file",
            HandlerKind::RotatingFile => "rotating_file",
            HandlerKind::TimedRotatingFile => "timed_rotating_file",
            HandlerKind::Syslog => "syslog",
            HandlerKind::Http => "http",
        }
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An output destination with its own severity threshold and formatter.
pub trait Handler: Send {
    /// Write a record unconditionally
    fn emit(&mut self, record: &LogRecord) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn kind(&self) -> HandlerKind;

    fn level(&self) -> LogLevel;
    fn set_level(&mut self, level: LogLevel);
    fn formatter(&self) -> &Formatter;
    fn set_formatter(&mut self, formatter: Formatter);

    fn name(&self) -> &str {
        self.kind().as_str()
    }

    /// Emit the record if it clears this handler's threshold.
    ///
    /// Returns `Ok(false)` when the record was filtered out.
    fn handle(&mut self, record: &LogRecord) -> Result<bool> {
        if record.level < self.level() {
            return Ok(false);
        }
        self.emit(record)?;
        Ok(true)
    }
}

/// A handler shared between a configuration's registry and live loggers.
///
/// Loggers detach handlers by identity, so clones of the same
/// `SharedHandler` refer to one attachment.
pub type SharedHandler = Arc<Mutex<Box<dyn Handler>>>;

/// Wrap a handler for registration and attachment
pub fn shared<H: Handler + 'static>(handler: H) -> SharedHandler {
    let boxed: Box<dyn Handler> = Box::new(handler);
    Arc::new(Mutex::new(boxed))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingHandler {
        level: LogLevel,
        formatter: Formatter,
        emitted: usize,
    }

    impl Handler for CountingHandler {
        fn emit(&mut self, _record: &LogRecord) -> Result<()> {
            self.emitted += 1;
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn kind(&self) -> HandlerKind {
            HandlerKind::Console
        }

        fn level(&self) -> LogLevel {
            self.level
        }

        fn set_level(&mut self, level: LogLevel) {
            self.level = level;
        }

        fn formatter(&self) -> &Formatter {
            &self.formatter
        }

        fn set_formatter(&mut self, formatter: Formatter) {
            self.formatter = formatter;
        }
    }

    #[test]
    fn test_handle_applies_threshold() {
        let mut handler = CountingHandler {
            level: LogLevel::Warning,
            formatter: Formatter::default(),
            emitted: 0,
        };

        let info = LogRecord::new("t", LogLevel::Info, "skip");
        let error = LogRecord::new("t", LogLevel::Error, "keep");

        assert!(!handler.handle(&info).unwrap());
        assert!(handler.handle(&error).unwrap());
        assert_eq!(handler.emitted, 1);
    }

    #[test]
    fn test_shared_handlers_compare_by_identity() {
        let make = || CountingHandler {
            level: LogLevel::Debug,
            formatter: Formatter::default(),
            emitted: 0,
        };
        let a = shared(make());
        let b = shared(make());

        assert!(Arc::ptr_eq(&a, &Arc::clone(&a)));
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.lock().name(), "console");
    }

    #[test]
    fn test_kind_serde_names() {
        let kind: HandlerKind = serde_json::from_str("\"timed_rotating_file\"").unwrap();
        assert_eq!(kind, HandlerKind::TimedRotatingFile);
        assert_eq!(kind.to_string(), "timed_rotating_file");
    }
}
