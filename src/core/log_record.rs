//! Log record structure

use super::log_level::LogLevel;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::panic::Location;

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
    static THREAD_NAME_CACHE: RefCell<Option<Option<String>>> = const { RefCell::new(None) };
}

/// Get cached thread ID, computing and caching it on first access
fn get_thread_id() -> String {
    THREAD_ID_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| format!("{:?}", std::thread::current().id()))
            .clone()
    })
}

/// Get cached thread name, computing and caching it on first access
fn get_thread_name() -> Option<String> {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| std::thread::current().name().map(String::from))
            .clone()
    })
}

/// A single event passed from a [`Logger`](super::Logger) to its handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// Name of the logger that created the record
    pub name: String,
    pub level: LogLevel,
    /// Message text with line breaks escaped
    pub message: String,
    pub timestamp: DateTime<Local>,
    /// Source file of the call site
    pub pathname: Option<String>,
    pub lineno: Option<u32>,
    pub module_path: Option<String>,
    pub thread_id: String,
    pub thread_name: Option<String>,
    /// Display strings of an error and its `source()` chain, outermost first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub error_chain: Vec<String>,
}

impl LogRecord {
    /// Sanitize log message to prevent log injection attacks
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// to prevent attackers from injecting fake log entries.
    fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(name: impl Into<String>, level: LogLevel, message: impl AsRef<str>) -> Self {
        Self {
            name: name.into(),
            level,
            message: Self::sanitize_message(message.as_ref()),
            timestamp: Local::now(),
            pathname: None,
            lineno: None,
            module_path: None,
            thread_id: get_thread_id(),
            thread_name: get_thread_name(),
            error_chain: Vec::new(),
        }
    }

    pub fn with_location(mut self, file: &str, line: u32) -> Self {
        self.pathname = Some(file.to_string());
        self.lineno = Some(line);
        self
    }

    /// Record the location of a `#[track_caller]` call site
    pub fn with_caller(self, location: &Location<'_>) -> Self {
        self.with_location(location.file(), location.line())
    }

    pub fn with_module_path(mut self, module_path: &str) -> Self {
        self.module_path = Some(module_path.to_string());
        self
    }

    /// Attach an error and every error in its `source()` chain
    pub fn with_error(mut self, error: &(dyn std::error::Error + 'static)) -> Self {
        let mut chain = Vec::new();
        let mut current: Option<&(dyn std::error::Error + 'static)> = Some(error);
        while let Some(err) = current {
            chain.push(Self::sanitize_message(&err.to_string()));
            current = err.source();
        }
        self.error_chain = chain;
        self
    }

    /// File name component of `pathname`
    pub fn filename(&self) -> Option<&str> {
        self.pathname.as_deref().map(|path| {
            std::path::Path::new(path)
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or(path)
        })
    }

    /// Thread name when the thread has one, otherwise its id
    pub fn thread(&self) -> &str {
        self.thread_name.as_deref().unwrap_or(&self.thread_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Outer(Inner);

    #[derive(Debug)]
    struct Inner;

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "request failed")
        }
    }

    impl fmt::Display for Inner {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "connection reset\nby peer")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    impl std::error::Error for Inner {}

    #[test]
    fn test_message_is_sanitized() {
        let record = LogRecord::new("app", LogLevel::Info, "line one\nline two\tend");
        assert_eq!(record.message, "line one\\nline two\\tend");
    }

    #[test]
    fn test_error_chain_collected() {
        let record = LogRecord::new("app", LogLevel::Error, "boom").with_error(&Outer(Inner));
        assert_eq!(
            record.error_chain,
            vec!["request failed".to_string(), "connection reset\\nby peer".to_string()]
        );
    }

    #[test]
    fn test_filename_from_pathname() {
        let record =
            LogRecord::new("app", LogLevel::Info, "x").with_location("src/handlers/file.rs", 7);
        assert_eq!(record.filename(), Some("file.rs"));
        assert_eq!(record.lineno, Some(7));
    }

    #[test]
    fn test_with_caller() {
        let record = LogRecord::new("app", LogLevel::Info, "x").with_caller(Location::caller());
        assert!(record.pathname.unwrap().ends_with("log_record.rs"));
    }
}
