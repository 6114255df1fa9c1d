//! Named logger implementation

use super::{
    error::Result,
    handler::SharedHandler,
    log_level::LogLevel,
    log_record::LogRecord,
    metrics::LoggerMetrics,
};
use parking_lot::RwLock;
use std::panic::Location;
use std::sync::Arc;

/// Level a logger starts with before anything configures it
pub const DEFAULT_LOGGER_LEVEL: LogLevel = LogLevel::Info;

/// A named emission point.
///
/// A record is written by an attached handler only when it clears both the
/// logger's threshold and that handler's own threshold. Emission is
/// synchronous: the calling thread performs the handler I/O.
pub struct Logger {
    name: String,
    min_level: RwLock<LogLevel>,
    handlers: RwLock<Vec<SharedHandler>>,
    /// Metrics for observability (dropped count, total logged, etc.)
    metrics: LoggerMetrics,
}

impl Logger {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_level: RwLock::new(DEFAULT_LOGGER_LEVEL),
            handlers: RwLock::new(Vec::new()),
            metrics: LoggerMetrics::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> LogLevel {
        *self.min_level.read()
    }

    pub fn set_level(&self, level: LogLevel) {
        *self.min_level.write() = level;
    }

    #[inline]
    pub fn is_enabled_for(&self, level: LogLevel) -> bool {
        level >= *self.min_level.read()
    }

    /// Attach a handler. Returns `false` if this handler is already attached.
    pub fn add_handler(&self, handler: SharedHandler) -> bool {
        let mut handlers = self.handlers.write();
        if handlers.iter().any(|h| Arc::ptr_eq(h, &handler)) {
            return false;
        }
        handlers.push(handler);
        true
    }

    /// Detach a handler by identity. Returns `false` if it was not attached.
    pub fn remove_handler(&self, handler: &SharedHandler) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|h| !Arc::ptr_eq(h, handler));
        handlers.len() != before
    }

    /// Detach every handler, returning how many were attached
    pub fn clear_handlers(&self) -> usize {
        let mut handlers = self.handlers.write();
        let count = handlers.len();
        handlers.clear();
        count
    }

    pub fn has_handler(&self, handler: &SharedHandler) -> bool {
        self.handlers.read().iter().any(|h| Arc::ptr_eq(h, handler))
    }

    /// Snapshot of the attached handlers, in attachment order
    pub fn handlers(&self) -> Vec<SharedHandler> {
        self.handlers.read().clone()
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Dispatch a prepared record to the attached handlers
    pub fn log_record(&self, record: LogRecord) {
        if !self.is_enabled_for(record.level) {
            self.metrics.record_filtered();
            return;
        }

        let handlers = self.handlers.read();
        Self::process_sync(&handlers, &record, &self.metrics);
    }

    /// Process a record with per-handler panic isolation
    ///
    /// One failing or panicking handler does not prevent the others from
    /// receiving the record. Failures are reported on stderr.
    fn process_sync(handlers: &[SharedHandler], record: &LogRecord, metrics: &LoggerMetrics) {
        let mut has_error = false;

        for (idx, handler) in handlers.iter().enumerate() {
            let handle_result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                handler.lock().handle(record)
            }));

            match handle_result {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    eprintln!("[LOGGER ERROR] Handler #{} failed: {}", idx, e);
                    has_error = true;
                }
                Err(panic_info) => {
                    let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        s.to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    eprintln!(
                        "[LOGGER CRITICAL] Handler #{} panicked: {}. \
                         Other handlers continue to function.",
                        idx, panic_msg
                    );
                    has_error = true;
                }
            }
        }

        if has_error {
            metrics.record_dropped();
        } else {
            metrics.record_logged();
        }
    }

    #[track_caller]
    pub fn log(&self, level: LogLevel, message: impl AsRef<str>) {
        if !self.is_enabled_for(level) {
            self.metrics.record_filtered();
            return;
        }

        let record = LogRecord::new(self.name.as_str(), level, message)
            .with_caller(Location::caller());
        self.log_record(record);
    }

    #[inline]
    #[track_caller]
    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    #[track_caller]
    pub fn info(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    #[track_caller]
    pub fn warning(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Warning, message);
    }

    #[inline]
    #[track_caller]
    pub fn error(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    #[track_caller]
    pub fn critical(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Critical, message);
    }

    /// Log at `ERROR` with an error and its source chain attached
    #[track_caller]
    pub fn exception(&self, message: impl AsRef<str>, error: &(dyn std::error::Error + 'static)) {
        if !self.is_enabled_for(LogLevel::Error) {
            self.metrics.record_filtered();
            return;
        }

        let record = LogRecord::new(self.name.as_str(), LogLevel::Error, message)
            .with_caller(Location::caller())
            .with_error(error);
        self.log_record(record);
    }

    /// Get the number of records lost to handler failures
    pub fn dropped_count(&self) -> u64 {
        self.metrics.dropped_count()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Flush every attached handler, stopping at the first failure
    pub fn flush(&self) -> Result<()> {
        for handler in self.handlers.read().iter() {
            handler.lock().flush()?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds: Vec<String> = self
            .handlers
            .read()
            .iter()
            .map(|h| h.lock().name().to_string())
            .collect();
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("handlers", &kinds)
            .finish()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
        }
    }
}
