//! Stress tests for concurrent logging
//!
//! These tests verify:
//! - No records are lost when many threads share one logger
//! - Size rotation stays consistent under concurrent writers
//! - Registry changes while other threads are logging do not deadlock
//! - A panicking handler does not stop the others

use logger_config::core::{shared, Handler, HandlerKind, LogRecord, Result};
use logger_config::handlers::{ConsoleStream, FileOptions};
use logger_config::{
    create_file_handler, create_rotating_file_handler, Formatter, LogLevel, Logger, LoggerConfig,
    LoggerRegistry,
};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

const THREADS: usize = 8;
const PER_THREAD: usize = 500;

#[test]
fn test_concurrent_file_logging_keeps_every_line() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("concurrent.log");

    let logger = Arc::new(Logger::new("stress"));
    logger.set_level(LogLevel::Debug);
    logger.add_handler(shared(
        create_file_handler(
            LogLevel::Debug,
            Formatter::new("{thread} {message}").unwrap(),
            &log_file,
            FileOptions::default(),
        )
        .expect("Failed to create handler"),
    ));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    logger.info(format!("thread {} message {}", t, i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("Logging thread panicked");
    }
    logger.flush().unwrap();

    let content = fs::read_to_string(&log_file).unwrap();
    assert_eq!(content.lines().count(), THREADS * PER_THREAD);
    assert_eq!(logger.metrics().total_logged(), (THREADS * PER_THREAD) as u64);
    assert_eq!(logger.dropped_count(), 0);
}

#[test]
fn test_concurrent_rotation() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("rotating.log");

    let logger = Arc::new(Logger::new("rotation-stress"));
    logger.add_handler(shared(
        create_rotating_file_handler(
            LogLevel::Debug,
            Formatter::new("{message}").unwrap(),
            &log_file,
            16 * 1024,
            3,
            FileOptions::default(),
        )
        .expect("Failed to create handler"),
    ));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    logger.warning(format!("{:02}-{:04} {}", t, i, "payload ".repeat(8)));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("Logging thread panicked");
    }
    logger.flush().unwrap();

    for i in 1..=3 {
        let backup = temp_dir.path().join(format!("rotating.log.{}", i));
        assert!(backup.exists(), "missing backup {}", i);
        assert!(fs::metadata(&backup).unwrap().len() <= 16 * 1024);
    }
    assert!(!temp_dir.path().join("rotating.log.4").exists());
    assert!(fs::metadata(&log_file).unwrap().len() <= 16 * 1024);
}

#[test]
fn test_registry_changes_while_logging() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = LoggerConfig::builder()
        .module_name("churn")
        .log_dir(temp_dir.path())
        .level(LogLevel::Debug)
        .registry(Arc::new(LoggerRegistry::new()))
        .console_stream(ConsoleStream::writer(std::io::sink()))
        .build()
        .expect("Failed to build configuration");
    let logger = config.get_current_logger();

    let writers: Vec<_> = (0..4)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    logger.debug(format!("writer {} line {}", t, i));
                }
            })
        })
        .collect();

    for _ in 0..50 {
        assert!(config.add_handler_logger("rotating_file").unwrap());
        assert!(config.remove_handler_logger("rotating_file"));
        assert!(config.reset_handlers_logger());
        config.setup_logger(None, None);
    }

    for handle in writers {
        handle.join().expect("Logging thread panicked");
    }
    assert_eq!(logger.handler_count(), 2);
}

struct PanickingHandler;

impl Handler for PanickingHandler {
    fn emit(&mut self, _record: &LogRecord) -> Result<()> {
        panic!("handler exploded");
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn kind(&self) -> HandlerKind {
        HandlerKind::Console
    }

    fn level(&self) -> LogLevel {
        LogLevel::Debug
    }

    fn set_level(&mut self, _level: LogLevel) {}

    fn formatter(&self) -> &Formatter {
        unimplemented!("never formats")
    }

    fn set_formatter(&mut self, _formatter: Formatter) {}
}

struct CountingHandler {
    count: Arc<AtomicUsize>,
    formatter: Formatter,
}

impl Handler for CountingHandler {
    fn emit(&mut self, _record: &LogRecord) -> Result<()> {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn kind(&self) -> HandlerKind {
        HandlerKind::Console
    }

    fn level(&self) -> LogLevel {
        LogLevel::Debug
    }

    fn set_level(&mut self, _level: LogLevel) {}

    fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    fn set_formatter(&mut self, formatter: Formatter) {
        self.formatter = formatter;
    }
}

#[test]
fn test_panicking_handler_isolated_under_load() {
    let count = Arc::new(AtomicUsize::new(0));
    let logger = Arc::new(Logger::new("isolation"));
    logger.add_handler(shared(PanickingHandler));
    logger.add_handler(shared(CountingHandler {
        count: Arc::clone(&count),
        formatter: Formatter::default(),
    }));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for _ in 0..100 {
                    logger.error("still delivered");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("Logging thread panicked");
    }

    assert_eq!(count.load(Ordering::SeqCst), 400);
    assert_eq!(logger.dropped_count(), 400);
}
