//! Basic configuration usage example
//!
//! Demonstrates the default console and file handlers and level filtering.
//!
//! Run with: cargo run --example basic_usage

use logger_config::prelude::*;
use logger_config::{critical, info};

fn main() -> Result<()> {
    println!("=== Logger Config - Basic Usage Example ===\n");

    // Console and `<cwd>/logs/basic_usage.log` are registered by default
    let mut config = LoggerConfig::new(Some("basic_usage"), Some(LogLevel::Debug))?;
    println!("Log directory: {}", config.log_dir().display());

    let logger = config.get_current_logger();

    println!("1. Logging at different levels:");
    logger.debug("This is a debug message");
    logger.info("This is an info message");
    logger.warning("This is a warning message");
    logger.error("This is an error message");
    critical!(logger, "This is a critical message from {}", "a macro");

    println!("\n2. Logging with a higher threshold:");
    let logger = config.setup_logger(None, Some(LogLevel::Warning));
    logger.debug("Debug message (hidden)");
    info!(logger, "Info message (hidden)");
    logger.warning("Warning message (visible)");

    println!("\n3. Registered handlers:");
    if let Some(handlers) = config.get_all_handlers() {
        for (key, handler) in handlers.iter() {
            println!("   {} -> {}", key, handler.lock().kind());
        }
    }

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
