//! File handler example
//!
//! Demonstrates size and time rotation, custom formatters and handlers
//! described in JSON.
//!
//! Run with: cargo run --example file_logging

use logger_config::handlers::FileOptions;
use logger_config::prelude::*;
use logger_config::{create_rotating_file_handler, RotationWhen, TimedRotation};

fn main() -> Result<()> {
    println!("=== Logger Config - File Logging Example ===\n");

    let mut config = LoggerConfig::builder()
        .module_name("file_logging")
        .level(LogLevel::Info)
        .build()?;
    let log_dir = config.log_dir().to_path_buf();

    // Every handler built from here on uses the compact template
    config.update_formatters_list(
        logger_config::DEFAULT_FORMATTER,
        Formatter::new("{timestamp} [{levelname:<8}] {name}: {message}")?,
    );

    println!("1. Size-rotating file with gzip backups");
    let rotating = create_rotating_file_handler(
        LogLevel::Info,
        config.get_formatter(logger_config::DEFAULT_FORMATTER).cloned().unwrap_or_default(),
        log_dir.join("file_logging.size.log"),
        4 * 1024,
        3,
        FileOptions::default(),
    )?
    .with_compression(true);
    config.update_handlers_list("size", rotating);
    config.add_handler_logger("size")?;

    println!("2. Daily rotation described in JSON");
    let json = format!(
        r#"{{"kind": "timed_rotating_file", "path": {},
            "rotation": {{"when": "midnight", "backup_count": 7}}}}"#,
        serde_json::to_string(&log_dir.join("file_logging.daily.log"))?
    );
    let daily = HandlerConfig::from_json(&json)?;
    config.update_handlers_from_config("daily", &daily)?;
    config.add_handler_logger("daily")?;

    let rotation = TimedRotation::new(RotationWhen::Hours).with_backup_count(24);
    config.update_handlers_from_config(
        "hourly",
        &HandlerConfig::TimedRotatingFile {
            path: log_dir.join("file_logging.hourly.log"),
            rotation,
            options: FileOptions::default(),
        },
    )?;
    config.add_handler_logger("hourly")?;

    let logger = config.get_current_logger();
    for i in 0..200 {
        logger.info(format!("Processing record {}", i));
    }
    logger.flush()?;

    println!("\n3. Files in {}:", log_dir.display());
    let mut names: Vec<_> = std::fs::read_dir(&log_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("file_logging"))
        .collect();
    names.sort();
    for name in names {
        println!("   {}", name);
    }

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
