//! Size-based rotating file handler
//!
//! Before a record that would make the file reach `max_bytes`, the current
//! file is moved aside as `app.log.1`, older backups shift up by one
//! (`app.log.1` to `app.log.2`, ...) and the backup beyond `backup_count` is
//! discarded. Backups can optionally be gzip-compressed (`app.log.1.gz`).

use super::file::{FileMode, FileOptions, FileStream};
use crate::core::{Formatter, Handler, HandlerKind, LogLevel, LogRecord, LoggerError, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Default size threshold: 100 KiB
pub const DEFAULT_MAX_BYTES: u64 = 100 * 1024;

/// Default number of kept backups
pub const DEFAULT_BACKUP_COUNT: usize = 1;

/// `path` with `.suffix` appended to its file name
pub(crate) fn suffixed_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

/// Rename `from` to `to`, replacing `to` on platforms where rename does not
fn replace_file(from: &Path, to: &Path) -> std::io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) => {
            if to.exists() {
                let _ = fs::remove_file(to);
            }
            fs::rename(from, to)
        }
    }
}

/// Rotating file handler keyed on file size
///
/// # Examples
///
/// ```no_run
/// use logger_config::core::{Formatter, LogLevel};
/// use logger_config::handlers::{FileOptions, RotatingFileHandler};
///
/// let handler = RotatingFileHandler::new(
///     LogLevel::Info,
///     Formatter::default(),
///     "/var/log/app.log",
///     10 * 1024 * 1024,
///     5,
///     FileOptions::default(),
/// )
/// .unwrap()
/// .with_compression(true);
/// ```
#[derive(Debug)]
pub struct RotatingFileHandler {
    level: LogLevel,
    formatter: Formatter,
    stream: FileStream,
    max_bytes: u64,
    backup_count: usize,
    compress: bool,
}

impl RotatingFileHandler {
    /// Create a rotating file handler.
    ///
    /// A `max_bytes` or `backup_count` of zero disables rollover. When
    /// rollover is enabled the file is always opened in append mode.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be created or opened
    pub fn new(
        level: LogLevel,
        formatter: Formatter,
        path: impl Into<PathBuf>,
        max_bytes: u64,
        backup_count: usize,
        options: FileOptions,
    ) -> Result<Self> {
        let options = if max_bytes > 0 {
            options.with_mode(FileMode::Append)
        } else {
            options
        };

        Ok(Self {
            level,
            formatter,
            stream: FileStream::new(path, options)?,
            max_bytes,
            backup_count,
            compress: false,
        })
    }

    /// Gzip backups as they are rotated out
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.stream.path()
    }

    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.stream.size()
    }

    #[must_use]
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    #[must_use]
    pub fn backup_count(&self) -> usize {
        self.backup_count
    }

    #[must_use]
    pub fn compress(&self) -> bool {
        self.compress
    }

    /// Path of the `index`-th backup, including `.gz` when compressing
    #[must_use]
    pub fn backup_path(&self, index: usize) -> PathBuf {
        let plain = suffixed_path(self.stream.path(), &index.to_string());
        if self.compress {
            suffixed_path(&plain, "gz")
        } else {
            plain
        }
    }

    fn should_rollover(&self, pending: u64) -> bool {
        self.max_bytes > 0
            && self.backup_count > 0
            && self.stream.size() > 0
            && self.stream.size() + pending >= self.max_bytes
    }

    /// Rotate now, regardless of the current size
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::FileRotationError`] if a backup cannot be moved
    /// or the fresh file cannot be opened.
    pub fn do_rollover(&mut self) -> Result<()> {
        let base = self.stream.path().to_path_buf();
        self.stream.close().map_err(|e| {
            LoggerError::file_rotation(
                base.display().to_string(),
                format!("Failed to flush before rotation: {}", e),
            )
        })?;

        if self.backup_count > 0 {
            for i in (1..self.backup_count).rev() {
                let src = self.backup_path(i);
                if src.exists() {
                    let dst = self.backup_path(i + 1);
                    replace_file(&src, &dst).map_err(|e| {
                        LoggerError::file_rotation(
                            src.display().to_string(),
                            format!("Failed to rotate backup files: {}", e),
                        )
                    })?;
                }
            }

            if base.exists() {
                let first = suffixed_path(&base, "1");
                replace_file(&base, &first).map_err(|e| {
                    LoggerError::file_rotation(
                        base.display().to_string(),
                        format!("Failed to rotate current log file: {}", e),
                    )
                })?;

                if self.compress {
                    compress_file(&first)?;
                }
            }
        }

        if !self.stream.options().delay {
            self.stream.open().map_err(|e| {
                LoggerError::file_rotation(
                    base.display().to_string(),
                    format!("Failed to create new log file: {}", e),
                )
            })?;
        }
        Ok(())
    }
}

/// Gzip `path` into `path.gz`, removing the original only once the
/// compressed copy is complete.
pub(crate) fn compress_file(path: &Path) -> Result<()> {
    use std::io::{BufReader, BufWriter, Read, Write};

    let gz_path = suffixed_path(path, "gz");
    let temp_gz_path = suffixed_path(path, "gz.tmp");

    let input = File::open(path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to open file for compression: {}", path.display()),
            e,
        )
    })?;
    let mut reader = BufReader::with_capacity(64 * 1024, input);

    let output = File::create(&temp_gz_path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to create temporary compressed file: {}", temp_gz_path.display()),
            e,
        )
    })?;
    let buffered_output = BufWriter::with_capacity(64 * 1024, output);
    let mut encoder =
        flate2::write::GzEncoder::new(buffered_output, flate2::Compression::default());

    let mut buffer = vec![0u8; 64 * 1024];
    loop {
        let bytes_read = reader.read(&mut buffer).map_err(|e| {
            let _ = fs::remove_file(&temp_gz_path);
            LoggerError::io_operation(
                "compress log file",
                format!("Failed to read from file: {}", path.display()),
                e,
            )
        })?;
        if bytes_read == 0 {
            break;
        }
        encoder.write_all(&buffer[..bytes_read]).map_err(|e| {
            let _ = fs::remove_file(&temp_gz_path);
            LoggerError::io_operation("compress log file", "Failed to compress data chunk", e)
        })?;
    }

    encoder
        .finish()
        .and_then(|mut out| out.flush())
        .map_err(|e| {
            let _ = fs::remove_file(&temp_gz_path);
            LoggerError::io_operation("compress log file", "Failed to finish compression", e)
        })?;

    fs::rename(&temp_gz_path, &gz_path).map_err(|e| {
        let _ = fs::remove_file(&temp_gz_path);
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to rename compressed file to: {}", gz_path.display()),
            e,
        )
    })?;

    if let Err(e) = fs::remove_file(path) {
        eprintln!(
            "[WARN] Compression succeeded but failed to remove original file {}: {}. \
            Both compressed and uncompressed versions exist.",
            path.display(),
            e
        );
    }

    Ok(())
}

impl Handler for RotatingFileHandler {
    fn emit(&mut self, record: &LogRecord) -> Result<()> {
        let line = self.formatter.render(record);
        let bytes = self.stream.encode_line(&line)?;

        // A delayed stream only learns the existing file size once opened
        if !self.stream.is_open() {
            self.stream.open()?;
        }
        if self.should_rollover(bytes.len() as u64) {
            if let Err(e) = self.do_rollover() {
                // Keep writing to the current file rather than lose the record
                eprintln!("[WARN] Log rotation failed: {}. Continuing with current file.", e);
                if !self.stream.is_open() {
                    if let Err(reopen_err) = self.stream.open() {
                        eprintln!(
                            "[LOGGER ERROR] Failed to reopen log file after rotation failure: {}",
                            reopen_err
                        );
                        return Err(e);
                    }
                }
            }
        }

        self.stream.write_bytes(&bytes)
    }

    fn flush(&mut self) -> Result<()> {
        self.stream.flush()
    }

    fn kind(&self) -> HandlerKind {
        HandlerKind::RotatingFile
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
