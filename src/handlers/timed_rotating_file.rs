//! Time-based rotating file handler
//!
//! The file is rolled over when the wall clock passes the next interval
//! boundary. Backups are named after the start of the interval they cover,
//! e.g. `app.log.2024-03-01_13` for hourly rotation.

use super::file::{FileOptions, FileStream};
use super::rotating_file::suffixed_path;
use crate::core::{Formatter, Handler, HandlerKind, LogLevel, LogRecord, LoggerError, Result};
use chrono::{DateTime, Datelike, Duration, Local, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::SystemTime;

/// Unit of the rotation interval
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationWhen {
    Seconds,
    Minutes,
    #[default]
    Hours,
    Days,
    /// Roll over at midnight, or at `at_time` when set
    Midnight,
    /// Roll over on the given weekday, Monday = 0
    Weekday(u8),
}

/// Longest rotation interval accepted, roughly a century
pub const MAX_ROTATION_SECONDS: i64 = 100 * 366 * 24 * 60 * 60;

impl RotationWhen {
    /// Length of one unit in seconds
    fn period_seconds(&self) -> i64 {
        match self {
            RotationWhen::Seconds => 1,
            RotationWhen::Minutes => 60,
            RotationWhen::Hours => 60 * 60,
            RotationWhen::Days | RotationWhen::Midnight => 24 * 60 * 60,
            RotationWhen::Weekday(_) => 7 * 24 * 60 * 60,
        }
    }

    /// strftime pattern of the backup suffix
    pub fn suffix_format(&self) -> &'static str {
        match self {
            RotationWhen::Seconds => "%Y-%m-%d_%H-%M-%S",
            RotationWhen::Minutes => "%Y-%m-%d_%H-%M",
            RotationWhen::Hours => "%Y-%m-%d_%H",
            RotationWhen::Days | RotationWhen::Midnight | RotationWhen::Weekday(_) => "%Y-%m-%d",
        }
    }
}

impl fmt::Display for RotationWhen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationWhen::Seconds => f.write_str("S"),
            RotationWhen::Minutes => f.write_str("M"),
            RotationWhen::Hours => f.write_str("H"),
            RotationWhen::Days => f.write_str("D"),
            RotationWhen::Midnight => f.write_str("MIDNIGHT"),
            RotationWhen::Weekday(day) => write!(f, "W{}", day),
        }
    }
}

impl FromStr for RotationWhen {
    type Err = LoggerError;

    /// Parses `S`, `M`, `H`, `D`, `MIDNIGHT` and `W0`..`W6` (case-insensitive)
    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_uppercase();
        match upper.as_str() {
            "S" => Ok(RotationWhen::Seconds),
            "M" => Ok(RotationWhen::Minutes),
            "H" => Ok(RotationWhen::Hours),
            "D" => Ok(RotationWhen::Days),
            "MIDNIGHT" => Ok(RotationWhen::Midnight),
            w if w.len() == 2 && w.starts_with('W') => match w[1..].parse::<u8>() {
                Ok(day) if day <= 6 => Ok(RotationWhen::Weekday(day)),
                _ => Err(LoggerError::config(
                    "TimedRotatingFileHandler",
                    format!("invalid day specified for weekly rollover: {}", s),
                )),
            },
            _ => Err(LoggerError::config(
                "TimedRotatingFileHandler",
                format!("invalid rollover interval specified: {}", s),
            )),
        }
    }
}

/// When and how often a timed handler rolls over
///
/// # Examples
///
/// ```
/// use logger_config::handlers::{RotationWhen, TimedRotation};
///
/// let rotation = TimedRotation::new(RotationWhen::Midnight).with_backup_count(7);
/// assert!(rotation.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimedRotation {
    pub when: RotationWhen,
    /// Multiplier applied to the unit of `when`
    pub interval: u32,
    /// Backups to keep; 0 keeps all
    pub backup_count: usize,
    pub utc: bool,
    /// Time of day for `Midnight` and `Weekday` rollover
    pub at_time: Option<NaiveTime>,
}

impl Default for TimedRotation {
    fn default() -> Self {
        Self {
            when: RotationWhen::default(),
            interval: 1,
            backup_count: 0,
            utc: false,
            at_time: None,
        }
    }
}

impl TimedRotation {
    #[must_use]
    pub fn new(when: RotationWhen) -> Self {
        Self {
            when,
            ..Self::default()
        }
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_backup_count(mut self, backup_count: usize) -> Self {
        self.backup_count = backup_count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_utc(mut self, utc: bool) -> Self {
        self.utc = utc;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_at_time(mut self, at_time: NaiveTime) -> Self {
        self.at_time = Some(at_time);
        self
    }

    /// # Errors
    ///
    /// Returns [`LoggerError::InvalidConfiguration`] for a zero interval, an
    /// interval longer than [`MAX_ROTATION_SECONDS`] or a weekday outside
    /// `0..=6`.
    pub fn validate(&self) -> Result<()> {
        if self.interval == 0 {
            return Err(LoggerError::config(
                "TimedRotatingFileHandler",
                "interval must be greater than zero",
            ));
        }
        if self.span_seconds(self.interval) > MAX_ROTATION_SECONDS {
            return Err(LoggerError::config(
                "TimedRotatingFileHandler",
                format!(
                    "interval {} {} exceeds the longest supported rotation",
                    self.interval, self.when
                ),
            ));
        }
        if let RotationWhen::Weekday(day) = self.when {
            if day > 6 {
                return Err(LoggerError::config(
                    "TimedRotatingFileHandler",
                    format!("invalid day specified for weekly rollover: {}", day),
                ));
            }
        }
        Ok(())
    }

    /// `units` of `when` in seconds, clamped to the longest supported rotation
    fn span_seconds(&self, units: u32) -> i64 {
        self.when
            .period_seconds()
            .saturating_mul(i64::from(units))
            .min(MAX_ROTATION_SECONDS + 1)
    }

    /// Length of one full rotation interval
    pub fn span(&self) -> Duration {
        Duration::seconds(self.span_seconds(self.interval))
    }

    /// First rollover strictly after `current`
    ///
    /// Saturates at [`NaiveDateTime::MAX`] when the rollover is not
    /// representable.
    pub fn next_rollover(&self, current: NaiveDateTime) -> NaiveDateTime {
        let at = self.at_time.unwrap_or(NaiveTime::MIN);
        let extra = Duration::seconds(self.span_seconds(self.interval.saturating_sub(1)));

        let next = match self.when {
            RotationWhen::Midnight => {
                let mut next = Some(current.date().and_time(at));
                if next.is_some_and(|n| n <= current) {
                    next = next.and_then(|n| n.checked_add_signed(Duration::days(1)));
                }
                next.and_then(|n| n.checked_add_signed(extra))
            }
            RotationWhen::Weekday(day) => {
                let today = current.weekday().num_days_from_monday() as i64;
                let ahead = (i64::from(day) - today).rem_euclid(7);
                let mut next = current
                    .date()
                    .and_time(at)
                    .checked_add_signed(Duration::days(ahead));
                if next.is_some_and(|n| n <= current) {
                    next = next.and_then(|n| n.checked_add_signed(Duration::weeks(1)));
                }
                next.and_then(|n| n.checked_add_signed(extra))
            }
            _ => current.checked_add_signed(self.span()),
        };
        next.unwrap_or(NaiveDateTime::MAX)
    }
}

/// Digits masked to `0`, used to recognise backup suffixes
fn suffix_mask(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_digit() { '0' } else { c })
        .collect()
}

/// The shape `suffix_mask` gives a suffix written with `format`
fn format_mask(format: &str) -> String {
    format
        .replace("%Y", "0000")
        .replace("%m", "00")
        .replace("%d", "00")
        .replace("%H", "00")
        .replace("%M", "00")
        .replace("%S", "00")
}

/// Rotating file handler keyed on wall-clock time
///
/// # Examples
///
/// ```no_run
/// use logger_config::core::{Formatter, LogLevel};
/// use logger_config::handlers::{
///     FileOptions, RotationWhen, TimedRotatingFileHandler, TimedRotation,
/// };
///
/// let handler = TimedRotatingFileHandler::new(
///     LogLevel::Info,
///     Formatter::default(),
///     "/var/log/app.log",
///     TimedRotation::new(RotationWhen::Midnight).with_backup_count(14),
///     FileOptions::default(),
/// )
/// .unwrap();
/// ```
#[derive(Debug)]
pub struct TimedRotatingFileHandler {
    level: LogLevel,
    formatter: Formatter,
    stream: FileStream,
    rotation: TimedRotation,
    rollover_at: NaiveDateTime,
}

impl TimedRotatingFileHandler {
    /// # Errors
    ///
    /// Returns error if the rotation settings are invalid or the file cannot
    /// be created or opened
    pub fn new(
        level: LogLevel,
        formatter: Formatter,
        path: impl Into<PathBuf>,
        rotation: TimedRotation,
        options: FileOptions,
    ) -> Result<Self> {
        rotation.validate()?;
        let path = path.into();

        // An existing file continues the interval it was last written in
        let start = fs::metadata(&path)
            .and_then(|m| m.modified())
            .map(|modified| Self::to_naive(modified, rotation.utc))
            .unwrap_or_else(|_| Self::clock(rotation.utc));
        let rollover_at = rotation.next_rollover(start);

        Ok(Self {
            level,
            formatter,
            stream: FileStream::new(path, options)?,
            rotation,
            rollover_at,
        })
    }

    fn clock(utc: bool) -> NaiveDateTime {
        if utc {
            Utc::now().naive_utc()
        } else {
            Local::now().naive_local()
        }
    }

    fn to_naive(time: SystemTime, utc: bool) -> NaiveDateTime {
        if utc {
            DateTime::<Utc>::from(time).naive_utc()
        } else {
            DateTime::<Local>::from(time).naive_local()
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.stream.path()
    }

    #[must_use]
    pub fn rotation(&self) -> &TimedRotation {
        &self.rotation
    }

    /// Wall-clock time of the next scheduled rollover
    #[must_use]
    pub fn rollover_at(&self) -> NaiveDateTime {
        self.rollover_at
    }

    /// Backup file name for the interval ending at the scheduled rollover
    fn backup_path(&self) -> PathBuf {
        let interval_start = self
            .rollover_at
            .checked_sub_signed(self.rotation.span())
            .unwrap_or(self.rollover_at);
        let suffix = interval_start
            .format(self.rotation.when.suffix_format())
            .to_string();
        suffixed_path(self.stream.path(), &suffix)
    }

    /// Existing backups beyond `backup_count`, oldest first
    fn files_to_delete(&self) -> Vec<PathBuf> {
        if self.rotation.backup_count == 0 {
            return Vec::new();
        }

        let base = self.stream.path();
        let (Some(dir), Some(base_name)) = (base.parent(), base.file_name()) else {
            return Vec::new();
        };
        let dir = if dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            dir
        };
        let prefix = format!("{}.", base_name.to_string_lossy());
        let expected = suffix_mask(&format_mask(self.rotation.when.suffix_format()));

        let mut backups: Vec<(String, PathBuf)> = match fs::read_dir(dir) {
            Ok(entries) => entries
                .filter_map(|entry| entry.ok())
                .filter_map(|entry| {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    let suffix = name.strip_prefix(&prefix)?;
                    (suffix_mask(suffix) == expected).then(|| (suffix.to_string(), entry.path()))
                })
                .collect(),
            Err(e) => {
                eprintln!("[WARN] Failed to list backups in {}: {}", dir.display(), e);
                return Vec::new();
            }
        };

        if backups.len() <= self.rotation.backup_count {
            return Vec::new();
        }
        // Fixed-width suffixes sort chronologically
        backups.sort();
        let excess = backups.len() - self.rotation.backup_count;
        backups.into_iter().take(excess).map(|(_, path)| path).collect()
    }

    /// Rotate now and schedule the next rollover
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::FileRotationError`] if the current file cannot
    /// be moved aside or reopened.
    pub fn do_rollover(&mut self) -> Result<()> {
        let base = self.stream.path().to_path_buf();
        self.stream.close().map_err(|e| {
            LoggerError::file_rotation(
                base.display().to_string(),
                format!("Failed to flush before rotation: {}", e),
            )
        })?;

        let backup = self.backup_path();
        if backup.exists() {
            let _ = fs::remove_file(&backup);
        }
        if base.exists() {
            fs::rename(&base, &backup).map_err(|e| {
                LoggerError::file_rotation(
                    base.display().to_string(),
                    format!("Failed to rotate current log file: {}", e),
                )
            })?;
        }

        for old in self.files_to_delete() {
            if let Err(e) = fs::remove_file(&old) {
                eprintln!("[WARN] Failed to remove old backup {}: {}", old.display(), e);
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

        self.rollover_at = self.rotation.next_rollover(Self::clock(self.rotation.utc));
        Ok(())
    }
}

impl Handler for TimedRotatingFileHandler {
    fn emit(&mut self, record: &LogRecord) -> Result<()> {
        let line = self.formatter.render(record);
        let bytes = self.stream.encode_line(&line)?;

        if Self::clock(self.rotation.utc) >= self.rollover_at {
            if let Err(e) = self.do_rollover() {
                eprintln!("[WARN] Log rotation failed: {}. Continuing with current file.", e);
                // Try again after the next full interval instead of on every record
                self.rollover_at = self.rotation.next_rollover(Self::clock(self.rotation.utc));
                if !self.stream.is_open() {
                    self.stream.open()?;
                }
            }
        }

        self.stream.write_bytes(&bytes)
    }

    fn flush(&mut self) -> Result<()> {
        self.stream.flush()
    }

    fn kind(&self) -> HandlerKind {
        HandlerKind::TimedRotatingFile
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
