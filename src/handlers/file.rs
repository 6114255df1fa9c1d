//! File handler implementation

use crate::core::{Formatter, Handler, HandlerKind, LogLevel, LogRecord, LoggerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// How an existing log file is treated when first opened
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileMode {
    #[default]
    Append,
    Truncate,
}

/// Byte encoding of written text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    #[default]
    Utf8,
    Ascii,
    Latin1,
}

/// What to do with characters the encoding cannot represent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingErrors {
    /// Fail the write
    #[default]
    Strict,
    /// Drop the character
    Ignore,
    /// Write `?` instead
    Replace,
    /// Write a `\xNN`, `\uNNNN` or `\UNNNNNNNN` escape
    BackslashReplace,
}

impl TextEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Ascii => "ascii",
            TextEncoding::Latin1 => "latin-1",
        }
    }

    fn max_code_point(&self) -> u32 {
        match self {
            TextEncoding::Utf8 => u32::from(char::MAX),
            TextEncoding::Ascii => 0x7F,
            TextEncoding::Latin1 => 0xFF,
        }
    }

    /// Encode `text`, applying `errors` to unrepresentable characters
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::EncodingError`] under [`EncodingErrors::Strict`]
    pub fn encode(&self, text: &str, errors: EncodingErrors) -> Result<Vec<u8>> {
        if *self == TextEncoding::Utf8 {
            return Ok(text.as_bytes().to_vec());
        }

        let max = self.max_code_point();
        let mut out = Vec::with_capacity(text.len());
        for c in text.chars() {
            let code = u32::from(c);
            if code <= max {
                // Both single-byte encodings map code points straight to bytes
                out.push(code as u8);
                continue;
            }
            match errors {
                EncodingErrors::Strict => return Err(LoggerError::encoding(self.as_str(), c)),
                EncodingErrors::Ignore => {}
                EncodingErrors::Replace => out.push(b'?'),
                EncodingErrors::BackslashReplace => {
                    let escaped = if code <= 0xFF {
                        format!("\\x{:02x}", code)
                    } else if code <= 0xFFFF {
                        format!("\\u{:04x}", code)
                    } else {
                        format!("\\U{:08x}", code)
                    };
                    out.extend_from_slice(escaped.as_bytes());
                }
            }
        }
        Ok(out)
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options shared by every file-backed handler
///
/// # Examples
///
/// ```
/// use logger_config::handlers::{EncodingErrors, FileMode, FileOptions, TextEncoding};
///
/// let options = FileOptions::new()
///     .with_mode(FileMode::Truncate)
///     .with_encoding(TextEncoding::Ascii)
///     .with_errors(EncodingErrors::Replace)
///     .with_delay(true);
/// assert!(options.delay);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOptions {
    pub mode: FileMode,
    pub encoding: TextEncoding,
    pub errors: EncodingErrors,
    /// Defer opening the file until the first record is written
    pub delay: bool,
}

impl FileOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_mode(mut self, mode: FileMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_errors(mut self, errors: EncodingErrors) -> Self {
        self.errors = errors;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_delay(mut self, delay: bool) -> Self {
        self.delay = delay;
        self
    }
}

/// Open log file plus the bookkeeping the rotating handlers share
pub(crate) struct FileStream {
    path: PathBuf,
    options: FileOptions,
    writer: Option<BufWriter<File>>,
    size: u64,
    /// Truncation only applies to the first open
    truncate_pending: bool,
}

impl FileStream {
    pub(crate) fn new(path: impl Into<PathBuf>, options: FileOptions) -> Result<Self> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(LoggerError::file_handler("", "path must not be empty"));
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let truncate_pending = options.mode == FileMode::Truncate;
        let delay = options.delay;
        let mut stream = Self {
            path,
            options,
            writer: None,
            size: 0,
            truncate_pending,
        };
        if !delay {
            stream.open()?;
        }
        Ok(stream)
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn options(&self) -> &FileOptions {
        &self.options
    }

    pub(crate) fn size(&self) -> u64 {
        self.size
    }

    pub(crate) fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    pub(crate) fn open(&mut self) -> Result<()> {
        let mut open_options = OpenOptions::new();
        open_options.create(true);
        if self.truncate_pending {
            open_options.write(true).truncate(true);
        } else {
            open_options.append(true);
        }

        let file = open_options.open(&self.path).map_err(|e| {
            LoggerError::file_handler(
                self.path.display().to_string(),
                format!("Failed to open: {}", e),
            )
        })?;
        let size = file
            .metadata()
            .map_err(|e| {
                LoggerError::file_handler(
                    self.path.display().to_string(),
                    format!("Cannot access file metadata: {}", e),
                )
            })?
            .len();

        self.truncate_pending = false;
        self.size = size;
        self.writer = Some(BufWriter::new(file));
        Ok(())
    }

    /// Encode a formatted line with the configured encoding, newline included
    pub(crate) fn encode_line(&self, line: &str) -> Result<Vec<u8>> {
        let mut bytes = self.options.encoding.encode(line, self.options.errors)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Write already-encoded bytes, opening the file if it was deferred
    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if self.writer.is_none() {
            self.open()?;
        }
        let path = &self.path;
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| {
                LoggerError::file_handler(path.display().to_string(), "File writer not initialized")
            })?;

        writer
            .write_all(bytes)
            .and_then(|_| writer.flush())
            .map_err(|e| {
                LoggerError::file_handler(
                    path.display().to_string(),
                    format!("Failed to write log record: {}", e),
                )
            })?;
        self.size += bytes.len() as u64;
        Ok(())
    }

    pub(crate) fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush().map_err(|e| {
                LoggerError::file_handler(
                    self.path.display().to_string(),
                    format!("Failed to flush: {}", e),
                )
            })?;
        }
        Ok(())
    }

    /// Flush and release the file handle
    pub(crate) fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_handler(
                    self.path.display().to_string(),
                    format!("Failed to flush before close: {}", e),
                )
            })?;
        }
        self.size = 0;
        Ok(())
    }
}

impl Drop for FileStream {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}

impl fmt::Debug for FileStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStream")
            .field("path", &self.path)
            .field("options", &self.options)
            .field("open", &self.writer.is_some())
            .field("size", &self.size)
            .finish()
    }
}

/// Appends one formatted line per record to a file
///
/// # Examples
///
/// ```no_run
/// use logger_config::core::{Formatter, LogLevel};
/// use logger_config::handlers::{FileHandler, FileOptions};
///
/// let handler = FileHandler::new(
///     LogLevel::Info,
///     Formatter::default(),
///     "/var/log/app.log",
///     FileOptions::default(),
/// )
/// .unwrap();
/// ```
#[derive(Debug)]
pub struct FileHandler {
    level: LogLevel,
    formatter: Formatter,
    stream: FileStream,
}

impl FileHandler {
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or, unless
    /// opening is delayed, the file cannot be opened.
    pub fn new(
        level: LogLevel,
        formatter: Formatter,
        path: impl Into<PathBuf>,
        options: FileOptions,
    ) -> Result<Self> {
        Ok(Self {
            level,
            formatter,
            stream: FileStream::new(path, options)?,
        })
    }

    pub fn path(&self) -> &Path {
        self.stream.path()
    }

    pub fn options(&self) -> &FileOptions {
        self.stream.options()
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_open()
    }

    pub fn close(&mut self) -> Result<()> {
        self.stream.close()
    }
}

impl Handler for FileHandler {
    fn emit(&mut self, record: &LogRecord) -> Result<()> {
        let line = self.formatter.render(record);
        let bytes = self.stream.encode_line(&line)?;
        self.stream.write_bytes(&bytes)
    }

    fn flush(&mut self) -> Result<()> {
        self.stream.flush()
    }

    fn kind(&self) -> HandlerKind {
        HandlerKind::File
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
