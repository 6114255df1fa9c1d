//! Message formatters
//!
//! A [`Formatter`] turns a [`LogRecord`] into one line of text using a
//! brace template such as `{timestamp} {levelname} {message}`. Templates are
//! parsed once, when the formatter is built, so malformed templates are
//! rejected before any handler uses them.

use super::error::{LoggerError, Result};
use super::log_record::LogRecord;
use super::timestamp::TimestampFormat;
use std::fmt;

/// Template registered under [`DEFAULT_FORMATTER`] by a fresh configuration
pub const DEFAULT_FORMAT: &str =
    "{name}_{timestamp} LEVEL: {levelname} - {pathname} + MESSAGE: {message}";

/// Registry key of the default formatter
pub const DEFAULT_FORMATTER: &str = "DEFAULT_FORMATTER";

/// Record attribute that can appear in a template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Timestamp,
    LevelName,
    LevelNo,
    PathName,
    FileName,
    LineNo,
    Module,
    Thread,
    Message,
}

impl Field {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "name" => Field::Name,
            "timestamp" | "asctime" => Field::Timestamp,
            "levelname" => Field::LevelName,
            "levelno" => Field::LevelNo,
            "pathname" => Field::PathName,
            "filename" => Field::FileName,
            "lineno" => Field::LineNo,
            "module" => Field::Module,
            "thread" | "threadName" => Field::Thread,
            "message" => Field::Message,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field { field: Field, width: Option<Width> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Width {
    Left(usize),
    Right(usize),
}

/// A parsed message template plus the timestamp format it renders with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    template: String,
    segments: Vec<Segment>,
    timestamp_format: TimestampFormat,
}

impl Formatter {
    /// Parse a template.
    ///
    /// Fields are written `{field}` or `{field:width}` / `{field:>width}`;
    /// `{{` and `}}` produce literal braces.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::FormatterError`] for unknown fields, bad widths
    /// or unbalanced braces.
    ///
    /// # Examples
    ///
    /// ```
    /// use logger_config::core::Formatter;
    ///
    /// assert!(Formatter::new("{levelname:8} {message}").is_ok());
    /// assert!(Formatter::new("{level} {message}").is_err());
    /// ```
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        let segments = Self::parse(&template)?;
        Ok(Self {
            template,
            segments,
            timestamp_format: TimestampFormat::default(),
        })
    }

    /// Set the timestamp format for the `{timestamp}` field
    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Set a custom strftime format for the `{timestamp}` field
    #[must_use]
    pub fn with_custom_timestamp(mut self, format_str: &str) -> Self {
        self.timestamp_format = TimestampFormat::Custom(format_str.to_string());
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn timestamp_format(&self) -> &TimestampFormat {
        &self.timestamp_format
    }

    fn parse(template: &str) -> Result<Vec<Segment>> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut spec = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        spec.push(c);
                    }
                    if !closed {
                        return Err(LoggerError::formatter(template, "unclosed '{'"));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Self::parse_field(template, &spec)?);
                }
                '}' => {
                    return Err(LoggerError::formatter(template, "single '}' encountered"));
                }
                c => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(segments)
    }

    fn parse_field(template: &str, spec: &str) -> Result<Segment> {
        let (name, width) = match spec.split_once(':') {
            Some((name, width)) => (name, Some(width)),
            None => (spec, None),
        };

        let field = Field::parse(name.trim()).ok_or_else(|| {
            LoggerError::formatter(template, format!("unknown field '{}'", name))
        })?;

        let width = match width {
            None => None,
            Some(w) => {
                let (align_right, digits) = match w.strip_prefix('>') {
                    Some(rest) => (true, rest),
                    None => (false, w.strip_prefix('<').unwrap_or(w)),
                };
                let n: usize = digits.parse().map_err(|_| {
                    LoggerError::formatter(template, format!("invalid width '{}'", w))
                })?;
                Some(if align_right {
                    Width::Right(n)
                } else {
                    Width::Left(n)
                })
            }
        };

        Ok(Segment::Field { field, width })
    }

    /// Render a record into a single line (without trailing newline)
    pub fn format(&self, record: &LogRecord) -> String {
        let mut out = String::with_capacity(self.template.len() + record.message.len() + 32);

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field { field, width } => {
                    let value = self.field_value(*field, record);
                    match width {
                        None => out.push_str(&value),
                        Some(Width::Left(n)) => out.push_str(&format!("{:<n$}", value, n = *n)),
                        Some(Width::Right(n)) => out.push_str(&format!("{:>n$}", value, n = *n)),
                    }
                }
            }
        }

        out
    }

    /// Render a record followed by its error chain, if any, on one line
    pub fn render(&self, record: &LogRecord) -> String {
        let mut line = self.format(record);
        if !record.error_chain.is_empty() {
            line.push_str(" | error: ");
            line.push_str(&record.error_chain.join(": "));
        }
        line
    }

    fn field_value(&self, field: Field, record: &LogRecord) -> String {
        match field {
            Field::Name => record.name.clone(),
            Field::Timestamp => self.timestamp_format.format(&record.timestamp),
            Field::LevelName => record.level.to_str().to_string(),
            Field::LevelNo => record.level.as_u8().to_string(),
            Field::PathName => record.pathname.clone().unwrap_or_default(),
            Field::FileName => record.filename().unwrap_or_default().to_string(),
            Field::LineNo => record.lineno.map(|l| l.to_string()).unwrap_or_default(),
            Field::Module => record.module_path.clone().unwrap_or_default(),
            Field::Thread => record.thread().to_string(),
            Field::Message => record.message.clone(),
        }
    }
}

impl Default for Formatter {
    /// The formatter built from [`DEFAULT_FORMAT`]
    fn default() -> Self {
        Self {
            template: DEFAULT_FORMAT.to_string(),
            segments: Self::parse(DEFAULT_FORMAT).unwrap_or_default(),
            timestamp_format: TimestampFormat::default(),
        }
    }
}

impl fmt::Display for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;

    fn record() -> LogRecord {
        LogRecord::new("test", LogLevel::Debug, "bug is found")
            .with_location("/srv/app/src/main.rs", 12)
            .with_module_path("app::main")
    }

    #[test]
    fn test_default_format() {
        let formatter = Formatter::default();
        let line = formatter.format(&record());

        assert!(line.starts_with("test_"));
        assert!(line.contains(" LEVEL: DEBUG - /srv/app/src/main.rs + MESSAGE: bug is found"));
    }

    #[test]
    fn test_all_fields() {
        let formatter =
            Formatter::new("{levelno}|{filename}|{lineno}|{module}|{asctime:0}").unwrap();
        let line = formatter.format(&record());
        assert!(line.starts_with("10|main.rs|12|app::main|"));
    }

    #[test]
    fn test_width_alignment() {
        let formatter = Formatter::new("[{levelname:8}] [{levelname:>8}]").unwrap();
        let line = formatter.format(&record());
        assert_eq!(line, "[DEBUG   ] [   DEBUG]");
    }

    #[test]
    fn test_escaped_braces() {
        let formatter = Formatter::new("{{literal}} {message}").unwrap();
        assert_eq!(formatter.format(&record()), "{literal} bug is found");
    }

    #[test]
    fn test_invalid_templates() {
        assert!(matches!(
            Formatter::new("{unknown}"),
            Err(LoggerError::FormatterError { .. })
        ));
        assert!(Formatter::new("{message").is_err());
        assert!(Formatter::new("message}").is_err());
        assert!(Formatter::new("{message:wide}").is_err());
    }

    #[test]
    fn test_missing_location_renders_empty() {
        let formatter = Formatter::new("<{pathname}:{lineno}>").unwrap();
        let record = LogRecord::new("x", LogLevel::Info, "m");
        assert_eq!(formatter.format(&record), "<:>");
    }

    #[test]
    fn test_custom_timestamp() {
        let formatter = Formatter::new("{timestamp}")
            .unwrap()
            .with_custom_timestamp("%Y");
        let line = formatter.format(&record());
        assert_eq!(line.len(), 4);
    }
}
