//! Console handler implementation

use crate::core::{Formatter, Handler, HandlerKind, LogLevel, LogRecord, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;

/// Where a console handler writes
pub enum ConsoleStream {
    Stdout,
    Stderr,
    /// Any caller-supplied sink, e.g. a socket or an in-memory buffer
    Writer(Box<dyn Write + Send>),
}

impl ConsoleStream {
    pub fn writer<W: Write + Send + 'static>(writer: W) -> Self {
        ConsoleStream::Writer(Box::new(writer))
    }

    pub(crate) fn write_all(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        match self {
            ConsoleStream::Stdout => {
                let mut out = std::io::stdout().lock();
                out.write_all(bytes)?;
                out.flush()
            }
            ConsoleStream::Stderr => {
                let mut err = std::io::stderr().lock();
                err.write_all(bytes)?;
                err.flush()
            }
            ConsoleStream::Writer(writer) => {
                writer.write_all(bytes)?;
                writer.flush()
            }
        }
    }

    pub(crate) fn flush(&mut self) -> std::io::Result<()> {
        match self {
            ConsoleStream::Stdout => std::io::stdout().flush(),
            ConsoleStream::Stderr => std::io::stderr().flush(),
            ConsoleStream::Writer(writer) => writer.flush(),
        }
    }
}

impl Default for ConsoleStream {
    fn default() -> Self {
        ConsoleStream::Stdout
    }
}

impl fmt::Debug for ConsoleStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleStream::Stdout => f.write_str("Stdout"),
            ConsoleStream::Stderr => f.write_str("Stderr"),
            ConsoleStream::Writer(_) => f.write_str("Writer(..)"),
        }
    }
}

/// Standard stream selector used by configuration files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamTarget {
    #[default]
    Stdout,
    Stderr,
}

impl From<StreamTarget> for ConsoleStream {
    fn from(target: StreamTarget) -> Self {
        match target {
            StreamTarget::Stdout => ConsoleStream::Stdout,
            StreamTarget::Stderr => ConsoleStream::Stderr,
        }
    }
}

/// Writes one formatted line per record to a stream
#[derive(Debug)]
pub struct ConsoleHandler {
    level: LogLevel,
    formatter: Formatter,
    stream: ConsoleStream,
}

impl ConsoleHandler {
    pub fn new(level: LogLevel, formatter: Formatter, stream: ConsoleStream) -> Self {
        Self {
            level,
            formatter,
            stream,
        }
    }

    /// Console handler on standard output
    pub fn stdout(level: LogLevel, formatter: Formatter) -> Self {
        Self::new(level, formatter, ConsoleStream::Stdout)
    }

    pub fn stream(&self) -> &ConsoleStream {
        &self.stream
    }
}

impl Handler for ConsoleHandler {
    fn emit(&mut self, record: &LogRecord) -> Result<()> {
        let mut line = self.formatter.render(record);
        line.push('\n');
        self.stream.write_all(line.as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.stream.flush()?;
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
