//! Colorized console handler with inline markup

use super::console::ConsoleStream;
use super::markup::render_markup;
use crate::core::{Formatter, Handler, HandlerKind, LogLevel, LogRecord, Result};
use colored::Colorize;
use std::io::IsTerminal;

/// Console handler that colors level names, renders `[bold red]...[/]`
/// markup and prints error chains as an indented tree.
///
/// # Examples
///
/// ```
/// use logger_config::core::{Formatter, LogLevel};
/// use logger_config::handlers::RichConsoleHandler;
///
/// let handler = RichConsoleHandler::new(LogLevel::Info, Formatter::default())
///     .with_markup(true)
///     .with_rich_tracebacks(false);
/// ```
#[derive(Debug)]
pub struct RichConsoleHandler {
    level: LogLevel,
    formatter: Formatter,
    markup: bool,
    rich_tracebacks: bool,
    use_colors: bool,
    stream: ConsoleStream,
}

impl RichConsoleHandler {
    /// Rich handler on standard output; colors are on when stdout is a terminal
    pub fn new(level: LogLevel, formatter: Formatter) -> Self {
        Self {
            level,
            formatter,
            markup: true,
            rich_tracebacks: true,
            use_colors: std::io::stdout().is_terminal(),
            stream: ConsoleStream::Stdout,
        }
    }

    #[must_use]
    pub fn with_markup(mut self, markup: bool) -> Self {
        self.markup = markup;
        self
    }

    #[must_use]
    pub fn with_rich_tracebacks(mut self, rich_tracebacks: bool) -> Self {
        self.rich_tracebacks = rich_tracebacks;
        self
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    #[must_use]
    pub fn with_stream(mut self, stream: ConsoleStream) -> Self {
        self.stream = stream;
        self
    }

    pub fn markup(&self) -> bool {
        self.markup
    }

    pub fn rich_tracebacks(&self) -> bool {
        self.rich_tracebacks
    }

    fn level_column(&self, level: LogLevel) -> String {
        let padded = format!("{:<8}", level.to_str());
        if self.use_colors {
            let colored = padded.color(level.color_code());
            if level >= LogLevel::Error {
                colored.bold().to_string()
            } else {
                colored.to_string()
            }
        } else {
            padded
        }
    }

    fn render(&self, record: &LogRecord) -> String {
        let body = self.formatter.format(record);
        let body = if self.markup {
            render_markup(&body, self.use_colors)
        } else {
            body
        };

        let mut output = format!("{} {}", self.level_column(record.level), body);

        if !record.error_chain.is_empty() {
            if self.rich_tracebacks {
                let mut chain = record.error_chain.iter();
                if let Some(top) = chain.next() {
                    let label = if self.use_colors {
                        "Error:".red().bold().to_string()
                    } else {
                        "Error:".to_string()
                    };
                    output.push_str(&format!("\n  {} {}", label, top));
                }
                let causes: Vec<&String> = chain.collect();
                for (i, cause) in causes.iter().enumerate() {
                    let branch = if i + 1 == causes.len() { "└─" } else { "├─" };
                    output.push_str(&format!("\n  {} Caused by: {}", branch, cause));
                }
            } else {
                output.push_str(" | error: ");
                output.push_str(&record.error_chain.join(": "));
            }
        }

        output.push('\n');
        output
    }
}

impl Handler for RichConsoleHandler {
    fn emit(&mut self, record: &LogRecord) -> Result<()> {
        let output = self.render(record);
        self.stream.write_all(output.as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.stream.flush()?;
        Ok(())
    }

    fn kind(&self) -> HandlerKind {
        HandlerKind::RichConsole
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

#[cfg(test)]
mod tests {
    use super::super::console::test_support::SharedBuffer;
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Wrapped {
        source: std::io::Error,
    }

    impl fmt::Display for Wrapped {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("config unreadable")
        }
    }

    impl std::error::Error for Wrapped {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.source)
        }
    }

    fn plain_handler(buffer: &SharedBuffer) -> RichConsoleHandler {
        RichConsoleHandler::new(LogLevel::Debug, Formatter::new("{message}").unwrap())
            .with_colors(false)
            .with_stream(ConsoleStream::writer(buffer.clone()))
    }

    #[test]
    fn test_defaults() {
        let handler = RichConsoleHandler::new(LogLevel::Info, Formatter::default());
        assert!(handler.markup());
        assert!(handler.rich_tracebacks());
        assert_eq!(handler.kind(), HandlerKind::RichConsole);
    }

    #[test]
    fn test_level_column_and_markup() {
        let buffer = SharedBuffer::default();
        let mut handler = plain_handler(&buffer);

        handler
            .emit(&LogRecord::new("rich", LogLevel::Warning, "[bold]disk[/] almost full"))
            .unwrap();
        assert_eq!(buffer.contents(), "WARNING  disk almost full\n");
    }

    #[test]
    fn test_markup_disabled_keeps_tags() {
        let buffer = SharedBuffer::default();
        let mut handler = plain_handler(&buffer).with_markup(false);

        handler
            .emit(&LogRecord::new("rich", LogLevel::Info, "[bold]literal[/]"))
            .unwrap();
        assert_eq!(buffer.contents(), "INFO     [bold]literal[/]\n");
    }

    #[test]
    fn test_traceback_tree() {
        let buffer = SharedBuffer::default();
        let mut handler = plain_handler(&buffer);

        let err = Wrapped {
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "app.toml missing"),
        };
        handler
            .emit(&LogRecord::new("rich", LogLevel::Error, "startup failed").with_error(&err))
            .unwrap();

        assert_eq!(
            buffer.contents(),
            "ERROR    startup failed\n  Error: config unreadable\n  \
             └─ Caused by: app.toml missing\n"
        );
    }

    #[test]
    fn test_plain_tracebacks() {
        let buffer = SharedBuffer::default();
        let mut handler = plain_handler(&buffer).with_rich_tracebacks(false);

        let err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        handler
            .emit(&LogRecord::new("rich", LogLevel::Critical, "halt").with_error(&err))
            .unwrap();
        assert_eq!(buffer.contents(), "CRITICAL halt | error: boom\n");
    }
}
