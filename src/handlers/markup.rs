//! Inline console markup
//!
//! Supports `[bold red]text[/]` style tags: an opening tag is a
//! space-separated list of style words, `[/]` or `[/anything]` closes the
//! most recent tag. Brackets whose content is not a style list are kept as
//! literal text, and `\[` escapes a bracket.

use colored::{Color, ColoredString, Colorize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Bold,
    Dim,
    Italic,
    Underline,
    Reverse,
    Fg(Color),
    Bg(Color),
}

fn parse_color(name: &str) -> Option<Color> {
    Some(match name {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "bright_black" | "grey" | "gray" => Color::BrightBlack,
        "bright_red" => Color::BrightRed,
        "bright_green" => Color::BrightGreen,
        "bright_yellow" => Color::BrightYellow,
        "bright_blue" => Color::BrightBlue,
        "bright_magenta" => Color::BrightMagenta,
        "bright_cyan" => Color::BrightCyan,
        "bright_white" => Color::BrightWhite,
        _ => return None,
    })
}

fn parse_style_word(word: &str) -> Option<Style> {
    match word {
        "bold" | "b" => Some(Style::Bold),
        "dim" => Some(Style::Dim),
        "italic" | "i" => Some(Style::Italic),
        "underline" | "u" => Some(Style::Underline),
        "reverse" => Some(Style::Reverse),
        _ => match word.strip_prefix("on_") {
            Some(bg) => parse_color(bg).map(Style::Bg),
            None => parse_color(word).map(Style::Fg),
        },
    }
}

/// Parse the inside of a `[...]` tag into styles, or `None` if it is not a tag
fn parse_tag(content: &str) -> Option<Vec<Style>> {
    let words: Vec<&str> = content.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }
    words
        .iter()
        .map(|w| parse_style_word(&w.to_lowercase()))
        .collect()
}

fn apply(text: &str, stack: &[Vec<Style>]) -> String {
    let mut styled: ColoredString = text.normal();
    for style in stack.iter().flatten() {
        styled = match *style {
            Style::Bold => styled.bold(),
            Style::Dim => styled.dimmed(),
            Style::Italic => styled.italic(),
            Style::Underline => styled.underline(),
            Style::Reverse => styled.reversed(),
            Style::Fg(color) => styled.color(color),
            Style::Bg(color) => styled.on_color(color),
        };
    }
    styled.to_string()
}

/// Render markup. With `colors` off the tags are removed and no escape
/// sequences are produced.
pub fn render_markup(text: &str, colors: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut stack: Vec<Vec<Style>> = Vec::new();
    let mut pending = String::new();
    let mut rest = text;

    let flush = |pending: &mut String, out: &mut String, stack: &[Vec<Style>]| {
        if pending.is_empty() {
            return;
        }
        if colors && !stack.is_empty() {
            out.push_str(&apply(pending, stack));
        } else {
            out.push_str(pending);
        }
        pending.clear();
    };

    while let Some(idx) = rest.find(['[', '\\']) {
        pending.push_str(&rest[..idx]);
        let tail = &rest[idx..];

        if let Some(after) = tail.strip_prefix("\\[") {
            pending.push('[');
            rest = after;
            continue;
        }
        if tail.starts_with('\\') {
            pending.push('\\');
            rest = &tail[1..];
            continue;
        }

        // tail starts with '['
        let Some(close) = tail.find(']') else {
            pending.push_str(tail);
            rest = "";
            break;
        };
        let content = &tail[1..close];

        if content.starts_with('/') {
            if stack.is_empty() {
                pending.push_str(&tail[..=close]);
            } else {
                flush(&mut pending, &mut out, &stack);
                stack.pop();
            }
        } else if let Some(styles) = parse_tag(content) {
            flush(&mut pending, &mut out, &stack);
            stack.push(styles);
        } else {
            pending.push_str(&tail[..=close]);
        }
        rest = &tail[close + 1..];
    }

    pending.push_str(rest);
    flush(&mut pending, &mut out, &stack);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_removed_without_colors() {
        assert_eq!(
            render_markup("[bold red]alert[/] raised by [cyan]worker[/cyan]", false),
            "alert raised by worker"
        );
    }

    #[test]
    fn test_non_style_brackets_are_literal() {
        assert_eq!(render_markup("items [1, 2] done", false), "items [1, 2] done");
        assert_eq!(render_markup("array[idx]", false), "array[idx]");
        assert_eq!(render_markup("dangling [bold", false), "dangling [bold");
    }

    #[test]
    fn test_unmatched_close_is_literal() {
        assert_eq!(render_markup("oops [/] here", false), "oops [/] here");
    }

    #[test]
    fn test_escaped_bracket() {
        assert_eq!(render_markup("\\[bold] stays", false), "[bold] stays");
    }

    #[test]
    fn test_colors_emit_escape_sequences() {
        colored::control::set_override(true);
        let rendered = render_markup("[bold]x[/]", true);
        colored::control::unset_override();
        assert!(rendered.contains("\x1b["));
        assert!(rendered.contains('x'));
    }
}
