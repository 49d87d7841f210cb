use panelog_parser::ProgressUpdate;
use ratatui::{
    style::Style,
    text::{Line, Span},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::theme;

const ELLIPSIS: &str = "..";
const MIN_BAR_WIDTH: usize = 5;
const COMPLETE_MARK: &str = " ✅";

/// drops ANSI CSI sequences and control characters
pub fn sanitize_control_chars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\x1b' {
            if chars.peek() == Some(&'[') {
                chars.next();
                while let Some(&ch) = chars.peek() {
                    chars.next();
                    if ch.is_ascii_alphabetic() {
                        break;
                    }
                }
            }
            continue;
        }
        if c == '\t' {
            result.push_str("    ");
            continue;
        }
        if c.is_control() {
            continue;
        }
        result.push(c);
    }

    result
}

/// cuts `content` to at most `width` terminal columns, marking the cut with ".."
pub fn truncate_to_width(content: &str, width: usize) -> String {
    if content.width() <= width {
        return content.to_string();
    }
    if width <= ELLIPSIS.len() {
        return ".".repeat(width);
    }

    let budget = width - ELLIPSIS.len();
    let mut used = 0;
    let mut truncated = String::new();
    for ch in content.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > budget {
            break;
        }
        used += ch_width;
        truncated.push(ch);
    }
    truncated.push_str(ELLIPSIS);
    truncated
}

/// one display row for a stored log line
pub fn content_into_line(content: &str, width: u16, style: Style) -> Line<'static> {
    let sanitized = sanitize_control_chars(content);
    Line::styled(truncate_to_width(&sanitized, width as usize), style)
}

fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}

/// `label [████░░░░] 3/10 (30.0%)`, or `label [██░░] 45.0%` for percentages
///
/// The bar takes whatever width the label and figures leave over and is
/// dropped when fewer than a few columns remain.
pub fn progress_line(progress: &ProgressUpdate, width: u16) -> Line<'static> {
    let width = width as usize;
    let percentage = progress.percentage();

    let mut figures = if progress.fraction {
        format!(
            "{}/{} ({:.1}%)",
            format_amount(progress.current),
            format_amount(progress.total),
            percentage
        )
    } else {
        format!("{:.1}%", percentage)
    };
    if progress.is_complete() {
        figures.push_str(COMPLETE_MARK);
    }

    let label = sanitize_control_chars(&progress.label);
    let label_width = if label.is_empty() { 0 } else { label.width() + 1 };

    // brackets plus the space before the figures
    let bar_inner = width.saturating_sub(label_width + figures.width() + 3);

    if bar_inner < MIN_BAR_WIDTH {
        let text = if label.is_empty() {
            figures
        } else {
            format!("{} {}", label, figures)
        };
        return Line::styled(truncate_to_width(&text, width), theme::INFO_STYLE);
    }

    let filled = (((percentage / 100.0) * bar_inner as f64).round() as usize).min(bar_inner);

    let mut spans = Vec::new();
    if !label.is_empty() {
        spans.push(Span::styled(format!("{} ", label), theme::INFO_STYLE));
    }
    spans.push(Span::raw("["));
    spans.push(Span::styled("█".repeat(filled), theme::PROGRESS_FILLED_STYLE));
    spans.push(Span::styled(
        "░".repeat(bar_inner - filled),
        theme::PROGRESS_EMPTY_STYLE,
    ));
    spans.push(Span::raw("] "));
    spans.push(Span::styled(figures, theme::INFO_STYLE));
    Line::from(spans)
}
