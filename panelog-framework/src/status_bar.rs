use ratatui::{
    prelude::*,
    widgets::{Paragraph, Widget},
};
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

/// short-lived message shown in the middle of the footer
pub struct DisplayEvent {
    pub text: String,
    pub style: Style,
    shown_at: Instant,
    duration: Duration,
}

impl DisplayEvent {
    pub fn new(text: impl Into<String>, duration: Duration, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
            shown_at: Instant::now(),
            duration,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.shown_at.elapsed() >= self.duration
    }

    /// drops the event once it has expired
    pub fn retain(event: Option<Self>) -> Option<Self> {
        event.filter(|e| !e.is_expired())
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum StatusGravity {
    Left,
    Mid,
    Right,
}

struct StatusSegment {
    text: String,
    style: Style,
}

/// one-row footer with left, centred and right aligned segment groups
#[derive(Default)]
pub struct StatusBar {
    left: Vec<StatusSegment>,
    mid: Vec<StatusSegment>,
    right: Vec<StatusSegment>,
    style: Style,
}

impl StatusBar {
    const SEPARATOR: &'static str = " | ";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, gravity: StatusGravity, text: impl Into<String>, style: Style) -> Self {
        let segment = StatusSegment {
            text: text.into(),
            style,
        };
        match gravity {
            StatusGravity::Left => self.left.push(segment),
            StatusGravity::Mid => self.mid.push(segment),
            StatusGravity::Right => self.right.push(segment),
        }
        self
    }

    pub fn add_plain(self, gravity: StatusGravity, text: impl Into<String>) -> Self {
        self.add(gravity, text, Style::default())
    }

    pub fn set_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    fn spans(segments: &[StatusSegment]) -> (Vec<Span<'_>>, usize) {
        let mut spans = Vec::new();
        let mut width = 0;
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(Self::SEPARATOR));
                width += Self::SEPARATOR.width();
            }
            spans.push(Span::styled(segment.text.as_str(), segment.style));
            width += segment.text.width();
        }
        (spans, width)
    }
}

impl Widget for StatusBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let total_width = area.width as usize;

        let (left_spans, left_width) = Self::spans(&self.left);
        let (mid_spans, mid_width) = Self::spans(&self.mid);
        let (right_spans, right_width) = Self::spans(&self.right);

        let mid_start = total_width.saturating_sub(mid_width) / 2;
        let right_start = total_width.saturating_sub(right_width);

        let mut spans = left_spans;
        spans.push(Span::raw(" ".repeat(mid_start.saturating_sub(left_width))));
        spans.extend(mid_spans);
        spans.push(Span::raw(
            " ".repeat(right_start.saturating_sub(mid_start.max(left_width) + mid_width)),
        ));
        spans.extend(right_spans);

        Paragraph::new(Line::from(spans))
            .style(self.style)
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_to_string(bar: StatusBar, width: u16) -> String {
        let area = Rect::new(0, 0, width, 1);
        let mut buf = Buffer::empty(area);
        bar.render(area, &mut buf);
        buf.content.iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_segments_are_aligned() {
        let bar = StatusBar::new()
            .add_plain(StatusGravity::Left, "L")
            .add_plain(StatusGravity::Mid, "MM")
            .add_plain(StatusGravity::Right, "R");
        assert_eq!(render_to_string(bar, 10), "L   MM   R");
    }

    #[test]
    fn test_separator_between_segments() {
        let bar = StatusBar::new()
            .add_plain(StatusGravity::Left, "a")
            .add_plain(StatusGravity::Left, "b");
        assert_eq!(render_to_string(bar, 7), "a | b  ");
    }

    #[test]
    fn test_expired_event_is_dropped() {
        let event = DisplayEvent::new("x", Duration::ZERO, Style::default());
        assert!(DisplayEvent::retain(Some(event)).is_none());

        let event = DisplayEvent::new("y", Duration::from_secs(60), Style::default());
        assert!(DisplayEvent::retain(Some(event)).is_some());
    }
}
