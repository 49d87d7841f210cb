use ratatui::{
    prelude::{Line, Stylize},
    style::{Color, Style},
    symbols::scrollbar,
    text::Span,
    widgets::{Block, BorderType, Borders, Scrollbar, ScrollbarOrientation, ScrollbarState},
};

fn brighten_color(color: Color) -> Color {
    match color {
        Color::Rgb(r, g, b) => Color::Rgb(
            r.saturating_add(40),
            g.saturating_add(40),
            b.saturating_add(40),
        ),
        Color::Black => Color::DarkGray,
        Color::Red => Color::LightRed,
        Color::Green => Color::LightGreen,
        Color::Yellow => Color::LightYellow,
        Color::Blue => Color::LightBlue,
        Color::Magenta => Color::LightMagenta,
        Color::Cyan => Color::LightCyan,
        Color::Gray | Color::DarkGray => Color::White,
        c => c,
    }
}

pub fn get_border_color(focused: bool, color: Color) -> Color {
    if focused {
        brighten_color(color)
    } else {
        color
    }
}

/// bordered block with a left title, a right-aligned info title and the
/// vertical scroll state of its content
pub struct AppBlock {
    title: Option<String>,
    info: Vec<Span<'static>>,
    lines_count: usize,
    scroll_position: usize,
    scrollbar_state: ScrollbarState,
}

impl AppBlock {
    pub fn new() -> Self {
        Self {
            title: None,
            info: Vec::new(),
            lines_count: 0,
            scroll_position: 0,
            scrollbar_state: ScrollbarState::default(),
        }
    }

    pub fn set_title(mut self, title: impl Into<String>) -> Self {
        self.update_title(title);
        self
    }

    pub fn update_title(&mut self, title: impl Into<String>) {
        self.title = Some(format!("─{}", title.into()));
    }

    pub fn update_info(&mut self, info: Vec<Span<'static>>) {
        self.info = info;
    }

    pub fn build(&self, focused: bool, color: Color) -> Block<'_> {
        let mut block = Block::default()
            .borders(Borders::TOP | Borders::LEFT | Borders::BOTTOM)
            .border_type(BorderType::Rounded)
            .border_style(Style::new().fg(get_border_color(focused, color)));

        if let Some(title) = &self.title {
            let title_style = if focused {
                Style::new().bold()
            } else {
                Style::new()
            };
            block = block.title(Line::from(title.as_str()).style(title_style).left_aligned());
        }

        if !self.info.is_empty() {
            block = block.title(Line::from(self.info.clone()).right_aligned());
        }

        block
    }

    pub fn update_scrollbar_state(&mut self, total_items: usize, position: Option<usize>) {
        if total_items > 0 {
            self.scrollbar_state = self
                .scrollbar_state
                .content_length(total_items)
                .position(position.unwrap_or(0));
        } else {
            // a single position shows a full-height thumb
            self.scrollbar_state = self.scrollbar_state.content_length(1).position(0);
        }
    }

    pub fn set_lines_count(&mut self, lines_count: usize) {
        self.lines_count = lines_count;
    }

    pub fn get_lines_count(&self) -> usize {
        self.lines_count
    }

    pub fn set_scroll_position(&mut self, scroll_position: usize) {
        self.scroll_position = scroll_position;
    }

    pub fn get_scroll_position(&self) -> usize {
        self.scroll_position
    }

    pub fn get_scrollbar_state(&mut self) -> &mut ScrollbarState {
        &mut self.scrollbar_state
    }

    /// scrollbar drawn in the column right of the block, closing its border
    pub fn create_scrollbar(focused: bool, color: Color) -> Scrollbar<'static> {
        Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .symbols(scrollbar::VERTICAL)
            .style(Style::default().fg(get_border_color(focused, color)))
            .begin_symbol(Some("╮"))
            .end_symbol(Some("╯"))
            .track_symbol(Some("│"))
            .thumb_symbol("█")
    }
}

impl Default for AppBlock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::layout::Rect;

    #[test]
    fn test_content_rect_excludes_borders() {
        let block = AppBlock::new().set_title("x");
        let inner = block.build(false, Color::Gray).inner(Rect::new(0, 0, 20, 10));
        assert_eq!(inner, Rect::new(1, 1, 19, 8));
    }

    #[test]
    fn test_focus_brightens_named_colors() {
        assert_eq!(get_border_color(true, Color::Blue), Color::LightBlue);
        assert_eq!(get_border_color(false, Color::Blue), Color::Blue);
        assert_eq!(
            get_border_color(true, Color::Rgb(250, 0, 10)),
            Color::Rgb(255, 40, 50)
        );
    }
}
