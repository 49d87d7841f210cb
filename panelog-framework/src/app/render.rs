use super::{App, HELP_POPUP_WIDTH, format_uptime};
use crate::{
    app_block::AppBlock,
    content_line_maker::{content_into_line, progress_line},
    status_bar::{StatusBar, StatusGravity},
    theme,
};
use ratatui::{
    prelude::*,
    widgets::{Clear, Paragraph, StatefulWidget, Widget},
};

impl App {
    pub(super) fn render_header(&self, area: Rect, buf: &mut Buffer) {
        StatusBar::new()
            .add(
                StatusGravity::Left,
                format!(" {}", self.title),
                Style::new().add_modifier(Modifier::BOLD),
            )
            .add_plain(StatusGravity::Right, format!("{} ", format_uptime(self.uptime())))
            .set_style(theme::HEADER_STYLE)
            .render(area, buf);
    }

    pub(super) fn render_panel(&mut self, index: usize, focused: bool, area: Rect, buf: &mut Buffer) {
        let Some(view) = self.views.get_mut(index) else {
            return;
        };
        view.last_area = Some(area);

        let snapshot = &view.snapshot;
        let mut info = Vec::new();
        for source in &snapshot.unavailable {
            info.push(Span::styled(
                format!("⚠ {} unavailable", source),
                theme::UNAVAILABLE_STYLE,
            ));
            info.push(Span::raw("─"));
        }
        let updated = snapshot
            .last_update
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "--:--:--".to_string());
        info.push(Span::raw(format!(
            "{}─{}/{}─{}",
            snapshot.name,
            snapshot.lines.len(),
            snapshot.capacity,
            updated
        )));
        if !view.autoscroll {
            info.push(Span::styled("─paused", theme::WARN_STYLE));
        }
        view.block.update_info(info);

        let [block_area, scrollbar_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(1)]).areas(area);

        let block = view.block.build(focused, view.color);
        let inner = block.inner(block_area);
        block.render(block_area, buf);

        let (progress_area, lines_area) = match &view.snapshot.progress {
            Some(_) if inner.height > 1 => {
                let [progress_area, lines_area] =
                    Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(inner);
                (Some(progress_area), lines_area)
            }
            _ => (None, inner),
        };

        if let (Some(progress_area), Some(progress)) = (progress_area, &view.snapshot.progress) {
            progress_line(progress, progress_area.width).render(progress_area, buf);
        }

        view.set_viewport_height(lines_area.height as usize);
        let top = view.visible_top();
        let lines: Vec<Line> = view
            .snapshot
            .lines
            .iter()
            .skip(top)
            .take(lines_area.height as usize)
            .map(|line| content_into_line(line, lines_area.width, Style::new().fg(theme::TEXT_FG_COLOR)))
            .collect();
        Paragraph::new(lines).render(lines_area, buf);

        StatefulWidget::render(
            AppBlock::create_scrollbar(focused, view.color),
            scrollbar_area,
            buf,
            view.block.get_scrollbar_state(),
        );
    }

    pub(super) fn render_debug_logs(&mut self, area: Rect, buf: &mut Buffer) {
        let records = self.debug_logs.lines();
        self.debug_block.set_lines_count(records.len());

        let [block_area, scrollbar_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(1)]).areas(area);

        let block = self.debug_block.build(false, theme::MUTED_FG_COLOR);
        let inner = block.inner(block_area);
        block.render(block_area, buf);

        // newest records at the bottom
        let visible = inner.height as usize;
        let top = records.len().saturating_sub(visible);
        let lines: Vec<Line> = records[top..]
            .iter()
            .map(|record| content_into_line(record, inner.width, theme::debug_line_style(record)))
            .collect();
        Paragraph::new(lines).render(inner, buf);

        self.debug_block.set_scroll_position(top);
        self.debug_block.update_scrollbar_state(top + 1, Some(top));
        StatefulWidget::render(
            AppBlock::create_scrollbar(false, theme::MUTED_FG_COLOR),
            scrollbar_area,
            buf,
            self.debug_block.get_scrollbar_state(),
        );
    }

    pub(super) fn render_footer(&self, area: Rect, buf: &mut Buffer) {
        let focus = self
            .views
            .get(self.focused)
            .map(|view| {
                let mode = if view.autoscroll { "follow" } else { "paused" };
                format!(" {} ({})", view.snapshot.title, mode)
            })
            .unwrap_or_default();

        let mut status_bar = StatusBar::new()
            .add(StatusGravity::Left, focus, Style::new().fg(theme::MUTED_FG_COLOR))
            .add(
                StatusGravity::Right,
                format!("{} lines", self.counts.ingested),
                Style::new().fg(theme::MUTED_FG_COLOR),
            )
            .add(
                StatusGravity::Right,
                format!("{}/{} sources", self.sources_running, self.sources_total),
                Style::new().fg(theme::MUTED_FG_COLOR),
            )
            .add(
                StatusGravity::Right,
                format!("v{} ", env!("CARGO_PKG_VERSION")),
                Style::new().fg(theme::MUTED_FG_COLOR),
            );

        match &self.display_event {
            Some(event) => {
                status_bar = status_bar.add(StatusGravity::Mid, event.text.clone(), event.style);
            }
            None if self.render_failures > 0 => {
                status_bar = status_bar.add(
                    StatusGravity::Mid,
                    format!("{} render failures", self.render_failures),
                    theme::ERROR_STYLE,
                );
            }
            None => {
                status_bar = status_bar.add_plain(StatusGravity::Mid, "?: help | q: quit");
            }
        }

        status_bar.render(area, buf);
    }

    pub(super) fn render_help_popup(&self, area: Rect, buf: &mut Buffer) {
        use ratatui::widgets::{Block, Borders};

        let help_text = vec![
            Line::from("Navigation:".bold()),
            Line::from("  j/k/↑/↓      - Scroll focused panel"),
            Line::from("  PgUp/PgDn    - Scroll by a page (also Ctrl+u/Ctrl+d)"),
            Line::from("  g/G          - Jump to oldest/newest line"),
            Line::from("  mouse wheel  - Scroll panel under cursor"),
            Line::from(""),
            Line::from("Focus:".bold()),
            Line::from("  Tab/Shift+Tab - Next/previous panel"),
            Line::from("  <num_key>     - Focus panel by number"),
            Line::from("  click         - Focus panel under cursor"),
            Line::from(""),
            Line::from("Actions:".bold()),
            Line::from("  c            - Clear focused panel"),
            Line::from("  d            - Toggle debug logs"),
            Line::from("  ?            - Toggle this help"),
            Line::from("  q/Esc        - Quit program"),
        ];

        // content lines + 2 for borders
        let popup_height = help_text.len() as u16 + 2;

        let [_, popup_area, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(popup_height),
            Constraint::Fill(1),
        ])
        .areas(area);
        let [_, popup_area, _] = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Length(HELP_POPUP_WIDTH),
            Constraint::Fill(1),
        ])
        .areas(popup_area);

        Clear.render(popup_area, buf);

        let block = Block::default()
            .title("Help")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::TEXT_FG_COLOR));

        Paragraph::new(help_text)
            .block(block)
            .fg(theme::TEXT_FG_COLOR)
            .render(popup_area, buf);
    }
}
