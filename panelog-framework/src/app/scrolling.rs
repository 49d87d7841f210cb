use super::{App, PanelView};

impl PanelView {
    fn max_top(&self) -> usize {
        self.snapshot.lines.len().saturating_sub(self.viewport_height)
    }

    /// first visible line; follows the newest lines while autoscrolling
    pub(super) fn visible_top(&self) -> usize {
        if self.autoscroll {
            self.max_top()
        } else {
            self.block.get_scroll_position().min(self.max_top())
        }
    }

    /// called by the renderer once the content height is known
    pub(super) fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = height;
        let top = self.visible_top();
        self.block.set_scroll_position(top);
        self.block.update_scrollbar_state(self.max_top() + 1, Some(top));
    }

    pub(super) fn scroll_up(&mut self, lines: usize) {
        let top = self.visible_top().saturating_sub(lines);
        self.autoscroll = false;
        self.block.set_scroll_position(top);
    }

    pub(super) fn scroll_down(&mut self, lines: usize) {
        let top = self.visible_top().saturating_add(lines);
        if top >= self.max_top() {
            self.scroll_to_bottom();
        } else {
            self.block.set_scroll_position(top);
        }
    }

    pub(super) fn scroll_to_top(&mut self) {
        self.autoscroll = self.max_top() == 0;
        self.block.set_scroll_position(0);
    }

    pub(super) fn scroll_to_bottom(&mut self) {
        self.autoscroll = true;
        self.block.set_scroll_position(self.max_top());
    }

    pub(super) fn page(&self) -> usize {
        self.viewport_height.saturating_sub(1).max(1)
    }
}

impl App {
    pub(super) fn focused_view(&mut self) -> Option<&mut PanelView> {
        self.views.get_mut(self.focused)
    }

    pub(super) fn scroll_focused(&mut self, down: bool, lines: usize) {
        self.scroll_view(self.focused, down, lines);
    }

    pub(super) fn scroll_view(&mut self, index: usize, down: bool, lines: usize) {
        if let Some(view) = self.views.get_mut(index) {
            if down {
                view.scroll_down(lines);
            } else {
                view.scroll_up(lines);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        app::PanelView,
        config::PanelConfig,
        panel::Panel,
    };
    use std::sync::Arc;

    fn view_with_lines(count: usize, viewport: usize) -> PanelView {
        let panel = Arc::new(Panel::new(PanelConfig::new("p", 1), 100));
        for i in 0..count {
            panel.update(|s| s.push_line(format!("{}", i)));
        }
        let mut view = PanelView::new(0, panel);
        view.refresh();
        view.set_viewport_height(viewport);
        view
    }

    #[test]
    fn test_follows_bottom_by_default() {
        let view = view_with_lines(20, 5);
        assert!(view.autoscroll);
        assert_eq!(view.visible_top(), 15);
    }

    #[test]
    fn test_scroll_up_then_back_down() {
        let mut view = view_with_lines(20, 5);
        view.scroll_up(3);
        assert!(!view.autoscroll);
        assert_eq!(view.visible_top(), 12);

        view.scroll_down(2);
        assert!(!view.autoscroll);
        assert_eq!(view.visible_top(), 14);

        view.scroll_down(10);
        assert!(view.autoscroll);
        assert_eq!(view.visible_top(), 15);
    }

    #[test]
    fn test_scroll_to_top() {
        let mut view = view_with_lines(20, 5);
        view.scroll_to_top();
        assert_eq!(view.visible_top(), 0);
        assert!(!view.autoscroll);

        // nothing to scroll when everything fits
        let mut short = view_with_lines(3, 5);
        short.scroll_to_top();
        assert!(short.autoscroll);
    }

    #[test]
    fn test_paused_view_stays_on_lines_while_evicting() {
        let panel = Arc::new(Panel::new(PanelConfig::new("p", 1), 10));
        for i in 0..10 {
            panel.update(|s| s.push_line(format!("{}", i)));
        }
        let mut view = PanelView::new(0, panel.clone());
        view.refresh();
        view.set_viewport_height(3);
        view.scroll_to_top();
        view.scroll_down(4);
        assert_eq!(view.snapshot.lines[view.visible_top()], "4");

        // two new lines evict "0" and "1"
        panel.update(|s| s.push_line("10".to_string()));
        panel.update(|s| s.push_line("11".to_string()));
        view.refresh();
        assert_eq!(view.snapshot.lines[view.visible_top()], "4");
    }
}
