use super::{App, MOUSE_SCROLL_STEP};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

impl App {
    pub(super) fn handle_mouse_event(&mut self, mouse: &MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollDown => {
                if let Some(index) = self.view_under_mouse(mouse) {
                    self.scroll_view(index, true, MOUSE_SCROLL_STEP);
                }
            }
            MouseEventKind::ScrollUp => {
                if let Some(index) = self.view_under_mouse(mouse) {
                    self.scroll_view(index, false, MOUSE_SCROLL_STEP);
                }
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(index) = self.view_under_mouse(mouse) {
                    self.focus_index(index);
                }
            }
            _ => {}
        }
    }

    pub(super) fn clear_focused_panel(&mut self) {
        let Some(view) = self.focused_view() else {
            return;
        };
        view.panel.update(|state| state.clear());
        view.autoscroll = true;
        let name = view.snapshot.name.clone();

        log::debug!("Cleared panel '{}'", name);
        self.set_display_event(format!("Cleared panel '{}'", name));
    }

    pub(super) fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => {
                    log::debug!("Ctrl+C pressed");
                    self.is_exiting = true;
                }
                KeyCode::Char('d') => {
                    let page = self.focused_page();
                    self.scroll_focused(true, page);
                }
                KeyCode::Char('u') => {
                    let page = self.focused_page();
                    self.scroll_focused(false, page);
                }
                _ => {}
            }
            return;
        }

        // help popup mode has higher priority
        if self.show_help_popup {
            match key.code {
                KeyCode::Char('?') | KeyCode::Esc => {
                    self.show_help_popup = false;
                    return;
                }
                KeyCode::Char('q') => {
                    // let 'q' fall through to quit the program
                }
                _ => return,
            }
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                log::debug!("Quit key pressed");
                self.is_exiting = true;
            }
            KeyCode::Char('?') => self.show_help_popup = true,
            KeyCode::Tab => self.focus_next(),
            KeyCode::BackTab => self.focus_previous(),
            KeyCode::Char(c @ '1'..='9') => {
                if let Some(digit) = c.to_digit(10) {
                    self.focus_index(digit as usize - 1);
                }
            }
            KeyCode::Char('j') | KeyCode::Down => self.scroll_focused(true, 1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_focused(false, 1),
            KeyCode::PageDown => {
                let page = self.focused_page();
                self.scroll_focused(true, page);
            }
            KeyCode::PageUp => {
                let page = self.focused_page();
                self.scroll_focused(false, page);
            }
            KeyCode::Char('g') | KeyCode::Home => {
                if let Some(view) = self.focused_view() {
                    view.scroll_to_top();
                }
            }
            KeyCode::Char('G') | KeyCode::End => {
                if let Some(view) = self.focused_view() {
                    view.scroll_to_bottom();
                }
            }
            KeyCode::Char('c') => self.clear_focused_panel(),
            KeyCode::Char('d') => {
                self.show_debug_logs = !self.show_debug_logs;
                log::debug!("Debug block toggled: {}", self.show_debug_logs);
            }
            _ => {}
        }
    }

    fn focused_page(&self) -> usize {
        self.views.get(self.focused).map_or(1, |view| view.page())
    }
}
