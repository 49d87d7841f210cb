use crate::config::PanelConfig;
use chrono::{DateTime, Local};
use panelog_parser::ProgressUpdate;
use ringbuf::{
    HeapRb,
    traits::{Consumer, Observer, RingBuffer},
};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// mutable state of one panel, guarded by the panel's mutex
pub struct PanelState {
    lines: HeapRb<String>,
    progress: Option<ProgressUpdate>,
    last_update: Option<DateTime<Local>>,
    dirty: bool,
    unavailable: Vec<String>,
    total_received: u64,
}

impl PanelState {
    /// `capacity` must be at least 1
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: HeapRb::new(capacity),
            progress: None,
            last_update: None,
            dirty: false,
            unavailable: Vec::new(),
            total_received: 0,
        }
    }

    /// appends a line, returning the evicted oldest line when the ring is full
    pub fn push_line(&mut self, line: String) -> Option<String> {
        self.total_received += 1;
        self.touch();
        self.lines.push_overwrite(line)
    }

    pub fn set_progress(&mut self, progress: ProgressUpdate) {
        self.progress = Some(progress);
        self.touch();
    }

    pub fn mark_unavailable(&mut self, source_name: impl Into<String>) {
        let source_name = source_name.into();
        if !self.unavailable.contains(&source_name) {
            self.unavailable.push(source_name);
        }
        self.dirty = true;
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.progress = None;
        self.dirty = true;
    }

    pub fn lines(&self) -> impl Iterator<Item = &String> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.occupied_len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lines.capacity().get()
    }

    pub fn progress(&self) -> Option<&ProgressUpdate> {
        self.progress.as_ref()
    }

    pub fn last_update(&self) -> Option<DateTime<Local>> {
        self.last_update
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn touch(&mut self) {
        self.last_update = Some(Local::now());
        self.dirty = true;
    }
}

/// immutable copy of a panel taken for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct PanelSnapshot {
    pub name: String,
    pub title: String,
    pub style: String,
    pub ratio: u16,
    pub lines: Vec<String>,
    pub progress: Option<ProgressUpdate>,
    pub last_update: Option<DateTime<Local>>,
    pub unavailable: Vec<String>,
    pub total_received: u64,
    pub capacity: usize,
}

/// a registered panel: its fixed config plus its guarded state
pub struct Panel {
    config: PanelConfig,
    state: Mutex<PanelState>,
}

impl Panel {
    pub fn new(config: PanelConfig, capacity: usize) -> Self {
        Self {
            config,
            state: Mutex::new(PanelState::new(capacity)),
        }
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// runs `f` with exclusive access to the state
    ///
    /// All mutation goes through here so concurrent writers to the same panel
    /// serialize while other panels stay independent.
    pub fn update<R>(&self, f: impl FnOnce(&mut PanelState) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn is_dirty(&self) -> bool {
        self.lock().is_dirty()
    }

    /// snapshot without touching the dirty flag
    pub fn snapshot(&self) -> PanelSnapshot {
        let state = self.lock();
        self.make_snapshot(&state)
    }

    /// snapshot and clear the dirty flag, or `None` if nothing changed
    pub fn take_dirty_snapshot(&self) -> Option<PanelSnapshot> {
        let mut state = self.lock();
        if !state.dirty {
            return None;
        }
        state.dirty = false;
        Some(self.make_snapshot(&state))
    }

    fn make_snapshot(&self, state: &PanelState) -> PanelSnapshot {
        PanelSnapshot {
            name: self.config.name.clone(),
            title: self.config.title.clone(),
            style: self.config.style.clone(),
            ratio: self.config.ratio,
            lines: state.lines().cloned().collect(),
            progress: state.progress.clone(),
            last_update: state.last_update,
            unavailable: state.unavailable.clone(),
            total_received: state.total_received,
            capacity: state.capacity(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PanelState> {
        // a writer that panicked mid-update leaves at worst a partial line list
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(capacity: usize) -> Panel {
        Panel::new(PanelConfig::new("p", 1), capacity)
    }

    #[test]
    fn test_fifo_eviction() {
        let panel = panel(3);
        for i in 0..5 {
            panel.update(|state| state.push_line(format!("line {}", i)));
        }

        let snapshot = panel.snapshot();
        assert_eq!(snapshot.lines, vec!["line 2", "line 3", "line 4"]);
        assert_eq!(snapshot.total_received, 5);
        assert_eq!(snapshot.capacity, 3);
    }

    #[test]
    fn test_push_returns_evicted_line() {
        let panel = panel(1);
        assert_eq!(panel.update(|s| s.push_line("a".to_string())), None);
        assert_eq!(
            panel.update(|s| s.push_line("b".to_string())),
            Some("a".to_string())
        );
    }

    #[test]
    fn test_fewer_lines_than_capacity() {
        let panel = panel(10);
        panel.update(|s| s.push_line("only".to_string()));
        assert_eq!(panel.snapshot().lines, vec!["only"]);
    }

    #[test]
    fn test_dirty_snapshot_clears_flag() {
        let panel = panel(4);
        assert!(panel.take_dirty_snapshot().is_none());

        panel.update(|s| s.push_line("x".to_string()));
        assert!(panel.is_dirty());
        let snapshot = panel.take_dirty_snapshot().unwrap();
        assert_eq!(snapshot.lines, vec!["x"]);
        assert!(snapshot.last_update.is_some());

        assert!(!panel.is_dirty());
        assert!(panel.take_dirty_snapshot().is_none());
    }

    #[test]
    fn test_plain_snapshot_keeps_dirty_flag() {
        let panel = panel(4);
        panel.update(|s| s.push_line("x".to_string()));
        let _ = panel.snapshot();
        assert!(panel.is_dirty());
    }

    #[test]
    fn test_progress_is_overwritten() {
        let panel = panel(4);
        panel.update(|s| s.set_progress(ProgressUpdate::new(10.0, 100.0, "sync")));
        panel.update(|s| s.set_progress(ProgressUpdate::new(3.0, 4.0, "copy")));

        let progress = panel.snapshot().progress.unwrap();
        assert_eq!(progress.current, 3.0);
        assert_eq!(progress.label, "copy");
    }

    #[test]
    fn test_clear() {
        let panel = panel(4);
        panel.update(|s| {
            s.push_line("x".to_string());
            s.set_progress(ProgressUpdate::new(1.0, 2.0, ""));
            s.clear();
        });
        let snapshot = panel.snapshot();
        assert!(snapshot.lines.is_empty());
        assert!(snapshot.progress.is_none());
        assert_eq!(snapshot.total_received, 1);
    }

    #[test]
    fn test_unavailable_sources_are_deduplicated() {
        let panel = panel(4);
        panel.update(|s| s.mark_unavailable("app.log"));
        panel.update(|s| s.mark_unavailable("app.log"));
        assert_eq!(panel.snapshot().unavailable, vec!["app.log"]);
    }
}
