use crate::{
    app_block::AppBlock,
    config::LayoutConfig,
    error::ViewerError,
    layout::split_by_ratio,
    panel::{Panel, PanelSnapshot},
    registry::{DEFAULT_PANEL_NAME, PanelRegistry},
    router::{LogRouter, RouterCounts},
    source::{SourceHandle, SourceStatus, TailSource, spawn_source_thread},
    status_bar::DisplayEvent,
    theme,
    ui_logger::{DebugLogBuffer, setup_logger},
};
use anyhow::{Result, anyhow};
use crossterm::event::{self, Event, MouseEvent};
use log::LevelFilter;
use panelog_parser::TagParser;
use ratatui::{Terminal, prelude::*, widgets::Widget};
use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

mod events;
mod render;
mod scrolling;

// constants
const DEFAULT_TICK_INTERVAL_MS: u64 = 100;
const DEFAULT_EVENT_POLL_INTERVAL_MS: u64 = 16;
const DEFAULT_SOURCE_POLL_INTERVAL_MS: u64 = 50;
pub const DEFAULT_CAPACITY: usize = 500;
const HELP_POPUP_WIDTH: u16 = 56;
const DEBUG_BLOCK_HEIGHT: u16 = 8;
const MOUSE_SCROLL_STEP: usize = 3;
const DISPLAY_EVENT_DURATION_MS: u64 = 1500;

#[derive(Clone)]
pub struct ViewerDesc {
    /// how often dirty panels are snapshotted and redrawn
    pub tick_interval: Duration,
    pub event_poll_interval: Duration,
    /// how often each tail source is polled
    pub poll_interval: Duration,
    /// lines kept per panel
    pub capacity: usize,
    pub default_panel: String,
    pub parser: TagParser,
    pub show_debug_logs: bool,
    pub log_level: LevelFilter,
    pub debug_log_file: Option<PathBuf>,
    pub title: String,
}

impl Default for ViewerDesc {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            event_poll_interval: Duration::from_millis(DEFAULT_EVENT_POLL_INTERVAL_MS),
            poll_interval: Duration::from_millis(DEFAULT_SOURCE_POLL_INTERVAL_MS),
            capacity: DEFAULT_CAPACITY,
            default_panel: DEFAULT_PANEL_NAME.to_string(),
            parser: TagParser::new(),
            show_debug_logs: false,
            log_level: LevelFilter::Debug,
            debug_log_file: None,
            title: "panelog".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerPhase {
    Starting,
    Running,
    ShuttingDown,
    Stopped,
}

/// Owns the panel registry, the router and the tail source threads.
///
/// Sources are attached while the viewer is `Starting`; [`Viewer::run`]
/// drives the terminal until the user quits or the shutdown signal is raised,
/// then stops every source.
pub struct Viewer {
    desc: ViewerDesc,
    phase: ViewerPhase,
    router: Arc<LogRouter>,
    sources: Vec<SourceHandle>,
    debug_logs: DebugLogBuffer,
    shutdown_signal: Arc<AtomicBool>,
}

impl Viewer {
    pub fn new(layout: &LayoutConfig, desc: ViewerDesc) -> Result<Self> {
        let debug_logs = DebugLogBuffer::default();
        setup_logger(&debug_logs, desc.log_level, desc.debug_log_file.as_deref())?;

        let registry = PanelRegistry::from_layout(layout, desc.default_panel.clone(), desc.capacity)?;
        log::info!(
            "Viewer: {} panels, capacity {} lines each",
            registry.len(),
            registry.capacity()
        );
        let router = LogRouter::new(Arc::new(registry), desc.parser.clone());

        Ok(Self {
            desc,
            phase: ViewerPhase::Starting,
            router: Arc::new(router),
            sources: Vec::new(),
            debug_logs,
            shutdown_signal: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn phase(&self) -> ViewerPhase {
        self.phase
    }

    pub fn registry(&self) -> &Arc<PanelRegistry> {
        self.router.registry()
    }

    pub fn router(&self) -> &Arc<LogRouter> {
        &self.router
    }

    /// flag that stops [`Viewer::run`] when set, e.g. from a signal handler
    pub fn shutdown_signal(&self) -> Arc<AtomicBool> {
        self.shutdown_signal.clone()
    }

    /// starts a thread tailing `source`; `home_panel` is flagged if it is lost
    pub fn add_source<S>(&mut self, source: S, home_panel: Option<String>) -> Result<()>
    where
        S: TailSource + 'static,
    {
        if self.phase != ViewerPhase::Starting {
            return Err(anyhow!("sources can only be added before the viewer runs"));
        }

        log::debug!("Viewer: adding source '{}'", source.name());
        let handle = spawn_source_thread(
            source,
            self.router.clone(),
            home_panel,
            self.desc.poll_interval,
        );
        self.sources.push(handle);
        Ok(())
    }

    pub fn source_statuses(&self) -> Vec<(String, SourceStatus)> {
        self.sources
            .iter()
            .map(|s| (s.name().to_string(), s.status()))
            .collect()
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        if self.phase != ViewerPhase::Starting {
            return Err(anyhow!("viewer already ran"));
        }
        self.phase = ViewerPhase::Running;

        let mut app = App::new(self.router.clone(), self.debug_logs.clone(), &self.desc);
        let tick_interval = self.desc.tick_interval;
        let event_poll_interval = self.desc.event_poll_interval;
        let mut last_tick = Instant::now();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| -> Result<()> {
            app.tick(&self.source_statuses());
            app.draw(terminal);

            while !app.is_exiting && !self.shutdown_signal.load(Ordering::Relaxed) {
                let mut needs_redraw = app.poll_event(event_poll_interval)?;

                if last_tick.elapsed() >= tick_interval {
                    needs_redraw |= app.tick(&self.source_statuses());
                    last_tick = Instant::now();
                }

                if needs_redraw {
                    app.draw(terminal);
                }
            }
            Ok(())
        }));

        self.shutdown();

        // last frame shows the sources stopped
        app.tick(&self.source_statuses());
        app.draw(terminal);

        match result {
            Ok(r) => r,
            Err(_) => Err(anyhow!("viewer panicked, sources stopped")),
        }
    }

    /// stops and joins every source thread; safe to call more than once
    pub fn shutdown(&mut self) {
        if self.phase == ViewerPhase::Stopped {
            return;
        }
        self.phase = ViewerPhase::ShuttingDown;
        log::debug!("Viewer: shutting down {} sources", self.sources.len());

        // signal all first so the threads wind down in parallel
        for source in &self.sources {
            source.signal_stop();
        }
        for source in &mut self.sources {
            source.shutdown();
        }

        self.phase = ViewerPhase::Stopped;
    }
}

impl Drop for Viewer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Runs a configured viewer on `terminal` until it is quit.
pub fn start_viewer<B: Backend>(terminal: &mut Terminal<B>, mut viewer: Viewer) -> Result<()> {
    color_eyre::install().or(Err(anyhow!("Error installing color_eyre")))?;
    viewer.run(terminal)
}

/// display side of one panel
struct PanelView {
    panel: Arc<Panel>,
    color: Color,
    snapshot: PanelSnapshot,
    block: AppBlock,
    autoscroll: bool,
    viewport_height: usize,
    last_area: Option<Rect>,
}

impl PanelView {
    fn new(index: usize, panel: Arc<Panel>) -> Self {
        let config = panel.config();
        let color = theme::panel_color(&config.style);
        let block = AppBlock::new().set_title(format!("[{}]─{}", index + 1, config.title));
        let snapshot = panel.snapshot();

        Self {
            panel,
            color,
            snapshot,
            block,
            autoscroll: true,
            viewport_height: 0,
            last_area: None,
        }
    }

    /// pulls a fresh snapshot if the panel changed since the last one
    fn refresh(&mut self) -> bool {
        let Some(snapshot) = self.panel.take_dirty_snapshot() else {
            return false;
        };

        if !self.autoscroll {
            // keep the viewport on the same lines while old ones are evicted
            let received = snapshot.total_received - self.snapshot.total_received;
            let grown = snapshot.lines.len().saturating_sub(self.snapshot.lines.len()) as u64;
            let evicted = received.saturating_sub(grown) as usize;
            let top = self.block.get_scroll_position().saturating_sub(evicted);
            self.block.set_scroll_position(top);
        }

        self.snapshot = snapshot;
        self.block.set_lines_count(self.snapshot.lines.len());
        true
    }
}

struct App {
    is_exiting: bool,
    title: String,
    router: Arc<LogRouter>,
    views: Vec<PanelView>,
    focused: usize,
    debug_logs: DebugLogBuffer,
    debug_block: AppBlock,
    show_debug_logs: bool,
    show_help_popup: bool,
    display_event: Option<DisplayEvent>,
    started_at: Instant,
    last_drawn_uptime: u64,
    counts: RouterCounts,
    sources_running: usize,
    sources_total: usize,
    render_failures: u64,
}

// ============================================================================
// Initialization
// ============================================================================
impl App {
    fn new(router: Arc<LogRouter>, debug_logs: DebugLogBuffer, desc: &ViewerDesc) -> Self {
        let views = router
            .registry()
            .panels()
            .iter()
            .enumerate()
            .map(|(index, panel)| PanelView::new(index, panel.clone()))
            .collect();

        Self {
            is_exiting: false,
            title: desc.title.clone(),
            router,
            views,
            focused: 0,
            debug_logs,
            debug_block: AppBlock::new().set_title("Debug Logs"),
            show_debug_logs: desc.show_debug_logs,
            show_help_popup: false,
            display_event: None,
            started_at: Instant::now(),
            last_drawn_uptime: 0,
            counts: RouterCounts::default(),
            sources_running: 0,
            sources_total: 0,
            render_failures: 0,
        }
    }
}

// ============================================================================
// Lifecycle
// ============================================================================
impl App {
    /// returns whether a redraw is needed
    fn poll_event(&mut self, poll_interval: Duration) -> Result<bool> {
        if !event::poll(poll_interval)? {
            return Ok(false);
        }

        match event::read()? {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse_event(&mouse),
            Event::Resize(width, height) => {
                log::debug!("Terminal resized to {}x{}", width, height);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Takes snapshots of dirty panels and refreshes the counters.
    /// Returns whether anything visible changed.
    fn tick(&mut self, sources: &[(String, SourceStatus)]) -> bool {
        let mut changed = false;
        for view in &mut self.views {
            changed |= view.refresh();
        }

        let counts = self.router.counts();
        if counts != self.counts {
            self.counts = counts;
            changed = true;
        }

        let running = sources
            .iter()
            .filter(|(_, status)| *status == SourceStatus::Running)
            .count();
        if running != self.sources_running || sources.len() != self.sources_total {
            self.sources_running = running;
            self.sources_total = sources.len();
            changed = true;
        }

        let uptime = self.started_at.elapsed().as_secs();
        if uptime != self.last_drawn_uptime {
            self.last_drawn_uptime = uptime;
            changed = true;
        }

        if self.display_event.is_some() {
            self.display_event = DisplayEvent::retain(self.display_event.take());
            changed |= self.display_event.is_none();
        }

        if self.show_debug_logs {
            changed |= self.debug_logs.len() != self.debug_block.get_lines_count();
        }

        changed
    }

    /// draw failures are logged and the next tick tries again
    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) {
        if let Err(e) = terminal.draw(|frame| frame.render_widget(&mut *self, frame.area())) {
            self.render_failures += 1;
            log::error!("{}", ViewerError::RenderFailure(e.to_string()));
        }
    }
}

// ============================================================================
// Focus management
// ============================================================================
impl App {
    fn focus_next(&mut self) {
        if !self.views.is_empty() {
            self.focused = (self.focused + 1) % self.views.len();
        }
    }

    fn focus_previous(&mut self) {
        if !self.views.is_empty() {
            self.focused = (self.focused + self.views.len() - 1) % self.views.len();
        }
    }

    fn focus_index(&mut self, index: usize) {
        if index < self.views.len() {
            self.focused = index;
        }
    }

    fn is_mouse_in_area(mouse: &MouseEvent, area: Rect) -> bool {
        area.contains(Position::new(mouse.column, mouse.row))
    }

    fn view_under_mouse(&self, mouse: &MouseEvent) -> Option<usize> {
        self.views.iter().position(|view| {
            view.last_area
                .is_some_and(|area| Self::is_mouse_in_area(mouse, area))
        })
    }
}

// ============================================================================
// Display events
// ============================================================================
impl App {
    fn set_display_event(&mut self, text: impl Into<String>) {
        self.display_event = Some(DisplayEvent::new(
            text,
            Duration::from_millis(DISPLAY_EVENT_DURATION_MS),
            theme::DISPLAY_EVENT_STYLE,
        ));
    }

    fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// `[hh:mm:ss]`
fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    format!(
        "[{:02}:{:02}:{:02}]",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}

// ============================================================================
// Widget implementation
// ============================================================================
impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let debug_height = if self.show_debug_logs {
            DEBUG_BLOCK_HEIGHT
        } else {
            0
        };
        let [header_area, main_area, debug_area, footer_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(debug_height),
            Constraint::Length(1),
        ])
        .areas(area);

        self.render_header(header_area, buf);

        let ratios: Vec<u16> = self.views.iter().map(|v| v.snapshot.ratio).collect();
        let regions = split_by_ratio(main_area, &ratios);
        for (index, region) in regions.into_iter().enumerate() {
            let focused = index == self.focused;
            self.render_panel(index, focused, region, buf);
        }

        if self.show_debug_logs {
            self.render_debug_logs(debug_area, buf);
        }
        self.render_footer(footer_area, buf);

        if self.show_help_popup {
            self.render_help_popup(area, buf);
        }
    }
}
