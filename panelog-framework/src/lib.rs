//! # panelog-framework
//!
//! Multi-panel terminal log viewer: tails any number of line sources, routes
//! every line to a named panel by its inline tag, and renders all panels live
//! with independent scroll and progress state.
//!
//! ## Core Concepts
//!
//! ### Tagging
//!
//! A line reaches panel `net` when it carries a `[#net]` marker anywhere in
//! it. `[@net]` marks a progress report: its figure (`12/40`, `45%`) moves the
//! panel's progress bar instead of adding a line. Lines without a known tag go
//! to the default panel. Parsing lives in the `panelog-parser` crate.
//!
//! ### Panels
//!
//! The [`PanelRegistry`] is built once from a [`LayoutConfig`] and never
//! changes afterwards. Each [`Panel`] keeps the newest `capacity` lines in a
//! ring buffer behind its own mutex, so sources writing to different panels
//! never contend.
//!
//! ### Sources and rendering
//!
//! Every [`TailSource`] runs on its own thread and pushes lines through the
//! [`LogRouter`]. The render loop never waits on them: each tick it takes
//! snapshots of the panels that changed and redraws, with panel heights
//! proportional to their ratios.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use panelog_framework::{LayoutConfig, PanelConfig, TailSource, Viewer, ViewerDesc, start_viewer};
//! use anyhow::Result;
//!
//! struct Heartbeat;
//!
//! impl TailSource for Heartbeat {
//!     fn name(&self) -> &str {
//!         "heartbeat"
//!     }
//!
//!     fn start(&mut self) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     fn stop(&mut self) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     fn poll_lines(&mut self) -> Result<Vec<String>> {
//!         Ok(vec!["[#status]alive".to_string()])
//!     }
//! }
//!
//! fn main() -> Result<()> {
//!     let layout = LayoutConfig::new().with_panel(PanelConfig::new("status", 1));
//!     let mut viewer = Viewer::new(&layout, ViewerDesc::default())?;
//!     viewer.add_source(Heartbeat, None)?;
//!
//!     let mut terminal = ratatui::init();
//!     let result = start_viewer(&mut terminal, viewer);
//!     ratatui::restore();
//!     result
//! }
//! ```

mod app;
mod app_block;
mod config;
mod content_line_maker;
mod error;
mod layout;
mod panel;
mod registry;
mod router;
mod source;
mod status_bar;
mod theme;
mod ui_logger;

pub use app::{DEFAULT_CAPACITY, Viewer, ViewerDesc, ViewerPhase, start_viewer};
pub use config::{LayoutConfig, PanelConfig};
pub use error::ViewerError;
pub use layout::split_by_ratio;
pub use panel::{Panel, PanelSnapshot, PanelState};
pub use registry::{DEFAULT_PANEL_NAME, PanelRegistry};
pub use router::{LogRouter, RouterCounts};
pub use source::{
    MAX_CONSECUTIVE_POLL_ERRORS, SourceHandle, SourceStatus, TailSource, spawn_source_thread,
};
pub use ui_logger::{DebugLogBuffer, UiLogger, setup_logger};

pub use panelog_parser::{ParsedLine, ProgressPattern, ProgressUpdate, TagKind, TagParser, TaggedLine};
