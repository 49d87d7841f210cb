//! Build demo: a fake build pipeline writing tagged lines into the default layout.
//!
//! Shows the three kinds of lines a source can emit:
//! - `[#panel]text` adds a line to a panel
//! - `[@panel]label (n/total)` moves a panel's progress bar
//! - untagged text lands in the default panel
//!
//! Run with: cargo run --example build_demo

use anyhow::Result;
use panelog_framework::{LayoutConfig, TailSource, Viewer, ViewerDesc, start_viewer};
use std::time::Duration;

const MODULES: usize = 40;

// emits one step of a pretend build per poll
struct FakeBuild {
    step: usize,
}

impl FakeBuild {
    fn new() -> Self {
        Self { step: 0 }
    }
}

impl TailSource for FakeBuild {
    fn name(&self) -> &str {
        "fake-build"
    }

    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn poll_lines(&mut self) -> Result<Vec<String>> {
        // slow down generation to make it visible
        std::thread::sleep(Duration::from_millis(300));

        if self.step >= MODULES {
            return Ok(Vec::new());
        }
        self.step += 1;

        let mut lines = vec![
            format!("[#process]compiling module_{:02}", self.step),
            format!("[@current_progress]compiling ({}/{})", self.step, MODULES),
        ];
        if self.step % 5 == 0 {
            lines.push(format!(
                "[#current_stats]{} modules done, {} left",
                self.step,
                MODULES - self.step
            ));
        }
        if self.step % 12 == 0 {
            lines.push("[#update]cache refreshed".to_string());
            lines.push("warning: stray line without a tag".to_string());
        }
        if self.step == MODULES {
            lines.push("[#update]build finished".to_string());
        }
        Ok(lines)
    }
}

fn main() -> Result<()> {
    let desc = ViewerDesc {
        title: "panelog build demo".to_string(),
        show_debug_logs: true,
        ..ViewerDesc::default()
    };
    let mut viewer = Viewer::new(&LayoutConfig::default_layout(), desc)?;
    viewer.add_source(FakeBuild::new(), None)?;

    let mut terminal = ratatui::init();
    let result = start_viewer(&mut terminal, viewer);
    ratatui::restore();
    result
}
