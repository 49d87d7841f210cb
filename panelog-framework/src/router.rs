use crate::{panel::Panel, registry::PanelRegistry};
use panelog_parser::{ParsedLine, ProgressUpdate, TagKind, TagParser};
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

/// diagnostic counters kept by the router
#[derive(Default)]
struct RouterStats {
    ingested: AtomicU64,
    tagged: AtomicU64,
    untagged: AtomicU64,
    unknown_tag: AtomicU64,
    progress_only: AtomicU64,
    dropped: AtomicU64,
}

/// point-in-time copy of the router counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterCounts {
    pub ingested: u64,
    pub tagged: u64,
    pub untagged: u64,
    /// tagged lines whose panel is not registered (shown in the default panel)
    pub unknown_tag: u64,
    /// `[@panel]` lines that only moved a progress bar
    pub progress_only: u64,
    /// blank lines
    pub dropped: u64,
}

/// dispatches raw lines to panels
///
/// `ingest` is called concurrently from every source thread. It never fails:
/// whatever cannot be routed to a named panel ends up in the default panel.
pub struct LogRouter {
    registry: Arc<PanelRegistry>,
    parser: TagParser,
    stats: RouterStats,
}

impl LogRouter {
    pub fn new(registry: Arc<PanelRegistry>, parser: TagParser) -> Self {
        Self {
            registry,
            parser,
            stats: RouterStats::default(),
        }
    }

    pub fn registry(&self) -> &Arc<PanelRegistry> {
        &self.registry
    }

    pub fn ingest(&self, raw_line: &str) {
        self.stats.ingested.fetch_add(1, Ordering::Relaxed);

        match self.parser.classify(raw_line) {
            ParsedLine::Tagged(line) => {
                self.stats.tagged.fetch_add(1, Ordering::Relaxed);

                let Some(panel) = self.registry.get(&line.panel_name) else {
                    // keep the marker so the reader can tell where it was meant to go
                    self.stats.unknown_tag.fetch_add(1, Ordering::Relaxed);
                    self.deliver(
                        self.registry.default_panel(),
                        raw_line.trim_end_matches(['\r', '\n']).to_string(),
                        line.progress_update,
                    );
                    return;
                };

                match (line.kind, line.progress_update) {
                    (TagKind::Progress, Some(progress)) => {
                        self.stats.progress_only.fetch_add(1, Ordering::Relaxed);
                        panel.update(|state| state.set_progress(progress));
                    }
                    (_, progress) => self.deliver(panel, line.text, progress),
                }
            }
            ParsedLine::Untagged {
                text,
                progress_update,
            } => {
                self.stats.untagged.fetch_add(1, Ordering::Relaxed);
                self.deliver(self.registry.default_panel(), text, progress_update);
            }
        }
    }

    pub fn ingest_all<I, S>(&self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.ingest(line.as_ref());
        }
    }

    /// marks the panel a lost source was feeding; `None` means the default panel
    pub fn report_source_lost(&self, panel: Option<&str>, source_name: &str) {
        let panel = self.registry.resolve(panel);
        log::warn!(
            "LogRouter: source '{}' unavailable, flagged on panel '{}'",
            source_name,
            panel.name()
        );
        panel.update(|state| state.mark_unavailable(source_name));
    }

    pub fn counts(&self) -> RouterCounts {
        RouterCounts {
            ingested: self.stats.ingested.load(Ordering::Relaxed),
            tagged: self.stats.tagged.load(Ordering::Relaxed),
            untagged: self.stats.untagged.load(Ordering::Relaxed),
            unknown_tag: self.stats.unknown_tag.load(Ordering::Relaxed),
            progress_only: self.stats.progress_only.load(Ordering::Relaxed),
            dropped: self.stats.dropped.load(Ordering::Relaxed),
        }
    }

    fn deliver(&self, panel: &Panel, text: String, progress: Option<ProgressUpdate>) {
        if text.trim().is_empty() {
            self.stats.dropped.fetch_add(1, Ordering::Relaxed);
            if let Some(progress) = progress {
                panel.update(|state| state.set_progress(progress));
            }
            return;
        }

        // one lock for both so a reader never sees the line without its progress
        panel.update(|state| {
            state.push_line(text);
            if let Some(progress) = progress {
                state.set_progress(progress);
            }
        });
    }
}
