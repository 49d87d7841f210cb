use crate::metadata::{self, MetaSnap};
use anyhow::{Context, Result};
use panelog_framework::{TailSource, ViewerError};
use std::{
    fs::File,
    io::{self, Read, Seek, SeekFrom},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

const DEFAULT_LOST_AFTER: Duration = Duration::from_secs(5);

/// Follows a growing text file and yields the complete lines appended to it.
///
/// - the file may not exist yet: polling returns nothing until it appears
/// - a shrinking file (truncation) or a new file at the path (rotation) is
///   read again from the start
/// - a file that was open once and then stays missing for `lost_after` is
///   reported as [`ViewerError::TailSourceLost`]
///
/// An unterminated last line is held back until the next poll; if the file
/// did not change by then it is emitted as is.
pub struct FileTailSource {
    path: PathBuf,
    name: String,
    start_at_end: bool,
    lost_after: Duration,
    offset: u64,
    pending: Vec<u8>,
    prev_meta: Option<MetaSnap>,
    seen: bool,
    missing_since: Option<Instant>,
}

impl FileTailSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self {
            path,
            name,
            start_at_end: false,
            lost_after: DEFAULT_LOST_AFTER,
            offset: 0,
            pending: Vec::new(),
            prev_meta: None,
            seen: false,
            missing_since: None,
        }
    }

    /// skip what the file already holds at start and show only new lines
    pub fn tail_only(mut self, tail_only: bool) -> Self {
        self.start_at_end = tail_only;
        self
    }

    pub fn with_lost_after(mut self, lost_after: Duration) -> Self {
        self.lost_after = lost_after;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn restart(&mut self, reason: &str) {
        log::debug!("FileTailSource: {} {}, reading from start", self.path.display(), reason);
        self.offset = 0;
        self.pending.clear();
    }

    fn on_missing(&mut self) -> Result<Vec<String>> {
        if !self.seen {
            return Ok(Vec::new());
        }

        let since = *self.missing_since.get_or_insert_with(Instant::now);
        if since.elapsed() >= self.lost_after {
            return Err(ViewerError::source_lost(
                &self.name,
                format!("{} is gone", self.path.display()),
            )
            .into());
        }

        Ok(self.flush_pending().into_iter().collect())
    }

    /// bytes in `prev_len..cur_len`; shorter when the file shrank since `cur_len` was taken
    fn read_delta(&self, prev_len: u64, cur_len: u64) -> Result<Vec<u8>> {
        let mut file = File::open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        file.seek(SeekFrom::Start(prev_len))?;

        let wanted = cur_len.saturating_sub(prev_len);
        let mut delta = Vec::with_capacity(wanted as usize);
        file.take(wanted)
            .read_to_end(&mut delta)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        Ok(delta)
    }

    /// splits buffered bytes into complete lines, keeping any partial tail
    fn take_lines(&mut self) -> Vec<String> {
        let Some(last_newline) = self.pending.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };

        let rest = self.pending.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.pending, rest);

        let body = complete.strip_suffix(b"\n").unwrap_or(&complete);
        body.split(|&b| b == b'\n').map(decode_line).collect()
    }

    fn flush_pending(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let line = decode_line(&self.pending);
        self.pending.clear();
        Some(line)
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

impl TailSource for FileTailSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&mut self) -> Result<()> {
        log::debug!("FileTailSource: starting on {}", self.path.display());

        match metadata::stat_path(&self.path) {
            Ok(meta) => {
                self.seen = true;
                if self.start_at_end {
                    self.offset = meta.len;
                    self.prev_meta = Some(meta);
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!(
                    "FileTailSource: {} does not exist yet, waiting for it",
                    self.path.display()
                );
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to stat {}", self.path.display()));
            }
        }

        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        log::debug!("FileTailSource: stopping on {}", self.path.display());
        Ok(())
    }

    fn poll_lines(&mut self) -> Result<Vec<String>> {
        let current = match metadata::stat_path(&self.path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return self.on_missing(),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to stat {}", self.path.display()));
            }
        };

        if !self.seen {
            log::info!("FileTailSource: {} appeared", self.path.display());
            self.seen = true;
        }
        if self.missing_since.take().is_some() {
            // a re-created file may reuse the old inode, so never trust prev_meta here
            self.restart("reappeared");
            self.prev_meta = None;
        }

        if !metadata::has_changed(&self.prev_meta, &current) {
            // the writer finished an unterminated line
            return Ok(self.flush_pending().into_iter().collect());
        }

        if let Some(prev) = &self.prev_meta
            && prev.is_replaced_by(&current)
        {
            self.restart("was replaced");
        } else if current.len < self.offset {
            self.restart("was truncated");
        }

        if current.len > self.offset {
            let delta = self.read_delta(self.offset, current.len)?;
            // a short read means a truncation raced the stat; the next poll restarts
            self.offset += delta.len() as u64;
            self.pending.extend_from_slice(&delta);
        }

        self.prev_meta = Some(current);
        let lines = self.take_lines();
        if !lines.is_empty() {
            log::debug!("FileTailSource: read {} lines from {}", lines.len(), self.name);
        }
        Ok(lines)
    }
}
