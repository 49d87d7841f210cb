use anyhow::{Context, Result};
use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};
use ringbuf::{
    HeapRb,
    traits::{Consumer, Observer, RingBuffer},
};
use simplelog::{CombinedLogger, Config, SharedLogger, WriteLogger};
use std::{
    fs::File,
    path::Path,
    sync::{Arc, Mutex, PoisonError},
};

const DEBUG_LOG_CAPACITY: usize = 1000;

/// the newest records of the viewer's own log, shown in the debug block
#[derive(Clone)]
pub struct DebugLogBuffer {
    records: Arc<Mutex<HeapRb<String>>>,
}

impl DebugLogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Arc::new(Mutex::new(HeapRb::new(capacity.max(1)))),
        }
    }

    pub fn push(&self, line: String) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_overwrite(line);
    }

    pub fn lines(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .occupied_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DebugLogBuffer {
    fn default() -> Self {
        Self::new(DEBUG_LOG_CAPACITY)
    }
}

/// logger that writes into a [`DebugLogBuffer`] instead of the terminal
pub struct UiLogger {
    buffer: DebugLogBuffer,
    level: LevelFilter,
    config: Config,
}

impl UiLogger {
    pub fn new(buffer: DebugLogBuffer, level: LevelFilter) -> Self {
        Self {
            buffer,
            level,
            config: Config::default(),
        }
    }
}

impl Log for UiLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        self.buffer.push(format!(
            "{} {:<5} {}",
            Local::now().format("%H:%M:%S%.3f"),
            record.level(),
            record.args()
        ));
    }

    fn flush(&self) {}
}

impl SharedLogger for UiLogger {
    fn level(&self) -> LevelFilter {
        self.level
    }

    fn config(&self) -> Option<&Config> {
        Some(&self.config)
    }

    fn as_log(self: Box<Self>) -> Box<dyn Log> {
        Box::new(*self)
    }
}

/// Installs the process logger: records go to `buffer`, and also to
/// `log_file` when one is given.
///
/// Only the first call in a process installs anything; later calls keep the
/// existing logger and still return `Ok`.
pub fn setup_logger(
    buffer: &DebugLogBuffer,
    level: LevelFilter,
    log_file: Option<&Path>,
) -> Result<()> {
    let mut loggers: Vec<Box<dyn SharedLogger>> =
        vec![Box::new(UiLogger::new(buffer.clone(), level))];

    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create debug log file: {}", path.display()))?;
        loggers.push(WriteLogger::new(level, Config::default(), file));
    }

    if CombinedLogger::init(loggers).is_err() {
        log::debug!("Logger already installed, keeping it");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn test_buffer_keeps_newest_records() {
        let buffer = DebugLogBuffer::new(2);
        buffer.push("a".to_string());
        buffer.push("b".to_string());
        buffer.push("c".to_string());
        assert_eq!(buffer.lines(), vec!["b", "c"]);
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_logger_respects_level() {
        let buffer = DebugLogBuffer::new(10);
        let logger = UiLogger::new(buffer.clone(), LevelFilter::Info);

        logger.log(
            &Record::builder()
                .level(Level::Debug)
                .args(format_args!("hidden"))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(Level::Warn)
                .args(format_args!("shown"))
                .build(),
        );

        let lines = buffer.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("WARN  shown"));
    }
}
