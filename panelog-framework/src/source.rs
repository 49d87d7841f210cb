//! Tail sources and the threads that drive them.
//!
//! A [`TailSource`] yields lines appended to some stream since its last poll.
//! [`spawn_source_thread`] runs one source on its own thread and feeds every
//! line into the shared [`LogRouter`]:
//!
//! ```text
//! ┌────────────┐  poll_lines()  ┌─────────────┐  ingest()  ┌───────────┐
//! │ TailSource │ ─────────────> │ Vec<String> │ ─────────> │ LogRouter │
//! └────────────┘                └─────────────┘            └───────────┘
//! ```

use crate::{error::ViewerError, router::LogRouter};
use anyhow::Result;
use std::{
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

/// a source failing this many polls in a row is treated as lost
pub const MAX_CONSECUTIVE_POLL_ERRORS: u32 = 20;

/// Trait for a stream of appended log lines.
///
/// # Non-blocking Contract
///
/// `poll_lines()` **must be non-blocking**. When nothing new arrived, return an
/// empty `Vec` immediately; the source thread sleeps for its poll interval
/// between calls.
///
/// # Errors
///
/// Transient errors are logged and polling continues, up to
/// [`MAX_CONSECUTIVE_POLL_ERRORS`] failed polls in a row. Return
/// [`ViewerError::TailSourceLost`] (through `anyhow`) when the stream is gone
/// for good: the thread then stops and flags the source's panel.
///
/// # Examples
///
/// ```rust
/// use panelog_framework::TailSource;
/// use anyhow::Result;
///
/// struct Scripted {
///     pending: Vec<String>,
/// }
///
/// impl TailSource for Scripted {
///     fn name(&self) -> &str {
///         "scripted"
///     }
///
///     fn start(&mut self) -> Result<()> {
///         Ok(())
///     }
///
///     fn stop(&mut self) -> Result<()> {
///         Ok(())
///     }
///
///     fn poll_lines(&mut self) -> Result<Vec<String>> {
///         Ok(self.pending.drain(..).collect())
///     }
/// }
/// ```
pub trait TailSource: Send {
    /// Name shown in diagnostics and in the "source unavailable" indicator.
    fn name(&self) -> &str;

    /// Acquire resources. Called once on the source thread before polling.
    fn start(&mut self) -> Result<()>;

    /// Release resources. Errors are logged but do not prevent shutdown.
    fn stop(&mut self) -> Result<()>;

    /// Lines appended since the previous call, without line terminators.
    fn poll_lines(&mut self) -> Result<Vec<String>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStatus {
    Starting,
    Running,
    /// the source was lost or failed to start; its thread has exited
    Failed,
    Stopped,
}

/// owner side of a running source thread
pub struct SourceHandle {
    name: String,
    thread: Option<thread::JoinHandle<()>>,
    stop_signal: Arc<AtomicBool>,
    status: Arc<Mutex<SourceStatus>>,
}

impl SourceHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> SourceStatus {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(|t| t.is_finished())
    }

    /// asks the thread to stop after its current poll, cutting its wait short
    pub fn signal_stop(&self) {
        self.stop_signal.store(true, Ordering::Relaxed);
        if let Some(handle) = &self.thread {
            handle.thread().unpark();
        }
    }

    /// signals and waits for the thread to exit
    pub fn shutdown(&mut self) {
        self.signal_stop();
        if let Some(handle) = self.thread.take() {
            log::debug!("Waiting for source thread '{}' to finish...", self.name);
            if let Err(e) = handle.join() {
                log::error!("Source thread '{}' panicked: {:?}", self.name, e);
                set_status(&self.status, SourceStatus::Failed);
            }
        }
    }
}

impl Drop for SourceHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn set_status(status: &Mutex<SourceStatus>, value: SourceStatus) {
    *status.lock().unwrap_or_else(PoisonError::into_inner) = value;
}

fn is_source_lost(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<ViewerError>(),
        Some(ViewerError::TailSourceLost { .. })
    )
}

/// Spawns a thread that polls `source` and routes every line it yields.
///
/// `home_panel` is the panel flagged when the source is lost; `None` flags
/// the default panel.
///
/// # Lifecycle
///
/// 1. Calls `source.start()`; on failure the source is reported lost
/// 2. Loops: `poll_lines()` → `router.ingest()` for each line
/// 3. Waits up to `poll_interval` between polls; a stop signal wakes it
/// 4. On stop signal, `TailSourceLost` or too many failed polls in a row:
///    calls `source.stop()` and exits
pub fn spawn_source_thread<S>(
    mut source: S,
    router: Arc<LogRouter>,
    home_panel: Option<String>,
    poll_interval: Duration,
) -> SourceHandle
where
    S: TailSource + 'static,
{
    let name = source.name().to_string();
    let should_stop = Arc::new(AtomicBool::new(false));
    let status = Arc::new(Mutex::new(SourceStatus::Starting));

    let thread = {
        let should_stop = should_stop.clone();
        let status = status.clone();
        let name = name.clone();

        thread::spawn(move || {
            if let Err(e) = source.start() {
                log::error!("Failed to start tail source '{}': {:#}", name, e);
                router.report_source_lost(home_panel.as_deref(), &name);
                set_status(&status, SourceStatus::Failed);
                return;
            }

            set_status(&status, SourceStatus::Running);
            log::debug!("Source thread '{}' started", name);

            let mut final_status = SourceStatus::Stopped;
            let mut failed_polls = 0;
            while !should_stop.load(Ordering::Relaxed) {
                match source.poll_lines() {
                    Ok(lines) => {
                        failed_polls = 0;
                        router.ingest_all(lines);
                    }
                    Err(e) if is_source_lost(&e) => {
                        log::warn!("{}", e);
                        router.report_source_lost(home_panel.as_deref(), &name);
                        final_status = SourceStatus::Failed;
                        break;
                    }
                    Err(e) => {
                        failed_polls += 1;
                        if failed_polls >= MAX_CONSECUTIVE_POLL_ERRORS {
                            log::warn!(
                                "Source '{}' failed {} polls in a row, giving up: {:#}",
                                name,
                                failed_polls,
                                e
                            );
                            router.report_source_lost(home_panel.as_deref(), &name);
                            final_status = SourceStatus::Failed;
                            break;
                        }
                        log::debug!("Source '{}' poll error: {:#}", name, e);
                    }
                }

                if should_stop.load(Ordering::Relaxed) {
                    break;
                }
                // unparked early by SourceHandle::signal_stop
                thread::park_timeout(poll_interval);
            }

            if let Err(e) = source.stop() {
                log::error!("Failed to stop tail source '{}': {:#}", name, e);
            }

            set_status(&status, final_status);
            log::debug!("Source thread '{}' stopped", name);
        })
    };

    SourceHandle {
        name,
        thread: Some(thread),
        stop_signal: should_stop,
        status,
    }
}
