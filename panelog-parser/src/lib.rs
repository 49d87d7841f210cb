//! Line grammar for panelog.
//!
//! A log line selects its panel with an inline marker:
//!
//! ```text
//! [#network]connection established      -> panel "network"
//! 10:30:01 [#db]query took 12ms         -> panel "db", shown as "10:30:01 query took 12ms"
//! [@build]compiling (12/40)             -> progress for panel "build"
//! plain line                            -> no panel, routed to the default panel
//! ```
//!
//! Progress figures (`45%`, `3/10`, `(3/10)`) are recognised in any line by an
//! ordered list of [`ProgressPattern`]s that callers may replace.

mod progress;
mod tag;

pub use progress::{ProgressPattern, ProgressUpdate, default_patterns, extract_progress};
pub use tag::{ParseSkip, ParsedLine, TagKind, TagParser, TaggedLine, is_valid_panel_name};
