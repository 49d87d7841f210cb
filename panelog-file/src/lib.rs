//! File tailing for panelog.
//!
//! [`FileTailSource`] implements [`panelog_framework::TailSource`] over a
//! plain text file that another process keeps appending to.

mod metadata;
mod tail;

pub use tail::FileTailSource;
