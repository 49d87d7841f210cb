use thiserror::Error;

/// failures the viewer distinguishes
///
/// Only the configuration variants (`DuplicateName`, `InvalidRatio`,
/// `InvalidCapacity`, `InvalidLayout`) ever reach the caller; the others are
/// reported inside the UI and logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewerError {
    #[error("duplicate panel name: {0}")]
    DuplicateName(String),

    #[error("panel '{0}' has ratio 0, ratios must be positive")]
    InvalidRatio(String),

    #[error("panel line capacity must be at least 1")]
    InvalidCapacity,

    #[error("invalid layout configuration: {0}")]
    InvalidLayout(String),

    #[error("tail source '{source_name}' lost: {reason}")]
    TailSourceLost { source_name: String, reason: String },

    #[error("render failed: {0}")]
    RenderFailure(String),
}

impl ViewerError {
    /// configuration errors stop the viewer before it starts
    pub fn is_startup_error(&self) -> bool {
        matches!(
            self,
            ViewerError::DuplicateName(_)
                | ViewerError::InvalidRatio(_)
                | ViewerError::InvalidCapacity
                | ViewerError::InvalidLayout(_)
        )
    }

    pub fn source_lost(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        ViewerError::TailSourceLost {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}
