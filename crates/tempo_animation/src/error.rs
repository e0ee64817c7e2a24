//! Animator error types

use thiserror::Error;

use crate::animator::{ClipId, TimelineId};

/// Errors reported by the animator registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnimatorError {
    /// The clip handle is stale or was never issued by this animator
    #[error("Clip not found: {0:?}")]
    ClipNotFound(ClipId),

    /// The timeline handle is stale or was never issued by this animator
    #[error("Timeline not found: {0:?}")]
    TimelineNotFound(TimelineId),

    /// Clips cannot be bound to an animation without duration
    #[error("Animation '{name}' has zero duration")]
    ZeroDuration { name: String },
}

/// Result type for animator operations
pub type Result<T> = std::result::Result<T, AnimatorError>;
