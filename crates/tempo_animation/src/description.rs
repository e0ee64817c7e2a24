//! Animation descriptions
//!
//! The scheduler only needs four attributes of an animation asset. Concrete
//! asset types (sprite sequences, property curves, ...) implement
//! [`AnimationSource`]; [`AnimationDescription`] is a plain value type for
//! callers that have no asset of their own.

use std::fmt;
use std::sync::Arc;

/// Read-only view of an animation asset, as seen by the scheduler
pub trait AnimationSource: fmt::Debug {
    fn name(&self) -> &str;

    /// Duration of one pass through the animation, in milliseconds
    fn duration_ms(&self) -> u32;

    /// Whether the asset is meant to be looped. Informational only; a clip's
    /// own loop count decides scheduling.
    fn is_loopable(&self) -> bool;

    /// Whether keyframes of this animation can be tweened
    fn can_tween(&self) -> bool;
}

/// An animation shared between any number of clips
pub type SharedAnimation = Arc<dyn AnimationSource + Send + Sync>;

/// Plain animation description
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimationDescription {
    pub name: String,
    pub duration_ms: u32,
    pub looping: bool,
    pub tween: bool,
}

impl AnimationDescription {
    pub fn new(name: impl Into<String>, duration_ms: u32) -> Self {
        Self {
            name: name.into(),
            duration_ms,
            looping: false,
            tween: false,
        }
    }

    pub fn with_loop(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn with_tween(mut self, tween: bool) -> Self {
        self.tween = tween;
        self
    }

    /// Wrap into a [`SharedAnimation`]
    pub fn shared(self) -> SharedAnimation {
        Arc::new(self)
    }
}

impl AnimationSource for AnimationDescription {
    fn name(&self) -> &str {
        &self.name
    }

    fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    fn is_loopable(&self) -> bool {
        self.looping
    }

    fn can_tween(&self) -> bool {
        self.tween
    }
}
