//! Tempo Animation Scheduler
//!
//! Decides when animations progress, loop and finish. What gets drawn is left
//! to the caller.
//!
//! # Features
//!
//! - **Clocks**: Millisecond clocks with pause, signed scale and wrap limits
//! - **Clips**: Playback instances with loop counts and their own speed
//! - **Timelines**: Start-time ordered scheduling, forwards or in reverse
//! - **Curves**: Tweening functions in a bounded 8-bit indexed table
//!
//! # Example
//!
//! ```rust
//! use tempo_animation::{AnimationDescription, Animator, AnimatorClip, ClipEvent};
//!
//! let mut animator = Animator::new();
//! let timeline = animator.create_timeline();
//!
//! let walk = AnimationDescription::new("walk", 1000);
//! let clip = animator.add_clip(AnimatorClip::from_description(walk).unwrap());
//! animator.play(clip, timeline, 0, true).unwrap();
//!
//! animator.update_timeline(timeline, 0.5).unwrap();
//! let events = animator.update_timeline(timeline, 0.5).unwrap();
//! assert!(matches!(events[0], ClipEvent::Finished { removed: true, .. }));
//! ```

pub mod animator;
pub mod clip;
pub mod clock;
pub mod curves;
pub mod description;
pub mod error;
pub mod timeline;

pub use animator::{Animator, ClipId, TimelineId};
pub use clip::{AnimatorClip, ClipProgress};
pub use clock::{Clock, Timer};
pub use curves::{Curve, CurveFn, CurveTable, CURVE_TABLE_CAPACITY};
pub use description::{AnimationDescription, AnimationSource, SharedAnimation};
pub use error::{AnimatorError, Result};
pub use timeline::{AnimatorTimeline, ClipEvent, ClipEvents, TimelineConfig};
