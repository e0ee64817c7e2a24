//! Animator clips
//!
//! A clip is one playback instance of an animation. It owns a local clock that
//! wraps at the end of the animation, counts the loops it has played and knows
//! which timeline (if any) is currently playing it.

use crate::animator::TimelineId;
use crate::clock::Clock;
use crate::description::{AnimationDescription, SharedAnimation};
use crate::error::{AnimatorError, Result};

/// Outcome of a single clip update
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClipProgress {
    /// Local time moved (or was paused) without crossing a boundary
    Running,
    /// The clip has finished and is holding at its end
    Holding,
    /// The end was reached and another loop started
    Looped,
    /// Running in reverse, the clip reached its beginning
    Rewound,
    /// The end was reached with no loops left
    Finished,
}

impl ClipProgress {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

/// A playback instance of an animation
#[derive(Debug, Clone)]
pub struct AnimatorClip {
    animation: SharedAnimation,
    /// Local timeline, wrapping at `duration - 1`
    clock: Clock,
    /// Repeat count; negative loops forever, 0 plays once
    loops: i32,
    times_looped: i32,
    /// Time on the hosting timeline at which this clip starts, in milliseconds
    global_start_time: u32,
    auto_remove: bool,
    /// Quantized to the end of its last loop
    finished: bool,
    timeline: Option<TimelineId>,
}

impl AnimatorClip {
    /// Create a detached clip bound to `animation`
    pub fn new(animation: SharedAnimation) -> Result<Self> {
        let wrap = wrap_limit_for(&animation)?;
        Ok(Self {
            animation,
            clock: Clock::new().with_wrap(wrap),
            loops: 0,
            times_looped: 0,
            global_start_time: 0,
            auto_remove: true,
            finished: false,
            timeline: None,
        })
    }

    pub fn from_description(description: AnimationDescription) -> Result<Self> {
        Self::new(description.shared())
    }

    /// Builder: set the repeat count
    pub fn with_loops(mut self, loops: i32) -> Self {
        self.loops = loops;
        self
    }

    /// Builder: set the local scale factor
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.clock.set_scale(scale);
        self
    }

    /// Rebind the clip to another animation. Local time is clamped to the new
    /// duration.
    pub fn set_animation(&mut self, animation: SharedAnimation) -> Result<()> {
        let wrap = wrap_limit_for(&animation)?;
        self.clock.set_wrap(Some(wrap));
        self.animation = animation;
        self.finished = false;
        Ok(())
    }

    pub fn animation(&self) -> &SharedAnimation {
        &self.animation
    }

    /// Duration of the bound animation, in milliseconds
    pub fn source_duration(&self) -> u32 {
        self.animation.duration_ms()
    }

    /// Duration of the whole clip including loops, scaled by the magnitude of
    /// the local scale factor. `None` when the clip loops forever.
    pub fn duration(&self) -> Option<u64> {
        if self.loops < 0 {
            return None;
        }
        let passes = i64::from(self.loops) + 1;
        let total = (passes * i64::from(self.source_duration())) as f64;
        Some((total * f64::from(self.clock.scale().abs())) as u64)
    }

    /// Global start time on the hosting timeline, in milliseconds
    pub fn start_time(&self) -> u32 {
        self.global_start_time
    }

    pub fn loops(&self) -> i32 {
        self.loops
    }

    /// Set how many times the clip repeats. Negative values loop forever.
    ///
    /// A finished clip given loops it has not played yet resumes looping on
    /// its next update.
    pub fn set_loops(&mut self, loops: i32) {
        self.loops = loops;
        if self.finished && (loops < 0 || self.times_looped < loops) {
            self.finished = false;
        }
    }

    pub fn times_looped(&self) -> i32 {
        self.times_looped
    }

    pub fn pause(&mut self) {
        self.clock.set_paused(true);
    }

    pub fn resume(&mut self) {
        self.clock.set_paused(false);
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    /// Stretch the local timeline. A scale of 0 behaves like pausing
    pub fn set_scale(&mut self, scale: f32) {
        self.clock.set_scale(scale);
    }

    pub fn scale(&self) -> f32 {
        self.clock.scale()
    }

    /// Current local time, in milliseconds. A finished clip reports exactly
    /// its source duration.
    pub fn time(&self) -> u32 {
        if self.finished {
            self.source_duration()
        } else {
            self.clock.time()
        }
    }

    /// The raw local clock. Once the clip has finished it sits at the wrap
    /// limit (`duration - 1`); use [`AnimatorClip::time`] for the quantized time.
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Whether the clip is attached to a timeline
    pub fn is_playing(&self) -> bool {
        self.timeline.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The timeline currently playing this clip
    pub fn timeline(&self) -> Option<TimelineId> {
        self.timeline
    }

    pub fn auto_remove(&self) -> bool {
        self.auto_remove
    }

    /// Clear the loop count and rewind local time to 0
    pub fn reset(&mut self) {
        self.times_looped = 0;
        self.finished = false;
        self.clock.set_time(0);
    }

    pub(crate) fn attach(
        &mut self,
        timeline: TimelineId,
        global_time: u32,
        start_offset_ms: i32,
        auto_remove: bool,
    ) {
        self.reset();
        let start = i64::from(global_time) + i64::from(start_offset_ms);
        self.global_start_time = start.clamp(0, i64::from(u32::MAX)) as u32;
        self.auto_remove = auto_remove;
        self.timeline = Some(timeline);
    }

    /// Clear the back-reference, returning the timeline that was playing the clip
    pub(crate) fn detach(&mut self) -> Option<TimelineId> {
        self.timeline.take()
    }

    /// Advance local time by the change the global clock just applied.
    ///
    /// Called by the hosting timeline, at most once per timeline update and only
    /// once the clip is due.
    pub(crate) fn update(&mut self, global: &Clock) -> ClipProgress {
        let delta_ms = global.delta_ms();

        if !global.is_reversed() {
            if self.finished {
                return ClipProgress::Holding;
            }
            if !self.clock.update_ms(delta_ms) {
                return ClipProgress::Running;
            }
            if self.loops < 0 || self.times_looped < self.loops {
                self.times_looped += 1;
                // Carry the remainder past the end into the new loop
                let carry = self.clock.overflow_ms();
                self.clock.set_time(carry);
                return ClipProgress::Looped;
            }
            // Quantize to end
            self.finished = true;
            return ClipProgress::Finished;
        }

        if self.clock.is_paused() {
            return ClipProgress::Running;
        }

        let before = self.time();
        let raw_before = self.clock.time();
        self.clock.update_ms(delta_ms);
        if self.clock.time() < raw_before {
            // Moving back off the end leaves the finished state
            self.finished = false;
        }
        if self.clock.time() > 0 {
            return ClipProgress::Running;
        }

        // Quantize to beginning
        self.finished = false;
        let rewound = before > 0 || self.times_looped > 0;
        self.times_looped = (self.times_looped - 1).max(0);
        self.clock.set_time(0);
        if rewound {
            ClipProgress::Rewound
        } else {
            ClipProgress::Running
        }
    }
}

fn wrap_limit_for(animation: &SharedAnimation) -> Result<u32> {
    // The wrap limit is inclusive, so one pass ends at duration - 1
    match animation.duration_ms() {
        0 => Err(AnimatorError::ZeroDuration {
            name: animation.name().to_string(),
        }),
        duration => Ok(duration - 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(duration_ms: u32, loops: i32) -> AnimatorClip {
        AnimatorClip::from_description(AnimationDescription::new("test", duration_ms))
            .unwrap()
            .with_loops(loops)
    }

    fn forward(global: &mut Clock, seconds: f32) {
        global.set_scale(global.scale().abs());
        global.update(seconds);
    }

    #[test]
    fn test_new_clip_is_detached() {
        let clip = clip(1000, 0);
        assert!(!clip.is_playing());
        assert_eq!(clip.time(), 0);
        assert_eq!(clip.clock().wrap_limit(), Some(999));
        assert!(clip.auto_remove());
    }

    #[test]
    fn test_zero_duration_is_rejected() {
        let result = AnimatorClip::from_description(AnimationDescription::new("empty", 0));
        assert_eq!(
            result.unwrap_err(),
            AnimatorError::ZeroDuration {
                name: "empty".to_string()
            }
        );
    }

    #[test]
    fn test_single_pass_finishes_once() {
        let mut clip = clip(1000, 0);
        let mut global = Clock::new();

        forward(&mut global, 0.5);
        assert_eq!(clip.update(&global), ClipProgress::Running);
        assert_eq!(clip.time(), 500);

        forward(&mut global, 0.5);
        assert_eq!(clip.update(&global), ClipProgress::Finished);
        assert_eq!(clip.time(), 1000);

        forward(&mut global, 0.5);
        assert_eq!(clip.update(&global), ClipProgress::Holding);
        assert_eq!(clip.time(), 1000);
    }

    #[test]
    fn test_loop_carries_remainder() {
        let mut clip = clip(1000, 2);
        let mut global = Clock::new();

        forward(&mut global, 0.75);
        clip.update(&global);
        forward(&mut global, 0.5);
        assert_eq!(clip.update(&global), ClipProgress::Looped);
        assert_eq!(clip.times_looped(), 1);
        assert_eq!(clip.time(), 250);
    }

    #[test]
    fn test_paused_clip_holds_still() {
        let mut clip = clip(1000, 0);
        let mut global = Clock::new();
        clip.pause();
        assert!(clip.is_paused());

        forward(&mut global, 0.5);
        assert_eq!(clip.update(&global), ClipProgress::Running);
        assert_eq!(clip.time(), 0);

        clip.resume();
        forward(&mut global, 0.5);
        clip.update(&global);
        assert_eq!(clip.time(), 500);
    }

    #[test]
    fn test_reverse_rewinds_to_beginning() {
        let mut clip = clip(1000, -1);
        let mut global = Clock::new();
        for _ in 0..5 {
            forward(&mut global, 0.5);
            clip.update(&global);
        }
        assert_eq!(clip.times_looped(), 2);
        assert_eq!(clip.time(), 500);

        global.set_scale(-1.0);
        global.update(0.25);
        assert_eq!(clip.update(&global), ClipProgress::Running);
        assert_eq!(clip.time(), 250);

        global.update(0.5);
        assert_eq!(clip.update(&global), ClipProgress::Rewound);
        assert_eq!(clip.time(), 0);
        assert_eq!(clip.times_looped(), 1);
    }

    #[test]
    fn test_reverse_leaves_finished_state() {
        let mut clip = clip(1000, 0);
        let mut global = Clock::new();
        forward(&mut global, 1.0);
        assert_eq!(clip.update(&global), ClipProgress::Finished);

        global.set_scale(-1.0);
        global.update(0.25);
        assert_eq!(clip.update(&global), ClipProgress::Running);
        assert!(!clip.is_finished());
        assert_eq!(clip.time(), 749);
    }

    #[test]
    fn test_paused_finished_clip_ignores_reverse() {
        let mut clip = clip(1000, 0);
        let mut global = Clock::new();
        forward(&mut global, 1.0);
        assert_eq!(clip.update(&global), ClipProgress::Finished);
        clip.pause();

        global.set_scale(-1.0);
        global.update(0.1);
        assert_eq!(clip.update(&global), ClipProgress::Running);
        assert!(clip.is_finished());
        assert_eq!(clip.time(), 1000);

        clip.resume();
        for _ in 0..5 {
            forward(&mut global, 0.1);
            assert_eq!(clip.update(&global), ClipProgress::Holding);
        }
        assert_eq!(clip.time(), 1000);
    }

    #[test]
    fn test_finished_clip_holds_when_reverse_does_not_move() {
        let mut clip = clip(1000, 0);
        let mut global = Clock::new();
        forward(&mut global, 1.0);
        clip.update(&global);

        global.set_scale(-1.0);
        global.set_paused(true);
        global.update(0.1);
        assert_eq!(clip.update(&global), ClipProgress::Running);
        assert!(clip.is_finished());
        assert_eq!(clip.time(), 1000);
    }

    #[test]
    fn test_set_loops_resumes_finished_clip() {
        let mut clip = clip(1000, 0);
        let mut global = Clock::new();
        forward(&mut global, 1.0);
        assert_eq!(clip.update(&global), ClipProgress::Finished);

        clip.set_loops(5);
        assert!(!clip.is_finished());

        forward(&mut global, 0.1);
        assert_eq!(clip.update(&global), ClipProgress::Looped);
        assert_eq!(clip.times_looped(), 1);

        for _ in 0..29 {
            forward(&mut global, 0.1);
            assert!(!clip.update(&global).is_finished());
        }
        assert_eq!(clip.times_looped(), 3);
    }

    #[test]
    fn test_set_loops_below_played_keeps_finished() {
        let mut clip = clip(1000, 1);
        let mut global = Clock::new();
        forward(&mut global, 1.0);
        assert_eq!(clip.update(&global), ClipProgress::Looped);
        forward(&mut global, 1.0);
        assert_eq!(clip.update(&global), ClipProgress::Finished);

        clip.set_loops(1);
        assert!(clip.is_finished());
        forward(&mut global, 0.1);
        assert_eq!(clip.update(&global), ClipProgress::Holding);
    }

    #[test]
    fn test_reverse_at_beginning_drains_one_loop_per_update() {
        let mut clip = clip(1000, -1);
        let mut global = Clock::new();
        forward(&mut global, 1.0);
        clip.update(&global);
        forward(&mut global, 1.0);
        clip.update(&global);
        assert_eq!(clip.times_looped(), 2);
        assert_eq!(clip.time(), 0);

        global.set_scale(-1.0);
        global.update(0.1);
        assert_eq!(clip.update(&global), ClipProgress::Rewound);
        assert_eq!(clip.times_looped(), 1);
        global.update(0.1);
        assert_eq!(clip.update(&global), ClipProgress::Rewound);
        assert_eq!(clip.times_looped(), 0);
        global.update(0.1);
        assert_eq!(clip.update(&global), ClipProgress::Running);
        assert_eq!(clip.times_looped(), 0);
    }

    #[test]
    fn test_raw_clock_sits_at_wrap_limit_when_finished() {
        let mut clip = clip(1000, 0);
        let mut global = Clock::new();
        forward(&mut global, 1.0);
        clip.update(&global);

        assert_eq!(clip.clock().time(), 999);
        assert_eq!(clip.time(), 1000);
    }

    #[test]
    fn test_duration() {
        let mut clip = clip(1000, 2);
        assert_eq!(clip.duration(), Some(3000));

        clip.set_scale(-0.5);
        assert_eq!(clip.duration(), Some(1500));

        clip.set_loops(-1);
        assert_eq!(clip.duration(), None);
    }

    #[test]
    fn test_attach_clamps_start_time() {
        let mut clip = clip(1000, 0);
        let timeline = TimelineId::default();

        clip.attach(timeline, 200, -500, false);
        assert_eq!(clip.start_time(), 0);
        assert_eq!(clip.timeline(), Some(timeline));
        assert!(!clip.auto_remove());

        clip.attach(timeline, 200, 300, true);
        assert_eq!(clip.start_time(), 500);

        assert_eq!(clip.detach(), Some(timeline));
        assert!(!clip.is_playing());
    }

    #[test]
    fn test_set_animation_clamps_local_time() {
        let mut clip = clip(1000, 0);
        let mut global = Clock::new();
        forward(&mut global, 0.8);
        clip.update(&global);

        clip.set_animation(AnimationDescription::new("short", 500).shared()).unwrap();
        assert_eq!(clip.source_duration(), 500);
        assert_eq!(clip.time(), 499);
    }
}
