//! Animator timelines
//!
//! A timeline owns the global clock and the clips currently scheduled on it,
//! ordered by global start time. Each update advances the clock and walks the
//! ordered clips in the direction the clock runs, stopping at the first clip
//! that is not due yet.

use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::animator::{ClipId, TimelineId};
use crate::clip::{AnimatorClip, ClipProgress};
use crate::clock::Clock;
use crate::curves::{CurveFn, CurveTable};

/// Something that happened to a clip during a timeline update
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClipEvent {
    /// The clip reached its end and started another loop
    Looped { clip: ClipId, times_looped: i32 },
    /// Running in reverse, the clip reached its beginning
    Rewound { clip: ClipId, times_looped: i32 },
    /// The clip finished; `removed` is set when it was evicted from the timeline
    Finished { clip: ClipId, removed: bool },
}

impl ClipEvent {
    pub fn clip(&self) -> ClipId {
        match self {
            Self::Looped { clip, .. }
            | Self::Rewound { clip, .. }
            | Self::Finished { clip, .. } => *clip,
        }
    }
}

/// Events produced by one timeline update
pub type ClipEvents = SmallVec<[ClipEvent; 4]>;

/// Timeline configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimelineConfig {
    /// Absolute time the global clock began at, in milliseconds
    pub initial_time_ms: u32,
    /// Global scale factor; negative plays every clip in reverse
    pub scale: f32,
    pub paused: bool,
    /// Register the built-in curve library after the sentinel slot
    pub curve_library: bool,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            initial_time_ms: 0,
            scale: 1.0,
            paused: false,
            curve_library: false,
        }
    }
}

/// The global timeline clips are played on
#[derive(Debug, Clone)]
pub struct AnimatorTimeline {
    clock: Clock,
    /// Scheduled clips, non-decreasing by start time, ties in insertion order
    clips: Vec<ClipId>,
    curves: CurveTable,
}

impl AnimatorTimeline {
    pub fn new() -> Self {
        Self::with_config(&TimelineConfig::default())
    }

    pub fn with_config(config: &TimelineConfig) -> Self {
        let mut clock = Clock::starting_at(config.initial_time_ms).with_scale(config.scale);
        clock.set_paused(config.paused);
        let curves = if config.curve_library {
            CurveTable::with_library()
        } else {
            CurveTable::new()
        };
        Self {
            clock,
            clips: Vec::new(),
            curves,
        }
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Mutable access to the global clock (pause, scale, seek)
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    /// Current global time, in milliseconds
    pub fn time(&self) -> u32 {
        self.clock.time()
    }

    /// Scheduled clips in start time order
    pub fn clips(&self) -> &[ClipId] {
        &self.clips
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn contains(&self, clip: ClipId) -> bool {
        self.clips.contains(&clip)
    }

    pub fn curves(&self) -> &CurveTable {
        &self.curves
    }

    pub fn curves_mut(&mut self) -> &mut CurveTable {
        &mut self.curves
    }

    /// Register tweening functions. See [`CurveTable::add`].
    pub fn add_tweening_funcs<I>(&mut self, funcs: I) -> u8
    where
        I: IntoIterator<Item = CurveFn>,
    {
        self.curves.add(funcs)
    }

    pub fn tweening_func(&self, index: u8) -> Option<CurveFn> {
        self.curves.get(index)
    }

    pub fn clear_tweening_funcs(&mut self) {
        self.curves.clear();
    }

    /// Insert a clip before the first clip that starts strictly later, so
    /// clips with equal start times keep their insertion order.
    pub(crate) fn insert(&mut self, id: ClipId, clips: &SlotMap<ClipId, AnimatorClip>) {
        let Some(start) = clips.get(id).map(AnimatorClip::start_time) else {
            return;
        };
        let position = self.clips.iter().position(|other| {
            clips
                .get(*other)
                .is_some_and(|clip| clip.start_time() > start)
        });
        match position {
            Some(index) => self.clips.insert(index, id),
            None => self.clips.push(id),
        }
    }

    /// Remove the first occurrence of a clip. Returns false if it was not scheduled
    pub(crate) fn remove(&mut self, id: ClipId) -> bool {
        match self.clips.iter().position(|other| *other == id) {
            Some(index) => {
                self.clips.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn take_clips(&mut self) -> Vec<ClipId> {
        std::mem::take(&mut self.clips)
    }

    /// Advance the global clock and every clip that is due.
    ///
    /// Clips are visited from the front when the clock runs forward and from
    /// the back when it runs in reverse. The walk stops at the first clip that
    /// is not due, which is only sound because `clips` stays sorted.
    pub(crate) fn update(
        &mut self,
        id: TimelineId,
        delta_seconds: f32,
        clips: &mut SlotMap<ClipId, AnimatorClip>,
    ) -> ClipEvents {
        self.clock.update(delta_seconds);
        let now = self.clock.time();
        let mut events = ClipEvents::new();

        if self.clock.is_reversed() {
            let mut index = self.clips.len();
            while index > 0 {
                index -= 1;
                let clip_id = self.clips[index];
                let Some(clip) = clips.get_mut(clip_id) else {
                    // Removed from the registry without being stopped
                    self.clips.remove(index);
                    continue;
                };
                if now < clip.start_time() {
                    break;
                }
                let progress = clip.update(&self.clock);
                // Removing at `index` leaves the clips still to visit in place
                self.settle(id, index, clip_id, clip, progress, &mut events);
            }
        } else {
            let mut index = 0;
            while index < self.clips.len() {
                let clip_id = self.clips[index];
                let Some(clip) = clips.get_mut(clip_id) else {
                    self.clips.remove(index);
                    continue;
                };
                if clip.start_time() >= now {
                    break;
                }
                let progress = clip.update(&self.clock);
                if !self.settle(id, index, clip_id, clip, progress, &mut events) {
                    index += 1;
                }
            }
        }

        events
    }

    /// Record the event for an updated clip and evict it if it finished with
    /// auto-remove set. Returns true if the clip at `index` was removed.
    fn settle(
        &mut self,
        id: TimelineId,
        index: usize,
        clip_id: ClipId,
        clip: &mut AnimatorClip,
        progress: ClipProgress,
        events: &mut ClipEvents,
    ) -> bool {
        tracing::trace!(
            "Clip {:?} on {:?}: {:?} at {}ms",
            clip_id,
            id,
            progress,
            clip.time()
        );
        match progress {
            ClipProgress::Running | ClipProgress::Holding => false,
            ClipProgress::Looped => {
                events.push(ClipEvent::Looped {
                    clip: clip_id,
                    times_looped: clip.times_looped(),
                });
                false
            }
            ClipProgress::Rewound => {
                events.push(ClipEvent::Rewound {
                    clip: clip_id,
                    times_looped: clip.times_looped(),
                });
                false
            }
            ClipProgress::Finished => {
                let removed = clip.auto_remove();
                if removed {
                    clip.detach();
                    self.clips.remove(index);
                    tracing::debug!("Clip {:?} finished; removed from {:?}", clip_id, id);
                }
                events.push(ClipEvent::Finished {
                    clip: clip_id,
                    removed,
                });
                removed
            }
        }
    }
}

impl Default for AnimatorTimeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::{lerp, power2};
    use crate::description::AnimationDescription;

    fn registry() -> SlotMap<ClipId, AnimatorClip> {
        SlotMap::with_key()
    }

    fn add(clips: &mut SlotMap<ClipId, AnimatorClip>, start: u32) -> ClipId {
        let mut clip =
            AnimatorClip::from_description(AnimationDescription::new("clip", 1000)).unwrap();
        clip.attach(TimelineId::default(), start, 0, true);
        clips.insert(clip)
    }

    #[test]
    fn test_insert_keeps_start_order() {
        let mut clips = registry();
        let mut timeline = AnimatorTimeline::new();

        let late = add(&mut clips, 300);
        let early = add(&mut clips, 100);
        let middle = add(&mut clips, 200);
        for id in [late, early, middle] {
            timeline.insert(id, &clips);
        }

        assert_eq!(timeline.clips(), &[early, middle, late]);
    }

    #[test]
    fn test_insert_ties_keep_insertion_order() {
        let mut clips = registry();
        let mut timeline = AnimatorTimeline::new();

        let first = add(&mut clips, 100);
        let second = add(&mut clips, 100);
        let earlier = add(&mut clips, 50);
        let third = add(&mut clips, 100);
        for id in [first, second, earlier, third] {
            timeline.insert(id, &clips);
        }

        assert_eq!(timeline.clips(), &[earlier, first, second, third]);
    }

    #[test]
    fn test_remove() {
        let mut clips = registry();
        let mut timeline = AnimatorTimeline::new();
        let a = add(&mut clips, 0);
        let b = add(&mut clips, 0);
        timeline.insert(a, &clips);
        timeline.insert(b, &clips);

        assert!(timeline.remove(a));
        assert!(!timeline.remove(a));
        assert_eq!(timeline.clips(), &[b]);
    }

    #[test]
    fn test_forward_update_stops_at_first_pending_clip() {
        let mut clips = registry();
        let mut timeline = AnimatorTimeline::new();
        let due = add(&mut clips, 0);
        let pending = add(&mut clips, 800);
        timeline.insert(due, &clips);
        timeline.insert(pending, &clips);

        timeline.update(TimelineId::default(), 0.5, &mut clips);
        assert_eq!(clips[due].time(), 500);
        assert_eq!(clips[pending].time(), 0);
    }

    #[test]
    fn test_finished_clip_is_evicted() {
        let mut clips = registry();
        let mut timeline = AnimatorTimeline::new();
        let id = add(&mut clips, 0);
        timeline.insert(id, &clips);

        assert!(timeline.update(TimelineId::default(), 0.5, &mut clips).is_empty());
        let events = timeline.update(TimelineId::default(), 0.5, &mut clips);
        assert_eq!(
            events.as_slice(),
            &[ClipEvent::Finished {
                clip: id,
                removed: true
            }]
        );
        assert!(timeline.is_empty());
        assert!(!clips[id].is_playing());
    }

    #[test]
    fn test_stale_clip_is_dropped() {
        let mut clips = registry();
        let mut timeline = AnimatorTimeline::new();
        let id = add(&mut clips, 0);
        timeline.insert(id, &clips);
        clips.remove(id);

        timeline.update(TimelineId::default(), 0.5, &mut clips);
        assert!(timeline.is_empty());
    }

    #[test]
    fn test_tweening_funcs() {
        let mut timeline = AnimatorTimeline::new();
        assert!(timeline.tweening_func(0).is_none());

        let first = timeline.add_tweening_funcs([lerp as CurveFn, power2 as CurveFn]);
        assert_eq!(first, 1);
        let func = timeline.tweening_func(first).expect("lerp registered");
        assert_eq!(func(0.0, 10.0, 0.5), 5.0);

        timeline.clear_tweening_funcs();
        assert!(timeline.tweening_func(first).is_none());
        assert_eq!(timeline.curves().len(), 1);
    }

    #[test]
    fn test_config() {
        let timeline = AnimatorTimeline::with_config(&TimelineConfig {
            initial_time_ms: 42,
            scale: -2.0,
            paused: true,
            curve_library: true,
        });
        assert_eq!(timeline.clock().initial_time(), 42);
        assert!(timeline.clock().is_reversed());
        assert!(timeline.clock().is_paused());
        assert!(timeline.tweening_func(1).is_some());
    }
}
