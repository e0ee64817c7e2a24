//! Animator registry
//!
//! Owns every clip and timeline and hands out generational handles to them.
//! A clip refers back to the timeline playing it through a [`TimelineId`], so a
//! destroyed timeline can never be reached through a stale reference.

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::clip::AnimatorClip;
use crate::error::{AnimatorError, Result};
use crate::timeline::{AnimatorTimeline, ClipEvent, ClipEvents, TimelineConfig};

new_key_type! {
    /// Handle to a clip owned by an [`Animator`]
    pub struct ClipId;
    /// Handle to a timeline owned by an [`Animator`]
    pub struct TimelineId;
}

/// Registry that owns clips and the timelines playing them
#[derive(Debug, Default)]
pub struct Animator {
    timelines: SlotMap<TimelineId, AnimatorTimeline>,
    clips: SlotMap<ClipId, AnimatorClip>,
}

impl Animator {
    pub fn new() -> Self {
        Self {
            timelines: SlotMap::with_key(),
            clips: SlotMap::with_key(),
        }
    }

    /// Create a timeline with the default configuration
    pub fn create_timeline(&mut self) -> TimelineId {
        self.create_timeline_with(TimelineConfig::default())
    }

    pub fn create_timeline_with(&mut self, config: TimelineConfig) -> TimelineId {
        self.timelines.insert(AnimatorTimeline::with_config(&config))
    }

    /// Destroy a timeline. Every clip it was playing is detached first
    pub fn destroy_timeline(&mut self, id: TimelineId) -> Result<AnimatorTimeline> {
        let mut timeline = self
            .timelines
            .remove(id)
            .ok_or(AnimatorError::TimelineNotFound(id))?;
        let detached = timeline.take_clips();
        for clip_id in &detached {
            if let Some(clip) = self.clips.get_mut(*clip_id) {
                clip.detach();
            }
        }
        tracing::debug!(
            "Destroyed timeline {:?}; detached {} clips",
            id,
            detached.len()
        );
        Ok(timeline)
    }

    pub fn timeline(&self, id: TimelineId) -> Option<&AnimatorTimeline> {
        self.timelines.get(id)
    }

    pub fn timeline_mut(&mut self, id: TimelineId) -> Option<&mut AnimatorTimeline> {
        self.timelines.get_mut(id)
    }

    /// Take ownership of a detached clip
    pub fn add_clip(&mut self, mut clip: AnimatorClip) -> ClipId {
        clip.detach();
        self.clips.insert(clip)
    }

    /// Stop a clip and give it back
    pub fn remove_clip(&mut self, id: ClipId) -> Result<AnimatorClip> {
        self.stop(id)?;
        self.clips.remove(id).ok_or(AnimatorError::ClipNotFound(id))
    }

    pub fn clip(&self, id: ClipId) -> Option<&AnimatorClip> {
        self.clips.get(id)
    }

    /// Mutable access to a clip (pause, resume, scale, loops)
    pub fn clip_mut(&mut self, id: ClipId) -> Option<&mut AnimatorClip> {
        self.clips.get_mut(id)
    }

    /// Play a clip on a timeline, starting `start_offset_ms` after the
    /// timeline's current time (clamped to 0).
    ///
    /// A clip already playing elsewhere is stopped first, so it is never
    /// scheduled on more than one timeline.
    pub fn play(
        &mut self,
        clip_id: ClipId,
        timeline_id: TimelineId,
        start_offset_ms: i32,
        auto_remove: bool,
    ) -> Result<()> {
        if !self.timelines.contains_key(timeline_id) {
            return Err(AnimatorError::TimelineNotFound(timeline_id));
        }
        self.stop(clip_id)?;

        let timeline = self
            .timelines
            .get_mut(timeline_id)
            .ok_or(AnimatorError::TimelineNotFound(timeline_id))?;
        let clip = self
            .clips
            .get_mut(clip_id)
            .ok_or(AnimatorError::ClipNotFound(clip_id))?;

        clip.attach(timeline_id, timeline.time(), start_offset_ms, auto_remove);
        let start = clip.start_time();
        timeline.insert(clip_id, &self.clips);

        tracing::debug!(
            "Playing clip {:?} on {:?} from {}ms",
            clip_id,
            timeline_id,
            start
        );
        Ok(())
    }

    /// Stop a clip, removing it from its timeline. Stopping a detached clip
    /// does nothing.
    pub fn stop(&mut self, clip_id: ClipId) -> Result<()> {
        let clip = self
            .clips
            .get_mut(clip_id)
            .ok_or(AnimatorError::ClipNotFound(clip_id))?;
        let Some(timeline_id) = clip.detach() else {
            return Ok(());
        };
        if let Some(timeline) = self.timelines.get_mut(timeline_id) {
            timeline.remove(clip_id);
        }
        tracing::debug!("Stopped clip {:?} on {:?}", clip_id, timeline_id);
        Ok(())
    }

    /// The timeline currently playing a clip, if it still exists
    pub fn timeline_of(&self, clip_id: ClipId) -> Option<TimelineId> {
        self.clips
            .get(clip_id)
            .and_then(AnimatorClip::timeline)
            .filter(|id| self.timelines.contains_key(*id))
    }

    /// Advance one timeline by `delta_seconds` of real time
    pub fn update_timeline(&mut self, id: TimelineId, delta_seconds: f32) -> Result<ClipEvents> {
        let timeline = self
            .timelines
            .get_mut(id)
            .ok_or(AnimatorError::TimelineNotFound(id))?;
        Ok(timeline.update(id, delta_seconds, &mut self.clips))
    }

    /// Advance every timeline by `delta_seconds` of real time
    pub fn update(&mut self, delta_seconds: f32) -> SmallVec<[(TimelineId, ClipEvent); 8]> {
        let mut events = SmallVec::new();
        for (id, timeline) in self.timelines.iter_mut() {
            let timeline_events = timeline.update(id, delta_seconds, &mut self.clips);
            events.extend(timeline_events.into_iter().map(|event| (id, event)));
        }
        events
    }

    /// Remove every clip from a timeline
    pub fn clear_clips(&mut self, id: TimelineId) -> Result<()> {
        let timeline = self
            .timelines
            .get_mut(id)
            .ok_or(AnimatorError::TimelineNotFound(id))?;
        for clip_id in timeline.take_clips() {
            if let Some(clip) = self.clips.get_mut(clip_id) {
                clip.detach();
            }
        }
        Ok(())
    }

    /// Start times of a timeline's clips, in scheduling order
    pub fn start_times(&self, id: TimelineId) -> Option<Vec<u32>> {
        let timeline = self.timelines.get(id)?;
        Some(
            timeline
                .clips()
                .iter()
                .filter_map(|clip_id| self.clips.get(*clip_id))
                .map(AnimatorClip::start_time)
                .collect(),
        )
    }

    /// Iterate over all clips
    pub fn clips_iter(&self) -> impl Iterator<Item = (ClipId, &AnimatorClip)> {
        self.clips.iter()
    }

    /// Iterate over all timelines
    pub fn timelines_iter(&self) -> impl Iterator<Item = (TimelineId, &AnimatorTimeline)> {
        self.timelines.iter()
    }

    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    pub fn timeline_count(&self) -> usize {
        self.timelines.len()
    }
}
