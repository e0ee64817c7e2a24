//! Headless scene simulation
//!
//! Plays every clip of a scene on one timeline, applies the scripted actions
//! and advances the timeline at a fixed frame rate.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use tempo_animation::{Animator, AnimatorClip, ClipEvent, ClipId, Clock, TimelineId};

use crate::config::{ActionEntry, ActionKind, SceneConfig};

/// A clip event, with the clip named as in the scene
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventReport {
    Looped { clip: String, times_looped: i32 },
    Rewound { clip: String, times_looped: i32 },
    Finished { clip: String, removed: bool },
}

impl fmt::Display for EventReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Looped { clip, times_looped } => {
                write!(f, "{} looped ({} so far)", clip, times_looped)
            }
            Self::Rewound { clip, times_looped } => {
                write!(f, "{} rewound ({} loops left)", clip, times_looped)
            }
            Self::Finished { clip, removed } => {
                if *removed {
                    write!(f, "{} finished and was removed", clip)
                } else {
                    write!(f, "{} finished", clip)
                }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClipState {
    pub name: String,
    pub time_ms: u32,
    pub times_looped: i32,
    pub playing: bool,
    pub finished: bool,
}

/// Everything that happened during one frame
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameReport {
    pub frame: u32,
    /// Global time after the update
    pub time_ms: u32,
    pub events: Vec<EventReport>,
    pub clips: Vec<ClipState>,
}

pub struct Simulation {
    animator: Animator,
    timeline: TimelineId,
    clips: Vec<(String, ClipId)>,
    /// Pending actions, ordered by frame
    actions: VecDeque<ActionEntry>,
}

impl Simulation {
    /// Build the timeline and start playing every clip of the scene
    pub fn new(scene: SceneConfig) -> Result<Self> {
        let mut animator = Animator::new();
        let timeline = animator.create_timeline_with((&scene.timeline).into());

        let mut clips = Vec::with_capacity(scene.clips.len());
        for entry in &scene.clips {
            let animation = scene
                .animation(&entry.animation)
                .with_context(|| format!("Unknown animation '{}'", entry.animation))?;
            let mut clip = AnimatorClip::from_description(animation.description())
                .with_context(|| format!("Failed to create clip '{}'", entry.name()))?
                .with_loops(entry.loops)
                .with_scale(entry.scale);
            if entry.paused {
                clip.pause();
            }

            let id = animator.add_clip(clip);
            animator.play(id, timeline, entry.start_offset_ms, entry.auto_remove)?;
            clips.push((entry.name().to_string(), id));
        }

        let mut actions = scene.actions;
        actions.sort_by_key(|action| action.frame);

        tracing::info!(
            "Loaded scene with {} clips and {} actions",
            clips.len(),
            actions.len()
        );

        Ok(Self {
            animator,
            timeline,
            clips,
            actions: actions.into(),
        })
    }

    /// Advance `frames` frames at `fps` frames per second
    pub fn run(&mut self, frames: u32, fps: f32) -> Result<Vec<FrameReport>> {
        if fps.is_nan() || fps <= 0.0 {
            anyhow::bail!("Frame rate must be positive, got {}", fps);
        }
        let delta_seconds = 1.0 / fps;

        let mut reports = Vec::with_capacity(frames as usize);
        for frame in 0..frames {
            reports.push(self.step(frame, delta_seconds)?);
        }
        Ok(reports)
    }

    /// Apply the actions due at `frame`, then update the timeline once
    pub fn step(&mut self, frame: u32, delta_seconds: f32) -> Result<FrameReport> {
        while self
            .actions
            .front()
            .is_some_and(|action| action.frame <= frame)
        {
            if let Some(action) = self.actions.pop_front() {
                self.apply(&action)?;
            }
        }

        let events = self
            .animator
            .update_timeline(self.timeline, delta_seconds)?
            .iter()
            .map(|event| self.report(event))
            .collect::<Vec<_>>();
        for event in &events {
            tracing::debug!("Frame {}: {}", frame, event);
        }

        Ok(FrameReport {
            frame,
            time_ms: self.clock()?.time(),
            events,
            clips: self.snapshot(),
        })
    }

    fn apply(&mut self, action: &ActionEntry) -> Result<()> {
        tracing::debug!(
            "Frame {}: applying {:?} to {}",
            action.frame,
            action.action,
            action.clip.as_deref().unwrap_or("timeline")
        );

        let target = match &action.clip {
            Some(name) => Some(self.clip_id(name)?),
            None => None,
        };

        match (action.action, target) {
            (ActionKind::Pause, Some(id)) => self.clip_mut(id)?.pause(),
            (ActionKind::Pause, None) => self.clock_mut()?.set_paused(true),
            (ActionKind::Resume, Some(id)) => self.clip_mut(id)?.resume(),
            (ActionKind::Resume, None) => self.clock_mut()?.set_paused(false),
            (ActionKind::Reverse, _) => {
                let clock = self.clock_mut()?;
                let scale = clock.scale();
                clock.set_scale(-scale);
            }
            (ActionKind::Scale, target) => {
                let value = action.value.with_context(|| {
                    format!("Action scale at frame {} needs a value", action.frame)
                })?;
                match target {
                    Some(id) => self.clip_mut(id)?.set_scale(value),
                    None => self.clock_mut()?.set_scale(value),
                }
            }
            (ActionKind::Stop, Some(id)) => self.animator.stop(id)?,
            (ActionKind::Play, Some(id)) => {
                self.animator
                    .play(id, self.timeline, action.start_offset_ms, action.auto_remove)?
            }
            (ActionKind::Stop | ActionKind::Play, None) => {
                anyhow::bail!(
                    "Action {:?} at frame {} needs a clip",
                    action.action,
                    action.frame
                );
            }
        }
        Ok(())
    }

    fn clip_id(&self, name: &str) -> Result<ClipId> {
        self.clips
            .iter()
            .find(|(clip_name, _)| clip_name == name)
            .map(|(_, id)| *id)
            .with_context(|| format!("Unknown clip '{}'", name))
    }

    fn clip_name(&self, id: ClipId) -> String {
        self.clips
            .iter()
            .find(|(_, clip_id)| *clip_id == id)
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| format!("{:?}", id))
    }

    fn clip_mut(&mut self, id: ClipId) -> Result<&mut AnimatorClip> {
        self.animator
            .clip_mut(id)
            .with_context(|| format!("Clip {:?} no longer exists", id))
    }

    fn clock(&self) -> Result<&Clock> {
        self.animator
            .timeline(self.timeline)
            .map(|timeline| timeline.clock())
            .context("Timeline no longer exists")
    }

    fn clock_mut(&mut self) -> Result<&mut Clock> {
        self.animator
            .timeline_mut(self.timeline)
            .map(|timeline| timeline.clock_mut())
            .context("Timeline no longer exists")
    }

    fn report(&self, event: &ClipEvent) -> EventReport {
        let clip = self.clip_name(event.clip());
        match *event {
            ClipEvent::Looped { times_looped, .. } => EventReport::Looped { clip, times_looped },
            ClipEvent::Rewound { times_looped, .. } => EventReport::Rewound { clip, times_looped },
            ClipEvent::Finished { removed, .. } => EventReport::Finished { clip, removed },
        }
    }

    fn snapshot(&self) -> Vec<ClipState> {
        self.clips
            .iter()
            .filter_map(|(name, id)| {
                self.animator.clip(*id).map(|clip| ClipState {
                    name: name.clone(),
                    time_ms: clip.time(),
                    times_looped: clip.times_looped(),
                    playing: clip.is_playing(),
                    finished: clip.is_finished(),
                })
            })
            .collect()
    }
}
