//! Scene file handling
//!
//! A scene describes one timeline, the animations it knows about, the clips
//! played on it and a script of actions applied at given frames.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tempo_animation::{AnimationDescription, TimelineConfig};

/// Top-level scene file
#[derive(Debug, Deserialize, Serialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub timeline: TimelineSection,
    #[serde(default)]
    pub animations: Vec<AnimationEntry>,
    #[serde(default)]
    pub clips: Vec<ClipEntry>,
    #[serde(default)]
    pub actions: Vec<ActionEntry>,
}

/// Global clock settings
#[derive(Debug, Deserialize, Serialize)]
pub struct TimelineSection {
    #[serde(default)]
    pub initial_time_ms: u32,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default)]
    pub paused: bool,
    /// Register the built-in curves on the timeline
    #[serde(default)]
    pub curve_library: bool,
}

fn default_scale() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

impl Default for TimelineSection {
    fn default() -> Self {
        Self {
            initial_time_ms: 0,
            scale: default_scale(),
            paused: false,
            curve_library: false,
        }
    }
}

impl From<&TimelineSection> for TimelineConfig {
    fn from(section: &TimelineSection) -> Self {
        TimelineConfig {
            initial_time_ms: section.initial_time_ms,
            scale: section.scale,
            paused: section.paused,
            curve_library: section.curve_library,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AnimationEntry {
    pub name: String,
    pub duration_ms: u32,
    #[serde(default, rename = "loop")]
    pub looping: bool,
    #[serde(default)]
    pub tween: bool,
}

impl AnimationEntry {
    pub fn description(&self) -> AnimationDescription {
        AnimationDescription::new(self.name.clone(), self.duration_ms)
            .with_loop(self.looping)
            .with_tween(self.tween)
    }
}

/// A clip played on the timeline when the simulation starts
#[derive(Debug, Deserialize, Serialize)]
pub struct ClipEntry {
    /// Name used by actions; defaults to the animation name
    #[serde(default)]
    pub name: Option<String>,
    pub animation: String,
    #[serde(default)]
    pub loops: i32,
    #[serde(default)]
    pub start_offset_ms: i32,
    #[serde(default = "default_true")]
    pub auto_remove: bool,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default)]
    pub paused: bool,
}

impl ClipEntry {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.animation)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Pause,
    Resume,
    Reverse,
    Scale,
    Stop,
    Play,
}

/// A scripted change applied before the update of `frame`.
///
/// `pause`, `resume` and `scale` act on the timeline unless `clip` is set;
/// `reverse` always flips the timeline; `stop` and `play` need a clip.
#[derive(Debug, Deserialize, Serialize)]
pub struct ActionEntry {
    pub frame: u32,
    pub action: ActionKind,
    #[serde(default)]
    pub clip: Option<String>,
    /// Scale factor for `scale`
    #[serde(default)]
    pub value: Option<f32>,
    #[serde(default)]
    pub start_offset_ms: i32,
    #[serde(default = "default_true")]
    pub auto_remove: bool,
}

impl SceneConfig {
    /// Load and validate a scene file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            anyhow::bail!("Scene file not found: {}", path.display());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Failed to load {}", path.display()))
    }

    /// Parse and validate a scene from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let scene: SceneConfig = toml::from_str(content).context("Failed to parse scene")?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn animation(&self, name: &str) -> Option<&AnimationEntry> {
        self.animations.iter().find(|entry| entry.name == name)
    }

    /// Check that every name referenced in the scene resolves
    pub fn validate(&self) -> Result<()> {
        let mut animations = HashSet::new();
        for entry in &self.animations {
            if !animations.insert(entry.name.as_str()) {
                anyhow::bail!("Duplicate animation '{}'", entry.name);
            }
            if entry.duration_ms == 0 {
                anyhow::bail!("Animation '{}' has zero duration", entry.name);
            }
        }

        let mut clips = HashSet::new();
        for clip in &self.clips {
            if !animations.contains(clip.animation.as_str()) {
                anyhow::bail!(
                    "Clip '{}' uses unknown animation '{}'",
                    clip.name(),
                    clip.animation
                );
            }
            if !clips.insert(clip.name()) {
                anyhow::bail!("Duplicate clip '{}'", clip.name());
            }
        }

        for action in &self.actions {
            match (&action.clip, action.action) {
                (Some(name), _) if !clips.contains(name.as_str()) => {
                    anyhow::bail!(
                        "Action at frame {} targets unknown clip '{}'",
                        action.frame,
                        name
                    );
                }
                (None, ActionKind::Stop | ActionKind::Play) => {
                    anyhow::bail!(
                        "Action {:?} at frame {} needs a clip",
                        action.action,
                        action.frame
                    );
                }
                (Some(_), ActionKind::Reverse) => {
                    anyhow::bail!(
                        "Action reverse at frame {} acts on the timeline only",
                        action.frame
                    );
                }
                _ => {}
            }
            if action.action == ActionKind::Scale && action.value.is_none() {
                anyhow::bail!("Action scale at frame {} needs a value", action.frame);
            }
        }

        Ok(())
    }

    /// A small scene showing loops, offsets and a scripted reversal
    pub fn example() -> Self {
        Self {
            timeline: TimelineSection::default(),
            animations: vec![
                AnimationEntry {
                    name: "walk".to_string(),
                    duration_ms: 1000,
                    looping: true,
                    tween: true,
                },
                AnimationEntry {
                    name: "jump".to_string(),
                    duration_ms: 400,
                    looping: false,
                    tween: false,
                },
            ],
            clips: vec![
                ClipEntry {
                    name: None,
                    animation: "walk".to_string(),
                    loops: -1,
                    start_offset_ms: 0,
                    auto_remove: true,
                    scale: 1.0,
                    paused: false,
                },
                ClipEntry {
                    name: Some("hop".to_string()),
                    animation: "jump".to_string(),
                    loops: 1,
                    start_offset_ms: 500,
                    auto_remove: true,
                    scale: 1.0,
                    paused: false,
                },
            ],
            actions: vec![ActionEntry {
                frame: 150,
                action: ActionKind::Reverse,
                clip: None,
                value: None,
                start_offset_ms: 0,
                auto_remove: true,
            }],
        }
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize scene")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"
[timeline]
scale = 0.5

[[animations]]
name = "walk"
duration_ms = 1000
loop = true

[[animations]]
name = "jump"
duration_ms = 400

[[clips]]
animation = "walk"
loops = -1

[[clips]]
name = "hop"
animation = "jump"
start_offset_ms = 250
auto_remove = false

[[actions]]
frame = 30
action = "reverse"

[[actions]]
frame = 40
action = "scale"
clip = "hop"
value = 2.0
"#;

    #[test]
    fn test_parse_scene() {
        let scene = SceneConfig::parse(SCENE).unwrap();
        assert_eq!(scene.timeline.scale, 0.5);
        assert!(!scene.timeline.paused);
        assert_eq!(scene.animations.len(), 2);
        assert!(scene.animation("walk").unwrap().looping);

        assert_eq!(scene.clips[0].name(), "walk");
        assert_eq!(scene.clips[0].loops, -1);
        assert!(scene.clips[0].auto_remove);
        assert_eq!(scene.clips[1].name(), "hop");
        assert_eq!(scene.clips[1].start_offset_ms, 250);
        assert!(!scene.clips[1].auto_remove);

        assert_eq!(scene.actions[0].action, ActionKind::Reverse);
        assert_eq!(scene.actions[1].value, Some(2.0));
    }

    #[test]
    fn test_defaults() {
        let scene = SceneConfig::parse("").unwrap();
        let config = TimelineConfig::from(&scene.timeline);
        assert_eq!(config, TimelineConfig::default());
        assert!(scene.clips.is_empty());
    }

    #[test]
    fn test_unknown_animation_is_rejected() {
        let err = SceneConfig::parse(
            r#"
[[clips]]
animation = "missing"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown animation"));
    }

    #[test]
    fn test_zero_duration_is_rejected() {
        let result = SceneConfig::parse(
            r#"
[[animations]]
name = "empty"
duration_ms = 0
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_stop_needs_clip() {
        let result = SceneConfig::parse(
            r#"
[[actions]]
frame = 1
action = "stop"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_scale_needs_value() {
        let result = SceneConfig::parse(
            r#"
[[actions]]
frame = 1
action = "scale"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_example_scene_is_valid() {
        let example = SceneConfig::example();
        example.validate().unwrap();

        let reparsed = SceneConfig::parse(&example.to_toml().unwrap()).unwrap();
        assert_eq!(reparsed.clips[1].name(), "hop");
        assert_eq!(reparsed.actions[0].action, ActionKind::Reverse);
    }
}
