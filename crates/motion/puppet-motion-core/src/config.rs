//! Configuration for queues and per-motion playback.

use serde::{Deserialize, Serialize};

use crate::ids::ParamId;

const DEFAULT_FADE_SECONDS: f32 = 1.0;

/// Looping playback rules.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionBehavior {
    /// No frame slack on loops and no seam correction.
    V1,
    /// One frame of slack per loop and a corrective segment across the seam.
    #[default]
    V2,
}

/// Queue sizing and playback behaviour.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial capacity hint for the entry list.
    pub entry_capacity: usize,

    /// Maximum events retained per tick; extra events are dropped with a warning.
    pub max_events_per_tick: usize,

    pub behavior: MotionBehavior,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            entry_capacity: 8,
            max_events_per_tick: 256,
            behavior: MotionBehavior::default(),
        }
    }
}

/// Playback settings attached to a clip when it is started.
///
/// Fade times are in seconds. Negative fades mean "unset" and are replaced by
/// one second in [`MotionConfig::normalized`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub fade_in_seconds: f32,
    pub fade_out_seconds: f32,
    /// Overall blend weight multiplied into every fade.
    pub weight: f32,
    /// Overrides the clip's own loop flag when set.
    pub looping: Option<bool>,
    /// Replay the fade-in on every loop.
    pub loop_fade_in: bool,
    /// Seconds of the clip skipped at start.
    pub offset_seconds: f32,
    pub eye_blink_ids: Vec<ParamId>,
    pub lip_sync_ids: Vec<ParamId>,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            fade_in_seconds: DEFAULT_FADE_SECONDS,
            fade_out_seconds: DEFAULT_FADE_SECONDS,
            weight: 1.0,
            looping: None,
            loop_fade_in: true,
            offset_seconds: 0.0,
            eye_blink_ids: Vec::new(),
            lip_sync_ids: Vec::new(),
        }
    }
}

impl MotionConfig {
    pub fn with_fades(mut self, fade_in: f32, fade_out: f32) -> Self {
        self.fade_in_seconds = fade_in;
        self.fade_out_seconds = fade_out;
        self
    }

    pub fn with_loop(mut self, looping: bool) -> Self {
        self.looping = Some(looping);
        self
    }

    pub fn with_effect_ids(mut self, eye_blink: Vec<ParamId>, lip_sync: Vec<ParamId>) -> Self {
        self.eye_blink_ids = eye_blink;
        self.lip_sync_ids = lip_sync;
        self
    }

    /// Replace negative (unset) fades with the one second default.
    pub fn normalized(mut self) -> Self {
        if self.fade_in_seconds < 0.0 {
            self.fade_in_seconds = DEFAULT_FADE_SECONDS;
        }
        if self.fade_out_seconds < 0.0 {
            self.fade_out_seconds = DEFAULT_FADE_SECONDS;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_fades_fall_back_to_one_second() {
        let cfg = MotionConfig::default().with_fades(-1.0, 0.25).normalized();
        assert_eq!(cfg.fade_in_seconds, 1.0);
        assert_eq!(cfg.fade_out_seconds, 0.25);
    }

    #[test]
    fn zero_fades_are_kept() {
        let cfg = MotionConfig::default().with_fades(0.0, 0.0).normalized();
        assert_eq!(cfg.fade_in_seconds, 0.0);
        assert_eq!(cfg.fade_out_seconds, 0.0);
    }
}
