//! Queue entries: one playing motion bound to the manager clock.
//!
//! Lifecycle: `Init -> Active -> End` (see [`EntryState`]).
//! - `Init -> Active` happens on the first tick after the entry was queued. It
//!   anchors the start time, computes the natural end time and emits `Began`.
//!   The entry does not write to the model on that tick.
//! - While `Active` the entry writes its curves every tick, blending from the
//!   value the model already holds (earlier entries' writes included).
//! - A clip reaching its end emits `Finished`; looping clips re-anchor and stay
//!   active, others end. An entry whose requested fade-out has run out ends
//!   without `Finished`.
//!
//! Time values are all on the manager clock (seconds) unless named "local".

use std::sync::Arc;

use log::{debug, trace, warn};

use crate::config::{MotionBehavior, MotionConfig};
use crate::data::{CurveTarget, ModelEffect, MotionClip};
use crate::effects::{EffectOverrides, EffectValues};
use crate::expression::ExpressionMotion;
use crate::fsm::{Edge, EntryState, Fsm, FsmState};
use crate::ids::EntryId;
use crate::interp::functions::{ease_sine, lerp_f32};
use crate::model::Model;
use crate::outputs::MotionEvent;
use crate::sampling::{evaluate_curve, LoopSeam};

/// A clip together with the settings it is played with.
#[derive(Clone, Debug)]
pub struct ClipMotion {
    pub clip: Arc<MotionClip>,
    pub config: MotionConfig,
}

impl ClipMotion {
    #[inline]
    pub fn is_loop(&self) -> bool {
        self.config.looping.unwrap_or(self.clip.is_loop())
    }
}

/// Anything a queue can play.
#[derive(Clone, Debug)]
pub enum Motion {
    Clip(Arc<ClipMotion>),
    Expression(Arc<ExpressionMotion>),
}

impl Motion {
    /// Play `clip` with `config` (unset fades normalised to one second).
    pub fn clip(clip: Arc<MotionClip>, config: MotionConfig) -> Self {
        Self::Clip(Arc::new(ClipMotion {
            clip,
            config: config.normalized(),
        }))
    }

    /// Play an expression overlay (unset fades normalised to one second).
    pub fn expression(expression: Arc<ExpressionMotion>) -> Self {
        let unset = expression.fade_in_seconds < 0.0 || expression.fade_out_seconds < 0.0;
        if unset {
            let normalized = expression.as_ref().clone().normalized();
            return Self::Expression(Arc::new(normalized));
        }
        Self::Expression(expression)
    }

    pub fn fade_in_seconds(&self) -> f32 {
        match self {
            Self::Clip(m) => m.config.fade_in_seconds,
            Self::Expression(e) => e.fade_in_seconds,
        }
    }

    pub fn fade_out_seconds(&self) -> f32 {
        match self {
            Self::Clip(m) => m.config.fade_out_seconds,
            Self::Expression(e) => e.fade_out_seconds,
        }
    }

    fn weight(&self) -> f32 {
        match self {
            Self::Clip(m) => m.config.weight,
            Self::Expression(_) => 1.0,
        }
    }

    fn offset_seconds(&self) -> f32 {
        match self {
            Self::Clip(m) => m.config.offset_seconds,
            Self::Expression(_) => 0.0,
        }
    }

    /// Length after which the entry ends on its own; negative when it never does.
    fn finite_duration(&self) -> f32 {
        match self {
            Self::Clip(m) if !m.is_loop() => m.clip.duration(),
            _ => -1.0,
        }
    }
}

/// Motion-level fade factors for one tick.
#[derive(Clone, Copy, Debug)]
struct Fade {
    fade_in: f32,
    fade_out: f32,
}

#[derive(Debug)]
pub struct MotionQueueEntry {
    id: EntryId,
    motion: Motion,
    fsm: Fsm<EntryState>,
    start_time: f32,
    /// Negative while open-ended.
    end_time: f32,
    fade_in_start_time: f32,
    fade_out_seconds: f32,
    fade_weight: f32,
    last_event_check_time: f32,
    effects: EffectOverrides,
}

impl MotionQueueEntry {
    pub(crate) fn new(id: EntryId, motion: Motion) -> Self {
        let effects = match &motion {
            Motion::Clip(m) => EffectOverrides::new(
                m.config.eye_blink_ids.clone(),
                m.config.lip_sync_ids.clone(),
            ),
            Motion::Expression(_) => EffectOverrides::default(),
        };
        Self {
            id,
            fade_out_seconds: motion.fade_out_seconds(),
            motion,
            fsm: Fsm::new(EntryState::Init),
            start_time: 0.0,
            end_time: -1.0,
            fade_in_start_time: 0.0,
            fade_weight: 0.0,
            last_event_check_time: f32::NEG_INFINITY,
            effects,
        }
    }

    #[inline]
    pub fn id(&self) -> EntryId {
        self.id
    }

    #[inline]
    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    #[inline]
    pub fn state(&self) -> EntryState {
        self.fsm.current()
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.fsm.is(EntryState::End)
    }

    #[inline]
    pub fn start_time(&self) -> f32 {
        self.start_time
    }

    /// Negative while the entry has no scheduled end.
    #[inline]
    pub fn end_time(&self) -> f32 {
        self.end_time
    }

    #[inline]
    pub fn fade_in_start_time(&self) -> f32 {
        self.fade_in_start_time
    }

    /// Blend weight used on the most recent tick.
    #[inline]
    pub fn fade_weight(&self) -> f32 {
        self.fade_weight
    }

    pub fn eye_blink_overridden(&self) -> &[bool] {
        self.effects.eye_blink_overridden()
    }

    pub fn lip_sync_overridden(&self) -> &[bool] {
        self.effects.lip_sync_overridden()
    }

    /// Bind the entry to the clock at `total`.
    pub(crate) fn begin(&mut self, total: f32, events: &mut Vec<MotionEvent>) {
        if !self.enter(EntryState::Active) {
            return;
        }
        self.start_time = total - self.motion.offset_seconds();
        self.fade_in_start_time = total;
        let duration = self.motion.finite_duration();
        self.end_time = if duration < 0.0 {
            -1.0
        } else {
            self.start_time + duration
        };
        events.push(MotionEvent::Began { entry: self.id });
    }

    /// Schedule the end `fade_out_seconds` from `total`, unless it already ends sooner.
    ///
    /// An entry that never started is ended immediately.
    pub fn start_fade_out(&mut self, fade_out_seconds: f32, total: f32) {
        match self.fsm.current() {
            EntryState::Init => self.stop(),
            EntryState::Active => {
                let new_end = total + fade_out_seconds;
                self.fade_out_seconds = fade_out_seconds;
                if self.end_time < 0.0 || new_end < self.end_time {
                    self.end_time = new_end;
                }
            }
            EntryState::End => {}
        }
    }

    /// End the entry now, without a `Finished` event.
    pub fn stop(&mut self) {
        if !self.is_finished() {
            self.enter(EntryState::End);
        }
    }

    fn enter(&mut self, to: EntryState) -> bool {
        match self.fsm.transition(to) {
            Ok(Edge { from, to }) => {
                debug!("entry {:?}: {} -> {}", self.id, from.name(), to.name());
                true
            }
            Err(err) => {
                warn!("entry {:?}: {err}", self.id);
                false
            }
        }
    }

    fn fade(&self, total: f32) -> Fade {
        let fade_in_seconds = self.motion.fade_in_seconds();
        let fade_in = if fade_in_seconds == 0.0 {
            1.0
        } else {
            ease_sine((total - self.fade_in_start_time) / fade_in_seconds)
        };
        let fade_out = if self.fade_out_seconds == 0.0 || self.end_time < 0.0 {
            1.0
        } else {
            ease_sine((self.end_time - total) / self.fade_out_seconds)
        };
        Fade { fade_in, fade_out }
    }

    /// Run one tick of an active entry.
    pub(crate) fn update(
        &mut self,
        model: &mut dyn Model,
        total: f32,
        behavior: MotionBehavior,
        events: &mut Vec<MotionEvent>,
    ) {
        if !self.fsm.is(EntryState::Active) {
            return;
        }
        let elapsed = total - self.start_time;
        debug_assert!(
            elapsed >= -f32::EPSILON,
            "entry {:?} updated before its start ({total} < {})",
            self.id,
            self.start_time
        );

        let fade = self.fade(total);
        self.fade_weight = self.motion.weight() * fade.fade_in * fade.fade_out;
        trace!(
            "entry {:?}: t={total} elapsed={elapsed} weight={}",
            self.id,
            self.fade_weight
        );

        match &self.motion {
            Motion::Clip(m) => {
                let m = Arc::clone(m);
                self.update_clip(&m, model, total, elapsed, fade, behavior, events);
            }
            Motion::Expression(e) => e.apply(model, self.fade_weight),
        }

        if self.fsm.is(EntryState::Active) && self.end_time >= 0.0 && self.end_time < total {
            self.stop();
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn update_clip(
        &mut self,
        motion: &ClipMotion,
        model: &mut dyn Model,
        total: f32,
        elapsed: f32,
        fade: Fade,
        behavior: MotionBehavior,
        events: &mut Vec<MotionEvent>,
    ) {
        let clip = motion.clip.as_ref();
        let looping = motion.is_loop();

        let mut duration = clip.duration();
        let mut time = elapsed;
        let mut seam = None;
        if looping {
            if behavior == MotionBehavior::V2 {
                duration += 1.0 / clip.fps();
            }
            if duration > 0.0 {
                while time > duration {
                    time -= duration;
                }
                if behavior == MotionBehavior::V2 {
                    seam = Some(LoopSeam { end_time: duration });
                }
            }
        }

        // Model curves: effect sources and model opacity.
        let mut effects = EffectValues::default();
        for curve in clip.curves().iter().filter(|c| c.target == CurveTarget::Model) {
            let Some(effect) = curve.effect else {
                continue;
            };
            let value = evaluate_curve(clip, curve, time, seam);
            match effect {
                ModelEffect::EyeBlink => effects.eye_blink = Some(value),
                ModelEffect::LipSync => effects.lip_sync = Some(value),
                ModelEffect::Opacity => model.set_model_opacity(value),
            }
        }

        // Parameter curves.
        self.effects.begin_tick();
        for curve in clip
            .curves()
            .iter()
            .filter(|c| c.target == CurveTarget::Parameter)
        {
            let Some(index) = model.parameter_index(&curve.id) else {
                continue;
            };
            let source = model.parameter_value_at(index);
            let value = evaluate_curve(clip, curve, time, seam);
            let value = self.effects.apply_to_curve(&curve.id, value, &effects);

            let weight = if curve.has_own_fade() {
                let fin = if curve.fade_in_time < 0.0 {
                    fade.fade_in
                } else if curve.fade_in_time == 0.0 {
                    1.0
                } else {
                    ease_sine((total - self.fade_in_start_time) / curve.fade_in_time)
                };
                let fout = if curve.fade_out_time < 0.0 {
                    fade.fade_out
                } else if curve.fade_out_time == 0.0 || self.end_time < 0.0 {
                    1.0
                } else {
                    ease_sine((self.end_time - total) / curve.fade_out_time)
                };
                motion.config.weight * fin * fout
            } else {
                self.fade_weight
            };

            model.set_parameter_value_at(index, lerp_f32(source, value, weight), 1.0);
        }

        self.effects
            .blend_remaining(model, &effects, self.fade_weight);

        // Part opacity curves.
        for curve in clip
            .curves()
            .iter()
            .filter(|c| c.target == CurveTarget::PartOpacity)
        {
            let Some(index) = model.part_index(&curve.id) else {
                continue;
            };
            let value = evaluate_curve(clip, curve, time, seam);
            model.set_part_opacity_at(index, value);
        }

        if clip.duration() >= 0.0 && elapsed >= duration {
            events.push(MotionEvent::Finished { entry: self.id });
            if looping {
                self.start_time = total - time;
                if motion.config.loop_fade_in {
                    self.fade_in_start_time = total - time;
                }
            } else {
                self.stop();
            }
        }

        // User events in (last check, now] of clip-local time.
        let before = self.last_event_check_time - self.start_time;
        let now = total - self.start_time;
        for event in clip.fired_events(before, now) {
            events.push(MotionEvent::UserData {
                entry: self.id,
                value: event.value.clone(),
            });
        }
        self.last_event_check_time = total;
    }
}
