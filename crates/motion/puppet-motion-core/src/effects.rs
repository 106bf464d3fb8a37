//! Eye-blink and lip-sync merge.
//!
//! A clip may carry `EyeBlink`/`LipSync` model curves. Their values reach the
//! model two ways:
//! - a parameter curve whose id is a configured effect id folds the effect
//!   into its own value (eye-blink multiplies, lip-sync adds) and flags that
//!   parameter as overridden for this tick;
//! - every configured effect parameter left unflagged is blended toward the
//!   effect value with the entry's fade weight.

use crate::ids::ParamId;
use crate::interp::functions::lerp_f32;
use crate::model::Model;

/// Effect values sampled from the clip this tick; `None` when the clip has no such curve.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EffectValues {
    pub eye_blink: Option<f32>,
    pub lip_sync: Option<f32>,
}

#[derive(Clone, Debug, Default)]
struct EffectGroup {
    ids: Vec<ParamId>,
    overridden: Vec<bool>,
}

impl EffectGroup {
    fn new(ids: Vec<ParamId>) -> Self {
        let overridden = vec![false; ids.len()];
        Self { ids, overridden }
    }

    fn clear(&mut self) {
        self.overridden.iter_mut().for_each(|f| *f = false);
    }

    /// Flag `id` if configured; returns whether it was.
    fn claim(&mut self, id: &ParamId) -> bool {
        match self.ids.iter().position(|p| p == id) {
            Some(i) => {
                self.overridden[i] = true;
                true
            }
            None => false,
        }
    }

    fn blend_unclaimed(&self, model: &mut dyn Model, target: f32, weight: f32) {
        for (id, _) in self
            .ids
            .iter()
            .zip(self.overridden.iter())
            .filter(|(_, claimed)| !**claimed)
        {
            let Some(index) = model.parameter_index(id) else {
                continue;
            };
            let source = model.parameter_value_at(index);
            model.set_parameter_value_at(index, lerp_f32(source, target, weight), 1.0);
        }
    }
}

/// Configured effect parameters of one queue entry and their per-tick override flags.
#[derive(Clone, Debug, Default)]
pub struct EffectOverrides {
    eye_blink: EffectGroup,
    lip_sync: EffectGroup,
}

impl EffectOverrides {
    pub fn new(eye_blink_ids: Vec<ParamId>, lip_sync_ids: Vec<ParamId>) -> Self {
        Self {
            eye_blink: EffectGroup::new(eye_blink_ids),
            lip_sync: EffectGroup::new(lip_sync_ids),
        }
    }

    pub fn begin_tick(&mut self) {
        self.eye_blink.clear();
        self.lip_sync.clear();
    }

    /// Fold effect values into a curve-driven parameter value.
    pub fn apply_to_curve(&mut self, id: &ParamId, mut value: f32, effects: &EffectValues) -> f32 {
        if let Some(blink) = effects.eye_blink {
            if self.eye_blink.claim(id) {
                value *= blink;
            }
        }
        if let Some(lip) = effects.lip_sync {
            if self.lip_sync.claim(id) {
                value += lip;
            }
        }
        value
    }

    /// Blend the configured parameters no curve claimed this tick.
    pub fn blend_remaining(&self, model: &mut dyn Model, effects: &EffectValues, fade_weight: f32) {
        if let Some(blink) = effects.eye_blink {
            self.eye_blink.blend_unclaimed(model, blink, fade_weight);
        }
        if let Some(lip) = effects.lip_sync {
            self.lip_sync.blend_unclaimed(model, lip, fade_weight);
        }
    }

    pub fn eye_blink_overridden(&self) -> &[bool] {
        &self.eye_blink.overridden
    }

    pub fn lip_sync_overridden(&self) -> &[bool] {
        &self.lip_sync.overridden
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ParameterTable;

    fn ids(names: &[&str]) -> Vec<ParamId> {
        names.iter().map(|n| ParamId::new(n)).collect()
    }

    #[test]
    fn claimed_parameters_skip_the_blend() {
        let mut model = ParameterTable::new()
            .with("EyeL", 1.0, 0.0, 1.0)
            .with("EyeR", 1.0, 0.0, 1.0);
        let mut fx = EffectOverrides::new(ids(&["EyeL", "EyeR"]), Vec::new());
        let effects = EffectValues {
            eye_blink: Some(0.0),
            lip_sync: None,
        };

        fx.begin_tick();
        let v = fx.apply_to_curve(&ParamId::new("EyeL"), 0.8, &effects);
        assert_eq!(v, 0.0);
        assert_eq!(fx.eye_blink_overridden(), &[true, false]);

        fx.blend_remaining(&mut model, &effects, 0.5);
        assert_eq!(model.get("EyeL"), Some(1.0));
        assert_eq!(model.get("EyeR"), Some(0.5));

        fx.begin_tick();
        assert_eq!(fx.eye_blink_overridden(), &[false, false]);
    }

    #[test]
    fn lip_sync_is_additive() {
        let mut fx = EffectOverrides::new(Vec::new(), ids(&["Mouth"]));
        let effects = EffectValues {
            eye_blink: Some(0.5),
            lip_sync: Some(0.25),
        };
        let v = fx.apply_to_curve(&ParamId::new("Mouth"), 0.5, &effects);
        assert_eq!(v, 0.75);
        assert_eq!(fx.lip_sync_overridden(), &[true]);
    }

    #[test]
    fn missing_effect_curve_leaves_values_alone() {
        let mut model = ParameterTable::new().with("Mouth", 0.3, 0.0, 1.0);
        let mut fx = EffectOverrides::new(Vec::new(), ids(&["Mouth"]));
        let effects = EffectValues::default();
        assert_eq!(fx.apply_to_curve(&ParamId::new("Mouth"), 0.6, &effects), 0.6);
        fx.blend_remaining(&mut model, &effects, 1.0);
        assert_eq!(model.get("Mouth"), Some(0.3));
    }
}
