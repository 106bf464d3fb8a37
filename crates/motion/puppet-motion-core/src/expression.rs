//! Expression overlays: static parameter offsets faded in and out through the
//! same queue protocol as clips.

use serde::{Deserialize, Serialize};

use crate::ids::ParamId;
use crate::model::Model;

fn default_fade() -> f32 {
    1.0
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionBlend {
    #[default]
    Add,
    Multiply,
    Overwrite,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpressionParameter {
    pub id: ParamId,
    pub value: f32,
    #[serde(default)]
    pub blend: ExpressionBlend,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpressionMotion {
    #[serde(default = "default_fade")]
    pub fade_in_seconds: f32,
    #[serde(default = "default_fade")]
    pub fade_out_seconds: f32,
    pub parameters: Vec<ExpressionParameter>,
}

impl ExpressionMotion {
    pub fn new(parameters: Vec<ExpressionParameter>) -> Self {
        Self {
            fade_in_seconds: default_fade(),
            fade_out_seconds: default_fade(),
            parameters,
        }
    }

    pub fn with_fades(mut self, fade_in: f32, fade_out: f32) -> Self {
        self.fade_in_seconds = fade_in;
        self.fade_out_seconds = fade_out;
        self
    }

    /// Replace negative (unset) fades with the one second default.
    pub fn normalized(mut self) -> Self {
        if self.fade_in_seconds < 0.0 {
            self.fade_in_seconds = default_fade();
        }
        if self.fade_out_seconds < 0.0 {
            self.fade_out_seconds = default_fade();
        }
        self
    }

    /// Apply every overlay with the entry's fade weight.
    pub fn apply(&self, model: &mut dyn Model, fade_weight: f32) {
        for p in &self.parameters {
            let Some(index) = model.parameter_index(&p.id) else {
                continue;
            };
            match p.blend {
                ExpressionBlend::Add => model.add_parameter_value_at(index, p.value, fade_weight),
                ExpressionBlend::Multiply => {
                    model.multiply_parameter_value_at(index, p.value, fade_weight)
                }
                ExpressionBlend::Overwrite => {
                    model.set_parameter_value_at(index, p.value, fade_weight)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ParameterTable;

    #[test]
    fn blends_by_kind() {
        let mut model = ParameterTable::new()
            .with("A", 1.0, -10.0, 10.0)
            .with("M", 2.0, -10.0, 10.0)
            .with("O", 4.0, -10.0, 10.0);
        let expr = ExpressionMotion::new(vec![
            ExpressionParameter {
                id: "A".into(),
                value: 2.0,
                blend: ExpressionBlend::Add,
            },
            ExpressionParameter {
                id: "M".into(),
                value: 3.0,
                blend: ExpressionBlend::Multiply,
            },
            ExpressionParameter {
                id: "O".into(),
                value: 0.0,
                blend: ExpressionBlend::Overwrite,
            },
            ExpressionParameter {
                id: "Missing".into(),
                value: 1.0,
                blend: ExpressionBlend::Add,
            },
        ]);
        expr.apply(&mut model, 0.5);
        assert_eq!(model.get("A"), Some(2.0));
        assert_eq!(model.get("M"), Some(4.0));
        assert_eq!(model.get("O"), Some(2.0));
    }

    #[test]
    fn unset_fades_become_one_second() {
        let expr = ExpressionMotion::new(Vec::new())
            .with_fades(-1.0, 0.0)
            .normalized();
        assert_eq!(expr.fade_in_seconds, 1.0);
        assert_eq!(expr.fade_out_seconds, 0.0);
    }
}
