//! Parameter interface of the animated model.
//!
//! The engine never touches geometry: it reads and writes scalar parameters
//! through [`Model`]. Hosts implement the index-based methods against their
//! own parameter storage; the by-id helpers are provided on top of
//! [`Model::parameter_index`]. [`ParameterTable`] is a ready-made
//! implementation for hosts without one and for tests.

use hashbrown::HashMap;

use crate::ids::ParamId;

pub trait Model {
    /// Resolve a parameter id to a dense index, `None` if the model lacks it.
    fn parameter_index(&self, id: &ParamId) -> Option<usize>;

    fn parameter_value_at(&self, index: usize) -> f32;

    /// `current + (value - current) * weight`.
    fn set_parameter_value_at(&mut self, index: usize, value: f32, weight: f32);

    /// `current + value * weight`.
    fn add_parameter_value_at(&mut self, index: usize, value: f32, weight: f32);

    /// `current * (1 + (value - 1) * weight)`.
    fn multiply_parameter_value_at(&mut self, index: usize, value: f32, weight: f32);

    /// Model-wide opacity driven by an `Opacity` model curve. Ignored by default.
    fn set_model_opacity(&mut self, _opacity: f32) {}

    /// Part opacity channels share the parameter table unless a host keeps them apart.
    fn part_index(&self, id: &ParamId) -> Option<usize> {
        self.parameter_index(id)
    }

    /// Written with full authority; no blend weight applies.
    fn set_part_opacity_at(&mut self, index: usize, opacity: f32) {
        self.set_parameter_value_at(index, opacity, 1.0);
    }

    fn parameter_value(&self, id: &ParamId) -> Option<f32> {
        self.parameter_index(id).map(|i| self.parameter_value_at(i))
    }

    /// Returns false when the model has no such parameter.
    fn set_parameter_value(&mut self, id: &ParamId, value: f32, weight: f32) -> bool {
        match self.parameter_index(id) {
            Some(i) => {
                self.set_parameter_value_at(i, value, weight);
                true
            }
            None => false,
        }
    }

    fn add_parameter_value(&mut self, id: &ParamId, value: f32, weight: f32) -> bool {
        match self.parameter_index(id) {
            Some(i) => {
                self.add_parameter_value_at(i, value, weight);
                true
            }
            None => false,
        }
    }

    fn multiply_parameter_value(&mut self, id: &ParamId, value: f32, weight: f32) -> bool {
        match self.parameter_index(id) {
            Some(i) => {
                self.multiply_parameter_value_at(i, value, weight);
                true
            }
            None => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct ParameterSlot {
    value: f32,
    default: f32,
    min: f32,
    max: f32,
}

impl ParameterSlot {
    #[inline]
    fn store(&mut self, value: f32) {
        self.value = value.clamp(self.min, self.max);
    }
}

/// In-memory parameter storage with per-parameter range clamping.
#[derive(Clone, Debug)]
pub struct ParameterTable {
    index: HashMap<ParamId, usize>,
    slots: Vec<ParameterSlot>,
    opacity: f32,
}

impl Default for ParameterTable {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            slots: Vec::new(),
            opacity: 1.0,
        }
    }
}

impl ParameterTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a parameter (or redefine an existing one) and reset it to `default`.
    pub fn define(&mut self, id: impl Into<ParamId>, default: f32, min: f32, max: f32) -> usize {
        let slot = ParameterSlot {
            value: default.clamp(min, max),
            default,
            min,
            max,
        };
        let id = id.into();
        if let Some(&i) = self.index.get(&id) {
            self.slots[i] = slot;
            return i;
        }
        let i = self.slots.len();
        self.slots.push(slot);
        self.index.insert(id, i);
        i
    }

    /// Builder-style [`define`](Self::define).
    pub fn with(mut self, id: &str, default: f32, min: f32, max: f32) -> Self {
        self.define(id, default, min, max);
        self
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Value by name; `None` for unknown ids.
    pub fn get(&self, id: &str) -> Option<f32> {
        self.index.get(id).map(|&i| self.slots[i].value)
    }

    pub fn model_opacity(&self) -> f32 {
        self.opacity
    }

    /// Restore every parameter to its default.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.value = slot.default.clamp(slot.min, slot.max);
        }
    }
}

impl Model for ParameterTable {
    fn parameter_index(&self, id: &ParamId) -> Option<usize> {
        self.index.get(id).copied()
    }

    fn parameter_value_at(&self, index: usize) -> f32 {
        self.slots[index].value
    }

    fn set_parameter_value_at(&mut self, index: usize, value: f32, weight: f32) {
        let slot = &mut self.slots[index];
        let next = if weight == 1.0 {
            value
        } else {
            slot.value + (value - slot.value) * weight
        };
        slot.store(next);
    }

    fn add_parameter_value_at(&mut self, index: usize, value: f32, weight: f32) {
        let slot = &mut self.slots[index];
        slot.store(slot.value + value * weight);
    }

    fn multiply_parameter_value_at(&mut self, index: usize, value: f32, weight: f32) {
        let slot = &mut self.slots[index];
        slot.store(slot.value * (1.0 + (value - 1.0) * weight));
    }

    fn set_model_opacity(&mut self, opacity: f32) {
        self.opacity = opacity;
    }
}
