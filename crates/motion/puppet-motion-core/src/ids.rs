//! Identifiers for parameters and queue entries.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Name of a model parameter, part, or reserved model-level channel.
///
/// Cheap to clone; compared by content.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamId(Arc<str>);

impl ParamId {
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParamId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ParamId {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl Borrow<str> for ParamId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle of one entry in a motion queue.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub u32);

/// Monotonic allocator for EntryId.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_entry: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_entry(&mut self) -> EntryId {
        let id = EntryId(self.next_entry);
        self.next_entry = self.next_entry.wrapping_add(1);
        id
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_entry(), EntryId(0));
        assert_eq!(alloc.alloc_entry(), EntryId(1));
        alloc.reset();
        assert_eq!(alloc.alloc_entry(), EntryId(0));
    }

    #[test]
    fn param_ids_compare_by_name() {
        let a = ParamId::new("ParamAngleX");
        let b: ParamId = String::from("ParamAngleX").into();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "ParamAngleX");
        assert_ne!(a, ParamId::from("ParamAngleY"));
    }

    #[test]
    fn param_ids_serialize_as_plain_strings() {
        let ids: Vec<ParamId> = serde_json::from_str(r#"["ParamEyeLOpen", "ParamMouthOpenY"]"#).unwrap();
        assert_eq!(ids[1].as_str(), "ParamMouthOpenY");
        assert_eq!(serde_json::to_string(&ids[0]).unwrap(), r#""ParamEyeLOpen""#);
    }
}
