//! Per-tick notifications produced by a motion queue.
//!
//! Parameter values go straight to the [`Model`](crate::model::Model); what
//! comes back from `update` is only the list of discrete events, in the order
//! they happened (entry insertion order, then curve evaluation order).

use serde::{Deserialize, Serialize};

use crate::ids::EntryId;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum MotionEvent {
    /// The entry left `Init` and is now bound to the clock.
    Began { entry: EntryId },
    /// The clip reached its end (once per loop for looping clips).
    Finished { entry: EntryId },
    /// A user data event on the clip timeline was crossed.
    UserData { entry: EntryId, value: String },
}

impl MotionEvent {
    pub fn entry(&self) -> EntryId {
        match self {
            Self::Began { entry } | Self::Finished { entry } | Self::UserData { entry, .. } => {
                *entry
            }
        }
    }
}

/// Outputs returned by the queue's `update`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub events: Vec<MotionEvent>,
    /// Whether any entry wrote to the model this tick.
    #[serde(default)]
    pub updated: bool,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.events.clear();
        self.updated = false;
    }

    #[inline]
    pub fn push_event(&mut self, event: MotionEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn finished_count(&self, entry: EntryId) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, MotionEvent::Finished { entry: id } if *id == entry))
            .count()
    }
}
