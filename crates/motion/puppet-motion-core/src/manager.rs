//! Motion queue and priority-gated manager.
//!
//! [`MotionQueueManager`] owns the entries and the clock:
//! - `start_motion` prunes ended entries, asks every live entry to fade out and
//!   appends the new one;
//! - `update` advances the clock and runs every entry in insertion order, so an
//!   entry blends on top of whatever earlier entries wrote this tick;
//! - ended entries stay in place until the next start or `prune_finished`.
//!
//! [`MotionManager`] adds reservation/priority admission on top.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::fsm::EntryState;
use crate::ids::{EntryId, IdAllocator};
use crate::model::Model;
use crate::outputs::{MotionEvent, Outputs};
use crate::queue::{Motion, MotionQueueEntry};

pub struct MotionQueueManager {
    cfg: Config,
    ids: IdAllocator,
    entries: Vec<MotionQueueEntry>,
    total_seconds: f32,
    last_total_seconds: f32,
    events: Vec<MotionEvent>,
    outputs: Outputs,
}

impl MotionQueueManager {
    pub fn new(cfg: Config) -> Self {
        Self {
            entries: Vec::with_capacity(cfg.entry_capacity),
            events: Vec::new(),
            cfg,
            ids: IdAllocator::new(),
            total_seconds: 0.0,
            last_total_seconds: 0.0,
            outputs: Outputs::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Queue `motion`, fading out everything already playing.
    pub fn start_motion(&mut self, motion: Motion) -> EntryId {
        self.prune_finished();
        let total = self.total_seconds;
        for entry in &mut self.entries {
            entry.start_fade_out(entry.motion().fade_out_seconds(), total);
        }
        let id = self.ids.alloc_entry();
        debug!("queue: start entry {:?} at t={total}", id);
        self.entries.push(MotionQueueEntry::new(id, motion));
        id
    }

    /// Advance the clock by `dt` seconds and apply every entry to `model`.
    pub fn update(&mut self, model: &mut dyn Model, dt: f32) -> &Outputs {
        self.outputs.clear();
        self.last_total_seconds = self.total_seconds;
        self.total_seconds += dt;
        let total = self.total_seconds;
        let behavior = self.cfg.behavior;

        self.events.clear();
        for entry in &mut self.entries {
            match entry.state() {
                EntryState::Init => entry.begin(total, &mut self.events),
                EntryState::Active => {
                    entry.update(model, total, behavior, &mut self.events);
                    self.outputs.updated = true;
                    if entry.is_finished() {
                        debug!("queue: entry {:?} ended at t={total}", entry.id());
                    }
                }
                EntryState::End => {}
            }
        }

        // Lifecycle events always pass; the cap only bounds user data.
        let max = self.cfg.max_events_per_tick;
        let mut user_data = 0usize;
        let mut dropped = 0usize;
        for event in self.events.drain(..) {
            if matches!(event, MotionEvent::UserData { .. }) {
                user_data += 1;
                if user_data > max {
                    dropped += 1;
                    continue;
                }
            }
            self.outputs.push_event(event);
        }
        if dropped > 0 {
            warn!("queue: dropped {dropped} user data events above the per-tick cap of {max}");
        }
        &self.outputs
    }

    /// True when no entry is waiting or playing.
    pub fn is_finished(&self) -> bool {
        self.entries.iter().all(MotionQueueEntry::is_finished)
    }

    /// True for ended entries and for ids no longer (or never) in the queue.
    pub fn is_entry_finished(&self, id: EntryId) -> bool {
        self.entry(id).map_or(true, MotionQueueEntry::is_finished)
    }

    /// Fade out every live entry with its own fade-out time.
    pub fn stop_all_motions(&mut self) {
        let total = self.total_seconds;
        for entry in &mut self.entries {
            entry.start_fade_out(entry.motion().fade_out_seconds(), total);
        }
    }

    /// Fade out one entry over `fade_out_seconds`. Returns false for unknown ids.
    pub fn fade_out_entry(&mut self, id: EntryId, fade_out_seconds: f32) -> bool {
        let total = self.total_seconds;
        match self.entries.iter_mut().find(|e| e.id() == id) {
            Some(entry) => {
                entry.start_fade_out(fade_out_seconds, total);
                true
            }
            None => false,
        }
    }

    /// Drop ended entries.
    pub fn prune_finished(&mut self) {
        self.entries.retain(|e| !e.is_finished());
    }

    #[inline]
    pub fn entries(&self) -> &[MotionQueueEntry] {
        &self.entries
    }

    pub fn entry(&self, id: EntryId) -> Option<&MotionQueueEntry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    #[inline]
    pub fn total_seconds(&self) -> f32 {
        self.total_seconds
    }

    #[inline]
    pub fn last_total_seconds(&self) -> f32 {
        self.last_total_seconds
    }

    /// Events of the most recent tick.
    #[inline]
    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }
}

impl Default for MotionQueueManager {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Admission priority. Higher wins; [`Priority::FORCE`] and above always win.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Priority(pub i32);

impl Priority {
    pub const NONE: Priority = Priority(0);
    pub const IDLE: Priority = Priority(1);
    pub const NORMAL: Priority = Priority(2);
    pub const FORCE: Priority = Priority(3);
}

#[derive(Default)]
pub struct MotionManager {
    queue: MotionQueueManager,
    reserved_priority: Priority,
    current_priority: Priority,
}

impl MotionManager {
    pub fn new(cfg: Config) -> Self {
        Self {
            queue: MotionQueueManager::new(cfg),
            reserved_priority: Priority::NONE,
            current_priority: Priority::NONE,
        }
    }

    /// Claim the next start slot at `priority`.
    pub fn reserve_motion(&mut self, priority: Priority) -> bool {
        if priority >= Priority::FORCE {
            self.reserved_priority = priority;
            return true;
        }
        if priority > self.reserved_priority && priority > self.current_priority {
            self.reserved_priority = priority;
            return true;
        }
        debug!(
            "manager: reservation at {:?} rejected (reserved {:?}, current {:?})",
            priority, self.reserved_priority, self.current_priority
        );
        false
    }

    /// Start `motion` as the playing priority, consuming a matching reservation.
    pub fn start_motion_priority(&mut self, motion: Motion, priority: Priority) -> EntryId {
        if priority == self.reserved_priority {
            self.reserved_priority = Priority::NONE;
        }
        self.current_priority = priority;
        self.queue.start_motion(motion)
    }

    /// Reserve then start; `None` when `priority` does not win admission.
    pub fn try_start_motion(&mut self, motion: Motion, priority: Priority) -> Option<EntryId> {
        if !self.reserve_motion(priority) {
            return None;
        }
        Some(self.start_motion_priority(motion, priority))
    }

    /// Advance and apply the queue; resets the playing priority once everything ended.
    pub fn update(&mut self, model: &mut dyn Model, dt: f32) -> &Outputs {
        self.queue.update(model, dt);
        if self.queue.is_finished() {
            self.current_priority = Priority::NONE;
        }
        self.queue.outputs()
    }

    #[inline]
    pub fn reserved_priority(&self) -> Priority {
        self.reserved_priority
    }

    #[inline]
    pub fn current_priority(&self) -> Priority {
        self.current_priority
    }

    pub fn set_reserved_priority(&mut self, priority: Priority) {
        self.reserved_priority = priority;
    }

    #[inline]
    pub fn queue(&self) -> &MotionQueueManager {
        &self.queue
    }

    #[inline]
    pub fn queue_mut(&mut self) -> &mut MotionQueueManager {
        &mut self.queue
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.queue.is_finished()
    }

    pub fn stop_all_motions(&mut self) {
        self.queue.stop_all_motions();
    }
}
