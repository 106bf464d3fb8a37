//! Small finite-state-machine helper shared by lifecycle-driven types.
//!
//! A lifecycle is an enum implementing [`FsmState`]; the owner holds an
//! [`Fsm`] and calls [`Fsm::transition`] for every change. The returned
//! [`Edge`] tells the owner which on-enter/on-exit work to run, so the owner
//! never keeps parallel boolean flags next to the state.

use serde::{Deserialize, Serialize};

use crate::error::TransitionError;

/// A closed set of lifecycle states with an allowed-edges relation.
pub trait FsmState: Copy + Eq + std::fmt::Debug {
    /// Whether `self -> to` is a legal edge.
    fn allows(self, to: Self) -> bool;

    fn name(self) -> &'static str;
}

/// One transition that actually happened.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Edge<S> {
    pub from: S,
    pub to: S,
}

#[derive(Clone, Debug)]
pub struct Fsm<S: FsmState> {
    current: S,
}

impl<S: FsmState> Fsm<S> {
    pub fn new(initial: S) -> Self {
        Self { current: initial }
    }

    #[inline]
    pub fn current(&self) -> S {
        self.current
    }

    #[inline]
    pub fn is(&self, state: S) -> bool {
        self.current == state
    }

    /// Move to `to`, returning the edge taken.
    pub fn transition(&mut self, to: S) -> Result<Edge<S>, TransitionError> {
        let from = self.current;
        if !from.allows(to) {
            return Err(TransitionError {
                from: from.name(),
                to: to.name(),
            });
        }
        self.current = to;
        Ok(Edge { from, to })
    }
}

/// Lifecycle of a motion queue entry. `End` is terminal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryState {
    /// Queued; not yet bound to the clock.
    Init,
    /// Evaluated every tick.
    Active,
    /// Finished or stopped; waiting to be pruned.
    End,
}

impl FsmState for EntryState {
    fn allows(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Init, Self::Active) | (Self::Init, Self::End) | (Self::Active, Self::End)
        )
    }

    fn name(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Active => "active",
            Self::End => "end",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_lifecycle_edges() {
        let mut fsm = Fsm::new(EntryState::Init);
        let edge = fsm.transition(EntryState::Active).unwrap();
        assert_eq!(edge.from, EntryState::Init);
        assert_eq!(edge.to, EntryState::Active);
        assert!(fsm.transition(EntryState::Init).is_err());
        fsm.transition(EntryState::End).unwrap();
        assert!(fsm.is(EntryState::End));
    }

    #[test]
    fn end_is_terminal() {
        let mut fsm = Fsm::new(EntryState::End);
        let err = fsm.transition(EntryState::Active).unwrap_err();
        assert_eq!(err.from, "end");
        assert_eq!(err.to, "active");
        assert!(fsm.transition(EntryState::End).is_err());
        assert_eq!(fsm.current(), EntryState::End);
    }
}
