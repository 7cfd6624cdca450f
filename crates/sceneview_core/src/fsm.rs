//! Phase state machines
//!
//! Flat, table-driven state machines for gesture detector phases. States
//! and events are plain integers; a `(state, event)` pair maps to at most one
//! target state. Recent transitions are kept for debugging.

use rustc_hash::FxHashMap;
use tracing::trace;

/// Identifier for a state within a state machine
pub type StateId = u32;

/// Identifier for an event type
pub type EventId = u32;

const HISTORY_LIMIT: usize = 64;

/// One edge of the transition table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: StateId,
    pub event: EventId,
    pub to: StateId,
}

impl Transition {
    pub const fn new(from: StateId, event: EventId, to: StateId) -> Self {
        Self { from, event, to }
    }
}

/// Builder for creating state machines
#[derive(Debug)]
pub struct StateMachineBuilder {
    label: &'static str,
    initial_state: StateId,
    table: FxHashMap<(StateId, EventId), StateId>,
}

impl StateMachineBuilder {
    pub fn new(initial_state: StateId) -> Self {
        Self {
            label: "fsm",
            initial_state,
            table: FxHashMap::default(),
        }
    }

    /// Name used in trace output
    pub fn label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    /// Add an edge. The first edge registered for a `(from, event)` pair wins.
    pub fn on(mut self, from: StateId, event: EventId, to: StateId) -> Self {
        self.table.entry((from, event)).or_insert(to);
        self
    }

    /// Add the same event edge from several states
    pub fn on_any(self, from: &[StateId], event: EventId, to: StateId) -> Self {
        from.iter().fold(self, |builder, &state| builder.on(state, event, to))
    }

    pub fn build(self) -> StateMachine {
        StateMachine {
            label: self.label,
            initial_state: self.initial_state,
            current_state: self.initial_state,
            table: self.table,
            history: Vec::new(),
        }
    }
}

/// A state machine instance
#[derive(Debug, Clone)]
pub struct StateMachine {
    label: &'static str,
    initial_state: StateId,
    current_state: StateId,
    table: FxHashMap<(StateId, EventId), StateId>,
    /// Most recent transitions, oldest first
    history: Vec<Transition>,
}

impl StateMachine {
    /// Create a state machine from a list of edges
    pub fn new(initial_state: StateId, transitions: impl IntoIterator<Item = Transition>) -> Self {
        transitions
            .into_iter()
            .fold(StateMachineBuilder::new(initial_state), |builder, t| {
                builder.on(t.from, t.event, t.to)
            })
            .build()
    }

    pub fn builder(initial_state: StateId) -> StateMachineBuilder {
        StateMachineBuilder::new(initial_state)
    }

    pub fn current_state(&self) -> StateId {
        self.current_state
    }

    pub fn is_in(&self, state: StateId) -> bool {
        self.current_state == state
    }

    /// Transitions taken, oldest first, bounded to the most recent 64
    pub fn history(&self) -> &[Transition] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Jump back to the initial state. Not recorded in the history.
    pub fn reset(&mut self) {
        self.current_state = self.initial_state;
    }

    /// Whether `event` has an edge out of the current state
    pub fn can_send(&self, event: EventId) -> bool {
        self.table.contains_key(&(self.current_state, event))
    }

    /// Send an event, returning the new state if a transition fired
    pub fn send(&mut self, event: EventId) -> Option<StateId> {
        let from = self.current_state;
        let to = *self.table.get(&(from, event))?;
        self.current_state = to;
        trace!(fsm = self.label, from, event, to, "transition");

        if self.history.len() == HISTORY_LIMIT {
            self.history.remove(0);
        }
        self.history.push(Transition::new(from, event, to));
        Some(to)
    }
}
