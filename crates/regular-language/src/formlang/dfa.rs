//! Deterministic Finite Automaton (DFA) implementation.

use crate::formlang::state::{StateId, StateSet};
use crate::formlang::symbol::{Alphabet, GraphEdge, Label, Symbol, coalesce_edges};
use indexmap::IndexMap;
use std::collections::VecDeque;
use std::ops::Range;

/// A Deterministic Finite Automaton.
///
/// The transition function may be partial: a missing entry means the input
/// is rejected. Minimization is the only place that totalizes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DFA {
    /// Start states. Exactly one for any DFA built by this crate, a set
    /// to match the NFA side.
    start_states: StateSet,
    /// Final (accepting) states
    accept_states: StateSet,
    /// Row per state: symbol -> destination
    transitions: Vec<IndexMap<Symbol, StateId>>,
    /// All symbols the automaton reads
    alphabet: Alphabet,
}

impl DFA {
    /// Create a new empty DFA.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty DFA over `alphabet`.
    pub fn with_alphabet(alphabet: Alphabet) -> Self {
        Self {
            alphabet,
            ..Self::default()
        }
    }

    /// Add a new state and return its ID.
    pub fn add_state(&mut self, is_start: bool, is_accept: bool) -> StateId {
        let id = self.num_states();
        self.transitions.push(IndexMap::new());
        if is_start {
            self.start_states.insert(id);
        }
        if is_accept {
            self.accept_states.insert(id);
        }
        id
    }

    fn assert_state(&self, state: StateId) {
        assert!(
            state < self.num_states(),
            "state {state} is not part of this DFA ({} states)",
            self.num_states()
        );
    }

    /// Add a final (accepting) state.
    pub fn add_accept_state(&mut self, state: StateId) {
        self.assert_state(state);
        self.accept_states.insert(state);
    }

    /// Set the transition of `source` on `symbol`, replacing any previous one.
    pub fn add_transition(&mut self, source: StateId, symbol: Symbol, destination: StateId) {
        self.assert_state(source);
        self.assert_state(destination);

        self.alphabet.insert(symbol);
        self.transitions[source as usize].insert(symbol, destination);
    }

    /// Add symbols to the alphabet without adding any transition on them.
    pub fn extend_alphabet(&mut self, alphabet: &Alphabet) {
        self.alphabet.union_with(alphabet);
    }

    /// Get the transition from a state on a symbol.
    pub fn transition(&self, source: StateId, symbol: Symbol) -> Option<StateId> {
        self.transitions.get(source as usize)?.get(&symbol).copied()
    }

    /// Get the number of states.
    pub fn num_states(&self) -> StateId {
        self.transitions.len() as StateId
    }

    /// All state handles.
    pub fn states(&self) -> Range<StateId> {
        0..self.num_states()
    }

    /// Get the start state.
    pub fn start_state(&self) -> Option<StateId> {
        self.start_states.first()
    }

    /// Get the start states as a set, mirroring [`EpsilonNFA::start_states`].
    ///
    /// [`EpsilonNFA::start_states`]: crate::formlang::EpsilonNFA::start_states
    pub fn start_states(&self) -> &StateSet {
        &self.start_states
    }

    /// Get the final states.
    pub fn accept_states(&self) -> &StateSet {
        &self.accept_states
    }

    /// Check if a state is the start state.
    pub fn is_start(&self, state: StateId) -> bool {
        self.start_states.contains(state)
    }

    /// Check if a state is a final state.
    pub fn is_accept(&self, state: StateId) -> bool {
        self.accept_states.contains(state)
    }

    /// Get the alphabet.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Whether every state has a transition on every symbol.
    pub fn is_total(&self) -> bool {
        self.transitions
            .iter()
            .all(|row| self.alphabet.iter().all(|symbol| row.contains_key(&symbol)))
    }

    /// Run the automaton on `input`.
    pub fn accepts(&self, input: &str) -> bool {
        let Some(mut state) = self.start_state() else {
            return false;
        };
        for symbol in input.chars() {
            match self.transition(state, symbol) {
                Some(next) => state = next,
                None => return false,
            }
        }
        self.accept_states.contains(state)
    }

    /// Check if the DFA is empty (accepts no strings).
    pub fn is_empty(&self) -> bool {
        !self
            .find_reachable_states()
            .intersects(&self.accept_states)
    }

    /// Find all states reachable from the start state.
    pub fn find_reachable_states(&self) -> StateSet {
        let mut reachable = StateSet::with_capacity(self.num_states() as usize);

        let Some(start) = self.start_state() else {
            return reachable;
        };

        let mut queue = VecDeque::new();
        queue.push_back(start);

        while let Some(state) = queue.pop_front() {
            if !reachable.insert(state) {
                continue;
            }

            for symbol in &self.alphabet {
                if let Some(next) = self.transition(state, symbol) {
                    if !reachable.contains(next) {
                        queue.push_back(next);
                    }
                }
            }
        }

        reachable
    }

    /// Get all transitions as an iterator.
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, Symbol, StateId)> + '_ {
        self.transitions.iter().enumerate().flat_map(|(src, row)| {
            row.iter()
                .map(move |(&symbol, &dst)| (src as StateId, symbol, dst))
        })
    }

    /// Convert to a graph representation (edges with labels).
    /// Returns: (nodes, edges) where edges are (src, dst, label)
    pub fn to_graph(&self) -> (Vec<StateId>, Vec<GraphEdge>) {
        let edges = self
            .transitions()
            .map(|(src, symbol, dst)| (src, Label::Symbol(symbol), dst));
        (self.states().collect(), coalesce_edges(edges))
    }
}
