//! Epsilon Non-deterministic Finite Automaton (ε-NFA) implementation.

use crate::formlang::state::{StateId, StateSet};
use crate::formlang::symbol::{Alphabet, GraphEdge, Label, Symbol, coalesce_edges};
use indexmap::IndexMap;
use std::collections::VecDeque;
use std::mem;
use std::ops::Range;

/// An Epsilon Non-deterministic Finite Automaton.
///
/// States are the dense handles `0..num_states()`. All structure lives in
/// per-state rows indexed by handle, so cycles are plain data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpsilonNFA {
    /// Start states
    start_states: StateSet,
    /// Accepting states
    accept_states: StateSet,
    /// Row per state: symbol -> set of destination states
    transitions: Vec<IndexMap<Symbol, StateSet>>,
    /// Row per state: destinations reachable without reading input
    epsilon_transitions: Vec<StateSet>,
    /// All symbols used (excluding epsilon)
    alphabet: Alphabet,
}

impl EpsilonNFA {
    /// Create a new empty epsilon-NFA.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next dense handle, optionally marking it as a start
    /// and/or accepting state.
    pub fn add_state(&mut self, is_start: bool, is_accept: bool) -> StateId {
        let id = self.num_states();
        self.transitions.push(IndexMap::new());
        self.epsilon_transitions.push(StateSet::new());
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
            "state {state} is not part of this NFA ({} states)",
            self.num_states()
        );
    }

    /// Add a transition from source to destination on the given symbol.
    /// Several destinations for the same symbol accumulate.
    pub fn add_transition(&mut self, source: StateId, symbol: Symbol, destination: StateId) {
        self.assert_state(source);
        self.assert_state(destination);

        self.alphabet.insert(symbol);
        self.transitions[source as usize]
            .entry(symbol)
            .or_default()
            .insert(destination);
    }

    /// Add an epsilon transition from source to destination.
    pub fn add_epsilon_transition(&mut self, source: StateId, destination: StateId) {
        self.assert_state(source);
        self.assert_state(destination);

        self.epsilon_transitions[source as usize].insert(destination);
    }

    /// Mark an existing state as a start state.
    pub fn add_start_state(&mut self, state: StateId) {
        self.assert_state(state);
        self.start_states.insert(state);
    }

    /// Mark an existing state as accepting.
    pub fn add_accept_state(&mut self, state: StateId) {
        self.assert_state(state);
        self.accept_states.insert(state);
    }

    pub(crate) fn set_accept_states(&mut self, accept_states: StateSet) {
        self.accept_states = accept_states;
    }

    /// Add symbols to the alphabet without adding any transition on them.
    pub fn extend_alphabet(&mut self, alphabet: &Alphabet) {
        self.alphabet.union_with(alphabet);
    }

    /// Delete a state and shift every larger handle down by one.
    ///
    /// The shift is applied to the start set, the accept set and both
    /// transition tables in a single pass, and edges into the removed state
    /// disappear with it.
    pub fn remove_state(&mut self, state: StateId) {
        self.assert_state(state);

        let mapping: Vec<Option<StateId>> = self
            .states()
            .map(|s| match s.cmp(&state) {
                std::cmp::Ordering::Less => Some(s),
                std::cmp::Ordering::Equal => None,
                std::cmp::Ordering::Greater => Some(s - 1),
            })
            .collect();
        self.remap(&mapping);
    }

    /// Rewrite every table through an old -> new handle mapping. States that
    /// map to `None` are dropped. The surviving new handles must be exactly
    /// `0..k`.
    fn remap(&mut self, mapping: &[Option<StateId>]) {
        debug_assert_eq!(mapping.len(), self.transitions.len());

        let len = mapping.iter().flatten().count();
        let mut transitions: Vec<IndexMap<Symbol, StateSet>> = vec![IndexMap::new(); len];
        let mut epsilon_transitions = vec![StateSet::new(); len];

        let old_transitions = mem::take(&mut self.transitions);
        let old_epsilon = mem::take(&mut self.epsilon_transitions);
        for (old, (row, epsilon)) in old_transitions.into_iter().zip(old_epsilon).enumerate() {
            let Some(new) = mapping[old] else {
                continue;
            };
            transitions[new as usize] = row
                .into_iter()
                .map(|(symbol, targets)| (symbol, targets.remap(mapping)))
                .filter(|(_, targets)| !targets.is_empty())
                .collect();
            epsilon_transitions[new as usize] = epsilon.remap(mapping);
        }

        self.transitions = transitions;
        self.epsilon_transitions = epsilon_transitions;
        self.start_states = self.start_states.remap(mapping);
        self.accept_states = self.accept_states.remap(mapping);
    }

    /// Get the number of states.
    pub fn num_states(&self) -> StateId {
        self.transitions.len() as StateId
    }

    /// All state handles.
    pub fn states(&self) -> Range<StateId> {
        0..self.num_states()
    }

    /// Get the start states.
    pub fn start_states(&self) -> &StateSet {
        &self.start_states
    }

    /// Get the accepting states.
    pub fn accept_states(&self) -> &StateSet {
        &self.accept_states
    }

    /// Check if a state is a start state.
    pub fn is_start(&self, state: StateId) -> bool {
        self.start_states.contains(state)
    }

    /// Check if a state is accepting.
    pub fn is_accept(&self, state: StateId) -> bool {
        self.accept_states.contains(state)
    }

    /// Get the alphabet (all symbols except epsilon).
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Destinations of `state` on `symbol`, if any.
    pub fn targets(&self, state: StateId, symbol: Symbol) -> Option<&StateSet> {
        self.transitions.get(state as usize)?.get(&symbol)
    }

    /// Destinations of the epsilon moves leaving `state`, if it exists.
    pub fn epsilon_targets(&self, state: StateId) -> Option<&StateSet> {
        self.epsilon_transitions.get(state as usize)
    }

    /// The symbol row of `state`, in insertion order.
    pub(crate) fn symbol_row(&self, state: StateId) -> &IndexMap<Symbol, StateSet> {
        &self.transitions[state as usize]
    }

    /// Whether any edge, epsilon or not, ends in `state`.
    pub(crate) fn has_incoming(&self, state: StateId) -> bool {
        self.epsilon_transitions.iter().any(|targets| targets.contains(state))
            || self
                .transitions
                .iter()
                .flat_map(|row| row.values())
                .any(|targets| targets.contains(state))
    }

    /// Compute the epsilon closure of a single state using DFS.
    fn epsilon_closure_single(&self, state: StateId) -> StateSet {
        let mut closure = StateSet::with_capacity(self.num_states() as usize);
        let mut stack = vec![state];

        while let Some(s) = stack.pop() {
            if !closure.insert(s) {
                continue;
            }
            for dest in self.epsilon_transitions[s as usize].iter() {
                if !closure.contains(dest) {
                    stack.push(dest);
                }
            }
        }

        closure
    }

    /// The epsilon closure of every state, indexed by handle. Each closure
    /// contains its own state.
    pub fn epsilon_closures(&self) -> Vec<StateSet> {
        self.states()
            .map(|state| self.epsilon_closure_single(state))
            .collect()
    }

    /// Get the epsilon closure of a set of states.
    pub fn epsilon_closure(&self, states: &StateSet) -> StateSet {
        let mut closure = StateSet::with_capacity(self.num_states() as usize);
        let mut stack: Vec<StateId> = states.iter().collect();

        while let Some(s) = stack.pop() {
            if !closure.insert(s) {
                continue;
            }
            for dest in self.epsilon_transitions[s as usize].iter() {
                if !closure.contains(dest) {
                    stack.push(dest);
                }
            }
        }

        closure
    }

    /// Get the states reachable from a set of states on a given symbol.
    /// Returns the epsilon closure of the reached states.
    pub fn move_on_symbol(&self, states: &StateSet, symbol: Symbol) -> StateSet {
        let mut reached = StateSet::with_capacity(self.num_states() as usize);

        for state in states.iter() {
            if let Some(destinations) = self.targets(state, symbol) {
                reached.union_with(destinations);
            }
        }

        self.epsilon_closure(&reached)
    }

    /// Simulate the automaton on `input`.
    pub fn accepts(&self, input: &str) -> bool {
        let mut current = self.epsilon_closure(&self.start_states);
        for symbol in input.chars() {
            if current.is_empty() {
                return false;
            }
            current = self.move_on_symbol(&current, symbol);
        }
        current.intersects(&self.accept_states)
    }

    /// Check if the NFA accepts no string at all.
    /// Uses BFS from start states following all transitions.
    pub fn is_empty(&self) -> bool {
        let mut visited = StateSet::with_capacity(self.num_states() as usize);
        let mut queue: VecDeque<StateId> = self.start_states.iter().collect();

        while let Some(state) = queue.pop_front() {
            if !visited.insert(state) {
                continue;
            }
            if self.accept_states.contains(state) {
                return false;
            }

            let successors = self.epsilon_transitions[state as usize]
                .iter()
                .chain(self.transitions[state as usize].values().flat_map(StateSet::iter));
            for dest in successors {
                if !visited.contains(dest) {
                    queue.push_back(dest);
                }
            }
        }

        true
    }

    /// All symbol transitions as `(source, symbol, destination)` triples.
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, Symbol, StateId)> + '_ {
        self.transitions.iter().enumerate().flat_map(|(src, row)| {
            row.iter().flat_map(move |(&symbol, dests)| {
                dests.iter().map(move |dst| (src as StateId, symbol, dst))
            })
        })
    }

    /// All epsilon transitions as `(source, destination)` pairs.
    pub fn epsilon_transitions(&self) -> impl Iterator<Item = (StateId, StateId)> + '_ {
        self.epsilon_transitions
            .iter()
            .enumerate()
            .flat_map(|(src, dests)| dests.iter().map(move |dst| (src as StateId, dst)))
    }

    /// Convert to a graph representation for diagram export.
    /// Returns `(nodes, edges)`; parallel edges share one comma-joined label.
    pub fn to_graph(&self) -> (Vec<StateId>, Vec<GraphEdge>) {
        let edges = self.states().flat_map(|src| {
            let epsilon = self.epsilon_transitions[src as usize]
                .iter()
                .map(move |dst| (src, Label::Epsilon, dst));
            let symbols = self.transitions[src as usize]
                .iter()
                .flat_map(move |(&symbol, dests)| {
                    dests.iter().map(move |dst| (src, Label::Symbol(symbol), dst))
                });
            epsilon.chain(symbols)
        });

        (self.states().collect(), coalesce_edges(edges))
    }
}
