//! Subset construction algorithm for converting ε-NFA to DFA.

use crate::formlang::dfa::DFA;
use crate::formlang::epsilon_nfa::EpsilonNFA;
use crate::formlang::state::{StateId, StateSet};
use indexmap::IndexMap;
use log::debug;
use std::collections::VecDeque;

/// Convert an epsilon-NFA to a DFA using the powerset construction algorithm.
///
/// DFA states are numbered in discovery order, breadth first, walking the
/// alphabet in order. Symbols that lead nowhere get no transition: the
/// result may be partial.
///
/// # Panics
///
/// If the NFA does not have exactly one start state.
pub fn subset_construction(nfa: &EpsilonNFA) -> DFA {
    assert_eq!(
        nfa.start_states().len(),
        1,
        "subset construction needs exactly one start state, found {:?}",
        nfa.start_states()
    );

    let closures = nfa.epsilon_closures();

    // Each DFA state corresponds to a set of NFA states. Sets are keyed by
    // membership, so the same set found along two paths maps to one state.
    let mut state_mapping: IndexMap<StateSet, StateId> = IndexMap::new();
    let mut dfa = DFA::new();
    dfa.extend_alphabet(nfa.alphabet());

    // Queue of DFA states to expand, with the NFA states they stand for
    let mut worklist: VecDeque<(StateId, StateSet)> = VecDeque::new();

    let mut initial_set = StateSet::with_capacity(nfa.num_states() as usize);
    for start in nfa.start_states().iter() {
        initial_set.union_with(&closures[start as usize]);
    }
    let initial = new_dfa_state(nfa, &mut dfa, &initial_set, true);
    state_mapping.insert(initial_set.clone(), initial);
    worklist.push_back((initial, initial_set));

    while let Some((current, current_set)) = worklist.pop_front() {
        for symbol in nfa.alphabet() {
            let mut next_set = StateSet::with_capacity(nfa.num_states() as usize);
            for state in current_set.iter() {
                if let Some(targets) = nfa.targets(state, symbol) {
                    for target in targets.iter() {
                        next_set.union_with(&closures[target as usize]);
                    }
                }
            }

            if next_set.is_empty() {
                // No transition on this symbol; totalizing is minimization's job
                continue;
            }

            let next = match state_mapping.get(&next_set) {
                Some(&existing) => existing,
                None => {
                    let new_state = new_dfa_state(nfa, &mut dfa, &next_set, false);
                    state_mapping.insert(next_set.clone(), new_state);
                    worklist.push_back((new_state, next_set));
                    new_state
                }
            };

            dfa.add_transition(current, symbol, next);
        }
    }

    debug!(
        "subset construction: {} NFA states -> {} DFA states",
        nfa.num_states(),
        dfa.num_states()
    );

    dfa
}

/// Allocate the DFA state standing for `nfa_states`. It accepts when the set
/// meets the NFA's accepting states.
fn new_dfa_state(
    nfa: &EpsilonNFA,
    dfa: &mut DFA,
    nfa_states: &StateSet,
    is_start: bool,
) -> StateId {
    dfa.add_state(is_start, nfa_states.intersects(nfa.accept_states()))
}

impl EpsilonNFA {
    /// Shorthand for [`subset_construction`], for chaining pipeline stages.
    pub fn determinize(&self) -> DFA {
        subset_construction(self)
    }
}
