//! Thompson construction primitives.
//!
//! Every fragment built here exposes exactly one start state and one
//! accepting state, so the combinators can be nested freely. `concat`
//! extends its receiver in place; `union` and `closure` build a fresh
//! automaton around copies of their operands and return it by value.

use crate::formlang::epsilon_nfa::EpsilonNFA;
use crate::formlang::state::{StateId, StateSet};
use crate::formlang::symbol::Symbol;

impl EpsilonNFA {
    /// Two states, start --ε--> accept. Recognizes the empty string.
    pub fn epsilon_basis() -> Self {
        let mut nfa = Self::new();
        let start = nfa.add_state(true, false);
        let accept = nfa.add_state(false, true);
        nfa.add_epsilon_transition(start, accept);
        nfa
    }

    /// Two states, start --symbol--> accept. Recognizes the one-symbol string.
    pub fn symbol_basis(symbol: Symbol) -> Self {
        let mut nfa = Self::new();
        let start = nfa.add_state(true, false);
        let accept = nfa.add_state(false, true);
        nfa.add_transition(start, symbol, accept);
        nfa
    }

    /// Copy every state of `other` into `self` under fresh handles, keeping
    /// its internal edges. Start and accept markings are not copied.
    ///
    /// Returns the old -> new handle mapping, indexed by `other`'s handles.
    pub fn merge(&mut self, other: &EpsilonNFA) -> Vec<StateId> {
        self.merge_except(other, &StateSet::new())
            .into_iter()
            .flatten()
            .collect()
    }

    /// [`merge`](Self::merge), leaving out the states in `skip` and the edges
    /// leaving them. No edge of `other` may enter a skipped state.
    fn merge_except(&mut self, other: &EpsilonNFA, skip: &StateSet) -> Vec<Option<StateId>> {
        // Alphabet first, so symbols keep other's first-appearance order.
        self.extend_alphabet(other.alphabet());

        let mapping: Vec<Option<StateId>> = other
            .states()
            .map(|state| (!skip.contains(state)).then(|| self.add_state(false, false)))
            .collect();

        for source in other.states() {
            let Some(new_source) = mapping[source as usize] else {
                continue;
            };
            for target in other.epsilon_targets(source).into_iter().flat_map(StateSet::iter) {
                if let Some(new_target) = mapping[target as usize] {
                    self.add_epsilon_transition(new_source, new_target);
                }
            }
            for (&symbol, targets) in other.symbol_row(source) {
                for new_target in targets.iter().filter_map(|t| mapping[t as usize]) {
                    self.add_transition(new_source, symbol, new_target);
                }
            }
        }

        mapping
    }

    /// Concatenation: `L(self)·L(other)`.
    ///
    /// The edges leaving `other`'s start state are copied onto every accepting
    /// state of `self` and `other`'s accepting states become the accepting
    /// states. `other`'s start is not copied over unless it accepts or is
    /// re-entered. Only `other` is copied, so folding a long sequence from the
    /// left stays linear.
    pub fn concat(mut self, other: EpsilonNFA) -> Self {
        let redundant: StateSet = other
            .start_states()
            .iter()
            .filter(|&start| !other.is_accept(start) && !other.has_incoming(start))
            .collect();
        let accepts = self.accept_states().to_vec();
        let mapping = self.merge_except(&other, &redundant);

        for start in other.start_states().iter() {
            let epsilon_targets = other
                .epsilon_targets(start)
                .into_iter()
                .flat_map(StateSet::iter);
            for new_target in epsilon_targets.filter_map(|t| mapping[t as usize]) {
                for &accept in &accepts {
                    self.add_epsilon_transition(accept, new_target);
                }
            }
            for (&symbol, targets) in other.symbol_row(start) {
                for new_target in targets.iter().filter_map(|t| mapping[t as usize]) {
                    for &accept in &accepts {
                        self.add_transition(accept, symbol, new_target);
                    }
                }
            }
        }

        let mut new_accepts: StateSet = other
            .accept_states()
            .iter()
            .filter_map(|state| mapping[state as usize])
            .collect();
        if other.start_states().intersects(other.accept_states()) {
            new_accepts.union_with(self.accept_states());
        }
        self.set_accept_states(new_accepts);

        self
    }

    /// Union: `L(self) ∪ L(other)`.
    pub fn union(self, other: EpsilonNFA) -> Self {
        Self::union_of([self, other])
    }

    /// Union of any number of operands: a fresh start state with an ε-edge to
    /// each operand's start, and an ε-edge from each operand's accepting
    /// states to a fresh accepting state. No operands gives the empty
    /// language.
    pub fn union_of(operands: impl IntoIterator<Item = EpsilonNFA>) -> Self {
        let mut nfa = Self::new();
        let start = nfa.add_state(true, false);
        let merged: Vec<(EpsilonNFA, Vec<StateId>)> = operands
            .into_iter()
            .map(|operand| {
                let mapping = nfa.merge(&operand);
                (operand, mapping)
            })
            .collect();
        let accept = nfa.add_state(false, true);

        for (operand, mapping) in &merged {
            for state in operand.start_states().iter() {
                nfa.add_epsilon_transition(start, mapping[state as usize]);
            }
            for state in operand.accept_states().iter() {
                nfa.add_epsilon_transition(mapping[state as usize], accept);
            }
        }

        nfa
    }

    /// Kleene closure: `L(self)*`.
    pub fn closure(self) -> Self {
        let mut nfa = Self::new();
        let start = nfa.add_state(true, false);
        let mapping = nfa.merge(&self);
        let accept = nfa.add_state(false, true);

        nfa.add_epsilon_transition(start, accept);
        for state in self.start_states().iter() {
            nfa.add_epsilon_transition(start, mapping[state as usize]);
        }
        for old_accept in self.accept_states().iter() {
            nfa.add_epsilon_transition(mapping[old_accept as usize], accept);
            for old_start in self.start_states().iter() {
                nfa.add_epsilon_transition(
                    mapping[old_accept as usize],
                    mapping[old_start as usize],
                );
            }
        }

        nfa
    }
}
