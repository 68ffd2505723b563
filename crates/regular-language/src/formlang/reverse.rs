//! DFA reversal.

use crate::formlang::dfa::DFA;
use crate::formlang::epsilon_nfa::EpsilonNFA;
use log::debug;

impl DFA {
    /// Build an NFA for the reverse language: every edge flipped, start and
    /// accept roles swapped.
    ///
    /// State `i` of the DFA becomes state `i` of the NFA. A fresh state,
    /// appended last, is the only start state and has an ε-edge to each old
    /// accept state, so the result can go straight back into
    /// [`subset_construction`](crate::formlang::subset_construction).
    pub fn reverse(&self) -> EpsilonNFA {
        let mut nfa = EpsilonNFA::new();
        nfa.extend_alphabet(self.alphabet());

        for state in self.states() {
            nfa.add_state(false, self.is_start(state));
        }
        for (source, symbol, destination) in self.transitions() {
            nfa.add_transition(destination, symbol, source);
        }

        let start = nfa.add_state(true, false);
        for accept in self.accept_states().iter() {
            nfa.add_epsilon_transition(start, accept);
        }

        debug!(
            "reversed DFA with {} states and {} accept states",
            self.num_states(),
            self.accept_states().len()
        );
        nfa
    }
}
