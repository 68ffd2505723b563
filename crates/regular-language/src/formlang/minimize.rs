//! DFA minimization by partition refinement (Hopcroft's algorithm).
//!
//! Missing transitions are first routed to a single synthesized sink so the
//! refinement works on a total automaton. The sink is discarded again before
//! the minimal automaton is rebuilt.

use crate::formlang::dfa::DFA;
use crate::formlang::state::{StateId, StateSet};
use crate::formlang::symbol::Symbol;
use indexmap::IndexMap;
use log::{debug, trace};
use std::collections::VecDeque;

/// A group of states that no input distinguishes (so far).
type Block = Vec<StateId>;

impl DFA {
    /// Collapse the DFA to the minimal DFA for the same language.
    ///
    /// Unreachable states are discarded. The states of the result are
    /// numbered breadth first from the start state, so minimizing a minimal
    /// DFA gives back an equal value.
    pub fn minimize(mut self) -> DFA {
        let Some(start) = self.start_state() else {
            return DFA::with_alphabet(self.alphabet().clone());
        };

        let (reachable, sink) = self.totalize(start);

        let (accepting, rejecting): (Block, Block) = reachable
            .iter()
            .copied()
            .partition(|&state| self.is_accept(state));
        let blocks: Vec<Block> = [rejecting, accepting]
            .into_iter()
            .filter(|block| !block.is_empty())
            .collect();

        let mut blocks = self.refine(blocks);

        if let Some(sink) = sink {
            drop_sink(&mut blocks, sink);
        }

        let minimized = self.rebuild(&blocks, start, sink);
        debug!(
            "minimized DFA: {} reachable states -> {} states{}",
            reachable.len() - usize::from(sink.is_some()),
            minimized.num_states(),
            if sink.is_some() { " (sink synthesized)" } else { "" }
        );
        minimized
    }

    /// Give every reachable state a transition on every symbol, routing the
    /// missing ones to one lazily created sink.
    ///
    /// Returns the reachable states in breadth-first order (the sink
    /// included) and the sink, if one was needed.
    fn totalize(&mut self, start: StateId) -> (Vec<StateId>, Option<StateId>) {
        let symbols: Vec<Symbol> = self.alphabet().iter().collect();
        let mut sink: Option<StateId> = None;

        let mut visited = StateSet::with_capacity(self.num_states() as usize);
        let mut order = Vec::new();
        let mut queue = VecDeque::from([start]);
        visited.insert(start);

        while let Some(state) = queue.pop_front() {
            order.push(state);
            for &symbol in &symbols {
                let next = match self.transition(state, symbol) {
                    Some(next) => next,
                    None => {
                        let sink = *sink.get_or_insert_with(|| self.add_sink(&symbols));
                        self.add_transition(state, symbol, sink);
                        sink
                    }
                };
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        (order, sink)
    }

    /// A non-accepting state looping to itself on every symbol.
    fn add_sink(&mut self, symbols: &[Symbol]) -> StateId {
        let sink = self.add_state(false, false);
        for &symbol in symbols {
            self.add_transition(sink, symbol, sink);
        }
        trace!("synthesized sink state {sink}");
        sink
    }

    /// Split blocks until no block holds two states whose successors fall in
    /// different blocks.
    ///
    /// Hopcroft's worklist: each entry is a splitter block and a symbol. The
    /// states moving into the splitter on that symbol leave their block for a
    /// fresh one. A split only queues the smaller half for symbols whose
    /// splitter was not already pending, so every state is handled
    /// `O(log n)` times per symbol.
    fn refine(&self, mut blocks: Vec<Block>) -> Vec<Block> {
        let symbols: Vec<Symbol> = self.alphabet().iter().collect();
        let num_states = self.num_states() as usize;

        // Block of each state, and its index inside that block
        let mut block_of = vec![0; num_states];
        let mut slot = vec![0; num_states];
        for (index, block) in blocks.iter().enumerate() {
            for (position, &state) in block.iter().enumerate() {
                block_of[state as usize] = index;
                slot[state as usize] = position;
            }
        }

        // predecessors[s][t]: states moving to `t` on `symbols[s]`
        let mut predecessors: Vec<Vec<Vec<StateId>>> =
            vec![vec![Vec::new(); num_states]; symbols.len()];
        for (s, &symbol) in symbols.iter().enumerate() {
            for &state in blocks.iter().flatten() {
                if let Some(target) = self.transition(state, symbol) {
                    predecessors[s][target as usize].push(state);
                }
            }
        }

        let mut pending: VecDeque<(usize, usize)> = VecDeque::new();
        let mut queued: Vec<Vec<bool>> = vec![vec![true; symbols.len()]; blocks.len()];
        for index in 0..blocks.len() {
            pending.extend((0..symbols.len()).map(|s| (index, s)));
        }

        while let Some((splitter, s)) = pending.pop_front() {
            queued[splitter][s] = false;

            let mut movers: IndexMap<usize, Vec<StateId>> = IndexMap::new();
            for &target in &blocks[splitter] {
                for &source in &predecessors[s][target as usize] {
                    movers
                        .entry(block_of[source as usize])
                        .or_default()
                        .push(source);
                }
            }

            for (index, moving) in movers {
                if moving.len() == blocks[index].len() {
                    continue;
                }

                let fresh = blocks.len();
                for &state in &moving {
                    let at = slot[state as usize];
                    blocks[index].swap_remove(at);
                    if let Some(&displaced) = blocks[index].get(at) {
                        slot[displaced as usize] = at;
                    }
                }
                for (position, &state) in moving.iter().enumerate() {
                    block_of[state as usize] = fresh;
                    slot[state as usize] = position;
                }
                blocks.push(moving);
                queued.push(vec![false; symbols.len()]);

                let fresh_is_smaller = blocks[fresh].len() < blocks[index].len();
                for t in 0..symbols.len() {
                    let next = if queued[index][t] || fresh_is_smaller {
                        fresh
                    } else {
                        index
                    };
                    if !queued[next][t] {
                        queued[next][t] = true;
                        pending.push_back((next, t));
                    }
                }
                trace!(
                    "split block {index} on {:?}: {} blocks",
                    symbols[s],
                    blocks.len()
                );
            }
        }

        blocks
    }

    /// Build one state per block, numbered breadth first from the block of
    /// `start`. Transitions into `sink` are left out.
    fn rebuild(&self, blocks: &[Block], start: StateId, sink: Option<StateId>) -> DFA {
        let mut minimized = DFA::with_alphabet(self.alphabet().clone());
        let block_of = block_index(blocks, self.num_states());

        let mut block_transitions: Vec<IndexMap<Symbol, usize>> =
            vec![IndexMap::new(); blocks.len()];
        for (index, block) in blocks.iter().enumerate() {
            for &state in block {
                for symbol in self.alphabet() {
                    let Some(target) = self.transition(state, symbol) else {
                        continue;
                    };
                    if Some(target) == sink {
                        continue;
                    }
                    if let Some(target_block) = block_of[target as usize] {
                        block_transitions[index].insert(symbol, target_block);
                    }
                }
            }
        }

        let Some(start_block) = block_of[start as usize] else {
            return minimized;
        };

        // Breadth-first numbering; blocks the walk misses keep their order
        // at the end.
        let mut order: Vec<usize> = Vec::with_capacity(blocks.len());
        let mut seen = vec![false; blocks.len()];
        let mut queue = VecDeque::from([start_block]);
        seen[start_block] = true;
        while let Some(index) = queue.pop_front() {
            order.push(index);
            for symbol in self.alphabet() {
                if let Some(&target) = block_transitions[index].get(&symbol) {
                    if !seen[target] {
                        seen[target] = true;
                        queue.push_back(target);
                    }
                }
            }
        }
        order.extend((0..blocks.len()).filter(|&index| !seen[index]));

        let mut new_id = vec![0; blocks.len()];
        for &index in &order {
            let block = &blocks[index];
            new_id[index] = minimized.add_state(
                block.contains(&start),
                block.iter().any(|&state| self.is_accept(state)),
            );
        }

        for &index in &order {
            for symbol in self.alphabet() {
                if let Some(&target) = block_transitions[index].get(&symbol) {
                    minimized.add_transition(new_id[index], symbol, new_id[target]);
                }
            }
        }

        minimized
    }
}

/// Map every state to the index of its block.
fn block_index(blocks: &[Block], num_states: StateId) -> Vec<Option<usize>> {
    let mut block_of = vec![None; num_states as usize];
    for (index, block) in blocks.iter().enumerate() {
        for &state in block {
            block_of[state as usize] = Some(index);
        }
    }
    block_of
}

/// Dead states have no representative in the minimal DFA: a block holding
/// only the sink goes away, otherwise just the sink leaves its block.
fn drop_sink(blocks: &mut Vec<Block>, sink: StateId) {
    let Some(index) = blocks.iter().position(|block| block.contains(&sink)) else {
        return;
    };
    if blocks[index].len() == 1 {
        blocks.remove(index);
    } else {
        blocks[index].retain(|&state| state != sink);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 0 -a-> 1 -b-> 3(final), 0 -b-> 2 -b-> 4(final)
    fn redundant_dfa() -> DFA {
        let mut dfa = DFA::new();
        dfa.add_state(true, false);
        dfa.add_state(false, false);
        dfa.add_state(false, false);
        dfa.add_state(false, true);
        dfa.add_state(false, true);

        dfa.add_transition(0, 'a', 1);
        dfa.add_transition(0, 'b', 2);
        dfa.add_transition(1, 'b', 3);
        dfa.add_transition(2, 'b', 4);
        dfa
    }

    #[test]
    fn test_dfa_minimization() {
        let minimized = redundant_dfa().minimize();

        // 1 and 2 merge, as do 3 and 4.
        assert_eq!(minimized.num_states(), 3);
        assert_eq!(minimized.start_state(), Some(0));
        assert_eq!(minimized.transition(0, 'a'), Some(1));
        assert_eq!(minimized.transition(0, 'b'), Some(1));
        assert_eq!(minimized.transition(1, 'b'), Some(2));
        assert_eq!(minimized.transition(1, 'a'), None);
        assert_eq!(minimized.accept_states().to_vec(), vec![2]);
        for accepted in ["ab", "bb"] {
            assert!(minimized.accepts(accepted));
        }
        for rejected in ["", "a", "ba", "abb"] {
            assert!(!minimized.accepts(rejected));
        }
    }

    #[test]
    fn test_minimize_is_idempotent() {
        let once = redundant_dfa().minimize();
        let twice = once.clone().minimize();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unreachable_states_are_dropped() {
        let mut dfa = DFA::new();
        dfa.add_state(true, true);
        dfa.add_state(false, false);
        dfa.add_transition(0, 'a', 0);
        dfa.add_transition(1, 'a', 0);

        let minimized = dfa.minimize();
        assert_eq!(minimized.num_states(), 1);
        assert!(minimized.is_total());
    }

    #[test]
    fn test_sink_sharing_a_block_keeps_the_dead_state() {
        // 1 is a dead state; 0 has no transition on 'b'.
        let mut dfa = DFA::new();
        dfa.add_state(true, true);
        dfa.add_state(false, false);
        dfa.add_transition(0, 'a', 1);
        dfa.add_transition(1, 'a', 1);
        dfa.add_transition(1, 'b', 1);

        let minimized = dfa.minimize();

        // The sink joins the block of 1 and is removed from it; 1 survives.
        assert_eq!(minimized.num_states(), 2);
        assert_eq!(minimized.transition(0, 'a'), Some(1));
        assert_eq!(minimized.transition(0, 'b'), None);
        assert!(minimized.accepts(""));
        assert!(!minimized.accepts("a"));
        assert_eq!(minimized.clone().minimize(), minimized);
    }

    #[test]
    fn test_only_sink_block_is_removed() {
        // L = {a}: after totalizing, the sink stands alone.
        let mut dfa = DFA::new();
        dfa.add_state(true, false);
        dfa.add_state(false, true);
        dfa.add_transition(0, 'a', 1);
        dfa.extend_alphabet(&"b".chars().collect());

        let minimized = dfa.minimize();
        assert_eq!(minimized.num_states(), 2);
        assert_eq!(minimized.transitions().count(), 1);
        assert_eq!(minimized.alphabet().len(), 2);
    }

    #[test]
    fn test_empty_language_collapses_to_single_state() {
        let mut dfa = DFA::new();
        dfa.add_state(true, false);
        dfa.add_state(false, false);
        dfa.add_transition(0, 'a', 1);

        let minimized = dfa.minimize();
        assert_eq!(minimized.num_states(), 1);
        assert!(minimized.is_empty());
        assert!(minimized.accept_states().is_empty());
        assert_eq!(minimized.transition(0, 'a'), Some(0));
    }

    #[test]
    fn test_no_start_state() {
        let mut dfa = DFA::new();
        dfa.add_state(false, true);
        dfa.add_transition(0, 'z', 0);

        let minimized = dfa.minimize();
        assert_eq!(minimized.num_states(), 0);
        assert!(minimized.alphabet().contains('z'));
    }

    #[test]
    fn test_long_chain() {
        // (ab)^5000 over {a, b}: every prefix length is its own state.
        let mut dfa = DFA::new();
        let n = 10_000;
        for i in 0..=n {
            dfa.add_state(i == 0, i == n);
        }
        for i in 0..n {
            dfa.add_transition(i, if i % 2 == 0 { 'a' } else { 'b' }, i + 1);
        }

        let minimized = dfa.clone().minimize();
        assert_eq!(minimized, dfa);
        assert!(minimized.accepts(&"ab".repeat(5_000)));
    }

    #[test]
    fn test_splits_are_order_independent() {
        // Two interleaved copies of the same chain collapse into one.
        let mut dfa = DFA::new();
        dfa.add_state(true, false);
        for _ in 0..6 {
            dfa.add_state(false, false);
        }
        dfa.add_accept_state(5);
        dfa.add_accept_state(6);
        dfa.add_transition(0, 'a', 1);
        dfa.add_transition(0, 'b', 2);
        dfa.add_transition(1, 'a', 3);
        dfa.add_transition(2, 'a', 4);
        dfa.add_transition(3, 'b', 5);
        dfa.add_transition(4, 'b', 6);
        dfa.add_transition(5, 'a', 3);
        dfa.add_transition(6, 'a', 4);

        let minimized = dfa.minimize();
        assert_eq!(minimized.num_states(), 4);
        assert!(minimized.accepts("aab"));
        assert!(minimized.accepts("babab"));
        assert!(!minimized.accepts("aa"));
    }

    #[test]
    fn test_refinement_needs_several_rounds() {
        // A chain where only the last state accepts: a^3 over {a}.
        let mut dfa = DFA::new();
        for i in 0..4 {
            dfa.add_state(i == 0, i == 3);
        }
        for i in 0..3 {
            dfa.add_transition(i, 'a', i + 1);
        }

        let minimized = dfa.minimize();
        assert_eq!(minimized.num_states(), 4);
        assert!(minimized.accepts("aaa"));
        assert!(!minimized.accepts("aa"));
        assert!(!minimized.accepts("aaaa"));
    }
}
