//! Finite automata over character alphabets.
//!
//! This module provides the pieces of the pattern pipeline:
//! - Thompson construction of epsilon-NFAs, driven by a regex parser
//! - Subset construction (NFA to DFA conversion)
//! - Hopcroft's DFA minimization
//! - DFA reversal, which composes with the above into Brzozowski's algorithm

mod dfa;
mod epsilon_nfa;
mod minimize;
pub mod regex;
mod reverse;
mod state;
mod subset_construction;
mod symbol;
mod thompson;

#[cfg(test)]
mod properties;

pub use dfa::DFA;
pub use epsilon_nfa::EpsilonNFA;
pub use regex::{RegexParser, parse};
pub use state::{StateId, StateSet};
pub use subset_construction::subset_construction;
pub use symbol::{Alphabet, GraphEdge, Label, Symbol};
