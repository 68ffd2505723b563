//! Input symbols and alphabets.

use crate::formlang::state::StateId;
use indexmap::{IndexMap, IndexSet};
use std::fmt;

/// A single input symbol.
pub type Symbol = char;

/// The label of an edge: either an input symbol or an epsilon move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    Epsilon,
    Symbol(Symbol),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Epsilon => write!(f, "ε"),
            Label::Symbol(symbol) => write!(f, "{symbol}"),
        }
    }
}

/// A labeled edge in the graph representation: (source, destination, label).
pub type GraphEdge = (StateId, StateId, String);

/// Merge parallel edges into one edge per ordered pair of states, joining
/// their labels with commas in the order they were first seen.
pub(crate) fn coalesce_edges(
    edges: impl IntoIterator<Item = (StateId, Label, StateId)>,
) -> Vec<GraphEdge> {
    let mut merged: IndexMap<(StateId, StateId), Vec<String>> = IndexMap::new();
    for (src, label, dst) in edges {
        merged.entry((src, dst)).or_default().push(label.to_string());
    }
    merged
        .into_iter()
        .map(|((src, dst), labels)| (src, dst, labels.join(",")))
        .collect()
}

/// The set of symbols an automaton reads.
///
/// Iteration follows first insertion, which keeps every algorithm that walks
/// the alphabet reproducible from run to run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alphabet {
    symbols: IndexSet<Symbol>,
}

impl Alphabet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a symbol. Returns `true` if it was new.
    pub fn insert(&mut self, symbol: Symbol) -> bool {
        self.symbols.insert(symbol)
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        self.symbols.contains(&symbol)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Add every symbol of `other` that is not already present.
    pub fn union_with(&mut self, other: &Alphabet) {
        self.symbols.extend(other.iter());
    }

    pub fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.symbols.iter().copied()
    }
}

impl FromIterator<Symbol> for Alphabet {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        Self {
            symbols: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Alphabet {
    type Item = Symbol;
    type IntoIter = std::iter::Copied<indexmap::set::Iter<'a, Symbol>>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_keeps_first_appearance_order() {
        let alphabet: Alphabet = "banana".chars().collect();
        assert_eq!(alphabet.iter().collect::<String>(), "ban");
        assert_eq!(alphabet.len(), 3);
    }

    #[test]
    fn test_alphabet_union() {
        let mut left: Alphabet = "ab".chars().collect();
        let right: Alphabet = "cba".chars().collect();
        left.union_with(&right);
        assert_eq!(left.iter().collect::<String>(), "abc");
    }

    #[test]
    fn test_coalesce_edges() {
        let edges = vec![
            (0, Label::Symbol('a'), 1),
            (1, Label::Epsilon, 0),
            (0, Label::Symbol('b'), 1),
        ];
        assert_eq!(
            coalesce_edges(edges),
            vec![(0, 1, "a,b".to_string()), (1, 0, "ε".to_string())]
        );
    }

    #[test]
    fn test_label_display() {
        assert_eq!(Label::Epsilon.to_string(), "ε");
        assert_eq!(Label::Symbol('x').to_string(), "x");
    }
}
