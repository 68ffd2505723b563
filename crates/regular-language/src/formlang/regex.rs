//! Pattern parser that drives the Thompson builders.
//!
//! ```text
//! expr   := term ('|' term)*
//! term   := factor factor*
//! factor := atom '*'?
//! atom   := '(' expr ')' | char
//! ```
//!
//! The parser is a single loop over the pattern with an explicit stack of
//! open groups, so neither pattern length nor nesting depth grows the call
//! stack. Sequences fold from the left.

use crate::error::{Error, Result};
use crate::formlang::epsilon_nfa::EpsilonNFA;
use crate::formlang::symbol::Alphabet;
use log::debug;
use std::mem;

const META_CHARS: [char; 4] = ['*', '|', '(', ')'];

fn is_meta_char(symbol: char) -> bool {
    META_CHARS.contains(&symbol)
}

/// Parse `pattern` into a single-start, single-accept NFA.
pub fn parse(pattern: &str) -> Result<EpsilonNFA> {
    let (nfa, alphabet) = RegexParser::new(pattern).parse()?;
    debug!(
        "parsed {pattern:?} into an NFA with {} states over {} symbols",
        nfa.num_states(),
        alphabet.len()
    );
    Ok(nfa)
}

/// Cursor over a pattern plus the literals seen so far. Lives for one parse.
#[derive(Debug)]
pub struct RegexParser {
    pattern: Vec<char>,
    position: usize,
    alphabet: Alphabet,
}

/// A group being parsed: the finished alternatives and the sequence of
/// factors after the last `|`.
#[derive(Debug, Default)]
struct Group {
    alternatives: Vec<EpsilonNFA>,
    sequence: Option<EpsilonNFA>,
}

impl Group {
    fn push_factor(&mut self, factor: EpsilonNFA) {
        self.sequence = Some(match self.sequence.take() {
            Some(sequence) => sequence.concat(factor),
            None => factor,
        });
    }

    /// End the current alternative at a `|`. Fails if it is empty.
    fn close_alternative(&mut self) -> bool {
        match self.sequence.take() {
            Some(sequence) => {
                self.alternatives.push(sequence);
                true
            }
            None => false,
        }
    }

    /// The union of all alternatives, or `None` if the last one is empty.
    fn finish(mut self) -> Option<EpsilonNFA> {
        let last = self.sequence.take()?;
        if self.alternatives.is_empty() {
            return Some(last);
        }
        self.alternatives.push(last);
        Some(EpsilonNFA::union_of(self.alternatives))
    }
}

impl RegexParser {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.chars().collect(),
            position: 0,
            alphabet: Alphabet::new(),
        }
    }

    /// Parse the whole pattern. The empty pattern is the empty-string
    /// language. Also returns the literals in order of first appearance.
    pub fn parse(mut self) -> Result<(EpsilonNFA, Alphabet)> {
        if self.pattern.is_empty() {
            return Ok((EpsilonNFA::epsilon_basis(), self.alphabet));
        }

        let mut current = Group::default();
        let mut enclosing: Vec<Group> = Vec::new();

        while let Some(found) = self.peek() {
            let position = self.position;
            match found {
                '(' => {
                    self.position += 1;
                    enclosing.push(mem::take(&mut current));
                }
                ')' => {
                    let Some(parent) = enclosing.pop() else {
                        return Err(Error::TrailingInput { position, found });
                    };
                    let group = mem::replace(&mut current, parent);
                    let Some(inner) = group.finish() else {
                        return Err(Error::UnexpectedMetaChar { position, found });
                    };
                    self.position += 1;
                    let factor = self.star(inner);
                    current.push_factor(factor);
                }
                '|' => {
                    if !current.close_alternative() {
                        return Err(Error::UnexpectedMetaChar { position, found });
                    }
                    self.position += 1;
                }
                _ if is_meta_char(found) => {
                    return Err(Error::UnexpectedMetaChar { position, found });
                }
                symbol => {
                    self.position += 1;
                    self.alphabet.insert(symbol);
                    let factor = self.star(EpsilonNFA::symbol_basis(symbol));
                    current.push_factor(factor);
                }
            }
        }

        let end = Error::UnexpectedEnd {
            position: self.position,
        };
        if !enclosing.is_empty() {
            return Err(end);
        }
        let nfa = current.finish().ok_or(end)?;
        Ok((nfa, self.alphabet))
    }

    fn peek(&self) -> Option<char> {
        self.pattern.get(self.position).copied()
    }

    /// Apply a postfix `*` to the atom just parsed, if there is one.
    fn star(&mut self, atom: EpsilonNFA) -> EpsilonNFA {
        if self.peek() == Some('*') {
            self.position += 1;
            return atom.closure();
        }
        atom
    }
}
