//! Randomized checks of the whole pipeline against a direct matcher.

use crate::compile::{Builder, Config, Minimization};
use crate::formlang::{DFA, EpsilonNFA, StateSet, parse};
use proptest::prelude::*;
use proptest::sample::Index;

const SYMBOLS: [char; 3] = ['a', 'b', 'c'];
const MAX_LEN: usize = 4;

#[derive(Debug, Clone)]
enum Pattern {
    Literal(char),
    Concat(Box<Pattern>, Box<Pattern>),
    Union(Box<Pattern>, Box<Pattern>),
    Star(Box<Pattern>),
}

impl Pattern {
    /// Fully parenthesized, so the parser's precedence never matters.
    fn render(&self) -> String {
        match self {
            Pattern::Literal(c) => c.to_string(),
            Pattern::Concat(l, r) => format!("({}{})", l.render(), r.render()),
            Pattern::Union(l, r) => format!("({}|{})", l.render(), r.render()),
            Pattern::Star(inner) => format!("({})*", inner.render()),
        }
    }

    fn matches(&self, input: &[char]) -> bool {
        match self {
            Pattern::Literal(c) => input.len() == 1 && input[0] == *c,
            Pattern::Concat(l, r) => {
                (0..=input.len()).any(|i| l.matches(&input[..i]) && r.matches(&input[i..]))
            }
            Pattern::Union(l, r) => l.matches(input) || r.matches(input),
            Pattern::Star(inner) => {
                input.is_empty()
                    || (1..=input.len())
                        .any(|i| inner.matches(&input[..i]) && self.matches(&input[i..]))
            }
        }
    }
}

fn pattern() -> impl Strategy<Value = Pattern> {
    let leaf = prop::sample::select(SYMBOLS.to_vec()).prop_map(Pattern::Literal);
    leaf.prop_recursive(4, 16, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone())
                .prop_map(|(l, r)| Pattern::Concat(Box::new(l), Box::new(r))),
            (inner.clone(), inner.clone())
                .prop_map(|(l, r)| Pattern::Union(Box::new(l), Box::new(r))),
            inner.prop_map(|p| Pattern::Star(Box::new(p))),
        ]
    })
}

/// Every string over `SYMBOLS` up to `MAX_LEN` characters.
fn inputs() -> Vec<Vec<char>> {
    let mut all = vec![Vec::new()];
    let mut frontier = vec![Vec::new()];
    for _ in 0..MAX_LEN {
        frontier = frontier
            .iter()
            .flat_map(|prefix| {
                SYMBOLS.iter().map(move |&c| {
                    let mut next: Vec<char> = prefix.clone();
                    next.push(c);
                    next
                })
            })
            .collect();
        all.extend(frontier.iter().cloned());
    }
    all
}

fn build(pattern: &str, minimization: Minimization) -> DFA {
    Builder::new()
        .configure(Config::new().minimization(minimization))
        .build(pattern)
        .unwrap()
}

/// States from which some accept state can be reached.
fn live_states(dfa: &DFA) -> StateSet {
    let mut live = dfa.accept_states().clone();
    loop {
        let before = live.len();
        for (source, _, destination) in dfa.transitions() {
            if live.contains(destination) {
                live.insert(source);
            }
        }
        if live.len() == before {
            return live;
        }
    }
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_pipeline_stages_agree(pattern in pattern()) {
        init_logger();
        let source = pattern.render();

        let nfa = parse(&source).unwrap();
        let dfa = nfa.determinize();
        let hopcroft = build(&source, Minimization::Hopcroft);
        let brzozowski = build(&source, Minimization::Brzozowski);

        for input in inputs() {
            let text: String = input.iter().collect();
            let expected = pattern.matches(&input);
            prop_assert_eq!(nfa.accepts(&text), expected, "NFA on {:?}", text);
            prop_assert_eq!(dfa.accepts(&text), expected, "DFA on {:?}", text);
            prop_assert_eq!(hopcroft.accepts(&text), expected, "Hopcroft on {:?}", text);
            prop_assert_eq!(brzozowski.accepts(&text), expected, "Brzozowski on {:?}", text);
        }
        prop_assert_eq!(hopcroft.num_states(), brzozowski.num_states());
    }

    #[test]
    fn test_reverse_accepts_reversed_strings(pattern in pattern()) {
        let dfa = parse(&pattern.render()).unwrap().determinize();
        let reversed = dfa.reverse();
        prop_assert_eq!(reversed.start_states().len(), 1);

        for input in inputs() {
            let forward: String = input.iter().collect();
            let backward: String = input.iter().rev().collect();
            prop_assert_eq!(dfa.accepts(&forward), reversed.accepts(&backward));
        }
    }

    #[test]
    fn test_minimize_is_idempotent(pattern in pattern()) {
        let once = build(&pattern.render(), Minimization::Hopcroft);
        let twice = once.clone().minimize();
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn test_minimal_dfa_shape(pattern in pattern()) {
        let dfa = build(&pattern.render(), Minimization::Hopcroft);

        prop_assert_eq!(dfa.start_states().len(), 1);
        prop_assert_eq!(dfa.find_reachable_states().len(), dfa.num_states() as usize);

        // Any missing edge stands for the dropped dead block, and at most one
        // dead state survives.
        let live = live_states(&dfa);
        prop_assert!(dfa.num_states() as usize - live.len() <= 1);
        if dfa.num_states() as usize - live.len() == 1 {
            prop_assert!(!dfa.is_total());
        }
    }

    #[test]
    fn test_thompson_composition_laws(left in pattern(), right in pattern()) {
        let a = parse(&left.render()).unwrap();
        let b = parse(&right.render()).unwrap();

        let concat = a.clone().concat(b.clone());
        let union = a.clone().union(b);
        let closure = a.closure();

        let concat_pattern = Pattern::Concat(Box::new(left.clone()), Box::new(right.clone()));
        let union_pattern = Pattern::Union(Box::new(left.clone()), Box::new(right));
        let closure_pattern = Pattern::Star(Box::new(left));

        for input in inputs() {
            let text: String = input.iter().collect();
            prop_assert_eq!(concat.accepts(&text), concat_pattern.matches(&input));
            prop_assert_eq!(union.accepts(&text), union_pattern.matches(&input));
            prop_assert_eq!(closure.accepts(&text), closure_pattern.matches(&input));
        }
    }

    #[test]
    fn test_handles_stay_dense(ops in prop::collection::vec(any::<Option<Index>>(), 0..40)) {
        let mut nfa = EpsilonNFA::new();
        let mut expected = 0u32;

        for op in ops {
            match op {
                Some(index) if expected > 0 => {
                    nfa.remove_state(index.index(expected as usize) as u32);
                    expected -= 1;
                }
                _ => {
                    let state = nfa.add_state(expected == 0, false);
                    prop_assert_eq!(state, expected);
                    if state > 0 {
                        nfa.add_transition(state - 1, 'a', state);
                        nfa.add_epsilon_transition(state, 0);
                    }
                    expected += 1;
                }
            }

            prop_assert_eq!(nfa.num_states(), expected);
            prop_assert!(nfa.states().eq(0..expected));
            for (source, _, destination) in nfa.transitions() {
                prop_assert!(source < expected && destination < expected);
            }
            for (source, destination) in nfa.epsilon_transitions() {
                prop_assert!(source < expected && destination < expected);
            }
            prop_assert!(nfa.start_states().iter().all(|s| s < expected));
        }
    }
}
