//! The pattern -> minimal DFA pipeline, with a small builder on top.

use crate::error::Result;
use crate::formlang::{DFA, EpsilonNFA, regex};
use log::debug;

/// How [`Builder::build`] reduces the DFA it determinized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Minimization {
    /// Partition refinement, see [`DFA::minimize`].
    #[default]
    Hopcroft,
    /// Reverse, determinize and minimize, twice over.
    Brzozowski,
    /// Keep the subset construction output as is.
    None,
}

/// Options for [`Builder`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Config {
    minimization: Minimization,
}

impl Config {
    pub fn new() -> Config {
        Config::default()
    }

    /// Pick the minimization strategy. [`Minimization::Hopcroft`] by default.
    pub fn minimization(mut self, minimization: Minimization) -> Config {
        self.minimization = minimization;
        self
    }

    pub fn get_minimization(&self) -> Minimization {
        self.minimization
    }
}

/// Compiles patterns into automata.
///
/// ```
/// use regular_language::{Builder, Config, Minimization};
///
/// let dfa = Builder::new()
///     .configure(Config::new().minimization(Minimization::Brzozowski))
///     .build("(a|b)*abb")?;
/// assert!(dfa.accepts("babb"));
/// assert!(!dfa.accepts("abba"));
/// # Ok::<(), regular_language::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Builder {
    config: Config,
}

impl Builder {
    pub fn new() -> Builder {
        Builder::default()
    }

    pub fn configure(&mut self, config: Config) -> &mut Builder {
        self.config = config;
        self
    }

    /// Parse `pattern` into its Thompson NFA.
    pub fn build_nfa(&self, pattern: &str) -> Result<EpsilonNFA> {
        regex::parse(pattern)
    }

    /// Parse `pattern`, determinize it and reduce the result according to
    /// the configured [`Minimization`].
    pub fn build(&self, pattern: &str) -> Result<DFA> {
        let dfa = self.build_nfa(pattern)?.determinize();
        let dfa = match self.config.get_minimization() {
            Minimization::Hopcroft => dfa.minimize(),
            Minimization::Brzozowski => brzozowski(dfa),
            Minimization::None => dfa,
        };
        debug!(
            "compiled {pattern:?} ({:?}): {} states",
            self.config.get_minimization(),
            dfa.num_states()
        );
        Ok(dfa)
    }
}

/// One round turns `dfa` into a minimal DFA of its reversed language; the
/// second round reverses back.
fn brzozowski(dfa: DFA) -> DFA {
    dfa.reverse()
        .determinize()
        .minimize()
        .reverse()
        .determinize()
        .minimize()
}

/// Compile `pattern` into its minimal DFA with the default [`Config`].
pub fn compile(pattern: &str) -> Result<DFA> {
    Builder::new().build(pattern)
}
