//! Compile small regular expressions into minimal DFAs.
//!
//! Patterns support literals, concatenation, alternation (`|`), Kleene star
//! (`*`) and grouping. A pattern goes through Thompson construction, subset
//! construction and minimization:
//!
//! ```
//! let dfa = regular_language::compile("a(b|c)*")?;
//! assert!(dfa.accepts("abcb"));
//! assert!(!dfa.accepts("ba"));
//! # Ok::<(), regular_language::Error>(())
//! ```
//!
//! Every stage is also public under [`formlang`], so they can be composed by
//! hand:
//!
//! ```
//! use regular_language::formlang::parse;
//!
//! let minimal = parse("(a|b)*b")?
//!     .determinize()
//!     .reverse()
//!     .determinize()
//!     .minimize();
//! // The reversed language: strings starting with b.
//! assert!(minimal.accepts("baa"));
//! assert!(!minimal.accepts("ab"));
//! # Ok::<(), regular_language::Error>(())
//! ```

mod compile;
mod error;
pub mod formlang;

pub use compile::{Builder, Config, Minimization, compile};
pub use error::{Error, Result};
pub use formlang::{DFA, EpsilonNFA};
