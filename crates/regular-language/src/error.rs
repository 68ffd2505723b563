use thiserror::Error;

/// A malformed pattern. Positions count characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("unexpected meta character {found:?} at position {position}")]
    UnexpectedMetaChar { position: usize, found: char },

    #[error("unexpected end of pattern at position {position}")]
    UnexpectedEnd { position: usize },

    #[error("unexpected {found:?} at position {position} after a complete expression")]
    TrailingInput { position: usize, found: char },
}

impl Error {
    /// Where in the pattern the problem was found.
    pub fn position(&self) -> usize {
        match *self {
            Error::UnexpectedMetaChar { position, .. }
            | Error::UnexpectedEnd { position }
            | Error::TrailingInput { position, .. } => position,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
