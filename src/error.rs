use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("Invalid sequence: empty input")]
    EmptySequence,

    #[error("Invalid sequence: unexpected character '{character}' at position {position} (allowed: A, T, G, C, N)")]
    InvalidCharacter { character: char, position: usize },
}

pub type Result<T> = std::result::Result<T, SequenceError>;
