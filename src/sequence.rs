use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::error::{Result, SequenceError};

/// Symbols accepted for metrics. `N` is the single wildcard.
pub const ALPHABET: [u8; 5] = [b'A', b'C', b'G', b'T', b'N'];

/// Exact per-base tally of a validated sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BaseCounts {
    pub a: u64,
    pub c: u64,
    pub g: u64,
    pub t: u64,
    pub n: u64,
}

impl BaseCounts {
    pub fn gc(&self) -> u64 {
        self.g + self.c
    }

    pub fn at(&self) -> u64 {
        self.a + self.t
    }

    pub fn total(&self) -> u64 {
        self.a + self.c + self.g + self.t + self.n
    }
}

/// An uppercase, non-empty DNA sequence over [`ALPHABET`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Sequence(String);

impl Sequence {
    /// Normalizes `text` to uppercase and validates it.
    ///
    /// Fails with [`SequenceError::EmptySequence`] on empty input, or with
    /// [`SequenceError::InvalidCharacter`] naming the first character outside
    /// the alphabet (position counts characters, not bytes).
    pub fn parse(text: &str) -> Result<Self> {
        if text.is_empty() {
            return Err(SequenceError::EmptySequence);
        }
        let mut normalized = String::with_capacity(text.len());
        for (position, ch) in text.chars().enumerate() {
            let upper = ch.to_ascii_uppercase();
            if !upper.is_ascii() || !ALPHABET.contains(&(upper as u8)) {
                return Err(SequenceError::InvalidCharacter { character: ch, position });
            }
            normalized.push(upper);
        }
        Ok(Sequence(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a parsed sequence.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn counts(&self) -> BaseCounts {
        let mut counts = BaseCounts::default();
        for &base in self.as_bytes() {
            match base {
                b'A' => counts.a += 1,
                b'C' => counts.c += 1,
                b'G' => counts.g += 1,
                b'T' => counts.t += 1,
                _ => counts.n += 1,
            }
        }
        counts
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for Sequence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Sequence {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
