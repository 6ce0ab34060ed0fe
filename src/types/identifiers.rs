use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Content-addressed identifier of a stored blob: the SHA-256 digest of a
/// `(format, content)` pair as 64 lowercase hex characters.
///
/// Identical content bytes plus identical format string always produce the
/// same ref; refs are never recomputed for existing data.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentRef(String);

#[derive(Debug, Error)]
pub enum RefParseError {
    #[error("Content ref must be exactly 64 characters, got {0}")]
    WrongLength(usize),
    #[error("Content ref must be lowercase hexadecimal")]
    InvalidCharacters,
}

impl ContentRef {
    /// Compute the ref for a `(format, content)` pair.
    ///
    /// The format string and content bytes are separated by a NUL byte so
    /// the pair boundaries cannot be confused across inputs.
    pub fn compute(format: &str, content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(format.as_bytes());
        hasher.update([0u8]);
        hasher.update(content);

        ContentRef(hex::encode(hasher.finalize()))
    }

    /// Validate an externally supplied ref string.
    ///
    /// Only the shape is checked (64 lowercase hex characters); whether a
    /// blob actually exists for the ref is a separate store lookup.
    pub fn parse(s: &str) -> Result<Self, RefParseError> {
        if s.len() != 64 {
            return Err(RefParseError::WrongLength(s.len()));
        }
        if !s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)) {
            return Err(RefParseError::InvalidCharacters);
        }

        Ok(ContentRef(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical digest over a page version's observable state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateHash(String);

impl StateHash {
    pub(crate) fn from_hasher(hasher: Sha256) -> Self {
        StateHash(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
