//! Content addresses for attachments.
//!
//! An attachment is identified by the SHA-256 digest of its raw bytes. The
//! same digest is used to dedupe repeated selections on the client and to let
//! the server group the chunks that belong to one file.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Error returned when a string is not a valid content address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid content hash {value:?}: expected {expected} lowercase hex characters")]
pub struct InvalidContentHash {
    /// The rejected input.
    pub value: String,
    /// Required length in characters.
    pub expected: usize,
}

/// Lowercase hex SHA-256 digest of a file's exact bytes.
///
/// # Example
///
/// ```
/// use journal_core::ContentHash;
///
/// let hash = ContentHash::of(b"hello");
/// assert_eq!(hash.as_str().len(), ContentHash::HEX_LEN);
/// assert_eq!(hash, ContentHash::of(b"hello"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    /// Length of the hex rendering.
    pub const HEX_LEN: usize = 64;

    /// Compute the content address of `bytes`.
    #[must_use]
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(hex::encode(hasher.finalize()))
    }

    /// Parse an existing hex digest.
    pub fn parse(value: &str) -> Result<Self, InvalidContentHash> {
        let valid = value.len() == Self::HEX_LEN
            && value
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if valid {
            Ok(Self(value.to_owned()))
        } else {
            Err(InvalidContentHash {
                value: value.to_owned(),
                expected: Self::HEX_LEN,
            })
        }
    }

    /// The full hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated digest for log lines and terminal output.
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContentHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ContentHash {
    type Err = InvalidContentHash;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ContentHash {
    type Error = InvalidContentHash;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digest_of_empty_input() {
        let hash = ContentHash::of(b"");
        assert_eq!(
            hash.as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn identical_bytes_share_an_address() {
        let a = ContentHash::of(b"same bytes");
        let b = ContentHash::of(b"same bytes");
        let c = ContentHash::of(b"other bytes");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn parse_accepts_own_rendering() {
        let hash = ContentHash::of(b"abc");
        let parsed: ContentHash = hash.as_str().parse().unwrap();
        assert_eq!(parsed, hash);
    }

    #[test]
    fn parse_rejects_wrong_length_and_uppercase() {
        assert!(ContentHash::parse("abc").is_err());
        let upper = ContentHash::of(b"abc").as_str().to_uppercase();
        let err = ContentHash::parse(&upper).unwrap_err();
        assert_eq!(err.expected, ContentHash::HEX_LEN);
    }

    #[test]
    fn short_form_is_prefix() {
        let hash = ContentHash::of(b"abc");
        assert!(hash.as_str().starts_with(hash.short()));
        assert_eq!(hash.short().len(), 12);
    }

    #[test]
    fn serde_uses_plain_string() {
        let hash = ContentHash::of(b"abc");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{hash}\""));
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
        assert!(serde_json::from_str::<ContentHash>("\"nope\"").is_err());
    }
}
