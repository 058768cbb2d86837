//! Station identifier type.

use std::fmt;

use serde::Serialize;

/// Longest station identifier accepted.
const MAX_LEN: usize = 16;

/// Error returned when parsing an invalid station identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station ID: {reason}")]
pub struct InvalidStationId {
    reason: &'static str,
}

/// A Synoptic station identifier (STID), e.g. `WBB` or `CLN`.
///
/// Identifiers are case-insensitive upstream, so they are stored upper-cased.
/// Surrounding whitespace is trimmed. This type guarantees that any
/// `StationId` value is non-empty and URL-safe by construction.
///
/// # Examples
///
/// ```
/// use synoptic_client::domain::StationId;
///
/// let stid = StationId::parse(" wbb ").unwrap();
/// assert_eq!(stid.as_str(), "WBB");
///
/// assert!(StationId::parse("").is_err());
/// assert!(StationId::parse("W B B").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StationId(String);

impl StationId {
    /// Parse a station identifier from a string.
    ///
    /// Accepts ASCII letters, digits, `_` and `-`, up to 16 characters.
    pub fn parse(s: &str) -> Result<Self, InvalidStationId> {
        let s = s.trim();

        if s.is_empty() {
            return Err(InvalidStationId {
                reason: "must not be empty",
            });
        }

        if s.len() > MAX_LEN {
            return Err(InvalidStationId {
                reason: "must be at most 16 characters",
            });
        }

        if !s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            return Err(InvalidStationId {
                reason: "must contain only ASCII letters, digits, '_' or '-'",
            });
        }

        Ok(StationId(s.to_ascii_uppercase()))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a raw upstream identifier.
    pub fn matches(&self, raw: &str) -> bool {
        self.0.eq_ignore_ascii_case(raw.trim())
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for StationId {
    type Err = InvalidStationId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_ids() {
        assert!(StationId::parse("WBB").is_ok());
        assert!(StationId::parse("CLN").is_ok());
        assert!(StationId::parse("KSLC").is_ok());
        assert!(StationId::parse("UT_123").is_ok());
        assert!(StationId::parse("A-1").is_ok());
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        let stid = StationId::parse("  kslc\n").unwrap();
        assert_eq!(stid.as_str(), "KSLC");
    }

    #[test]
    fn reject_empty() {
        assert!(StationId::parse("").is_err());
        assert!(StationId::parse("   ").is_err());
    }

    #[test]
    fn reject_bad_characters() {
        assert!(StationId::parse("W B").is_err());
        assert!(StationId::parse("WBB&token=x").is_err());
        assert!(StationId::parse("WBÖ").is_err());
    }

    #[test]
    fn reject_too_long() {
        assert!(StationId::parse("ABCDEFGHIJKLMNOPQ").is_err());
        assert!(StationId::parse("ABCDEFGHIJKLMNOP").is_ok());
    }

    #[test]
    fn matches_is_case_insensitive() {
        let stid = StationId::parse("WBB").unwrap();
        assert!(stid.matches("wbb"));
        assert!(stid.matches(" WBB "));
        assert!(!stid.matches("KSLC"));
    }

    #[test]
    fn display_and_debug() {
        let stid = StationId::parse("cln").unwrap();
        assert_eq!(format!("{}", stid), "CLN");
        assert_eq!(format!("{:?}", stid), "StationId(CLN)");
    }
}
