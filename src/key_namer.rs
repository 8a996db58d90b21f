//! # Key Namer
//!
//! Derives the compact node token used to namespace cache keys from a ledger
//! node's canonical identifier, and builds the cache keys read each cycle.
//!
//! ```rust
//! use ledger_status::key_namer::KeyNamer;
//!
//! let namer = KeyNamer::for_identifier(
//!     "did:ledger:node:f7a5e3c4-1b2d-4e8f-9a0b-c1d2e3f4a5b6",
//! ).unwrap();
//! assert_eq!(namer.token(), "f7a5e3c41b2d4e8f9a0bc1d2e3f4a5b6");
//! assert_eq!(namer.windowed_key("ocl", 1_700_000_000), "ocl|f7a5e3c41b2d4e8f9a0bc1d2e3f4a5b6|1700000000");
//! ```

use crate::constants::keys;
use crate::error::{ReporterError, ReporterResult};

/// Extract the trailing colon-delimited segment of `identifier` and strip hyphens.
///
/// Trailing colons are ignored, so `urn:uuid:abc-def:` yields `abcdef`.
pub fn token_for(identifier: &str) -> ReporterResult<String> {
    let segment = identifier
        .trim_end_matches(':')
        .rsplit(':')
        .next()
        .unwrap_or_default();

    let token = segment.replace('-', "");
    if token.is_empty() {
        return Err(ReporterError::invalid_identifier(identifier));
    }

    Ok(token)
}

/// Cache key builder bound to a single node token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyNamer {
    token: String,
}

impl KeyNamer {
    /// Build a namer from a canonical ledger node identifier
    pub fn for_identifier(identifier: &str) -> ReporterResult<Self> {
        Ok(Self {
            token: token_for(identifier)?,
        })
    }

    /// Build a namer from an already-derived token
    pub fn from_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Scalar duration keys, in aggregate / findConsensus / recentHistoryMergeOnly order
    pub fn duration_keys(&self) -> [String; 3] {
        [
            keys::DURATION_AGGREGATE,
            keys::DURATION_FIND_CONSENSUS,
            keys::DURATION_RECENT_HISTORY_MERGE_ONLY,
        ]
        .map(|name| {
            format!(
                "{prefix}{sep}{name}{sep}{token}",
                prefix = keys::DURATION_PREFIX,
                sep = keys::KEY_SEPARATOR,
                token = self.token
            )
        })
    }

    /// Per-second counter key `{prefix}|{token}|{epoch_second}`
    pub fn windowed_key(&self, prefix: &str, epoch_second: i64) -> String {
        format!(
            "{prefix}{sep}{token}{sep}{epoch_second}",
            sep = keys::KEY_SEPARATOR,
            token = self.token
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_strips_hyphens_from_trailing_segment() {
        let token = token_for("urn:uuid:0a1b2c3d-4e5f-6071-8293-a4b5c6d7e8f9").unwrap();
        assert_eq!(token, "0a1b2c3d4e5f60718293a4b5c6d7e8f9");
    }

    #[test]
    fn test_token_ignores_trailing_colons() {
        assert_eq!(token_for("urn:uuid:ab-cd::").unwrap(), "abcd");
    }

    #[test]
    fn test_identifier_without_colons_is_its_own_segment() {
        assert_eq!(token_for("ab-cd-ef").unwrap(), "abcdef");
    }

    #[test]
    fn test_empty_identifier_is_rejected() {
        assert_eq!(
            token_for(""),
            Err(ReporterError::InvalidIdentifier {
                identifier: String::new()
            })
        );
        assert!(token_for(":::").is_err());
        assert!(token_for("urn:uuid:--").is_err());
    }

    #[test]
    fn test_duration_keys_use_token() {
        let namer = KeyNamer::from_token("abc");
        assert_eq!(
            namer.duration_keys(),
            [
                "t|aggregate|abc".to_string(),
                "t|findConsensus|abc".to_string(),
                "t|recentHistoryMergeOnly|abc".to_string(),
            ]
        );
    }
}
