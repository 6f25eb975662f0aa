//! # Domain Errors
//!
//! Error types for the feed pipeline.
//!
//! Only `FeedError` ever reaches a caller as an `Err`. `ResolveError` and
//! `RejectReason` describe item-level drops and are reported inside a
//! `PageReport`, never raised.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pipeline-level errors.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The ledger source could not be read. Pauses the session.
    #[error("Ledger source unavailable: {0}")]
    SourceUnavailable(String),

    /// `advance()` or `refresh()` was called before `start()`.
    #[error("No feed session has been started")]
    NotStarted,

    /// Configuration rejected by `FeedConfig::validate`.
    #[error("Invalid feed configuration: {0}")]
    InvalidConfig(String),

    /// Address string could not be parsed.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// An append would break the ledger's sequence ordering.
    #[error("Ledger entry out of order: {got} does not follow {last}")]
    LedgerOrder {
        /// Last sequence index in the ledger
        last: u64,
        /// Sequence index that was offered
        got: u64,
    },
}

/// Failure of a single content resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ResolveError {
    /// Nothing is stored under the pointer.
    #[error("Content not found: {0}")]
    NotFound(String),

    /// The resolver did not answer in time.
    #[error("Resolution of {pointer} timed out after {timeout_ms}ms")]
    Timeout {
        /// Pointer being resolved
        pointer: String,
        /// Limit that expired
        timeout_ms: u64,
    },

    /// A payload came back but is not a metadata record.
    #[error("Malformed metadata for {pointer}: {reason}")]
    Malformed {
        /// Pointer being resolved
        pointer: String,
        /// Decoder message
        reason: String,
    },

    /// Connection-level failure that is none of the above.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl ResolveError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Timeout { .. } => "timeout",
            Self::Malformed { .. } => "malformed",
            Self::Transport(_) => "transport",
        }
    }
}

/// Why the validator refused a record.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum RejectReason {
    /// Resolution produced no record.
    #[error("No metadata record")]
    MissingRecord,

    /// Pointer is empty once the gateway prefix is stripped.
    #[error("Content pointer is empty after normalization")]
    EmptyPointer,

    /// Image is a known broken-encoding placeholder.
    #[error("Image is a broken placeholder: {0}")]
    SentinelImage(String),
}

impl RejectReason {
    /// Short label used for metrics and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MissingRecord => "missing_record",
            Self::EmptyPointer => "empty_pointer",
            Self::SentinelImage(_) => "sentinel_image",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_unavailable_error() {
        let err = FeedError::SourceUnavailable("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_ledger_order_error() {
        let err = FeedError::LedgerOrder { last: 10, got: 7 };
        assert!(err.to_string().contains("7 does not follow 10"));
    }

    #[test]
    fn test_timeout_error() {
        let err = ResolveError::Timeout {
            pointer: "QmAbc".to_string(),
            timeout_ms: 250,
        };
        assert!(err.to_string().contains("250ms"));
        assert_eq!(err.kind(), "timeout");
    }

    #[test]
    fn test_resolve_error_kinds() {
        assert_eq!(ResolveError::NotFound("x".into()).kind(), "not_found");
        assert_eq!(ResolveError::Transport("x".into()).kind(), "transport");
        let malformed = ResolveError::Malformed {
            pointer: "x".into(),
            reason: "eof".into(),
        };
        assert_eq!(malformed.kind(), "malformed");
    }

    #[test]
    fn test_reject_reason_labels() {
        assert_eq!(RejectReason::MissingRecord.label(), "missing_record");
        assert_eq!(RejectReason::EmptyPointer.label(), "empty_pointer");
        assert_eq!(
            RejectReason::SentinelImage("x".into()).label(),
            "sentinel_image"
        );
    }
}
