//! # Domain Value Objects
//!
//! Identifiers, pagination state and per-page reports.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::errors::{RejectReason, ResolveError};

/// Normalized content pointer.
///
/// The gateway prefix and surrounding whitespace are stripped, leaving the
/// bare content identifier. Feeds are deduplicated on this value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentId(String);

impl ContentId {
    /// Normalize a raw ledger pointer.
    pub fn normalize(raw: &str, gateway_prefix: &str) -> Self {
        let trimmed = raw.trim();
        let stripped = if gateway_prefix.is_empty() {
            trimmed
        } else {
            trimmed.strip_prefix(gateway_prefix).unwrap_or(trimmed)
        };
        Self(stripped.trim().trim_matches('/').to_string())
    }

    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when nothing remains after normalization.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for ContentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of one feed session; tags every in-flight fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Mint a fresh session id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pagination state machine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedPhase {
    /// No session yet.
    Unstarted,
    /// Page 1 of a new session is in flight.
    FetchingFirst,
    /// Ready for `advance()`; `page` pages are accumulated.
    Idle {
        /// Last completed page
        page: u32,
    },
    /// `page` is in flight.
    FetchingMore {
        /// Page being fetched
        page: u32,
    },
    /// The last page is being re-polled.
    Refreshing {
        /// Page being re-polled
        page: u32,
    },
    /// Source exhausted; `advance()` is a no-op.
    End {
        /// Last page that yielded entries
        page: u32,
    },
    /// Systemic failure; paused until `start()`.
    Failed {
        /// Last completed page
        page: u32,
        /// Error reported upward
        reason: String,
    },
}

impl FeedPhase {
    /// Last completed page (at least 1).
    pub fn current_page(&self) -> u32 {
        match self {
            Self::Unstarted | Self::FetchingFirst => 1,
            Self::FetchingMore { page } => page.saturating_sub(1).max(1),
            Self::Idle { page }
            | Self::Refreshing { page }
            | Self::End { page }
            | Self::Failed { page, .. } => (*page).max(1),
        }
    }

    /// True while a fetch is outstanding.
    pub fn is_fetching(&self) -> bool {
        matches!(
            self,
            Self::FetchingFirst | Self::FetchingMore { .. } | Self::Refreshing { .. }
        )
    }

    /// Name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unstarted => "unstarted",
            Self::FetchingFirst => "fetching_first",
            Self::Idle { .. } => "idle",
            Self::FetchingMore { .. } => "fetching_more",
            Self::Refreshing { .. } => "refreshing",
            Self::End { .. } => "end",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Read model of the pagination state for rendering loading/end indicators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    /// Last completed page, 1-based.
    pub current_page: u32,
    /// Page 1 is loading.
    pub is_fetching_first_page: bool,
    /// A later page is loading.
    pub is_fetching_more: bool,
    /// No further data is expected.
    pub reached_end: bool,
    /// Systemic failure message, if paused on an error.
    pub error: Option<String>,
}

impl From<&FeedPhase> for PaginationState {
    fn from(phase: &FeedPhase) -> Self {
        Self {
            current_page: phase.current_page(),
            is_fetching_first_page: matches!(phase, FeedPhase::FetchingFirst),
            is_fetching_more: matches!(
                phase,
                FeedPhase::FetchingMore { .. } | FeedPhase::Refreshing { .. }
            ),
            reached_end: matches!(phase, FeedPhase::End { .. }),
            error: match phase {
                FeedPhase::Failed { reason, .. } => Some(reason.clone()),
                _ => None,
            },
        }
    }
}

/// What a page operation did to the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageOutcome {
    /// Results appended; more pages may follow.
    Appended,
    /// Results (possibly none) appended and the session reached its end.
    Ended,
    /// Not performed: a fetch was outstanding or the session is paused/ended.
    Ignored,
    /// Fetched, but the session changed meanwhile; nothing appended.
    Discarded,
}

impl PageOutcome {
    /// Label used for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Appended => "appended",
            Self::Ended => "ended",
            Self::Ignored => "ignored",
            Self::Discarded => "discarded",
        }
    }
}

/// An entry dropped because resolution failed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionFailure {
    /// Ledger position of the entry.
    pub sequence_index: u64,
    /// Pointer that failed.
    pub content_id: ContentId,
    /// Failure kind.
    pub error: ResolveError,
}

/// An entry dropped by the validator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    /// Ledger position of the entry.
    pub sequence_index: u64,
    /// Pointer of the rejected record.
    pub content_id: ContentId,
    /// Rejection rule that fired.
    pub reason: RejectReason,
}

/// Summary of one `start`/`advance`/`refresh` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageReport {
    /// Session the fetch was issued for.
    pub session: SessionId,
    /// Page that was (or would have been) fetched.
    pub page: u32,
    /// Effect on the session.
    pub outcome: PageOutcome,
    /// Raw entries in the page window.
    pub windowed: usize,
    /// Entries that passed the filter.
    pub matched: usize,
    /// Matched entries skipped because the feed already holds them.
    pub already_present: usize,
    /// Successful resolutions.
    pub resolved: usize,
    /// Items added to the feed.
    pub appended: usize,
    /// Item-level resolution failures.
    pub failures: Vec<ResolutionFailure>,
    /// Item-level validation rejections.
    pub rejections: Vec<Rejection>,
}

impl PageReport {
    /// Report for a request absorbed by the guard.
    pub fn ignored(session: SessionId, page: u32) -> Self {
        Self {
            session,
            page,
            outcome: PageOutcome::Ignored,
            windowed: 0,
            matched: 0,
            already_present: 0,
            resolved: 0,
            appended: 0,
            failures: Vec::new(),
            rejections: Vec::new(),
        }
    }

    /// Entries dropped for any item-level reason.
    pub fn dropped(&self) -> usize {
        self.failures.len() + self.rejections.len()
    }
}
