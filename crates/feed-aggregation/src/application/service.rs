//! # Pagination Controller
//!
//! Application service driving one feed session at a time.
//!
//! Each page runs window → filter → enrich → validate → accumulate. Pages are
//! strictly sequential: `advance()` is only honored from `Idle`, and the
//! transition to `FetchingMore` happens under the state lock before the first
//! await, so two racing calls produce exactly one fetch.
//!
//! Every fetch carries the `SessionId` active when it was issued. Results are
//! committed under the same lock that `start()` uses to replace the session;
//! a fetch whose tag no longer matches is discarded.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

use feed_telemetry::metric_inc;
use feed_telemetry::metrics::{
    ADVANCE_IGNORED, DUPLICATES_SKIPPED, ITEMS_APPENDED, PAGES_FETCHED, VALIDATION_REJECTIONS,
};
use tracing::{debug, error, info, warn};

use super::accumulator::{FeedAccumulator, FeedSnapshot};
use super::enricher::{Enricher, ResolvedEntry};
use crate::algorithms::{is_short_page, window_page, EntryFilter, Validator};
use crate::config::FeedConfig;
use crate::domain::{
    ContentId, FeedError, FeedItem, FeedPhase, LedgerEntry, PageOutcome, PageReport,
    PaginationState, RejectReason, Rejection, ResolutionFailure, SessionId,
};
use crate::ports::{ContentResolver, FeedApi, LedgerSource};

#[derive(Clone, Debug)]
struct Session {
    id: SessionId,
    filter: EntryFilter,
}

struct SessionState {
    session: Option<Session>,
    phase: FeedPhase,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FetchKind {
    First,
    More,
    Refresh,
}

/// Output of the I/O half of a page fetch, waiting to be committed.
struct PageWork {
    ledger_len: usize,
    windowed: usize,
    matched: usize,
    already_present: usize,
    resolved: usize,
    items: Vec<FeedItem>,
    failures: Vec<ResolutionFailure>,
    rejections: Vec<Rejection>,
}

/// Pagination controller - owns the feed and its state machine.
pub struct PaginationController<L: LedgerSource, R: ContentResolver> {
    /// Configuration.
    config: FeedConfig,
    /// Entry source.
    ledger: Arc<L>,
    /// Concurrent content resolution.
    enricher: Enricher<R>,
    /// Record checks.
    validator: Validator,
    /// Accumulated output.
    feed: FeedAccumulator,
    /// Active session and phase.
    state: Mutex<SessionState>,
}

impl<L: LedgerSource, R: ContentResolver> PaginationController<L, R> {
    /// Create a controller. Nothing is fetched until `start()`.
    pub fn new(config: FeedConfig, ledger: Arc<L>, resolver: R) -> Result<Self, FeedError> {
        config.validate()?;
        let enricher = Enricher::new(resolver, config.concurrency(), config.resolve_timeout());
        let validator = Validator::from_config(&config);
        Ok(Self {
            config,
            ledger,
            enricher,
            validator,
            feed: FeedAccumulator::new(),
            state: Mutex::new(SessionState {
                session: None,
                phase: FeedPhase::Unstarted,
            }),
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Entry source.
    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    /// Content resolver.
    pub fn resolver(&self) -> &R {
        self.enricher.resolver()
    }

    /// Current phase.
    pub fn phase(&self) -> FeedPhase {
        self.state.lock().phase.clone()
    }

    /// Active session, if started.
    pub fn session_id(&self) -> Option<SessionId> {
        self.state.lock().session.as_ref().map(|s| s.id)
    }

    /// Filter of the active session, if started.
    pub fn filter(&self) -> Option<EntryFilter> {
        self.state.lock().session.as_ref().map(|s| s.filter.clone())
    }

    /// Current ordered feed.
    pub fn snapshot(&self) -> FeedSnapshot {
        self.feed.snapshot()
    }

    /// Current pagination state.
    pub fn pagination_state(&self) -> PaginationState {
        PaginationState::from(&self.state.lock().phase)
    }

    /// Begin a new session for `filter` and load page 1.
    ///
    /// Any fetch still in flight for the previous session is discarded when
    /// it completes.
    pub async fn start(&self, filter: EntryFilter) -> Result<PageReport, FeedError> {
        let session = SessionId::new();
        {
            let mut state = self.state.lock();
            state.session = Some(Session {
                id: session,
                filter: filter.clone(),
            });
            state.phase = FeedPhase::FetchingFirst;
            self.feed.reset();
        }
        info!(%session, %filter, source = self.ledger.source_id(), "[feed] Session started");

        self.fetch(session, &filter, 1, FetchKind::First).await
    }

    /// Load the next page. Only honored from `Idle`.
    pub async fn advance(&self) -> Result<PageReport, FeedError> {
        let (session, filter, page) = {
            let mut state = self.state.lock();
            let Some(active) = state.session.clone() else {
                return Err(FeedError::NotStarted);
            };
            match state.phase.clone() {
                FeedPhase::Idle { page } => {
                    let next = page + 1;
                    state.phase = FeedPhase::FetchingMore { page: next };
                    (active.id, active.filter, next)
                }
                other => {
                    metric_inc!(ADVANCE_IGNORED);
                    debug!(session = %active.id, phase = other.name(), "[feed] advance() ignored");
                    return Ok(PageReport::ignored(active.id, other.current_page()));
                }
            }
        };

        self.fetch(session, &filter, page, FetchKind::More).await
    }

    /// Re-poll the last page after the end of data was reached.
    ///
    /// Entries appended to the ledger since are enriched and appended. The
    /// session returns to `Idle` once the ledger extends past this page.
    pub async fn refresh(&self) -> Result<PageReport, FeedError> {
        let (session, filter, page) = {
            let mut state = self.state.lock();
            let Some(active) = state.session.clone() else {
                return Err(FeedError::NotStarted);
            };
            match state.phase.clone() {
                FeedPhase::End { page } => {
                    state.phase = FeedPhase::Refreshing { page };
                    (active.id, active.filter, page)
                }
                other => {
                    debug!(session = %active.id, phase = other.name(), "[feed] refresh() ignored");
                    return Ok(PageReport::ignored(active.id, other.current_page()));
                }
            }
        };

        self.fetch(session, &filter, page, FetchKind::Refresh).await
    }

    async fn fetch(
        &self,
        session: SessionId,
        filter: &EntryFilter,
        page: u32,
        kind: FetchKind,
    ) -> Result<PageReport, FeedError> {
        match self.collect_page(filter, page).await {
            Ok(work) => Ok(self.commit(session, page, kind, work)),
            Err(err) => self.fail(session, page, kind, err),
        }
    }

    /// I/O half of a page fetch. Touches no session state.
    async fn collect_page(&self, filter: &EntryFilter, page: u32) -> Result<PageWork, FeedError> {
        let entries = self.ledger.entries().await?;
        let window = window_page(&entries, page, self.config.page_size);
        let windowed = window.len();

        let mut matched = 0;
        let mut already_present = 0;
        let mut rejections = Vec::new();
        let mut pending = HashSet::new();
        let mut batch: Vec<(LedgerEntry, ContentId)> = Vec::new();

        for entry in window.iter().filter(|entry| filter.matches(entry)) {
            matched += 1;
            let content_id = ContentId::normalize(&entry.content_pointer, &self.config.gateway_prefix);
            if let Err(reason) = self.validator.check_pointer(&content_id) {
                rejections.push(self.reject(entry.sequence_index, content_id, reason));
                continue;
            }
            if self.feed.contains(&content_id) || !pending.insert(content_id.clone()) {
                already_present += 1;
                continue;
            }
            batch.push((entry.clone(), content_id));
        }
        DUPLICATES_SKIPPED.inc_by(already_present as f64);

        let enriched = self.enricher.enrich(batch).await;
        let resolved = enriched.resolved.len();

        let mut items = Vec::with_capacity(resolved);
        for ResolvedEntry {
            entry,
            content_id,
            record,
        } in enriched.resolved
        {
            match self.validator.accept(&content_id, Some(record)) {
                Ok(metadata) => items.push(FeedItem::new(entry, content_id, metadata)),
                Err(reason) => rejections.push(self.reject(entry.sequence_index, content_id, reason)),
            }
        }
        rejections.sort_by_key(|r| r.sequence_index);

        Ok(PageWork {
            ledger_len: entries.len(),
            windowed,
            matched,
            already_present,
            resolved,
            items,
            failures: enriched.failures,
            rejections,
        })
    }

    fn reject(
        &self,
        sequence_index: u64,
        content_id: ContentId,
        reason: RejectReason,
    ) -> Rejection {
        VALIDATION_REJECTIONS.with_label_values(&[reason.label()]).inc();
        warn!(
            pointer = %content_id,
            sequence_index,
            reason = reason.label(),
            "[feed] Rejecting entry: {}",
            reason
        );
        Rejection {
            sequence_index,
            content_id,
            reason,
        }
    }

    /// Append a fetched page if its session is still active, then move the
    /// state machine on.
    fn commit(&self, session: SessionId, page: u32, kind: FetchKind, work: PageWork) -> PageReport {
        let mut state = self.state.lock();

        let mut report = PageReport {
            session,
            page,
            outcome: PageOutcome::Discarded,
            windowed: work.windowed,
            matched: work.matched,
            already_present: work.already_present,
            resolved: work.resolved,
            appended: 0,
            failures: work.failures,
            rejections: work.rejections,
        };

        if state.session.as_ref().map(|s| s.id) != Some(session) {
            metric_inc!(PAGES_FETCHED, &[PageOutcome::Discarded.label()]);
            warn!(%session, page, "[feed] Discarding results of a replaced session");
            return report;
        }

        let offered = work.items.len();
        let appended = self.feed.append(work.items);
        ITEMS_APPENDED.inc_by(appended as f64);
        DUPLICATES_SKIPPED.inc_by((offered - appended) as f64);

        let page_size = self.config.page_size;
        let short = self.config.end_on_short_page && is_short_page(work.windowed, page_size);
        let next = match kind {
            FetchKind::First if work.windowed == 0 || short => FeedPhase::End { page: 1 },
            FetchKind::First => FeedPhase::Idle { page: 1 },
            FetchKind::More if work.windowed == 0 => FeedPhase::End {
                page: page.saturating_sub(1).max(1),
            },
            FetchKind::More if short => FeedPhase::End { page },
            FetchKind::More => FeedPhase::Idle { page },
            // Idle only once the ledger holds entries past this page.
            FetchKind::Refresh if work.ledger_len > page as usize * page_size => {
                FeedPhase::Idle { page }
            }
            FetchKind::Refresh => FeedPhase::End { page },
        };

        report.outcome = if matches!(next, FeedPhase::End { .. }) {
            PageOutcome::Ended
        } else {
            PageOutcome::Appended
        };
        report.appended = appended;
        metric_inc!(PAGES_FETCHED, &[report.outcome.label()]);

        info!(
            %session,
            page,
            windowed = report.windowed,
            matched = report.matched,
            appended,
            dropped = report.dropped(),
            phase = next.name(),
            "[feed] Page committed"
        );
        state.phase = next;
        report
    }

    /// Pause the session on a systemic failure, unless it was replaced.
    fn fail(
        &self,
        session: SessionId,
        page: u32,
        kind: FetchKind,
        err: FeedError,
    ) -> Result<PageReport, FeedError> {
        let mut state = self.state.lock();
        if state.session.as_ref().map(|s| s.id) != Some(session) {
            metric_inc!(PAGES_FETCHED, &[PageOutcome::Discarded.label()]);
            warn!(%session, page, "[feed] Ignoring failure of a replaced session: {}", err);
            let mut report = PageReport::ignored(session, page);
            report.outcome = PageOutcome::Discarded;
            return Ok(report);
        }

        let last = match kind {
            FetchKind::First => 1,
            FetchKind::More => page.saturating_sub(1).max(1),
            FetchKind::Refresh => page,
        };
        state.phase = FeedPhase::Failed {
            page: last,
            reason: err.to_string(),
        };
        metric_inc!(PAGES_FETCHED, &["failed"]);
        error!(%session, page, "[feed] Pagination paused: {}", err);
        Err(err)
    }
}

#[async_trait]
impl<L: LedgerSource, R: ContentResolver> FeedApi for PaginationController<L, R> {
    async fn start(&self, filter: EntryFilter) -> Result<PageReport, FeedError> {
        PaginationController::start(self, filter).await
    }

    async fn advance(&self) -> Result<PageReport, FeedError> {
        PaginationController::advance(self).await
    }

    async fn refresh(&self) -> Result<PageReport, FeedError> {
        PaginationController::refresh(self).await
    }

    fn snapshot(&self) -> FeedSnapshot {
        PaginationController::snapshot(self)
    }

    fn pagination_state(&self) -> PaginationState {
        PaginationController::pagination_state(self)
    }
}
