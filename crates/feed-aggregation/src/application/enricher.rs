//! # Enricher
//!
//! Resolves a page's filtered entries against the content store.
//!
//! Lookups run concurrently up to a fixed cap and are collected through
//! `buffered`, which yields results in submission order whatever order they
//! complete in. A failed lookup is recorded and its entry dropped; it never
//! fails the batch.

use futures::stream::{self, StreamExt};
use std::time::Duration;

use feed_telemetry::metrics::{HistogramTimer, RESOLUTIONS, RESOLUTION_DURATION};
use tracing::{debug, warn};

use crate::domain::{ContentId, LedgerEntry, MetadataRecord, ResolutionFailure, ResolveError};
use crate::ports::ContentResolver;

/// An entry together with its resolved record.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedEntry {
    /// Source entry.
    pub entry: LedgerEntry,
    /// Normalized pointer that was resolved.
    pub content_id: ContentId,
    /// Resolved record, not yet validated.
    pub record: MetadataRecord,
}

/// Output of one enrichment pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnrichedBatch {
    /// Successful resolutions, in input order.
    pub resolved: Vec<ResolvedEntry>,
    /// Failed resolutions, in input order.
    pub failures: Vec<ResolutionFailure>,
}

/// Bounded fan-out over a content resolver.
pub struct Enricher<R: ContentResolver> {
    resolver: R,
    max_concurrency: usize,
    timeout: Duration,
}

impl<R: ContentResolver> Enricher<R> {
    /// Create an enricher. A zero cap is treated as 1.
    pub fn new(resolver: R, max_concurrency: usize, timeout: Duration) -> Self {
        Self {
            resolver,
            max_concurrency: max_concurrency.max(1),
            timeout,
        }
    }

    /// The wrapped resolver.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Resolve every entry of `batch`, preserving input order.
    pub async fn enrich(&self, batch: Vec<(LedgerEntry, ContentId)>) -> EnrichedBatch {
        if batch.is_empty() {
            return EnrichedBatch::default();
        }

        let resolver = &self.resolver;
        let limit = self.timeout;
        let outcomes: Vec<_> = stream::iter(batch.into_iter().map(|(entry, content_id)| async move {
            let result = resolve_with_timeout(resolver, &content_id, limit).await;
            (entry, content_id, result)
        }))
        .buffered(self.max_concurrency)
        .collect()
        .await;

        let mut enriched = EnrichedBatch::default();
        for (entry, content_id, result) in outcomes {
            match result {
                Ok(record) => enriched.resolved.push(ResolvedEntry {
                    entry,
                    content_id,
                    record,
                }),
                Err(error) => {
                    warn!(
                        pointer = %content_id,
                        sequence_index = entry.sequence_index,
                        kind = error.kind(),
                        "[feed] Dropping entry: {}",
                        error
                    );
                    enriched.failures.push(ResolutionFailure {
                        sequence_index: entry.sequence_index,
                        content_id,
                        error,
                    });
                }
            }
        }
        enriched
    }
}

async fn resolve_with_timeout<R: ContentResolver>(
    resolver: &R,
    content_id: &ContentId,
    limit: Duration,
) -> Result<MetadataRecord, ResolveError> {
    let _timer = HistogramTimer::new(&RESOLUTION_DURATION);
    debug!(pointer = %content_id, "[feed] Resolving content");

    let result = match tokio::time::timeout(limit, resolver.resolve(content_id)).await {
        Ok(result) => result,
        Err(_) => Err(ResolveError::Timeout {
            pointer: content_id.to_string(),
            timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }),
    };

    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    RESOLUTIONS.with_label_values(&[outcome]).inc();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Address;
    use crate::ports::MockContentResolver;
    use rand::Rng;

    fn batch(ids: &[&str]) -> Vec<(LedgerEntry, ContentId)> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| {
                (
                    LedgerEntry::new(i as u64, Address::ZERO, *id, 1),
                    ContentId::from(*id),
                )
            })
            .collect()
    }

    fn resolved_ids(batch: &EnrichedBatch) -> Vec<&str> {
        batch.resolved.iter().map(|r| r.content_id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let enricher = Enricher::new(MockContentResolver::new(), 8, Duration::from_secs(1));
        let result = enricher.enrich(Vec::new()).await;
        assert!(result.resolved.is_empty());
        assert_eq!(enricher.resolver().calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_order_preserved_under_random_latency() {
        let ids: Vec<String> = (0..8).map(|i| format!("cid-{i}")).collect();
        let mut rng = rand::thread_rng();
        let mut resolver = MockContentResolver::new();
        for id in &ids {
            resolver = resolver
                .with_record(id, MetadataRecord::named(id.clone()))
                .with_delay(id, Duration::from_millis(rng.gen_range(1..200)));
        }

        let enricher = Enricher::new(resolver, 8, Duration::from_secs(5));
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let result = enricher.enrich(batch(&refs)).await;

        assert_eq!(resolved_ids(&result), refs);
        assert!(result.failures.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_failure_does_not_fail_batch() {
        let resolver = MockContentResolver::new()
            .with_record("a", MetadataRecord::named("A"))
            .with_record("c", MetadataRecord::named("C"))
            .with_failure(
                "b",
                ResolveError::Malformed {
                    pointer: "b".into(),
                    reason: "not json".into(),
                },
            );

        let enricher = Enricher::new(resolver, 8, Duration::from_secs(1));
        let result = enricher.enrich(batch(&["a", "b", "c", "d"])).await;

        assert_eq!(resolved_ids(&result), vec!["a", "c"]);
        let failed: Vec<_> = result.failures.iter().map(|f| f.error.kind()).collect();
        assert_eq!(failed, vec!["malformed", "not_found"]);
        assert_eq!(result.failures[0].sequence_index, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_recorded_per_item() {
        let resolver = MockContentResolver::new()
            .with_record("slow", MetadataRecord::named("slow"))
            .with_delay("slow", Duration::from_secs(30))
            .with_record("fast", MetadataRecord::named("fast"));

        let enricher = Enricher::new(resolver, 8, Duration::from_millis(100));
        let result = enricher.enrich(batch(&["slow", "fast"])).await;

        assert_eq!(resolved_ids(&result), vec!["fast"]);
        assert!(matches!(
            result.failures[0].error,
            ResolveError::Timeout { timeout_ms: 100, .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_cap_respected() {
        let ids: Vec<String> = (0..12).map(|i| format!("cid-{i}")).collect();
        let mut resolver = MockContentResolver::new();
        for id in &ids {
            resolver = resolver
                .with_record(id, MetadataRecord::named(id.clone()))
                .with_delay(id, Duration::from_millis(50));
        }

        let enricher = Enricher::new(resolver, 3, Duration::from_secs(5));
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let result = enricher.enrich(batch(&refs)).await;

        assert_eq!(result.resolved.len(), 12);
        assert_eq!(enricher.resolver().max_in_flight(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookups_overlap() {
        let mut resolver = MockContentResolver::new();
        for id in ["a", "b", "c"] {
            resolver = resolver
                .with_record(id, MetadataRecord::named(id))
                .with_delay(id, Duration::from_millis(100));
        }

        let enricher = Enricher::new(resolver, 8, Duration::from_secs(5));
        let started = tokio::time::Instant::now();
        enricher.enrich(batch(&["a", "b", "c"])).await;

        assert_eq!(enricher.resolver().max_in_flight(), 3);
        assert!(started.elapsed() < Duration::from_millis(300));
    }
}
