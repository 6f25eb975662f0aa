//! # Integration Test Flows
//!
//! Drives `PaginationController` against real adapters and from concurrent
//! tasks.
//!
//! ## Flows Tested:
//!
//! 1. **File ledger → file store**: pagination, item-level drops, record repair
//! 2. **Growing ledger**: end of data, refresh, resumed paging
//! 3. **Scroll guard**: many concurrent `advance()` calls, one fetch
//! 4. **Filter change**: a replaced session's page never lands
//! 5. **Caching resolver**: repeated sessions reuse resolved records

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::Barrier;
    use tokio_test::assert_ok;

    use feed_aggregation::{
        invariant_ledger_order, invariant_unique_pointers, CachingResolver, EntryFilter,
        FeedConfig, FeedPhase, FileSystemResolver, InMemoryLedger, JsonFileLedger,
        MetadataRecord, MockContentResolver, MockLedgerSource, PageOutcome, PaginationController,
        RejectReason, ResolveError, BROKEN_IMAGE_SENTINEL, DEFAULT_GATEWAY_PREFIX,
    };

    use crate::integration::fixtures::{cid, post, record, write_ledger, write_record, ALICE, BOB};

    fn seqs(items: &[feed_aggregation::FeedItem]) -> Vec<u64> {
        items.iter().map(|i| i.entry.sequence_index).collect()
    }

    fn mock_store(range: std::ops::Range<u64>) -> MockContentResolver {
        range.fold(MockContentResolver::new(), |r, seq| {
            r.with_record(&cid(seq), record(seq))
        })
    }

    // =============================================================================
    // FLOW 1: FILE LEDGER → FILE STORE
    // =============================================================================

    #[tokio::test]
    async fn test_file_backed_feed_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("store");
        std::fs::create_dir(&store).unwrap();

        let entries: Vec<_> = (0..12)
            .map(|seq| post(seq, if seq == 3 || seq == 7 { BOB } else { ALICE }))
            .collect();
        let ledger_path = dir.path().join("ledger.json");
        write_ledger(&ledger_path, &entries).unwrap();

        for seq in 0..12 {
            match seq {
                // Broken upstream encoding.
                2 => write_record(
                    &store,
                    &cid(seq),
                    &MetadataRecord::named("broken").with_image(BROKEN_IMAGE_SENTINEL),
                )
                .unwrap(),
                // Never uploaded.
                5 => {}
                // Image placeholder with nothing after the gateway.
                6 => write_record(
                    &store,
                    &cid(seq),
                    &MetadataRecord::named("no image").with_image(DEFAULT_GATEWAY_PREFIX),
                )
                .unwrap(),
                9 => std::fs::write(store.join(format!("{}.json", cid(seq))), "{").unwrap(),
                _ => write_record(&store, &cid(seq), &record(seq)).unwrap(),
            }
        }

        let controller = PaginationController::new(
            FeedConfig::default(),
            Arc::new(JsonFileLedger::new(&ledger_path)),
            CachingResolver::new(FileSystemResolver::new(&store), 64),
        )
        .unwrap();

        let first = assert_ok!(controller.start(EntryFilter::Author(ALICE)).await);
        assert_eq!(first.windowed, 8);
        assert_eq!(first.matched, 6);
        assert_eq!(first.appended, 4);
        assert!(matches!(first.failures[0].error, ResolveError::NotFound(_)));
        assert!(matches!(
            first.rejections[0].reason,
            RejectReason::SentinelImage(_)
        ));
        assert_eq!(controller.phase(), FeedPhase::Idle { page: 1 });

        let second = assert_ok!(controller.advance().await);
        assert_eq!(second.outcome, PageOutcome::Ended);
        assert!(matches!(
            second.failures[0].error,
            ResolveError::Malformed { .. }
        ));

        let feed = controller.snapshot();
        assert_eq!(seqs(&feed), vec![0, 1, 4, 6, 8, 10, 11]);
        assert!(invariant_unique_pointers(&feed));
        assert!(invariant_ledger_order(&feed));
        assert_eq!(feed[0].display_date.as_deref(), Some("2023-11-14"));
        assert_eq!(feed[0].content_id.as_str(), cid(0));
        assert_eq!(feed[3].metadata.image, None);

        let third = assert_ok!(controller.advance().await);
        assert_eq!(third.outcome, PageOutcome::Ignored);
        assert_eq!(controller.snapshot().len(), 7);
    }

    #[tokio::test]
    async fn test_missing_ledger_file_pauses_session() {
        let dir = tempfile::tempdir().unwrap();
        let controller = PaginationController::new(
            FeedConfig::default(),
            Arc::new(JsonFileLedger::new(dir.path().join("absent.json"))),
            FileSystemResolver::new(dir.path()),
        )
        .unwrap();

        assert!(controller.start(EntryFilter::All).await.is_err());
        let state = controller.pagination_state();
        assert!(state.error.is_some());
        assert!(!state.reached_end);
        assert!(controller.snapshot().is_empty());
    }

    // =============================================================================
    // FLOW 2: GROWING LEDGER
    // =============================================================================

    #[tokio::test]
    async fn test_growing_ledger_refresh_and_resume() {
        let ledger = Arc::new(
            InMemoryLedger::with_entries("mem", (0..5).map(|seq| post(seq, ALICE)).collect())
                .unwrap(),
        );
        let controller =
            PaginationController::new(FeedConfig::for_testing(), ledger.clone(), mock_store(0..20))
                .unwrap();

        assert_ok!(controller.start(EntryFilter::All).await);
        assert_eq!(controller.phase(), FeedPhase::End { page: 1 });
        assert_eq!(controller.snapshot().len(), 5);

        for seq in 5..13 {
            ledger.append(post(seq, ALICE)).unwrap();
        }

        let refreshed = assert_ok!(controller.refresh().await);
        assert_eq!(refreshed.appended, 3);
        assert_eq!(refreshed.already_present, 5);
        assert_eq!(controller.phase(), FeedPhase::Idle { page: 1 });

        let resumed = assert_ok!(controller.advance().await);
        assert_eq!(resumed.appended, 5);
        assert_eq!(controller.phase(), FeedPhase::End { page: 2 });

        let unchanged = assert_ok!(controller.refresh().await);
        assert_eq!(unchanged.appended, 0);

        let feed = controller.snapshot();
        assert_eq!(seqs(&feed), (0..13).collect::<Vec<_>>());
        assert!(invariant_unique_pointers(&feed));
    }

    // =============================================================================
    // FLOW 3: SCROLL GUARD
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_advance_fetches_once() {
        let entries: Vec<_> = (0..24).map(|seq| post(seq, ALICE)).collect();
        let resolver = (8..16).fold(mock_store(0..24), |r, seq| {
            r.with_delay(&cid(seq), Duration::from_millis(200))
        });
        let controller = Arc::new(
            PaginationController::new(
                FeedConfig::for_testing(),
                Arc::new(MockLedgerSource::new(entries)),
                resolver,
            )
            .unwrap(),
        );
        assert_ok!(controller.start(EntryFilter::All).await);

        let barrier = Arc::new(Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let controller = controller.clone();
                let barrier = barrier.clone();
                tokio::spawn(async move {
                    barrier.wait().await;
                    controller.advance().await
                })
            })
            .collect();

        let mut outcomes = Vec::new();
        for handle in handles {
            outcomes.push(assert_ok!(handle.await.unwrap()).outcome);
        }

        let appended = outcomes
            .iter()
            .filter(|o| **o == PageOutcome::Appended)
            .count();
        assert_eq!(appended, 1);
        assert_eq!(controller.ledger().calls(), 2);
        assert_eq!(controller.resolver().calls(), 16);
        assert_eq!(controller.phase(), FeedPhase::Idle { page: 2 });
    }

    // =============================================================================
    // FLOW 4: FILTER CHANGE
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_filter_change_mid_fetch() {
        let entries: Vec<_> = (0..4)
            .map(|seq| post(seq, ALICE))
            .chain((4..6).map(|seq| post(seq, BOB)))
            .collect();
        let resolver = (0..4).fold(mock_store(0..6), |r, seq| {
            r.with_delay(&cid(seq), Duration::from_millis(300))
        });
        let controller = Arc::new(
            PaginationController::new(
                FeedConfig::for_testing(),
                Arc::new(MockLedgerSource::new(entries)),
                resolver,
            )
            .unwrap(),
        );

        let stale = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.start(EntryFilter::Author(ALICE)).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        let current = assert_ok!(controller.start(EntryFilter::Author(BOB)).await);
        assert_eq!(current.appended, 2);

        let stale = assert_ok!(stale.await.unwrap());
        assert_eq!(stale.outcome, PageOutcome::Discarded);
        assert_eq!(seqs(&controller.snapshot()), vec![4, 5]);
        assert!(controller.snapshot().iter().all(|i| i.entry.author == BOB));
    }

    // =============================================================================
    // FLOW 5: CACHING RESOLVER
    // =============================================================================

    #[tokio::test]
    async fn test_cache_shared_across_sessions() {
        let entries: Vec<_> = (0..6).map(|seq| post(seq, ALICE)).collect();
        let cache = Arc::new(CachingResolver::new(mock_store(0..6), 16));
        let controller = PaginationController::new(
            FeedConfig::for_testing(),
            Arc::new(MockLedgerSource::new(entries)),
            cache.clone(),
        )
        .unwrap();

        assert_ok!(controller.start(EntryFilter::All).await);
        assert_ok!(controller.start(EntryFilter::Author(ALICE)).await);

        assert_eq!(controller.snapshot().len(), 6);
        assert_eq!(cache.inner().calls(), 6);
        assert_eq!(cache.hits(), 6);
    }

    #[tokio::test]
    async fn test_metrics_exported_after_paging() {
        feed_telemetry::register_metrics().unwrap();
        let entries: Vec<_> = (0..3).map(|seq| post(seq, ALICE)).collect();
        let controller = PaginationController::new(
            FeedConfig::for_testing(),
            Arc::new(MockLedgerSource::new(entries)),
            mock_store(0..3),
        )
        .unwrap();
        assert_ok!(controller.start(EntryFilter::All).await);

        let text = feed_telemetry::encode_metrics().unwrap();
        assert!(text.contains("feed_pages_fetched_total"));
        assert!(text.contains("feed_items_appended_total"));
        assert!(text.contains("feed_resolution_duration_seconds"));
    }
}
