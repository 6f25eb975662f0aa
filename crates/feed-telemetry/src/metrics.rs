//! Prometheus metrics for the feed aggregation pipeline.
//!
//! All metrics follow the naming convention: `feed_<area>_<metric>_<unit>`
//!
//! Collectors can be updated before `register_metrics()` is called; they only
//! appear in `encode_metrics()` output once registered.

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // PAGINATION METRICS
    // =========================================================================

    /// Page fetches by outcome
    pub static ref PAGES_FETCHED: CounterVec = CounterVec::new(
        Opts::new("feed_pages_fetched_total", "Page fetches by outcome"),
        &["outcome"]  // outcome: appended/ended/discarded/failed
    ).expect("metric creation failed");

    /// advance() calls absorbed by the in-flight guard
    pub static ref ADVANCE_IGNORED: Counter = Counter::new(
        "feed_advance_ignored_total",
        "Page advance requests ignored while a fetch was outstanding"
    ).expect("metric creation failed");

    // =========================================================================
    // ACCUMULATOR METRICS
    // =========================================================================

    /// Items appended to a feed
    pub static ref ITEMS_APPENDED: Counter = Counter::new(
        "feed_items_appended_total",
        "Total feed items appended"
    ).expect("metric creation failed");

    /// Items skipped because their content pointer was already present
    pub static ref DUPLICATES_SKIPPED: Counter = Counter::new(
        "feed_duplicates_skipped_total",
        "Feed items skipped as duplicates"
    ).expect("metric creation failed");

    // =========================================================================
    // ENRICHMENT METRICS
    // =========================================================================

    /// Content resolutions by outcome
    pub static ref RESOLUTIONS: CounterVec = CounterVec::new(
        Opts::new("feed_resolutions_total", "Content resolutions by outcome"),
        &["outcome"]  // outcome: ok/not_found/timeout/malformed/transport
    ).expect("metric creation failed");

    /// Content resolution latency
    pub static ref RESOLUTION_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "feed_resolution_duration_seconds",
            "Time spent resolving a content pointer"
        ).buckets(exponential_buckets(0.001, 2.0, 15).expect("valid buckets"))
    ).expect("metric creation failed");

    // =========================================================================
    // VALIDATION METRICS
    // =========================================================================

    /// Records rejected by the validator
    pub static ref VALIDATION_REJECTIONS: CounterVec = CounterVec::new(
        Opts::new("feed_validation_rejections_total", "Records rejected by validation"),
        &["reason"]  // reason: missing_record/empty_pointer/sentinel_image
    ).expect("metric creation failed");
}

/// Handle for the registered metrics
pub struct MetricsHandle {
    registry: Arc<Registry>,
}

impl MetricsHandle {
    /// Registry the collectors live in.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; already-registered collectors are skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Pagination
        Box::new(PAGES_FETCHED.clone()),
        Box::new(ADVANCE_IGNORED.clone()),
        // Accumulator
        Box::new(ITEMS_APPENDED.clone()),
        Box::new(DUPLICATES_SKIPPED.clone()),
        // Enrichment
        Box::new(RESOLUTIONS.clone()),
        Box::new(RESOLUTION_DURATION.clone()),
        // Validation
        Box::new(VALIDATION_REJECTIONS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}
