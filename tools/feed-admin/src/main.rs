//! Feed-Admin: Society Feed admin CLI

use std::io;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use feed_admin::output::{render_report, write_feed};
use feed_admin::{page_feed, Args, ContentSource};
use feed_aggregation::{
    CachingResolver, ContentResolver, EntryFilter, FeedConfig, FileSystemResolver,
    HttpGatewayResolver, JsonFileLedger, PaginationController,
};
use feed_telemetry::{encode_metrics, init_telemetry, TelemetryConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut telemetry = TelemetryConfig::from_env();
    if args.verbose {
        telemetry = telemetry.with_log_level("debug");
    }
    let _guard = init_telemetry(&telemetry).context("initializing telemetry")?;

    let config = args.feed_config()?;
    let filter = args.filter()?;
    let ledger = Arc::new(JsonFileLedger::new(&args.ledger));

    match args.content_source() {
        ContentSource::Store(dir) => {
            info!("[feed] Resolving metadata from {}", dir.display());
            let resolver = CachingResolver::new(FileSystemResolver::new(dir), args.cache_size);
            run(&args, config, ledger, resolver, filter).await
        }
        ContentSource::Gateway(url) => {
            info!("[feed] Resolving metadata through {}", url);
            let gateway = HttpGatewayResolver::new(url, config.resolve_timeout())?;
            let resolver = CachingResolver::new(gateway, args.cache_size);
            run(&args, config, ledger, resolver, filter).await
        }
    }
}

async fn run<R: ContentResolver>(
    args: &Args,
    config: FeedConfig,
    ledger: Arc<JsonFileLedger>,
    resolver: R,
    filter: EntryFilter,
) -> anyhow::Result<()> {
    let controller = PaginationController::new(config, ledger, resolver)?;
    let reports = page_feed(&controller, filter, args.pages)
        .await
        .with_context(|| format!("paging {}", args.ledger.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_feed(&mut out, &controller.snapshot(), args.json)?;

    if !args.json {
        for report in &reports {
            eprintln!("{}", render_report(report));
        }
    }
    if args.metrics {
        eprintln!("{}", encode_metrics()?);
    }
    Ok(())
}
