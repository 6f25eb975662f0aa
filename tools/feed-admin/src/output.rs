//! Rendering of feed items and page reports.

use std::io::{self, Write};

use feed_aggregation::{FeedItem, PageReport};

/// One-line text rendering of an item.
pub fn render_item(item: &FeedItem) -> String {
    let date = item.display_date.as_deref().unwrap_or("----------");
    let title = item.metadata.name.as_deref().unwrap_or("(untitled)");
    let mut line = format!(
        "#{:<6} {} {} by {} [{}]",
        item.entry.sequence_index, date, title, item.entry.author, item.content_id
    );
    if let Some(image) = &item.metadata.image {
        line.push_str(" img=");
        line.push_str(image);
    }
    line
}

/// One-line summary of a page operation.
pub fn render_report(report: &PageReport) -> String {
    format!(
        "page {} {}: windowed={} matched={} appended={} present={} failed={} rejected={}",
        report.page,
        report.outcome.label(),
        report.windowed,
        report.matched,
        report.appended,
        report.already_present,
        report.failures.len(),
        report.rejections.len()
    )
}

/// Write `items` as text lines, or as JSON lines when `json` is set.
pub fn write_feed<W: Write>(out: &mut W, items: &[FeedItem], json: bool) -> io::Result<()> {
    for item in items {
        if json {
            serde_json::to_writer(&mut *out, item)?;
            writeln!(out)?;
        } else {
            writeln!(out, "{}", render_item(item))?;
        }
    }
    out.flush()
}
