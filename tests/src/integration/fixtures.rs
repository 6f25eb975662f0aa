//! Ledger and metadata-store builders shared by the integration flows.

use std::io;
use std::path::Path;

use feed_aggregation::{Address, LedgerEntry, MetadataRecord, DEFAULT_GATEWAY_PREFIX};

/// First test author.
pub const ALICE: Address = Address([0xA1; 20]);

/// Second test author.
pub const BOB: Address = Address([0xB0; 20]);

/// Content id of the post at `seq`.
pub fn cid(seq: u64) -> String {
    format!("Qm{seq:04}")
}

/// Ledger entry for post `seq`, one day apart, pointer in gateway form.
pub fn post(seq: u64, author: Address) -> LedgerEntry {
    LedgerEntry::new(
        seq,
        author,
        format!("{DEFAULT_GATEWAY_PREFIX}{}", cid(seq)),
        1_700_000_000 + seq * 86_400,
    )
}

/// A well-formed metadata record for post `seq`.
pub fn record(seq: u64) -> MetadataRecord {
    MetadataRecord {
        name: Some(format!("Post {seq}")),
        description: Some(format!("Body of post {seq}")),
        image: Some(format!("{DEFAULT_GATEWAY_PREFIX}img{seq}")),
        ..MetadataRecord::default()
    }
}

/// Write `entries` as a JSON ledger file.
pub fn write_ledger(path: &Path, entries: &[LedgerEntry]) -> io::Result<()> {
    std::fs::write(path, serde_json::to_vec_pretty(entries)?)
}

/// Store `record` under `<dir>/<id>.json`.
pub fn write_record(dir: &Path, id: &str, record: &MetadataRecord) -> io::Result<()> {
    std::fs::write(dir.join(format!("{id}.json")), serde_json::to_vec(record)?)
}
