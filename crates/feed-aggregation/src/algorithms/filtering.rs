//! # Entry Filtering
//!
//! Runs ahead of resolution so the content store is only queried for
//! entries that can end up in the feed.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{Address, LedgerEntry};

/// Predicate selecting the entries of a feed session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryFilter {
    /// Entries posted by one address.
    Author(Address),
    /// Every entry.
    All,
}

impl EntryFilter {
    /// Does `entry` belong in the feed?
    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        match self {
            Self::Author(author) => entry.author == *author,
            Self::All => true,
        }
    }

    /// Matching entries, in input order.
    pub fn apply<'a>(&self, entries: &'a [LedgerEntry]) -> Vec<&'a LedgerEntry> {
        entries.iter().filter(|entry| self.matches(entry)).collect()
    }
}

impl fmt::Display for EntryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Author(author) => write!(f, "author={author}"),
            Self::All => f.write_str("all"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address([byte; 20])
    }

    fn entries() -> Vec<LedgerEntry> {
        vec![
            LedgerEntry::new(0, addr(0xA), "a0", 1),
            LedgerEntry::new(1, addr(0xB), "b0", 2),
            LedgerEntry::new(2, addr(0xA), "a1", 3),
        ]
    }

    #[test]
    fn test_author_filter() {
        let entries = entries();
        let matched = EntryFilter::Author(addr(0xA)).apply(&entries);
        let seqs: Vec<u64> = matched.iter().map(|e| e.sequence_index).collect();
        assert_eq!(seqs, vec![0, 2]);
    }

    #[test]
    fn test_author_filter_no_match() {
        let entries = entries();
        assert!(EntryFilter::Author(addr(0xC)).apply(&entries).is_empty());
    }

    #[test]
    fn test_all_filter() {
        let entries = entries();
        assert_eq!(EntryFilter::All.apply(&entries).len(), 3);
    }

    #[test]
    fn test_display() {
        assert_eq!(EntryFilter::All.to_string(), "all");
        assert!(EntryFilter::Author(addr(0xA))
            .to_string()
            .starts_with("author=0x0a0a"));
    }
}
