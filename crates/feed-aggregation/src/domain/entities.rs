//! # Domain Entities
//!
//! Ledger entries, resolved metadata and the feed items built from them.

use chrono::DateTime;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::errors::FeedError;
use super::value_objects::ContentId;

/// 20-byte account address.
///
/// Parsed from `0x`-prefixed hex in either case; always displayed lowercase.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Parse a hex address, with or without the `0x` prefix.
    pub fn from_hex(value: &str) -> Result<Self, FeedError> {
        let trimmed = value.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        let bytes =
            hex::decode(digits).map_err(|e| FeedError::InvalidAddress(format!("{value}: {e}")))?;
        let array: [u8; 20] = bytes.try_into().map_err(|b: Vec<u8>| {
            FeedError::InvalidAddress(format!("{value}: expected 20 bytes, got {}", b.len()))
        })?;
        Ok(Self(array))
    }

    /// Lowercase `0x`-prefixed hex form.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Address::from_hex(&raw).map_err(de::Error::custom)
    }
}

/// One immutable record of the post ledger.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Position assigned by the ledger; unique and increasing.
    pub sequence_index: u64,
    /// Posting account.
    pub author: Address,
    /// Pointer into the content store, usually a gateway URL.
    pub content_pointer: String,
    /// Unix timestamp in seconds.
    pub created_at: u64,
    /// Listing price in the chain's smallest unit.
    #[serde(default)]
    pub price: u128,
    /// Number of copies offered.
    #[serde(default)]
    pub amount: u64,
}

impl LedgerEntry {
    /// Create an entry without listing terms.
    pub fn new(
        sequence_index: u64,
        author: Address,
        content_pointer: impl Into<String>,
        created_at: u64,
    ) -> Self {
        Self {
            sequence_index,
            author,
            content_pointer: content_pointer.into(),
            created_at,
            price: 0,
            amount: 0,
        }
    }

    /// Attach listing terms.
    pub fn with_listing(mut self, price: u128, amount: u64) -> Self {
        self.price = price;
        self.amount = amount;
        self
    }
}

/// Key/value attribute of a metadata record.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Attribute {
    /// Attribute name.
    pub trait_type: String,
    /// Attribute value; strings and numbers both occur.
    pub value: serde_json::Value,
}

/// Off-chain payload a content pointer resolves to.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct MetadataRecord {
    /// Post title.
    pub name: Option<String>,
    /// Post body.
    pub description: Option<String>,
    /// Image URI.
    pub image: Option<String>,
    /// Link to the post elsewhere.
    pub external_url: Option<String>,
    /// Ordered attributes.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl MetadataRecord {
    /// Record with only a name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the image URI.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// A ledger entry merged with its validated metadata.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct FeedItem {
    /// Normalized content pointer; the feed's uniqueness key.
    pub content_id: ContentId,
    /// Source entry.
    pub entry: LedgerEntry,
    /// Validated and repaired metadata.
    pub metadata: MetadataRecord,
    /// `YYYY-MM-DD` (UTC) derived from `created_at`.
    pub display_date: Option<String>,
}

impl FeedItem {
    /// Build a feed item, deriving the display date.
    pub fn new(entry: LedgerEntry, content_id: ContentId, metadata: MetadataRecord) -> Self {
        let display_date = display_date(entry.created_at);
        Self {
            content_id,
            entry,
            metadata,
            display_date,
        }
    }
}

/// Format a unix timestamp as a UTC calendar date.
///
/// Zero means the ledger carried no date.
pub fn display_date(created_at: u64) -> Option<String> {
    if created_at == 0 {
        return None;
    }
    let secs = i64::try_from(created_at).ok()?;
    DateTime::from_timestamp(secs, 0).map(|dt| dt.format("%Y-%m-%d").to_string())
}
