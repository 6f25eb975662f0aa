//! # Record Validation
//!
//! Accept/reject decisions for resolved metadata, plus repair of records
//! that are usable once cleaned up.
//!
//! A resolution can succeed at the transport level and still return a
//! record produced by a broken upstream encoder. Those records carry a
//! known placeholder in `image` and are rejected here so they never reach
//! the feed.

use crate::config::FeedConfig;
use crate::domain::{ContentId, MetadataRecord, RejectReason};

/// Validates and repairs metadata records.
#[derive(Clone, Debug)]
pub struct Validator {
    gateway_prefix: String,
    sentinels: Vec<String>,
}

impl Validator {
    /// Create a validator for a gateway prefix and a set of sentinel images.
    pub fn new(gateway_prefix: impl Into<String>, sentinels: Vec<String>) -> Self {
        Self {
            gateway_prefix: gateway_prefix.into(),
            sentinels,
        }
    }

    /// Build from feed configuration.
    pub fn from_config(config: &FeedConfig) -> Self {
        Self::new(config.gateway_prefix.clone(), config.sentinel_images.clone())
    }

    /// Reject pointers that normalize to nothing. Checked before resolution.
    pub fn check_pointer(&self, content_id: &ContentId) -> Result<(), RejectReason> {
        if content_id.is_empty() {
            return Err(RejectReason::EmptyPointer);
        }
        Ok(())
    }

    /// Accept or reject a record as resolved.
    pub fn validate(
        &self,
        content_id: &ContentId,
        record: Option<&MetadataRecord>,
    ) -> Result<(), RejectReason> {
        self.check_pointer(content_id)?;
        let record = record.ok_or(RejectReason::MissingRecord)?;

        if let Some(image) = record.image.as_deref() {
            let image = image.trim();
            if self.sentinels.iter().any(|s| s == image) {
                return Err(RejectReason::SentinelImage(image.to_string()));
            }
        }
        Ok(())
    }

    /// Clean up a record that passed validation.
    ///
    /// Blank strings become absent. An image that is only the gateway prefix
    /// points at nothing and is cleared so the item renders without one.
    pub fn repair(&self, mut record: MetadataRecord) -> MetadataRecord {
        record.name = non_blank(record.name);
        record.description = non_blank(record.description);
        record.external_url = non_blank(record.external_url);
        record.image = non_blank(record.image).filter(|image| !self.is_bare_gateway(image));
        record
    }

    /// Validate, then repair.
    pub fn accept(
        &self,
        content_id: &ContentId,
        record: Option<MetadataRecord>,
    ) -> Result<MetadataRecord, RejectReason> {
        self.validate(content_id, record.as_ref())?;
        record
            .map(|r| self.repair(r))
            .ok_or(RejectReason::MissingRecord)
    }

    fn is_bare_gateway(&self, image: &str) -> bool {
        if self.gateway_prefix.is_empty() {
            return false;
        }
        image.trim_end_matches('/') == self.gateway_prefix.trim_end_matches('/')
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::from_config(&FeedConfig::default())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
