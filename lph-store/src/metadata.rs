//! Bookkeeping sub-document stored alongside every MongoDB record

use bson::{doc, DateTime, Document};
use serde::{Deserialize, Serialize};

/// Field name of the metadata sub-document
pub const METADATA_FIELD: &str = "metadata";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Whether this record has been soft-deleted
    #[serde(default)]
    pub is_deleted: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,

    /// Insertion time; listings are ordered by it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
}

impl Metadata {
    pub fn new() -> Self {
        let now = DateTime::now();
        Self {
            is_deleted: false,
            deleted_at: None,
            updated_at: Some(now),
            created_at: Some(now),
        }
    }

    /// Filter clause matching live (not soft-deleted) records
    pub fn live() -> Document {
        doc! { "metadata.is_deleted": { "$ne": true } }
    }

    /// `$set` fields for any write
    pub fn touch(now: DateTime) -> Document {
        doc! {
            "metadata.is_deleted": false,
            "metadata.updated_at": now,
        }
    }

    /// `$setOnInsert` fields for a newly inserted record
    pub fn on_insert(now: DateTime) -> Document {
        doc! { "metadata.created_at": now }
    }

    /// `$set` fields that soft-delete a record
    pub fn tombstone(now: DateTime) -> Document {
        doc! {
            "metadata.is_deleted": true,
            "metadata.deleted_at": now,
            "metadata.updated_at": now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_round_trip() {
        let metadata = Metadata::new();
        let document = bson::to_document(&metadata).unwrap();
        assert!(!document.get_bool("is_deleted").unwrap());
        assert!(document.get("deleted_at").is_none());

        let parsed: Metadata = bson::from_document(document).unwrap();
        assert_eq!(parsed, metadata);
    }
}
