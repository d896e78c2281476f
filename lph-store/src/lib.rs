//! LPH Store - record persistence for the LPH back office
//!
//! The back office talks to persistence through [`RecordStore`]: a small,
//! kind-keyed list / get / upsert / delete surface over untyped records.
//! Two backends are provided:
//!
//! - [`MemoryStore`]: process-local, used in tests and local development
//! - [`MongoRecordStore`]: MongoDB with soft deletes
//!
//! Every call is a single round trip; there are no retries. A failed call
//! surfaces as [`StoreError`] and the caller decides what to report.

mod error;
mod guard;
mod memory;
mod metadata;
mod mongo;

pub use error::{StoreError, StoreResult};
pub use guard::WriteGuard;
pub use memory::MemoryStore;
pub use metadata::Metadata;
pub use mongo::{redact_uri, MongoRecordStore};

use async_trait::async_trait;
use lph_core::entity::{record_id, Entity, EntityKind, Record, ID_FIELD};
use serde_json::Value;

/// Persistence boundary for every entity kind
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &'static str;

    /// All live records of a kind, in insertion order
    async fn list(&self, kind: EntityKind) -> StoreResult<Vec<Record>>;

    async fn get(&self, kind: EntityKind, id: &str) -> StoreResult<Option<Record>>;

    /// Insert or merge a record.
    ///
    /// A record without an `id` gets a fresh UUID. An existing record is
    /// updated field by field; keys absent from `record` keep their stored
    /// value. Returns the stored record.
    async fn upsert(&self, kind: EntityKind, record: Record) -> StoreResult<Record>;

    /// Merge into an existing record only if `guard` holds on its current
    /// state. Fails with [`StoreError::Conflict`] when it does not and with
    /// [`StoreError::NotFound`] when the record is absent.
    async fn upsert_if(
        &self,
        kind: EntityKind,
        record: Record,
        guard: &WriteGuard,
    ) -> StoreResult<Record>;

    async fn delete(&self, kind: EntityKind, id: &str) -> StoreResult<()>;
}

impl dyn RecordStore {
    /// Typed [`RecordStore::list`]
    pub async fn list_as<T: Entity>(&self) -> StoreResult<Vec<T>> {
        self.list(T::KIND)
            .await?
            .into_iter()
            .map(|record| decode(T::KIND, record))
            .collect()
    }

    pub async fn get_as<T: Entity>(&self, id: &str) -> StoreResult<Option<T>> {
        self.get(T::KIND, id)
            .await?
            .map(|record| decode(T::KIND, record))
            .transpose()
    }

    /// Typed [`RecordStore::upsert`]; returns the stored entity with its id
    pub async fn upsert_as<T: Entity>(&self, entity: &T) -> StoreResult<T> {
        let stored = self.upsert(T::KIND, entity.to_record()).await?;
        decode(T::KIND, stored)
    }
}

fn decode<T: Entity>(kind: EntityKind, record: Record) -> StoreResult<T> {
    T::from_record(record)
        .map_err(|e| StoreError::Serialization(format!("{kind}: {e}")))
}

/// Id of `record`, assigning a fresh UUID if it has none
pub(crate) fn ensure_id(record: &mut Record) -> String {
    match record_id(record) {
        Some(id) => id.to_string(),
        None => {
            let id = uuid::Uuid::new_v4().to_string();
            record.insert(ID_FIELD.to_string(), Value::String(id.clone()));
            id
        }
    }
}

/// Shallow merge: every key of `patch` overwrites `base`
pub(crate) fn merge(base: &mut Record, patch: Record) {
    for (key, value) in patch {
        base.insert(key, value);
    }
}
