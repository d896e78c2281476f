//! In-process record store

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use lph_core::entity::{record_id, EntityKind, Record};

use crate::{ensure_id, merge, RecordStore, StoreError, StoreResult, WriteGuard};

/// Record store held in memory, one vector per kind in insertion order.
///
/// Deletes are hard deletes. [`MemoryStore::set_available`] simulates an
/// outage so callers' error paths can be exercised.
#[derive(Debug)]
pub struct MemoryStore {
    collections: RwLock<HashMap<EntityKind, Vec<Record>>>,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Store pre-populated with records; ids are assigned where missing
    pub fn with_records(seed: impl IntoIterator<Item = (EntityKind, Vec<Record>)>) -> Self {
        let mut collections = HashMap::new();
        for (kind, records) in seed {
            let entries: &mut Vec<Record> = collections.entry(kind).or_default();
            for mut record in records {
                ensure_id(&mut record);
                entries.push(record);
            }
        }
        Self {
            collections: RwLock::new(collections),
            available: AtomicBool::new(true),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store is offline".into()))
        }
    }
}

fn position(records: &[Record], id: &str) -> Option<usize> {
    records.iter().position(|r| record_id(r) == Some(id))
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list(&self, kind: EntityKind) -> StoreResult<Vec<Record>> {
        self.check_available()?;
        let collections = self.collections.read().await;
        Ok(collections.get(&kind).cloned().unwrap_or_default())
    }

    async fn get(&self, kind: EntityKind, id: &str) -> StoreResult<Option<Record>> {
        self.check_available()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(&kind)
            .and_then(|records| position(records, id).map(|i| records[i].clone())))
    }

    async fn upsert(&self, kind: EntityKind, mut record: Record) -> StoreResult<Record> {
        self.check_available()?;
        let id = ensure_id(&mut record);

        let mut collections = self.collections.write().await;
        let records = collections.entry(kind).or_default();
        let stored = match position(records, &id) {
            Some(i) => {
                merge(&mut records[i], record);
                records[i].clone()
            }
            None => {
                records.push(record.clone());
                record
            }
        };
        debug!(%kind, %id, "Upserted record");
        Ok(stored)
    }

    async fn upsert_if(
        &self,
        kind: EntityKind,
        record: Record,
        guard: &WriteGuard,
    ) -> StoreResult<Record> {
        self.check_available()?;
        let id = record_id(&record).unwrap_or_default().to_string();
        let not_found = || StoreError::NotFound {
            kind,
            id: id.clone(),
        };

        let mut collections = self.collections.write().await;
        let records = collections.get_mut(&kind).ok_or_else(not_found)?;
        let i = position(records, &id).ok_or_else(not_found)?;
        if !guard.matches(&records[i]) {
            debug!(%kind, %id, "Guarded write rejected");
            return Err(StoreError::Conflict { kind, id });
        }
        merge(&mut records[i], record);
        Ok(records[i].clone())
    }

    async fn delete(&self, kind: EntityKind, id: &str) -> StoreResult<()> {
        self.check_available()?;
        let mut collections = self.collections.write().await;
        let records = collections.entry(kind).or_default();
        match position(records, id) {
            Some(i) => {
                records.remove(i);
                debug!(%kind, %id, "Deleted record");
                Ok(())
            }
            None => Err(StoreError::NotFound {
                kind,
                id: id.to_string(),
            }),
        }
    }
}
