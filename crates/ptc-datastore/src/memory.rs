use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::entity::{Entity, EntityKey, Query, Record};
use crate::error::{DatastoreError, DatastoreResult};
use crate::traits::Datastore;
use crate::transaction::Transaction;

/// Entities keyed and ordered by [`EntityKey`], with per-entity revisions.
///
/// Shared by the in-memory and commit-log backends; callers provide the
/// locking.
#[derive(Debug, Default)]
pub(crate) struct Table {
    entries: BTreeMap<EntityKey, Record>,
    last_revision: u64,
}

impl Table {
    pub(crate) fn read(&self, key: &EntityKey) -> Option<Record> {
        self.entries.get(key).cloned()
    }

    pub(crate) fn query(&self, query: &Query) -> Vec<(EntityKey, Entity)> {
        self.entries
            .iter()
            .filter(|(key, record)| query.matches(key, &record.entity))
            .map(|(key, record)| (key.clone(), record.entity.clone()))
            .collect()
    }

    /// Fails with `Conflict` on the first read whose revision has moved.
    pub(crate) fn validate(&self, txn: &Transaction) -> DatastoreResult<()> {
        for (key, observed) in txn.reads() {
            let current = self.entries.get(key).map(|r| r.revision);
            if current != observed {
                return Err(DatastoreError::Conflict { key: key.clone() });
            }
        }
        Ok(())
    }

    pub(crate) fn apply(&mut self, writes: Vec<(EntityKey, Option<Entity>)>) {
        for (key, entity) in writes {
            match entity {
                Some(entity) => {
                    self.last_revision += 1;
                    let revision = self.last_revision;
                    self.entries.insert(key, Record { entity, revision });
                }
                None => {
                    self.entries.remove(&key);
                }
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// In-memory datastore.
///
/// Intended for tests, development, and single-process deployments. All
/// entities are held behind a `RwLock`; commits validate and apply under the
/// write lock, so every query sees a consistent cut.
pub struct InMemoryDatastore {
    table: RwLock<Table>,
    unavailable: AtomicBool,
}

impl InMemoryDatastore {
    /// Create a new empty datastore.
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table::default()),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Number of entities currently stored.
    pub fn len(&self) -> usize {
        self.table.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the datastore is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// While set, every operation fails with [`DatastoreError::Unavailable`].
    /// Used to exercise failure paths.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> DatastoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DatastoreError::Unavailable);
        }
        Ok(())
    }
}

impl Default for InMemoryDatastore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Datastore for InMemoryDatastore {
    async fn read(&self, key: &EntityKey) -> DatastoreResult<Option<Record>> {
        self.check_available()?;
        Ok(self.table.read().expect("lock poisoned").read(key))
    }

    async fn query(&self, query: &Query) -> DatastoreResult<Vec<(EntityKey, Entity)>> {
        self.check_available()?;
        Ok(self.table.read().expect("lock poisoned").query(query))
    }

    async fn commit(&self, txn: Transaction) -> DatastoreResult<()> {
        self.check_available()?;
        let mut table = self.table.write().expect("lock poisoned");
        table.validate(&txn)?;
        table.apply(txn.into_writes());
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryDatastore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDatastore")
            .field("entity_count", &self.len())
            .finish()
    }
}
