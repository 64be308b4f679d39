use async_trait::async_trait;

use crate::entity::{Entity, EntityKey, Query, Record};
use crate::error::DatastoreResult;
use crate::transaction::Transaction;

/// Transactional key-value store holding one entity group.
///
/// All implementations must satisfy these invariants:
/// - A query observes a single consistent cut: every write of a committed
///   transaction is visible to it, or none is.
/// - `commit` applies all writes of a transaction or none of them.
/// - `commit` fails with `Conflict` if any entity read through the
///   transaction has changed since it was read.
/// - All I/O errors are propagated, never silently ignored.
#[async_trait]
pub trait Datastore: Send + Sync {
    /// Read an entity and its current revision.
    ///
    /// Returns `Ok(None)` if the entity does not exist.
    async fn read(&self, key: &EntityKey) -> DatastoreResult<Option<Record>>;

    /// All entities matching `query`, ordered by key.
    async fn query(&self, query: &Query) -> DatastoreResult<Vec<(EntityKey, Entity)>>;

    /// Validate the read set of `txn` and apply its writes atomically.
    async fn commit(&self, txn: Transaction) -> DatastoreResult<()>;

    /// Read an entity without tracking its revision.
    async fn get(&self, key: &EntityKey) -> DatastoreResult<Option<Entity>> {
        Ok(self.read(key).await?.map(|record| record.entity))
    }

    /// Write a single entity outside of any read-modify-write cycle.
    async fn put(&self, key: EntityKey, entity: Entity) -> DatastoreResult<()> {
        let mut txn = Transaction::new();
        txn.put(key, entity);
        self.commit(txn).await
    }

    /// Delete an entity. Deleting a missing entity is not an error.
    async fn delete(&self, key: &EntityKey) -> DatastoreResult<()> {
        let mut txn = Transaction::new();
        txn.delete(key.clone());
        self.commit(txn).await
    }
}
