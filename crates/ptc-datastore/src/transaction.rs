use std::collections::BTreeMap;
use std::future::Future;

use tracing::debug;

use crate::entity::{Entity, EntityKey};
use crate::error::{DatastoreError, DatastoreResult};
use crate::traits::Datastore;

/// Default number of attempts made by [`run_in_transaction`].
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// An optimistic transaction: the revisions it observed and the writes it
/// will apply. Nothing reaches the backend until [`Datastore::commit`].
#[derive(Clone, Debug, Default)]
pub struct Transaction {
    reads: BTreeMap<EntityKey, Option<u64>>,
    writes: BTreeMap<EntityKey, Option<Entity>>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read an entity through the transaction.
    ///
    /// Pending writes of this transaction are visible. The first revision
    /// observed for a key is the one validated at commit.
    pub async fn get(
        &mut self,
        ds: &dyn Datastore,
        key: &EntityKey,
    ) -> DatastoreResult<Option<Entity>> {
        if let Some(pending) = self.writes.get(key) {
            return Ok(pending.clone());
        }
        let record = ds.read(key).await?;
        self.reads
            .entry(key.clone())
            .or_insert(record.as_ref().map(|r| r.revision));
        Ok(record.map(|r| r.entity))
    }

    pub fn put(&mut self, key: EntityKey, entity: Entity) {
        self.writes.insert(key, Some(entity));
    }

    pub fn delete(&mut self, key: EntityKey) {
        self.writes.insert(key, None);
    }

    /// Observed revisions; `None` means the entity did not exist.
    pub fn reads(&self) -> impl Iterator<Item = (&EntityKey, Option<u64>)> {
        self.reads.iter().map(|(k, r)| (k, *r))
    }

    pub fn is_read_only(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn into_writes(self) -> Vec<(EntityKey, Option<Entity>)> {
        self.writes.into_iter().collect()
    }
}

/// Run `body` in a fresh transaction and commit it, retrying on conflict.
///
/// `body` receives the transaction by value and hands it back with its
/// result. Errors from `body` abort without committing. After
/// `max_attempts` conflicting commits the call fails with
/// [`DatastoreError::TooMuchContention`].
pub async fn run_in_transaction<T, E, F, Fut>(
    ds: &dyn Datastore,
    max_attempts: u32,
    mut body: F,
) -> Result<T, E>
where
    E: From<DatastoreError>,
    F: FnMut(Transaction) -> Fut,
    Fut: Future<Output = Result<(Transaction, T), E>>,
{
    let attempts = max_attempts.max(1);
    for attempt in 1..=attempts {
        let (txn, value) = body(Transaction::new()).await?;
        match ds.commit(txn).await {
            Ok(()) => return Ok(value),
            Err(DatastoreError::Conflict { key }) => {
                debug!(attempt, %key, "transaction conflict; retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(DatastoreError::TooMuchContention { attempts }.into())
}
