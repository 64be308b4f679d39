use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ptc_conference::Conference;
use ptc_datastore::{Entity, EntityKey};
use tracing::info;

use crate::blob::{apply_blob, BlobName};
use crate::error::{StoreError, StoreResult};

/// The cached conference and the blob versions it was built from.
#[derive(Debug)]
pub(crate) struct Snapshot {
    pub(crate) conf: Arc<Conference>,
    versions: HashMap<BlobName, i64>,
    /// Highest blob version applied so far.
    pub(crate) max_version: i64,
    last_sync: Option<Instant>,
}

impl Snapshot {
    pub(crate) fn new() -> Self {
        Self {
            conf: Arc::new(Conference::new()),
            versions: HashMap::new(),
            max_version: 0,
            last_sync: None,
        }
    }

    pub(crate) fn is_fresh(&self, ttl: Duration) -> bool {
        self.last_sync.is_some_and(|t| t.elapsed() < ttl)
    }

    pub(crate) fn version(&self, name: BlobName) -> i64 {
        self.versions.get(&name).copied().unwrap_or(0)
    }

    /// Apply every blob newer than the version already applied for its name.
    ///
    /// The new conference and versions are built aside and published only if
    /// every blob decodes; on error the snapshot is left untouched.
    pub(crate) fn refresh(&mut self, blobs: Vec<(EntityKey, Entity)>) -> StoreResult<Arc<Conference>> {
        let mut conf: Option<Conference> = None;
        let mut versions = self.versions.clone();
        let mut max_version = self.max_version;

        for (key, entity) in blobs {
            let name = BlobName::parse(&key.name).ok_or_else(|| StoreError::UnknownBlob(key.name.clone()))?;
            if entity.version <= versions.get(&name).copied().unwrap_or(0) {
                continue;
            }
            let base = conf.as_ref().unwrap_or(self.conf.as_ref());
            if let Some(next) = apply_blob(base, name, &entity.data)? {
                info!(blob = %name, version = entity.version, "loading blob");
                conf = Some(next);
            }
            versions.insert(name, entity.version);
            max_version = max_version.max(entity.version);
        }

        if let Some(conf) = conf {
            self.conf = Arc::new(conf);
        }
        self.versions = versions;
        self.max_version = max_version;
        self.last_sync = Some(Instant::now());
        Ok(Arc::clone(&self.conf))
    }
}
