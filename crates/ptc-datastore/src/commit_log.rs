use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::entity::{Entity, EntityKey, Query, Record};
use crate::error::{DatastoreError, DatastoreResult};
use crate::memory::Table;
use crate::traits::Datastore;
use crate::transaction::Transaction;

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: usize = 8;

/// One committed transaction as written to the log.
///
/// On-disk format:
/// ```text
/// [4 bytes: payload length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode-serialized LogRecord)]
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct LogRecord {
    writes: Vec<(EntityKey, Option<Entity>)>,
}

/// Durable datastore backed by an append-only commit log.
///
/// The full table is kept in memory. Each commit is validated, appended to
/// the log and synced, then applied. Commits are serialized by the writer
/// lock; the table lock is only taken to validate and to apply, so reads do
/// not wait on the sync. On open the log is replayed front to
/// back; entries that fail the CRC check are skipped. A truncated tail (a
/// torn write from a crash) ends recovery and is cut from the file.
pub struct LogDatastore {
    path: PathBuf,
    table: RwLock<Table>,
    writer: Mutex<LogWriter>,
}

/// Append side of the log.
struct LogWriter {
    file: File,
    /// End of the last complete frame.
    offset: u64,
    /// Set when a failed append could not be rolled back.
    broken: bool,
    #[cfg(test)]
    fail_next: bool,
}

impl LogWriter {
    /// Write one frame and sync it. On failure the file is cut back to the
    /// last complete frame so that later appends stay aligned.
    fn append(&mut self, frame: &[u8]) -> io::Result<()> {
        if self.broken {
            return Err(io::Error::other("commit log is in an unknown state; reopen it"));
        }
        match self.write_frame(frame) {
            Ok(()) => {
                self.offset += frame.len() as u64;
                Ok(())
            }
            Err(e) => {
                warn!(offset = self.offset, error = %e, "commit log append failed; rolling back");
                if let Err(truncate) = self.file.set_len(self.offset) {
                    warn!(error = %truncate, "commit log rollback failed");
                    self.broken = true;
                }
                Err(e)
            }
        }
    }

    fn write_frame(&mut self, frame: &[u8]) -> io::Result<()> {
        #[cfg(test)]
        if std::mem::take(&mut self.fail_next) {
            self.file.write_all(&frame[..HEADER_SIZE])?;
            return Err(io::Error::other("injected write failure"));
        }
        self.file.write_all(frame)?;
        self.file.sync_data()
    }
}

impl LogDatastore {
    /// Open (or create) the commit log at `path` and replay it.
    pub fn open(path: &Path) -> DatastoreResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;

        let bytes = fs::read(path)?;
        let (records, end) = recover(&bytes);
        if end < bytes.len() {
            warn!(path = %path.display(), end, file_len = bytes.len(), "truncating torn commit log tail");
            file.set_len(end as u64)?;
        }
        let writer = LogWriter {
            file,
            offset: end as u64,
            broken: false,
            #[cfg(test)]
            fail_next: false,
        };

        let mut table = Table::default();
        let count = records.len();
        for record in records {
            table.apply(record.writes);
        }
        info!(path = %path.display(), transactions = count, entities = table.len(), "commit log replayed");

        Ok(Self {
            path: path.to_path_buf(),
            table: RwLock::new(table),
            writer: Mutex::new(writer),
        })
    }
}

/// Frame `record` as `[length][crc][payload]`.
fn encode_frame(record: &LogRecord) -> DatastoreResult<Vec<u8>> {
    let payload =
        bincode::serialize(record).map_err(|e| DatastoreError::Serialization(e.to_string()))?;
    let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Decode every intact record in `bytes`. Also returns the offset just past
/// the last complete frame; anything after it is a torn write.
fn recover(bytes: &[u8]) -> (Vec<LogRecord>, usize) {
    let mut records = Vec::new();
    let mut offset = 0usize;

    while offset + HEADER_SIZE <= bytes.len() {
        let header = &bytes[offset..offset + HEADER_SIZE];
        let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
        let expected_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

        let start = offset + HEADER_SIZE;
        if length == 0 || start + length > bytes.len() {
            warn!(offset, length, file_len = bytes.len(), "truncated commit log entry; stopping recovery");
            break;
        }
        let payload = &bytes[start..start + length];
        offset = start + length;

        let actual_crc = crc32fast::hash(payload);
        if actual_crc != expected_crc {
            warn!(offset = start - HEADER_SIZE, expected = expected_crc, actual = actual_crc, "CRC mismatch; skipping entry");
            continue;
        }
        match bincode::deserialize::<LogRecord>(payload) {
            Ok(record) => records.push(record),
            Err(e) => warn!(offset = start - HEADER_SIZE, error = %e, "undecodable commit log entry; skipping"),
        }
    }
    (records, offset)
}

#[async_trait]
impl Datastore for LogDatastore {
    async fn read(&self, key: &EntityKey) -> DatastoreResult<Option<Record>> {
        Ok(self.table.read().expect("lock poisoned").read(key))
    }

    async fn query(&self, query: &Query) -> DatastoreResult<Vec<(EntityKey, Entity)>> {
        Ok(self.table.read().expect("lock poisoned").query(query))
    }

    async fn commit(&self, txn: Transaction) -> DatastoreResult<()> {
        // Held until the commit is applied; no other commit can change the
        // table between validation and apply.
        let mut writer = self.writer.lock().expect("log mutex poisoned");
        self.table.read().expect("lock poisoned").validate(&txn)?;
        if txn.is_read_only() {
            return Ok(());
        }
        let record = LogRecord {
            writes: txn.into_writes(),
        };
        let frame = encode_frame(&record)?;
        writer.append(&frame)?;
        debug!(len = frame.len(), writes = record.writes.len(), "commit log append");

        self.table.write().expect("lock poisoned").apply(record.writes);
        Ok(())
    }
}

impl std::fmt::Debug for LogDatastore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogDatastore").field("path", &self.path).finish()
    }
}
