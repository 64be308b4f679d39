//! Transactional key-value storage for the PTC conference.
//!
//! Every entity lives in a single entity group and is addressed by an
//! [`EntityKey`]: the version counter (`meta/1`), named blobs
//! (`blob/<name>`), and per-participant evaluations (`eval/<id>`). Writes go
//! through optimistic [`Transaction`]s: reads record the revision they saw,
//! and commit fails with a conflict if any of those entities changed in the
//! meantime. [`run_in_transaction`] retries such conflicts a bounded number
//! of times.
//!
//! # Storage Backends
//!
//! All backends implement the [`Datastore`] trait:
//!
//! - [`InMemoryDatastore`]: `BTreeMap`-based store for tests and development
//! - [`LogDatastore`]: in-memory table made durable by an append-only,
//!   CRC-framed commit log that is replayed on open
//!
//! # Design Rules
//!
//! 1. A commit applies all of its writes or none of them.
//! 2. Queries observe a consistent cut of committed transactions.
//! 3. No lock is held across an `.await`.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod commit_log;
pub mod entity;
pub mod error;
pub mod memory;
pub mod traits;
pub mod transaction;

// Re-export primary types at crate root for ergonomic imports.
pub use commit_log::LogDatastore;
pub use entity::{Entity, EntityKey, Kind, Query, Record};
pub use error::{DatastoreError, DatastoreResult};
pub use memory::InMemoryDatastore;
pub use traits::Datastore;
pub use transaction::{run_in_transaction, Transaction, DEFAULT_MAX_ATTEMPTS};
