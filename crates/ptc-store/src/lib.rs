//! Versioned blob storage for conference data.
//!
//! Conference data lives in a handful of named blobs (configuration,
//! classes, participants, instructor classes, login codes, print
//! signatures) plus one evaluation record per participant. Every write to
//! a snapshot-feeding blob runs in a transaction that bumps a single
//! version counter and stamps the blob with the new version.
//!
//! [`Store::get`] serves an immutable [`Conference`](ptc_conference::Conference)
//! from cache and, once the cache TTL lapses, fetches only the blobs newer
//! than the highest version it has applied.

pub mod blob;
pub mod error;
pub mod login_code;
mod snapshot;
pub mod store;

pub use blob::{apply_blob, BlobName};
pub use error::{StoreError, StoreResult};
pub use login_code::{assign_login_codes, LoginCodes, MAX_CODE_ATTEMPTS};
pub use store::{Store, StoreOptions, DEFAULT_CACHE_TTL};
