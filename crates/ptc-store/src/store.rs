use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use ptc_conference::{Conference, InstructorClasses, PrintSignatures};
use ptc_datastore::{
    run_in_transaction, Datastore, Entity, EntityKey, Kind, Query, Transaction, DEFAULT_MAX_ATTEMPTS,
};
use ptc_types::{participant_id, Class, Configuration, Evaluation, Participant, NUM_SESSION};
use rand::rngs::OsRng;
use tracing::debug;

use crate::blob::{decode, encode, encode_configuration, BlobName};
use crate::error::{StoreError, StoreResult};
use crate::login_code::{assign_login_codes, LoginCodes};
use crate::snapshot::Snapshot;

/// Default time a snapshot is served without checking for newer blobs.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

/// Store tuning.
#[derive(Clone, Debug)]
pub struct StoreOptions {
    /// How long a snapshot is served from cache.
    pub cache_ttl: Duration,
    /// Upper bound on each store operation, including retries.
    pub request_timeout: Option<Duration>,
    /// Attempts per transaction before giving up on contention.
    pub max_attempts: u32,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            request_timeout: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Reads and writes conference data.
///
/// Readers get an immutable [`Conference`] snapshot from [`Store::get`],
/// refreshed from the datastore at most once per cache TTL. Writers update
/// one or more blobs in a transaction that also bumps the version counter;
/// the snapshot picks the change up on its next refresh.
pub struct Store {
    datastore: Arc<dyn Datastore>,
    options: StoreOptions,
    snapshot: RwLock<Snapshot>,
}

/// Bump the version counter inside `txn` and return the new version.
async fn next_version(txn: &mut Transaction, ds: &dyn Datastore) -> StoreResult<i64> {
    let version = txn.get(ds, &EntityKey::meta()).await?.map_or(0, |m| m.version) + 1;
    txn.put(EntityKey::meta(), Entity::new(version, Vec::new()));
    Ok(version)
}

/// Read and decode a blob inside `txn`; missing blobs decode to the default.
async fn read_blob<T>(txn: &mut Transaction, ds: &dyn Datastore, name: BlobName) -> StoreResult<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    match txn.get(ds, &name.key()).await? {
        Some(entity) => decode(name.as_str(), &entity.data),
        None => Ok(T::default()),
    }
}

impl Store {
    pub fn new(datastore: Arc<dyn Datastore>, options: StoreOptions) -> Self {
        Self {
            datastore,
            options,
            snapshot: RwLock::new(Snapshot::new()),
        }
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    async fn within<T>(&self, op: impl Future<Output = StoreResult<T>>) -> StoreResult<T> {
        match self.options.request_timeout {
            Some(limit) => tokio::time::timeout(limit, op)
                .await
                .map_err(|_| StoreError::DeadlineExceeded(limit))?,
            None => op.await,
        }
    }

    /// Run `body` in a retried transaction under the request timeout.
    async fn transact<T, F, Fut>(&self, body: F) -> StoreResult<T>
    where
        F: FnMut(Transaction) -> Fut,
        Fut: Future<Output = StoreResult<(Transaction, T)>>,
    {
        let ds = self.datastore.as_ref();
        self.within(run_in_transaction(ds, self.options.max_attempts, body)).await
    }

    /// The current conference, and whether it was served from cache.
    ///
    /// With `no_cache` false and a snapshot younger than the cache TTL, no
    /// I/O is done. Otherwise all blobs newer than the high-water version are
    /// fetched (without holding the snapshot lock) and applied. On error the
    /// previous snapshot stays in place.
    pub async fn get(&self, no_cache: bool) -> StoreResult<(Arc<Conference>, bool)> {
        let max_version = {
            let snapshot = self.snapshot.read().expect("lock poisoned");
            if !no_cache && snapshot.is_fresh(self.options.cache_ttl) {
                return Ok((Arc::clone(&snapshot.conf), true));
            }
            snapshot.max_version
        };

        let query = Query::kind(Kind::Blob).newer_than(max_version);
        let blobs = self
            .within(async { self.datastore.query(&query).await.map_err(StoreError::from) })
            .await?;
        debug!(max_version, fetched = blobs.len(), "snapshot refresh");

        let conf = self.snapshot.write().expect("lock poisoned").refresh(blobs)?;
        Ok((conf, false))
    }

    /// Write one blob under a new version. Returns the version.
    async fn put_blob(&self, name: BlobName, data: Vec<u8>) -> StoreResult<i64> {
        let ds = self.datastore.as_ref();
        let data = &data;
        self.transact(move |mut txn| async move {
            let version = next_version(&mut txn, ds).await?;
            txn.put(name.key(), Entity::new(version, data.clone()));
            Ok((txn, version))
        })
        .await
    }

    /// Validate and store the configuration. Returns the committed version.
    pub async fn put_configuration(&self, config: &Configuration) -> StoreResult<i64> {
        config.validate()?;
        self.put_blob(BlobName::Configuration, encode_configuration(config)?).await
    }

    /// Replace the class list. Returns the committed version.
    pub async fn put_classes(&self, classes: &[Class]) -> StoreResult<i64> {
        self.put_blob(BlobName::Classes, encode(BlobName::Classes.as_str(), classes)?).await
    }

    /// Replace the participant list and assign login codes.
    ///
    /// Missing participant IDs are derived from the identity fields. Codes
    /// are assigned and the login-code map saved in the same transaction as
    /// the participants. On success every participant in `participants` has
    /// its login code set. Returns the committed version.
    pub async fn put_participants(&self, participants: &mut [Participant]) -> StoreResult<i64> {
        for p in participants.iter_mut() {
            if p.id.is_empty() {
                p.id = participant_id(p);
            }
        }

        let ds = self.datastore.as_ref();
        let input: &[Participant] = participants;
        let (version, codes) = self
            .transact(move |mut txn| async move {
                let version = next_version(&mut txn, ds).await?;
                let mut codes: LoginCodes = read_blob(&mut txn, ds, BlobName::LoginCodes).await?;
                let mut assigned = input.to_vec();
                assign_login_codes(&mut codes, &mut assigned, &mut OsRng)?;

                txn.put(
                    BlobName::LoginCodes.key(),
                    Entity::new(0, encode(BlobName::LoginCodes.as_str(), &codes)?),
                );
                txn.put(
                    BlobName::Participants.key(),
                    Entity::new(version, encode(BlobName::Participants.as_str(), &assigned)?),
                );
                Ok((txn, (version, codes)))
            })
            .await?;

        for p in participants.iter_mut() {
            if let Some(code) = codes.get(&p.id) {
                p.login_code = code.clone();
            }
        }
        Ok(version)
    }

    /// Set instructor classes for one participant, keyed by session index.
    ///
    /// The participant's entry is removed when every session ends up zero.
    /// Returns the committed version.
    pub async fn modify_instructor_classes(
        &self,
        participant_id: &str,
        modifications: &BTreeMap<usize, i32>,
    ) -> StoreResult<i64> {
        if let Some(&session) = modifications.keys().find(|&&s| s >= NUM_SESSION) {
            return Err(StoreError::InvalidSession(session));
        }

        let ds = self.datastore.as_ref();
        self.transact(move |mut txn| async move {
            let version = next_version(&mut txn, ds).await?;
            let mut all: InstructorClasses = read_blob(&mut txn, ds, BlobName::InstructorClasses).await?;

            let mut classes = all
                .get(participant_id)
                .cloned()
                .unwrap_or_else(|| vec![0; NUM_SESSION]);
            classes.resize(classes.len().max(NUM_SESSION), 0);
            for (&session, &number) in modifications {
                classes[session] = number;
            }
            if classes.iter().all(|&n| n == 0) {
                all.remove(participant_id);
            } else {
                all.insert(participant_id.to_string(), classes);
            }

            txn.put(
                BlobName::InstructorClasses.key(),
                Entity::new(version, encode(BlobName::InstructorClasses.as_str(), &all)?),
            );
            Ok((txn, version))
        })
        .await
    }

    /// Last printed signature per participant.
    pub async fn get_print_signatures(&self) -> StoreResult<PrintSignatures> {
        self.within(async {
            match self.datastore.get(&BlobName::PrintSignatures.key()).await? {
                Some(entity) => decode(BlobName::PrintSignatures.as_str(), &entity.data),
                None => Ok(PrintSignatures::new()),
            }
        })
        .await
    }

    /// Merge signatures into the stored map. An empty signature removes the
    /// participant's entry.
    pub async fn set_print_signatures(&self, modified: &PrintSignatures) -> StoreResult<()> {
        let ds = self.datastore.as_ref();
        self.transact(move |mut txn| async move {
            let mut signatures: PrintSignatures = read_blob(&mut txn, ds, BlobName::PrintSignatures).await?;
            for (id, signature) in modified {
                if signature.is_empty() {
                    signatures.remove(id);
                } else {
                    signatures.insert(id.clone(), signature.clone());
                }
            }
            txn.put(
                BlobName::PrintSignatures.key(),
                Entity::new(0, encode(BlobName::PrintSignatures.as_str(), &signatures)?),
            );
            Ok((txn, ()))
        })
        .await
    }

    /// The participant's evaluation; empty if none has been submitted.
    pub async fn get_evaluation(&self, participant_id: &str) -> StoreResult<Evaluation> {
        self.within(async {
            let mut eval: Evaluation = match self.datastore.get(&EntityKey::eval(participant_id)).await? {
                Some(entity) => decode("eval", &entity.data)?,
                None => Evaluation::default(),
            };
            eval.participant_id = participant_id.to_string();
            Ok::<_, StoreError>(eval)
        })
        .await
    }

    /// Merge `modified` into the participant's stored evaluation.
    pub async fn set_evaluation(&self, participant_id: &str, modified: &Evaluation) -> StoreResult<()> {
        let ds = self.datastore.as_ref();
        let key = &EntityKey::eval(participant_id);
        self.transact(move |mut txn| async move {
            let mut eval: Evaluation = match txn.get(ds, key).await? {
                Some(entity) => decode("eval", &entity.data)?,
                None => Evaluation::default(),
            };
            eval.merge(modified);
            txn.put(key.clone(), Entity::new(0, encode("eval", &eval)?));
            Ok((txn, ()))
        })
        .await
    }

    /// Delete a blob. Deleting a missing blob is not an error.
    pub async fn delete_blob(&self, name: &str) -> StoreResult<()> {
        if name.is_empty() {
            return Err(StoreError::EmptyBlobName);
        }
        let key = EntityKey::blob(name);
        self.within(async { self.datastore.delete(&key).await.map_err(StoreError::from) })
            .await
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").field("options", &self.options).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptc_datastore::{InMemoryDatastore, LogDatastore};
    use ptc_types::{Lunch, SessionEvaluation};
    use proptest::prelude::*;

    fn store() -> (Arc<InMemoryDatastore>, Store) {
        let ds = Arc::new(InMemoryDatastore::new());
        let store = Store::new(ds.clone(), StoreOptions::default());
        (ds, store)
    }

    fn valid_config() -> Configuration {
        Configuration {
            year: 2024,
            month: 3,
            day: 9,
            cookie_key: "k".into(),
            lunches: vec![Lunch {
                name: "A".into(),
                seating: 1,
                ..Lunch::default()
            }],
            ..Configuration::default()
        }
    }

    fn person(first: &str, last: &str) -> Participant {
        Participant {
            first_name: first.into(),
            last_name: last.into(),
            registration_number: "R1".into(),
            ..Participant::default()
        }
    }

    #[tokio::test]
    async fn startup_on_empty_datastore() {
        let (_, store) = store();
        let (conf, from_cache) = store.get(false).await.unwrap();
        assert!(!from_cache);
        assert!(conf.classes().is_empty());
        assert!(conf.participants().is_empty());
        assert_eq!(conf.general_lunch(), &Lunch::tbd());
        assert!(conf.configuration().validate().is_err());

        let (again, from_cache) = store.get(false).await.unwrap();
        assert!(from_cache);
        assert!(Arc::ptr_eq(&conf, &again));
    }

    #[tokio::test]
    async fn configuration_round_trip() {
        let (_, store) = store();
        store.put_configuration(&valid_config()).await.unwrap();
        let (conf, _) = store.get(true).await.unwrap();
        let date = conf.date().unwrap();
        assert_eq!(date.to_rfc3339(), "2024-03-09T00:00:00-08:00");
        assert_eq!(date.timezone(), chrono_tz::America::Los_Angeles);
        assert_eq!(conf.general_lunch().name, "A");
    }

    #[tokio::test]
    async fn empty_cookie_key_is_rejected() {
        let (ds, store) = store();
        let config = Configuration {
            cookie_key: String::new(),
            ..valid_config()
        };
        assert!(matches!(
            store.put_configuration(&config).await,
            Err(StoreError::ConfigInvalid(_))
        ));
        assert!(ds.is_empty());
    }

    #[tokio::test]
    async fn classes_fill_session_grid() {
        let (_, store) = store();
        let class = Class {
            number: 201,
            start: 1,
            end: 2,
            ..Class::default()
        };
        store.put_classes(&[class]).await.unwrap();
        let (conf, _) = store.get(true).await.unwrap();
        let sessions = conf.sessions();
        assert!(sessions[0].is_empty());
        assert_eq!(sessions[1][0].class.number, 201);
        assert_eq!(sessions[2][0].class.number, 201);
    }

    #[tokio::test]
    async fn reimport_keeps_login_code() {
        let (_, store) = store();
        let mut first = vec![person("Ann", "Lee")];
        store.put_participants(&mut first).await.unwrap();
        let code = first[0].login_code.clone();
        assert_eq!(code.len(), 6);
        assert_eq!(first[0].id, participant_id(&first[0]));

        store.put_participants(&mut []).await.unwrap();
        let (conf, _) = store.get(true).await.unwrap();
        assert!(conf.participants().is_empty());

        let mut again = vec![person("Bob", "Ray"), person("Ann", "Lee")];
        store.put_participants(&mut again).await.unwrap();
        assert_eq!(again[1].login_code, code);
        assert_ne!(again[0].login_code, code);

        let (conf, _) = store.get(true).await.unwrap();
        assert_eq!(conf.participant_from_login_code(&code).unwrap().first_name, "Ann");
        assert!(conf.participants().iter().all(|p| !p.login_code.is_empty()));
    }

    #[tokio::test]
    async fn evaluation_delete_on_empty() {
        let (_, store) = store();
        let set = |class_number, overall| Evaluation {
            sessions: vec![SessionEvaluation {
                session: 2,
                class_number,
                overall_rating: overall,
                ..SessionEvaluation::default()
            }],
            ..Evaluation::default()
        };
        store.set_evaluation("p1", &set(300, 4)).await.unwrap();
        let eval = store.get_evaluation("p1").await.unwrap();
        assert_eq!(eval.participant_id, "p1");
        assert_eq!(eval.sessions.len(), 1);

        store.set_evaluation("p1", &set(0, 0)).await.unwrap();
        assert!(store.get_evaluation("p1").await.unwrap().sessions.is_empty());
    }

    #[tokio::test]
    async fn missing_evaluation_is_empty() {
        let (_, store) = store();
        let eval = store.get_evaluation("nobody").await.unwrap();
        assert_eq!(eval.participant_id, "nobody");
        assert!(eval.is_empty());
    }

    #[tokio::test]
    async fn instructor_classes_remove_on_zero() {
        let (_, store) = store();
        store
            .modify_instructor_classes("id", &BTreeMap::from([(0, 101)]))
            .await
            .unwrap();
        let (conf, _) = store.get(true).await.unwrap();
        assert_eq!(conf.instructor_classes()["id"], vec![101, 0, 0, 0, 0, 0]);

        store
            .modify_instructor_classes("id", &BTreeMap::from([(0, 0)]))
            .await
            .unwrap();
        let (conf, _) = store.get(true).await.unwrap();
        assert!(!conf.instructor_classes().contains_key("id"));
    }

    #[tokio::test]
    async fn instructor_session_out_of_range() {
        let (_, store) = store();
        let result = store
            .modify_instructor_classes("id", &BTreeMap::from([(NUM_SESSION, 101)]))
            .await;
        assert!(matches!(result, Err(StoreError::InvalidSession(6))));
    }

    #[tokio::test]
    async fn print_signatures_merge_and_delete() {
        let (_, store) = store();
        assert!(store.get_print_signatures().await.unwrap().is_empty());
        store
            .set_print_signatures(&BTreeMap::from([
                ("a".to_string(), "1|0".to_string()),
                ("b".to_string(), "2|0".to_string()),
            ]))
            .await
            .unwrap();
        store
            .set_print_signatures(&BTreeMap::from([("a".to_string(), String::new())]))
            .await
            .unwrap();
        let signatures = store.get_print_signatures().await.unwrap();
        assert_eq!(signatures.len(), 1);
        assert_eq!(signatures["b"], "2|0");
    }

    #[tokio::test]
    async fn delete_blob_is_idempotent() {
        let (ds, store) = store();
        store.put_classes(&[]).await.unwrap();
        store.delete_blob("classes").await.unwrap();
        store.delete_blob("classes").await.unwrap();
        assert!(ds.get(&BlobName::Classes.key()).await.unwrap().is_none());
        assert!(matches!(store.delete_blob("").await, Err(StoreError::EmptyBlobName)));
    }

    #[tokio::test]
    async fn versions_increase_and_blobs_share_version() {
        let (ds, store) = store();
        let v1 = store.put_classes(&[]).await.unwrap();
        let v2 = store.put_participants(&mut [person("Ann", "Lee")]).await.unwrap();
        assert_eq!((v1, v2), (1, 2));
        assert_eq!(ds.get(&EntityKey::meta()).await.unwrap().unwrap().version, 2);
        assert_eq!(ds.get(&BlobName::Participants.key()).await.unwrap().unwrap().version, 2);
        assert_eq!(ds.get(&BlobName::LoginCodes.key()).await.unwrap().unwrap().version, 0);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_snapshot() {
        let (ds, store) = store();
        store.put_classes(&[Class { number: 101, ..Class::default() }]).await.unwrap();
        let (before, _) = store.get(true).await.unwrap();

        store.put_classes(&[Class { number: 201, ..Class::default() }]).await.unwrap();
        ds.set_unavailable(true);
        assert!(matches!(
            store.get(true).await,
            Err(StoreError::Backend(ptc_datastore::DatastoreError::Unavailable))
        ));
        ds.set_unavailable(false);

        ds.put(EntityKey::blob("mystery"), Entity::new(99, Vec::new())).await.unwrap();
        assert!(matches!(store.get(true).await, Err(StoreError::UnknownBlob(_))));
        ds.delete(&EntityKey::blob("mystery")).await.unwrap();

        ds.put(BlobName::Participants.key(), Entity::new(98, vec![0xc1])).await.unwrap();
        assert!(matches!(store.get(true).await, Err(StoreError::Codec { .. })));

        // Every failed refresh left the last good snapshot in place.
        let (cached, from_cache) = store.get(false).await.unwrap();
        assert!(from_cache);
        assert!(Arc::ptr_eq(&before, &cached));
    }

    #[tokio::test]
    async fn cache_ttl_controls_refresh() {
        let ds = Arc::new(InMemoryDatastore::new());
        let store = Store::new(
            ds,
            StoreOptions {
                cache_ttl: Duration::ZERO,
                ..StoreOptions::default()
            },
        );
        store.get(false).await.unwrap();
        store.put_classes(&[Class { number: 101, ..Class::default() }]).await.unwrap();
        let (conf, from_cache) = store.get(false).await.unwrap();
        assert!(!from_cache);
        assert!(conf.class(101).is_some());
    }

    #[tokio::test]
    async fn durable_backend_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ptc.log");
        {
            let ds = Arc::new(LogDatastore::open(&path).unwrap());
            let store = Store::new(ds, StoreOptions::default());
            store.put_configuration(&valid_config()).await.unwrap();
            store.put_participants(&mut [person("Ann", "Lee")]).await.unwrap();
        }
        let ds = Arc::new(LogDatastore::open(&path).unwrap());
        let store = Store::new(ds, StoreOptions::default());
        let (conf, _) = store.get(false).await.unwrap();
        assert!(conf.configuration().validate().is_ok());
        assert_eq!(conf.participants().len(), 1);
        assert!(!conf.participants()[0].login_code.is_empty());
    }

    #[tokio::test]
    async fn concurrent_writers_serialize() {
        let (ds, store) = store();
        let store = Arc::new(store);
        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .modify_instructor_classes(&format!("p{i}"), &BTreeMap::from([(1, 100 + i)]))
                    .await
            }));
        }
        let mut versions = Vec::new();
        for handle in handles {
            versions.push(handle.await.unwrap().unwrap());
        }
        versions.sort();
        assert_eq!(versions, (1..=8).collect::<Vec<i64>>());
        assert_eq!(ds.get(&EntityKey::meta()).await.unwrap().unwrap().version, 8);
        let (conf, _) = store.get(true).await.unwrap();
        assert_eq!(conf.instructor_classes().len(), 8);
    }

    #[derive(Clone, Debug)]
    enum Op {
        Classes(Vec<i32>),
        Participants(Vec<String>),
        Instructor(usize, i32),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            proptest::collection::vec(100i32..700, 0..4).prop_map(Op::Classes),
            proptest::collection::vec("[A-Z][a-z]{1,6}", 0..4).prop_map(Op::Participants),
            (0usize..NUM_SESSION, 0i32..700).prop_map(|(s, n)| Op::Instructor(s, n)),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn refresh_reflects_every_commit(ops in proptest::collection::vec(op(), 1..12)) {
            let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            rt.block_on(async {
                let (ds, store) = store();
                let mut last = 0;
                for op in ops {
                    let (version, name) = match op {
                        Op::Classes(numbers) => {
                            let classes: Vec<Class> = numbers
                                .iter()
                                .map(|n| Class { number: *n, ..Class::default() })
                                .collect();
                            (store.put_classes(&classes).await.unwrap(), BlobName::Classes)
                        }
                        Op::Participants(names) => {
                            let mut ps: Vec<Participant> = names.iter().map(|n| person(n, "X")).collect();
                            (store.put_participants(&mut ps).await.unwrap(), BlobName::Participants)
                        }
                        Op::Instructor(session, number) => (
                            store
                                .modify_instructor_classes("i", &BTreeMap::from([(session, number)]))
                                .await
                                .unwrap(),
                            BlobName::InstructorClasses,
                        ),
                    };
                    prop_assert!(version > last);
                    last = version;

                    store.get(true).await.unwrap();
                    let snapshot = store.snapshot.read().unwrap();
                    prop_assert_eq!(snapshot.version(name), version);
                    prop_assert_eq!(snapshot.max_version, version);
                    for other in BlobName::ALL {
                        prop_assert!(snapshot.version(other) <= version);
                    }
                    drop(snapshot);
                    let meta = ds.get(&EntityKey::meta()).await.unwrap().unwrap();
                    prop_assert_eq!(meta.version, version);
                }
                Ok(())
            })?;
        }

        #[test]
        fn participants_keep_codes_across_imports(
            names in proptest::collection::btree_set("[A-Z][a-z]{2,8}", 1..12),
            keep in proptest::collection::vec(any::<bool>(), 12),
        ) {
            let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            rt.block_on(async {
                let (_, store) = store();
                let mut first: Vec<Participant> = names.iter().map(|n| person(n, "Smith")).collect();
                store.put_participants(&mut first).await.unwrap();

                let mut second: Vec<Participant> = first
                    .iter()
                    .zip(&keep)
                    .filter(|(_, k)| **k)
                    .map(|(p, _)| person(&p.first_name, &p.last_name))
                    .rev()
                    .collect();
                store.put_participants(&mut second).await.unwrap();
                let mut third: Vec<Participant> = names.iter().map(|n| person(n, "Smith")).collect();
                store.put_participants(&mut third).await.unwrap();

                for p in second.iter().chain(&third) {
                    let original = first.iter().find(|f| f.id == p.id).unwrap();
                    prop_assert_eq!(&p.login_code, &original.login_code);
                }
                Ok(())
            })?;
        }
    }
}
