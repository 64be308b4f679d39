use std::fmt;

use ptc_conference::{Conference, InstructorClasses};
use ptc_datastore::EntityKey;
use ptc_types::{Class, Configuration, Participant};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{StoreError, StoreResult};

/// The registered blobs.
///
/// The first four feed the conference snapshot and are written with the
/// version of their transaction. Login codes and print signatures are read
/// directly and stored with version 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BlobName {
    Configuration,
    Classes,
    Participants,
    InstructorClasses,
    LoginCodes,
    PrintSignatures,
}

impl BlobName {
    pub const ALL: [BlobName; 6] = [
        Self::Configuration,
        Self::Classes,
        Self::Participants,
        Self::InstructorClasses,
        Self::LoginCodes,
        Self::PrintSignatures,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Classes => "classes",
            Self::Participants => "participants",
            Self::InstructorClasses => "instructorClasses",
            Self::LoginCodes => "loginCodes",
            Self::PrintSignatures => "printSignatures",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.as_str() == name)
    }

    pub fn key(self) -> EntityKey {
        EntityKey::blob(self.as_str())
    }
}

impl fmt::Display for BlobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encode with field names so that fields can be added without breaking
/// payloads written by older builds.
pub(crate) fn encode<T: Serialize + ?Sized>(blob: &str, value: &T) -> StoreResult<Vec<u8>> {
    rmp_serde::to_vec_named(value).map_err(|e| StoreError::Codec {
        blob: blob.to_string(),
        reason: e.to_string(),
    })
}

/// Decode a payload written by [`encode`]. An empty payload decodes to the
/// default value.
pub(crate) fn decode<T: DeserializeOwned + Default>(blob: &str, data: &[u8]) -> StoreResult<T> {
    if data.is_empty() {
        return Ok(T::default());
    }
    rmp_serde::from_slice(data).map_err(|e| StoreError::Codec {
        blob: blob.to_string(),
        reason: e.to_string(),
    })
}

/// The configuration is stored as JSON so that it can be inspected and
/// edited by hand.
pub(crate) fn encode_configuration(config: &Configuration) -> StoreResult<Vec<u8>> {
    serde_json::to_vec(config).map_err(|e| StoreError::Codec {
        blob: BlobName::Configuration.to_string(),
        reason: e.to_string(),
    })
}

fn decode_configuration(data: &[u8]) -> StoreResult<Configuration> {
    serde_json::from_slice(data).map_err(|e| StoreError::Codec {
        blob: BlobName::Configuration.to_string(),
        reason: e.to_string(),
    })
}

/// Decode `data` as blob `name` and apply it to `conf`.
///
/// Returns `None` for blobs that do not feed the snapshot.
pub fn apply_blob(conf: &Conference, name: BlobName, data: &[u8]) -> StoreResult<Option<Conference>> {
    let blob = name.as_str();
    let next = match name {
        BlobName::Configuration => conf.update_configuration(decode_configuration(data)?),
        BlobName::Classes => conf.update_classes(decode::<Vec<Class>>(blob, data)?),
        BlobName::Participants => conf.update_participants(decode::<Vec<Participant>>(blob, data)?),
        BlobName::InstructorClasses => {
            conf.update_instructor_classes(decode::<InstructorClasses>(blob, data)?)
        }
        BlobName::LoginCodes | BlobName::PrintSignatures => return Ok(None),
    };
    Ok(Some(next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn names_round_trip() {
        for name in BlobName::ALL {
            assert_eq!(BlobName::parse(name.as_str()), Some(name));
        }
        assert_eq!(BlobName::parse("nonsense"), None);
        assert_eq!(BlobName::InstructorClasses.key().to_string(), "blob/instructorClasses");
    }

    #[test]
    fn payloads_tolerate_added_fields() {
        #[derive(Serialize)]
        struct Newer {
            number: i32,
            title: String,
            added_later: bool,
        }
        let data = encode("classes", &vec![Newer { number: 101, title: "Knots".into(), added_later: true }]).unwrap();
        let classes: Vec<Class> = decode("classes", &data).unwrap();
        assert_eq!(classes[0].number, 101);
        assert_eq!(classes[0].title, "Knots");
    }

    #[test]
    fn payloads_tolerate_missing_fields() {
        #[derive(Serialize, Deserialize, Default)]
        struct Older {
            number: i32,
        }
        let data = encode("classes", &vec![Older { number: 7 }]).unwrap();
        let classes: Vec<Class> = decode("classes", &data).unwrap();
        assert_eq!(classes[0].number, 7);
        assert!(classes[0].evaluation_codes.is_empty());
    }

    #[test]
    fn empty_payload_is_default() {
        let codes: std::collections::BTreeMap<String, String> = decode("loginCodes", &[]).unwrap();
        assert!(codes.is_empty());
    }

    #[test]
    fn corrupt_payload_names_the_blob() {
        let err = decode::<Vec<Class>>("classes", &[0xc1, 0x00]).unwrap_err();
        assert!(matches!(err, StoreError::Codec { ref blob, .. } if blob == "classes"));
        let err = apply_blob(&Conference::new(), BlobName::Configuration, b"{").unwrap_err();
        assert!(err.to_string().starts_with("store.configuration:"));
    }

    #[test]
    fn apply_updates_the_matching_slice() {
        let conf = Conference::new();
        let classes = vec![Class { number: 201, start: 1, end: 2, ..Class::default() }];
        let data = encode("classes", &classes).unwrap();
        let next = apply_blob(&conf, BlobName::Classes, &data).unwrap().unwrap();
        assert_eq!(next.class(201).unwrap().as_ref(), &classes[0]);

        let config = Configuration { year: 2024, month: 3, day: 9, ..Configuration::default() };
        let next = apply_blob(&next, BlobName::Configuration, &encode_configuration(&config).unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(next.configuration().year, 2024);
        assert!(next.class(201).is_some());

        assert!(apply_blob(&next, BlobName::LoginCodes, &[]).unwrap().is_none());
    }
}
