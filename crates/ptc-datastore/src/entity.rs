use std::fmt;

use serde::{Deserialize, Serialize};

/// Entity kinds stored under the conference entity group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Kind {
    /// The singleton version counter.
    Meta,
    /// A named, versioned blob.
    Blob,
    /// A per-participant evaluation.
    Eval,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Meta => "meta",
            Self::Blob => "blob",
            Self::Eval => "eval",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key of an entity: a kind and a name, displayed as `kind/name`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityKey {
    pub kind: Kind,
    pub name: String,
}

impl EntityKey {
    pub fn new(kind: Kind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    /// The version counter, `meta/1`.
    pub fn meta() -> Self {
        Self::new(Kind::Meta, "1")
    }

    pub fn blob(name: impl Into<String>) -> Self {
        Self::new(Kind::Blob, name)
    }

    pub fn eval(participant_id: impl Into<String>) -> Self {
        Self::new(Kind::Eval, participant_id)
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

/// A stored value. Blobs that feed the snapshot carry the version of the
/// transaction that wrote them; other entities use version 0.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub version: i64,
    pub data: Vec<u8>,
}

impl Entity {
    pub fn new(version: i64, data: Vec<u8>) -> Self {
        Self { version, data }
    }
}

/// An entity together with the backend revision it was read at.
///
/// Revisions are assigned by the backend on every write and are what
/// optimistic transactions validate against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub entity: Entity,
    pub revision: u64,
}

/// Range query over one entity kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    pub kind: Kind,
    /// Only entities with `version > newer_than` match.
    pub newer_than: Option<i64>,
}

impl Query {
    pub fn kind(kind: Kind) -> Self {
        Self {
            kind,
            newer_than: None,
        }
    }

    pub fn newer_than(mut self, version: i64) -> Self {
        self.newer_than = Some(version);
        self
    }

    pub fn matches(&self, key: &EntityKey, entity: &Entity) -> bool {
        key.kind == self.kind && self.newer_than.map_or(true, |v| entity.version > v)
    }
}
