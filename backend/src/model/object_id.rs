//! Twelve-byte object identifiers rendered as 24 hex characters.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Error returned when a string is not a valid object identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("the provided hex string is not a valid ObjectID")]
pub struct ObjectIdError;

/// Identifier of a persisted entity.
///
/// The all-zero value ([`ObjectId::NIL`]) marks an entity that has not been
/// stored yet; create requests must carry it, and a body without an `id`
/// field decodes to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ObjectId([u8; 12]);

static COUNTER: AtomicU32 = AtomicU32::new(0);

impl ObjectId {
    pub const NIL: ObjectId = ObjectId([0; 12]);

    /// Generate a fresh identifier: creation seconds, random bytes, counter.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 12];
        let seconds = chrono::Utc::now().timestamp() as u32;
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&uuid::Uuid::new_v4().as_bytes()[..5]);
        let count = COUNTER.fetch_add(1, Ordering::Relaxed).to_be_bytes();
        bytes[9..].copy_from_slice(&count[1..]);
        Self(bytes)
    }

    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> [u8; 12] {
        self.0
    }

    pub fn is_nil(&self) -> bool {
        *self == Self::NIL
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn parse_str(s: &str) -> Result<Self, ObjectIdError> {
        if s.len() != 24 {
            return Err(ObjectIdError);
        }
        let mut bytes = [0u8; 12];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| ObjectIdError)?;
        Ok(Self(bytes))
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse_str(&raw).map_err(de::Error::custom)
    }
}
