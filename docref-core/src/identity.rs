//! Identity types for documents

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::IdentityError;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Number of raw bytes in an [`ObjectId`].
pub const OBJECT_ID_LEN: usize = 12;

/// Opaque 12-byte document identity.
///
/// The textual form is 24 lowercase hex characters, which is also how the id
/// is serialized. Equality is byte equality, so two ids compare equal exactly
/// when their hex strings do.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

impl ObjectId {
    /// Generate a fresh id.
    ///
    /// Layout: 4-byte big-endian Unix timestamp (seconds) followed by 8 random
    /// bytes taken from the random tail of a UUIDv7.
    pub fn new() -> Self {
        let secs = u32::try_from(Utc::now().timestamp()).unwrap_or(u32::MAX);
        let entropy = Uuid::now_v7();

        let mut bytes = [0u8; OBJECT_ID_LEN];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..].copy_from_slice(&entropy.as_bytes()[8..]);
        Self(bytes)
    }

    /// Build an id from raw bytes.
    pub const fn from_bytes(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Build a zero-padded id from an integer, e.g. `1` → `000000000000000000000001`.
    pub fn from_u64(n: u64) -> Self {
        let mut bytes = [0u8; OBJECT_ID_LEN];
        bytes[4..].copy_from_slice(&n.to_be_bytes());
        Self(bytes)
    }

    /// Parse a 24-character hex string.
    pub fn parse_str(s: &str) -> Result<Self, IdentityError> {
        if s.len() != OBJECT_ID_LEN * 2 {
            return Err(IdentityError::InvalidLength { len: s.len() });
        }
        let mut bytes = [0u8; OBJECT_ID_LEN];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| IdentityError::InvalidHex {
            value: s.to_string(),
        })?;
        Ok(Self(bytes))
    }

    /// Raw bytes of the id.
    pub const fn bytes(&self) -> [u8; OBJECT_ID_LEN] {
        self.0
    }

    /// Lowercase hex representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Creation time embedded in the leading four bytes.
    pub fn timestamp(&self) -> Option<Timestamp> {
        let secs = u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]);
        DateTime::from_timestamp(i64::from(secs), 0)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse_str(&s).map_err(de::Error::custom)
    }
}

/// A persisted entity with its own identity.
///
/// `MODEL_NAME` is the entity type name used in error messages and to derive
/// the loader method name (`get{MODEL_NAME}`).
pub trait Document: Send + Sync + 'static {
    /// Name of the entity type, e.g. `"Author"`.
    const MODEL_NAME: &'static str;

    /// Identity of this instance.
    fn id(&self) -> ObjectId;
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_from_u64_renders_zero_padded() {
        assert_eq!(ObjectId::from_u64(1).to_string(), "000000000000000000000001");
        assert_eq!(ObjectId::from_u64(255).to_string(), "0000000000000000000000ff");
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        let err = ObjectId::parse_str("0001").unwrap_err();
        assert_eq!(err, IdentityError::InvalidLength { len: 4 });
    }

    #[test]
    fn test_parse_rejects_non_hex() {
        let err = ObjectId::parse_str("zz0000000000000000000001").unwrap_err();
        assert!(matches!(err, IdentityError::InvalidHex { .. }));
    }

    #[test]
    fn test_parse_accepts_uppercase() {
        let id: ObjectId = "0000000000000000000000FF".parse().unwrap();
        assert_eq!(id, ObjectId::from_u64(255));
    }

    #[test]
    fn test_new_ids_are_distinct_and_timestamped() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        assert_ne!(a, b);

        let ts = a.timestamp().expect("timestamp should decode");
        let age = Utc::now().signed_duration_since(ts);
        assert!(age.num_seconds() < 60);
    }

    #[test]
    fn test_serializes_as_hex_string() {
        let id = ObjectId::from_u64(5);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"000000000000000000000005\"");

        let back: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_deserialize_rejects_bad_hex() {
        let result: Result<ObjectId, _> = serde_json::from_str("\"not-an-id\"");
        assert!(result.is_err());
    }

    proptest! {
        /// Equality of ids agrees with equality of their hex strings.
        #[test]
        fn prop_equality_matches_hex(a in any::<[u8; 12]>(), b in any::<[u8; 12]>()) {
            let (a, b) = (ObjectId::from_bytes(a), ObjectId::from_bytes(b));
            prop_assert_eq!(a == b, a.to_hex() == b.to_hex());
        }

        #[test]
        fn prop_hex_parses_back(bytes in any::<[u8; 12]>()) {
            let id = ObjectId::from_bytes(bytes);
            prop_assert_eq!(ObjectId::parse_str(&id.to_hex()).unwrap(), id);
        }
    }
}
