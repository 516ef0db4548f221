//! Typed UUID identifiers.
//!
//! `Id<T>` wraps a UUID with a zero-sized marker so that identifiers of
//! different entities cannot be mixed up at compile time.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// ```
/// use kernel::id::{AccessId, Id, PairId};
///
/// let access: AccessId = Id::new();
/// let pair: PairId = Id::from_uuid(*access.as_uuid());
/// assert_eq!(access.as_uuid(), pair.as_uuid());
/// ```
pub struct Id<T> {
    value: Uuid,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    /// Random identifier (UUID v4).
    pub fn new() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self {
            value: uuid,
            _marker: PhantomData,
        }
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.value
    }

    pub fn into_uuid(self) -> Uuid {
        self.value
    }
}

// Manual impls: derives would demand the same traits from the marker type.
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> Default for Id<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value, f)
    }
}

impl<T> From<Uuid> for Id<T> {
    fn from(uuid: Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

impl<T> From<Id<T>> for Uuid {
    fn from(id: Id<T>) -> Self {
        id.value
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Uuid::deserialize(deserializer).map(Self::from_uuid)
    }
}

pub mod markers {
    /// One access token (and its metadata record).
    pub struct AccessToken;

    /// One refresh token (and its metadata record).
    pub struct RefreshToken;

    /// The mint that produced an access/refresh pair.
    pub struct TokenPair;
}

pub type AccessId = Id<markers::AccessToken>;
pub type RefreshId = Id<markers::RefreshToken>;
pub type PairId = Id<markers::TokenPair>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<PairId> = (0..64).map(|_| PairId::new()).collect();
        assert_eq!(ids.len(), 64);
    }

    #[test]
    fn test_from_uuid() {
        let uuid = Uuid::new_v4();
        let id: AccessId = Id::from_uuid(uuid);
        assert_eq!(id.as_uuid(), &uuid);
        assert_eq!(Uuid::from(id), uuid);
    }

    #[test]
    fn test_serde_is_plain_uuid() {
        let uuid = Uuid::new_v4();
        let id: RefreshId = Id::from_uuid(uuid);

        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{uuid}\""));

        let back: RefreshId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
