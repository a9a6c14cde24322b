use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Runtime IDs are small integers assigned when a ruleset or scenario is built.
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuntimeId<T> {
    pub raw: u16,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T> RuntimeId<T> {
    #[inline]
    pub const fn new(raw: u16) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }
}

// Manual impls so the tag types need no derives of their own.
impl<T> Clone for RuntimeId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RuntimeId<T> {}

impl<T> PartialEq for RuntimeId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for RuntimeId<T> {}

impl<T> PartialOrd for RuntimeId<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for RuntimeId<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<T> std::hash::Hash for RuntimeId<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T> fmt::Debug for RuntimeId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.raw)
    }
}

#[derive(Debug)]
pub enum TerrainTag {}
#[derive(Debug)]
pub enum ProvinceTag {}

pub type TerrainId = RuntimeId<TerrainTag>;
pub type ProvinceId = RuntimeId<ProvinceTag>;

/// Nation ID is a simple index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NationId(pub u8);

impl fmt::Display for NationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "nation#{}", self.0)
    }
}

/// Workforces are identified by UUID so editor-created and game-created units never collide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkforceId(pub Uuid);

impl WorkforceId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn from_u128(raw: u128) -> Self {
        Self(Uuid::from_u128(raw))
    }
}

impl fmt::Display for WorkforceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Structure IDs come from a per-scenario counter so turn resolution stays reproducible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructureId(pub u32);

impl fmt::Display for StructureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "structure#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_ids_serialize_as_plain_integers() {
        let id = TerrainId::new(3);
        assert_eq!(serde_json::to_string(&id).unwrap(), "3");
        let back: TerrainId = serde_json::from_str("3").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn workforce_ids_order_by_uuid_value() {
        let a = WorkforceId::from_u128(1);
        let b = WorkforceId::from_u128(2);
        assert!(a < b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            "\"00000000-0000-0000-0000-000000000001\""
        );
    }
}
