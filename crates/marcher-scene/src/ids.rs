//! Node identifiers
//!
//! Ids are decimal strings handed out in increasing order. Ids that do not
//! parse as numbers (such as the fixed root id) are valid keys but never
//! affect allocation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Identifier of a node in the shape tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of the id, if it was issued by an allocator
    pub fn number(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Largest id that may be restored from persisted data
pub const MAX_RESTORED_ID: u64 = (1 << 53) - 1;

/// Issues fresh node ids for one editing session
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    /// Highest id issued or observed so far
    floor: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return an id strictly greater than every id issued or observed
    pub fn next_id(&mut self) -> NodeId {
        self.floor += 1;
        NodeId(self.floor.to_string())
    }

    /// Raise the floor past an id restored from persisted data
    ///
    /// Ids above [`MAX_RESTORED_ID`] are rejected and leave the floor alone.
    pub fn observe(&mut self, id: &NodeId) -> Result<()> {
        match id.number() {
            Some(n) if n > MAX_RESTORED_ID => Err(Error::IdOutOfRange(id.clone())),
            Some(n) => {
                self.floor = self.floor.max(n);
                Ok(())
            }
            None => Ok(()),
        }
    }

    pub fn floor(&self) -> u64 {
        self.floor
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_increase() {
        let mut ids = IdAllocator::new();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_eq!(a.as_str(), "1");
        assert_eq!(b.as_str(), "2");
    }

    #[test]
    fn test_observe_is_monotone() {
        let mut ids = IdAllocator::new();
        ids.observe(&NodeId::new("40")).unwrap();
        ids.observe(&NodeId::new("12")).unwrap();
        ids.observe(&NodeId::new("40")).unwrap();
        assert_eq!(ids.floor(), 40);
        assert_eq!(ids.next_id().as_str(), "41");
    }

    #[test]
    fn test_non_numeric_ids_are_ignored() {
        let mut ids = IdAllocator::new();
        ids.observe(&NodeId::new("shapes")).unwrap();
        assert_eq!(ids.next_id().as_str(), "1");
    }

    #[test]
    fn test_largest_id_is_rejected() {
        let mut ids = IdAllocator::new();
        let max = NodeId::new(u64::MAX.to_string());
        assert!(matches!(ids.observe(&max), Err(Error::IdOutOfRange(_))));
        assert_eq!(ids.floor(), 0);

        let too_big = NodeId::new((MAX_RESTORED_ID + 1).to_string());
        assert!(ids.observe(&too_big).is_err());

        ids.observe(&NodeId::new(MAX_RESTORED_ID.to_string())).unwrap();
        let next = ids.next_id();
        assert_eq!(next.number(), Some(MAX_RESTORED_ID + 1));
    }
}
