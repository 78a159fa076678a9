//! Stable node identities.
//!
//! Every tree node carries a [`NodeId`] that survives rebuilds: a node whose
//! children changed is rebuilt with the same id, so ids identify a syntactic
//! position across passes while `Arc` identity tracks structural sharing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Create a NodeId from a raw value.
    pub const fn new(id: u64) -> Self {
        NodeId(id)
    }

    /// Allocate an id that has not been handed out before in this process.
    ///
    /// Ids are unique across threads, so units parsed concurrently never
    /// share an id.
    pub fn fresh() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw value.
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn fresh_ids_are_unique() {
        let ids: HashSet<NodeId> = (0..1000).map(|_| NodeId::fresh()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn fresh_ids_are_unique_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| (0..250).map(|_| NodeId::fresh()).collect::<Vec<_>>()))
            .collect();
        let mut all = HashSet::new();
        for h in handles {
            for id in h.join().unwrap() {
                assert!(all.insert(id), "duplicate id {}", id);
            }
        }
        assert_eq!(all.len(), 1000);
    }

    #[test]
    fn display_and_serde() {
        let id = NodeId::new(42);
        assert_eq!(id.to_string(), "#42");
        assert_eq!(id.as_u64(), 42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "42");
        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
