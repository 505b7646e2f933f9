//! Shared handle to the graph snapshot currently being served.
//!
//! Reload support without locks on the query path: a query clones the
//! `Arc` once up front and runs entirely against that snapshot, so a
//! swap mid-flight never shows it a half-updated graph.

use std::sync::{Arc, RwLock};

use crate::graph::CharacterGraph;

/// Swappable owner of the serving graph.
pub struct SharedGraph {
    inner: RwLock<Arc<CharacterGraph>>,
}

impl SharedGraph {
    pub fn new(graph: CharacterGraph) -> Self {
        Self {
            inner: RwLock::new(Arc::new(graph)),
        }
    }

    /// The snapshot to run the current request against. The lock is held
    /// only for the pointer clone, never during traversal.
    pub fn snapshot(&self) -> Arc<CharacterGraph> {
        self.inner.read().unwrap().clone()
    }

    /// Publish a fully-built replacement graph as a single pointer swap.
    /// Snapshots handed out earlier keep the graph they started with.
    pub fn swap(&self, graph: CharacterGraph) {
        *self.inner.write().unwrap() = Arc::new(graph);
    }
}
