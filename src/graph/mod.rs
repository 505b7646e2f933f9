//! Character relationship graph: store, shortest paths, connection ranking,
//! and visualization subgraph assembly.
//!
//! The graph is loaded once (or republished whole on reload) and queried
//! read-only; every query runs against an immutable snapshot.

mod path;
mod rank;
mod shared;
mod store;
mod viz;

pub use path::{shortest_path, PathEdge, PathResult};
pub use rank::{ranked_connections, top_connections};
pub use shared::SharedGraph;
pub use store::CharacterGraph;
pub use viz::{build_visualization, VizLink, VizNode, Visualization};

use serde::{Deserialize, Serialize};

/// A named character in the relationship graph.
///
/// The name is the identity: unique, case-sensitive, no separate numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    /// Unique name, e.g. `Moiraine Damodred`.
    pub name: String,
    /// Display role, e.g. `Aes Sedai`.
    pub role: String,
    /// Display allegiance/group label, e.g. `Blue Ajah`.
    pub allegiance: String,
}

impl Character {
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        allegiance: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            allegiance: allegiance.into(),
        }
    }
}

/// A direct connection of some origin character.
///
/// `strength` is the weight of the edge between the origin and this
/// character; the origin itself is implied by the query that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub name: String,
    pub role: String,
    pub allegiance: String,
    pub strength: f64,
}
