//! Ranking a character's direct connections by strength.

use crate::error::{Result, SixdegError};
use crate::graph::{CharacterGraph, Connection};

/// All direct connections of `name`, strongest first.
///
/// Equal strengths fall back to ascending neighbor name, so the ordering
/// is total and stable across runs. Fails with `UnknownCharacter` when
/// `name` is not in the graph; a known character with no edges yields an
/// empty list.
pub fn ranked_connections(graph: &CharacterGraph, name: &str) -> Result<Vec<Connection>> {
    let neighbors = graph.neighbors_of(name)?;

    let mut connections: Vec<Connection> = Vec::with_capacity(neighbors.len());
    for (neighbor, &strength) in neighbors {
        let character = graph.character(neighbor).ok_or_else(|| {
            SixdegError::Internal(format!("neighbor {} has no character record", neighbor))
        })?;
        connections.push(Connection {
            name: character.name.clone(),
            role: character.role.clone(),
            allegiance: character.allegiance.clone(),
            strength,
        });
    }

    connections.sort_by(|a, b| {
        b.strength
            .partial_cmp(&a.strength)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });

    Ok(connections)
}

/// The `limit` strongest connections of `name`.
///
/// A limit of zero yields an empty list (still validating that the
/// character exists). Characters with fewer than `limit` neighbors return
/// them all.
pub fn top_connections(
    graph: &CharacterGraph,
    name: &str,
    limit: usize,
) -> Result<Vec<Connection>> {
    let mut connections = ranked_connections(graph, name)?;
    connections.truncate(limit);
    Ok(connections)
}
