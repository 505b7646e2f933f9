//! In-memory store of characters and their weighted acquaintance edges.
//!
//! Populated once at load, read-only afterwards. Adjacency is kept in
//! `BTreeMap`s so neighbor iteration always ascends lexically by name,
//! which is what makes path and ranking results reproducible.

use std::collections::BTreeMap;

use crate::error::{Result, SixdegError};
use crate::graph::Character;

/// The relationship graph: characters plus symmetric weighted edges.
///
/// Edges are undirected; each pair is stored under both endpoints so that
/// `neighbors_of` is a direct lookup from either side.
#[derive(Debug, Clone, Default)]
pub struct CharacterGraph {
    characters: BTreeMap<String, Character>,
    adjacency: BTreeMap<String, BTreeMap<String, f64>>,
}

impl CharacterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if a character with this exact name is in the graph.
    pub fn contains(&self, name: &str) -> bool {
        self.characters.contains_key(name)
    }

    /// Look up a character by name.
    pub fn character(&self, name: &str) -> Option<&Character> {
        self.characters.get(name)
    }

    /// All characters, ascending by name.
    pub fn characters(&self) -> impl Iterator<Item = &Character> {
        self.characters.values()
    }

    pub fn character_count(&self) -> usize {
        self.characters.len()
    }

    /// Each undirected edge exactly once as `(a, b, strength)` with `a < b`,
    /// ascending.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, f64)> + '_ {
        self.adjacency.iter().flat_map(|(a, neighbors)| {
            neighbors
                .iter()
                .filter(move |(b, _)| a.as_str() < b.as_str())
                .map(move |(b, strength)| (a.as_str(), b.as_str(), *strength))
        })
    }

    pub fn edge_count(&self) -> usize {
        self.edges().count()
    }

    /// Strength of the edge between `a` and `b`, if one exists.
    pub fn edge_strength(&self, a: &str, b: &str) -> Option<f64> {
        self.adjacency.get(a).and_then(|n| n.get(b)).copied()
    }

    /// Add a character. Idempotent for an identical record; a record with
    /// the same name but different role/allegiance is rejected.
    pub fn add_character(&mut self, character: Character) -> Result<()> {
        if let Some(existing) = self.characters.get(&character.name) {
            if *existing == character {
                return Ok(());
            }
            return Err(SixdegError::DuplicateCharacter(character.name));
        }
        self.adjacency
            .insert(character.name.clone(), BTreeMap::new());
        self.characters.insert(character.name.clone(), character);
        Ok(())
    }

    /// Add (or update) the symmetric edge between `a` and `b`.
    ///
    /// Both endpoints must already exist; strength must be in `(0, 1]`;
    /// `a == b` is rejected. Re-adding an existing pair overwrites the
    /// stored strength instead of duplicating the edge.
    pub fn add_edge(&mut self, a: &str, b: &str, strength: f64) -> Result<()> {
        if a == b {
            return Err(SixdegError::SelfEdge(a.to_string()));
        }
        for endpoint in [a, b] {
            if !self.contains(endpoint) {
                return Err(SixdegError::UnknownCharacter(endpoint.to_string()));
            }
        }
        // NaN fails the first comparison, so it is rejected here too.
        if !(strength > 0.0 && strength <= 1.0) {
            return Err(SixdegError::InvalidWeight {
                a: a.to_string(),
                b: b.to_string(),
                strength,
            });
        }

        if let Some(previous) = self.edge_strength(a, b) {
            if previous != strength {
                log::debug!(
                    "Edge {} -- {} strength updated: {} -> {}",
                    a,
                    b,
                    previous,
                    strength
                );
            }
        }
        self.adjacency
            .get_mut(a)
            .expect("endpoint checked above")
            .insert(b.to_string(), strength);
        self.adjacency
            .get_mut(b)
            .expect("endpoint checked above")
            .insert(a.to_string(), strength);
        Ok(())
    }

    /// All edges incident to `name`, keyed by neighbor name (ascending).
    ///
    /// Fails with `UnknownCharacter` for names not in the graph; use
    /// [`contains`](Self::contains) first where absence is expected.
    pub fn neighbors_of(&self, name: &str) -> Result<&BTreeMap<String, f64>> {
        self.adjacency
            .get(name)
            .ok_or_else(|| SixdegError::UnknownCharacter(name.to_string()))
    }
}
