//! Assembles the merged subgraph handed to the renderer.
//!
//! The visualization is the shortest path plus each endpoint's strongest
//! connections, folded into one node/link set. Nodes are deduplicated;
//! links are not, so a connection that retraces a path edge shows up
//! twice with different `on_path` flags.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{Result, SixdegError};
use crate::graph::{shortest_path, top_connections, Character, CharacterGraph};

/// A node of the visualization. `on_path` marks membership in the
/// computed shortest path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VizNode {
    #[serde(rename = "id")]
    pub name: String,
    pub role: String,
    pub allegiance: String,
    #[serde(rename = "onPath")]
    pub on_path: bool,
}

impl VizNode {
    fn from_character(character: &Character, on_path: bool) -> Self {
        Self {
            name: character.name.clone(),
            role: character.role.clone(),
            allegiance: character.allegiance.clone(),
            on_path,
        }
    }
}

/// A link of the visualization, flagged like [`VizNode`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VizLink {
    pub source: String,
    pub target: String,
    pub strength: f64,
    #[serde(rename = "onPath")]
    pub on_path: bool,
}

/// Merged subgraph for one (source, target) query.
///
/// `distance` is the path's hop count, or `None` when the endpoints are
/// disconnected and only the partial graph (both endpoints plus their own
/// connections) is returned.
#[derive(Debug, Clone, PartialEq)]
pub struct Visualization {
    pub nodes: Vec<VizNode>,
    pub links: Vec<VizLink>,
    pub distance: Option<usize>,
}

impl Visualization {
    pub fn path_found(&self) -> bool {
        self.distance.is_some()
    }
}

/// Build the visualization subgraph for a pair of characters.
///
/// Assembly order: the shortest path seeds the node and link sets with
/// `on_path = true`; then the source's and then the target's top
/// `neighbor_limit` connections are merged in with `on_path = false`.
/// A neighbor already present keeps its existing node entry, but its
/// connection link is added regardless.
///
/// A disconnected pair is not an error here: the graph degrades to the
/// two endpoints plus their own connections, with `distance: None` so
/// callers can still report the missing path. Unknown names, by contrast,
/// fail outright with `UnknownCharacter`.
///
/// Querying a character against itself returns the single-node graph
/// immediately, without pulling in its connections.
pub fn build_visualization(
    graph: &CharacterGraph,
    source: &str,
    target: &str,
    neighbor_limit: usize,
) -> Result<Visualization> {
    for name in [source, target] {
        if !graph.contains(name) {
            return Err(SixdegError::UnknownCharacter(name.to_string()));
        }
    }

    if source == target {
        let character = character_of(graph, source)?;
        return Ok(Visualization {
            nodes: vec![VizNode::from_character(&character, true)],
            links: Vec::new(),
            distance: Some(0),
        });
    }

    let mut nodes: Vec<VizNode> = Vec::new();
    let mut links: Vec<VizLink> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    let distance = match shortest_path(graph, source, target) {
        Ok(path) => {
            for character in &path.characters {
                seen.insert(character.name.clone());
                nodes.push(VizNode::from_character(character, true));
            }
            for edge in &path.edges {
                links.push(VizLink {
                    source: edge.from.clone(),
                    target: edge.to.clone(),
                    strength: edge.strength,
                    on_path: true,
                });
            }
            Some(path.distance())
        }
        Err(SixdegError::NoPathFound { .. }) => {
            // Partial result: show both endpoints and their own networks
            // even though nothing joins them.
            for name in [source, target] {
                let character = character_of(graph, name)?;
                seen.insert(character.name.clone());
                nodes.push(VizNode::from_character(&character, false));
            }
            None
        }
        Err(other) => return Err(other),
    };

    for origin in [source, target] {
        for connection in top_connections(graph, origin, neighbor_limit)? {
            if seen.insert(connection.name.clone()) {
                nodes.push(VizNode {
                    name: connection.name.clone(),
                    role: connection.role,
                    allegiance: connection.allegiance,
                    on_path: false,
                });
            }
            links.push(VizLink {
                source: origin.to_string(),
                target: connection.name,
                strength: connection.strength,
                on_path: false,
            });
        }
    }

    verify(&nodes, &links)?;
    Ok(Visualization {
        nodes,
        links,
        distance,
    })
}

fn character_of(graph: &CharacterGraph, name: &str) -> Result<Character> {
    graph
        .character(name)
        .cloned()
        .ok_or_else(|| SixdegError::Internal(format!("character {} vanished mid-query", name)))
}

/// Structural checks every assembled graph must pass: unique node names,
/// link endpoints all present, no self loops.
fn verify(nodes: &[VizNode], links: &[VizLink]) -> Result<()> {
    let mut names: HashSet<&str> = HashSet::with_capacity(nodes.len());
    for node in nodes {
        if !names.insert(&node.name) {
            return Err(SixdegError::Internal(format!(
                "visualization contains duplicate node {}",
                node.name
            )));
        }
    }
    for link in links {
        if link.source == link.target {
            return Err(SixdegError::Internal(format!(
                "visualization contains self loop on {}",
                link.source
            )));
        }
        for endpoint in [&link.source, &link.target] {
            if !names.contains(endpoint.as_str()) {
                return Err(SixdegError::Internal(format!(
                    "visualization link references missing node {}",
                    endpoint
                )));
            }
        }
    }
    Ok(())
}
