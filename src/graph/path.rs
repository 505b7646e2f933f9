//! Shortest-path search between two characters.
//!
//! Distance is hop count, not accumulated strength: a two-edge chain of
//! weak acquaintances beats a three-edge chain of close friends. Among
//! equally short routes the result is deterministic because neighbors are
//! expanded in ascending name order (see [`CharacterGraph::neighbors_of`]).

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::{Result, SixdegError};
use crate::graph::{Character, CharacterGraph};

/// One traversed edge of a path, in walk order.
#[derive(Debug, Clone, PartialEq)]
pub struct PathEdge {
    pub from: String,
    pub to: String,
    pub strength: f64,
}

/// A shortest path from source to target.
///
/// `characters` runs source-first; `edges` holds the connection walked at
/// each step, so `edges.len() == characters.len() - 1`. A source equal to
/// the target yields one character and no edges.
#[derive(Debug, Clone, PartialEq)]
pub struct PathResult {
    pub characters: Vec<Character>,
    pub edges: Vec<PathEdge>,
}

impl PathResult {
    /// Number of hops separating the endpoints.
    pub fn distance(&self) -> usize {
        self.edges.len()
    }
}

/// Find the fewest-hops path between two characters.
///
/// # Arguments
/// * `graph` - The graph snapshot to search
/// * `source` - Starting character name (must exist)
/// * `target` - Destination character name (must exist)
///
/// # Returns
/// The shortest path, or `NoPathFound` when the endpoints live in
/// disconnected components. Unknown names fail with `UnknownCharacter`
/// before any traversal happens.
pub fn shortest_path(graph: &CharacterGraph, source: &str, target: &str) -> Result<PathResult> {
    for name in [source, target] {
        if !graph.contains(name) {
            return Err(SixdegError::UnknownCharacter(name.to_string()));
        }
    }

    if source == target {
        let character = lookup(graph, source)?;
        return Ok(PathResult {
            characters: vec![character],
            edges: Vec::new(),
        });
    }

    // Plain breadth-first search. First discovery of a node is a shortest
    // route to it, and ascending neighbor order makes that discovery
    // deterministic, so no explicit tie-breaking is needed.
    let mut visited: HashSet<String> = HashSet::from([source.to_string()]);
    let mut parent: HashMap<String, String> = HashMap::new();
    let mut queue: VecDeque<String> = VecDeque::from([source.to_string()]);

    'search: while let Some(current) = queue.pop_front() {
        for neighbor in graph.neighbors_of(&current)?.keys() {
            if visited.insert(neighbor.clone()) {
                parent.insert(neighbor.clone(), current.clone());
                if neighbor == target {
                    break 'search;
                }
                queue.push_back(neighbor.clone());
            }
        }
    }

    if !parent.contains_key(target) {
        return Err(SixdegError::NoPathFound {
            from: source.to_string(),
            to: target.to_string(),
        });
    }

    // Walk the parent chain back from the target, then flip it.
    let mut names: Vec<String> = Vec::new();
    let mut cursor = target.to_string();
    loop {
        names.push(cursor.clone());
        match parent.get(&cursor) {
            Some(previous) => cursor = previous.clone(),
            None => break,
        }
    }
    names.reverse();

    let mut characters = Vec::with_capacity(names.len());
    for name in &names {
        characters.push(lookup(graph, name)?);
    }

    let mut edges = Vec::with_capacity(names.len() - 1);
    for step in names.windows(2) {
        let strength = graph.edge_strength(&step[0], &step[1]).ok_or_else(|| {
            SixdegError::Internal(format!(
                "edge {} -- {} vanished during path reconstruction",
                step[0], step[1]
            ))
        })?;
        edges.push(PathEdge {
            from: step[0].clone(),
            to: step[1].clone(),
            strength,
        });
    }

    Ok(PathResult { characters, edges })
}

fn lookup(graph: &CharacterGraph, name: &str) -> Result<Character> {
    graph
        .character(name)
        .cloned()
        .ok_or_else(|| SixdegError::Internal(format!("character {} vanished mid-query", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(graph: &mut CharacterGraph, name: &str) {
        graph
            .add_character(Character::new(name, "Villager", "Two Rivers"))
            .unwrap();
    }

    /// Rand reaches Lan two ways: Moiraine (2 hops) or Egwene -> Nynaeve
    /// (3 hops). Thom hangs off Moiraine; Loial is disconnected.
    fn sample_graph() -> CharacterGraph {
        let mut graph = CharacterGraph::new();
        for name in [
            "Rand al'Thor",
            "Egwene al'Vere",
            "Nynaeve al'Meara",
            "Moiraine Damodred",
            "Lan Mandragoran",
            "Thom Merrilin",
            "Loial",
        ] {
            add(&mut graph, name);
        }
        graph.add_edge("Rand al'Thor", "Egwene al'Vere", 0.7).unwrap();
        graph.add_edge("Egwene al'Vere", "Nynaeve al'Meara", 0.8).unwrap();
        graph.add_edge("Nynaeve al'Meara", "Lan Mandragoran", 0.9).unwrap();
        graph.add_edge("Rand al'Thor", "Moiraine Damodred", 0.7).unwrap();
        graph.add_edge("Moiraine Damodred", "Lan Mandragoran", 0.9).unwrap();
        graph.add_edge("Moiraine Damodred", "Thom Merrilin", 0.7).unwrap();
        graph
    }

    fn path_names(result: &PathResult) -> Vec<&str> {
        result.characters.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_shortest_by_hops_not_strength() {
        let graph = sample_graph();
        let path = shortest_path(&graph, "Rand al'Thor", "Lan Mandragoran").unwrap();
        assert_eq!(
            path_names(&path),
            vec!["Rand al'Thor", "Moiraine Damodred", "Lan Mandragoran"]
        );
        assert_eq!(path.distance(), 2);
        assert_eq!(path.edges.len(), 2);
        assert_eq!(path.edges[0].from, "Rand al'Thor");
        assert_eq!(path.edges[0].to, "Moiraine Damodred");
        assert_eq!(path.edges[1].strength, 0.9);
    }

    #[test]
    fn test_two_hop_chain_through_sole_intermediary() {
        let mut graph = CharacterGraph::new();
        for name in ["Aviendha", "Bain", "Chiad"] {
            add(&mut graph, name);
        }
        graph.add_edge("Aviendha", "Bain", 0.9).unwrap();
        graph.add_edge("Bain", "Chiad", 0.7).unwrap();

        let path = shortest_path(&graph, "Aviendha", "Chiad").unwrap();
        assert_eq!(path_names(&path), vec!["Aviendha", "Bain", "Chiad"]);
        assert_eq!(path.distance(), 2);
    }

    #[test]
    fn test_adjacent_pair_is_one_hop() {
        let graph = sample_graph();
        let path = shortest_path(&graph, "Moiraine Damodred", "Thom Merrilin").unwrap();
        assert_eq!(path.distance(), 1);
        assert_eq!(
            path_names(&path),
            vec!["Moiraine Damodred", "Thom Merrilin"]
        );
    }

    #[test]
    fn test_equal_length_routes_take_lexically_first() {
        // Two 2-hop routes from Egwene to Tam; Abell sorts before Cenn.
        let mut graph = CharacterGraph::new();
        for name in ["Egwene al'Vere", "Cenn Buie", "Abell Cauthon", "Tam al'Thor"] {
            add(&mut graph, name);
        }
        graph.add_edge("Egwene al'Vere", "Cenn Buie", 0.9).unwrap();
        graph.add_edge("Egwene al'Vere", "Abell Cauthon", 0.2).unwrap();
        graph.add_edge("Cenn Buie", "Tam al'Thor", 0.9).unwrap();
        graph.add_edge("Abell Cauthon", "Tam al'Thor", 0.2).unwrap();

        let path = shortest_path(&graph, "Egwene al'Vere", "Tam al'Thor").unwrap();
        assert_eq!(
            path_names(&path),
            vec!["Egwene al'Vere", "Abell Cauthon", "Tam al'Thor"]
        );
    }

    #[test]
    fn test_source_equals_target() {
        let graph = sample_graph();
        let path = shortest_path(&graph, "Rand al'Thor", "Rand al'Thor").unwrap();
        assert_eq!(path.distance(), 0);
        assert_eq!(path_names(&path), vec!["Rand al'Thor"]);
        assert!(path.edges.is_empty());
    }

    #[test]
    fn test_unknown_endpoints_rejected_before_search() {
        let graph = sample_graph();
        let result = shortest_path(&graph, "Padan Fain", "Rand al'Thor");
        assert!(matches!(result, Err(SixdegError::UnknownCharacter(name)) if name == "Padan Fain"));

        let result = shortest_path(&graph, "Rand al'Thor", "Padan Fain");
        assert!(matches!(result, Err(SixdegError::UnknownCharacter(name)) if name == "Padan Fain"));
    }

    #[test]
    fn test_disconnected_components() {
        let graph = sample_graph();
        let result = shortest_path(&graph, "Rand al'Thor", "Loial");
        match result {
            Err(SixdegError::NoPathFound { from, to }) => {
                assert_eq!(from, "Rand al'Thor");
                assert_eq!(to, "Loial");
            }
            other => panic!("expected NoPathFound, got {:?}", other),
        }
    }

    #[test]
    fn test_distance_is_symmetric() {
        let graph = sample_graph();
        for (a, b) in [
            ("Rand al'Thor", "Lan Mandragoran"),
            ("Thom Merrilin", "Nynaeve al'Meara"),
            ("Egwene al'Vere", "Moiraine Damodred"),
        ] {
            let forward = shortest_path(&graph, a, b).unwrap();
            let backward = shortest_path(&graph, b, a).unwrap();
            assert_eq!(forward.distance(), backward.distance(), "{} <-> {}", a, b);
        }
    }

    #[test]
    fn test_path_endpoints_and_consecutive_edges() {
        let graph = sample_graph();
        let path = shortest_path(&graph, "Thom Merrilin", "Nynaeve al'Meara").unwrap();
        let names = path_names(&path);
        assert_eq!(*names.first().unwrap(), "Thom Merrilin");
        assert_eq!(*names.last().unwrap(), "Nynaeve al'Meara");
        for (i, edge) in path.edges.iter().enumerate() {
            assert_eq!(edge.from, names[i]);
            assert_eq!(edge.to, names[i + 1]);
            assert_eq!(
                graph.edge_strength(&edge.from, &edge.to),
                Some(edge.strength)
            );
        }
    }
}
