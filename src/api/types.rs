//! Wire types for the JSON API.
//!
//! Field names match what the original D3 front end consumes: camelCase,
//! nodes keyed by `id`, path membership flagged as `onPath`.

use serde::Serialize;

use crate::graph::{Character, Connection, PathResult, VizLink, VizNode};

/// One node of the full-network payload.
#[derive(Debug, Serialize)]
pub struct NetworkNode {
    pub id: String,
    pub role: String,
    pub allegiance: String,
}

impl From<&Character> for NetworkNode {
    fn from(character: &Character) -> Self {
        Self {
            id: character.name.clone(),
            role: character.role.clone(),
            allegiance: character.allegiance.clone(),
        }
    }
}

/// One undirected edge of the full-network payload.
#[derive(Debug, Serialize)]
pub struct NetworkLink {
    pub source: String,
    pub target: String,
    pub strength: f64,
}

/// `GET /api/network` response body.
#[derive(Debug, Serialize)]
pub struct NetworkResponse {
    pub nodes: Vec<NetworkNode>,
    pub links: Vec<NetworkLink>,
}

/// `GET /api/path` response body.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PathResponse {
    Found {
        success: bool,
        distance: usize,
        nodes: Vec<VizNode>,
        links: Vec<VizLink>,
    },
    NotFound {
        success: bool,
        message: String,
    },
}

impl PathResponse {
    /// Wrap a computed path; every node and link is on the path by
    /// definition here.
    pub fn found(path: &PathResult) -> Self {
        let nodes = path
            .characters
            .iter()
            .map(|character| VizNode {
                name: character.name.clone(),
                role: character.role.clone(),
                allegiance: character.allegiance.clone(),
                on_path: true,
            })
            .collect();
        let links = path
            .edges
            .iter()
            .map(|edge| VizLink {
                source: edge.from.clone(),
                target: edge.to.clone(),
                strength: edge.strength,
                on_path: true,
            })
            .collect();
        PathResponse::Found {
            success: true,
            distance: path.distance(),
            nodes,
            links,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        PathResponse::NotFound {
            success: false,
            message: message.into(),
        }
    }
}

/// One entry of the `GET /api/connections/:name` array.
#[derive(Debug, Serialize)]
pub struct ConnectionDto {
    pub name: String,
    pub role: String,
    pub allegiance: String,
    #[serde(rename = "connectionStrength")]
    pub connection_strength: f64,
}

impl From<Connection> for ConnectionDto {
    fn from(connection: Connection) -> Self {
        Self {
            name: connection.name,
            role: connection.role,
            allegiance: connection.allegiance,
            connection_strength: connection.strength,
        }
    }
}

/// `GET /api/visualization` response body.
#[derive(Debug, Serialize)]
pub struct VisualizationResponse {
    pub success: bool,
    #[serde(rename = "pathFound")]
    pub path_found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub nodes: Vec<VizNode>,
    pub links: Vec<VizLink>,
}

impl From<crate::graph::Visualization> for VisualizationResponse {
    fn from(viz: crate::graph::Visualization) -> Self {
        let path_found = viz.path_found();
        Self {
            success: true,
            path_found,
            distance: viz.distance,
            message: if path_found {
                None
            } else {
                Some("No path found between these characters".to_string())
            },
            nodes: viz.nodes,
            links: viz.links,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{PathEdge, Visualization};

    fn rand() -> Character {
        Character::new("Rand al'Thor", "Dragon Reborn", "Dragon")
    }

    fn mat() -> Character {
        Character::new("Matrim Cauthon", "General", "Band of the Red Hand")
    }

    #[test]
    fn test_path_found_shape() {
        let path = PathResult {
            characters: vec![rand(), mat()],
            edges: vec![PathEdge {
                from: "Rand al'Thor".to_string(),
                to: "Matrim Cauthon".to_string(),
                strength: 0.9,
            }],
        };
        let json = serde_json::to_value(PathResponse::found(&path)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["distance"], 1);
        assert_eq!(json["nodes"][0]["id"], "Rand al'Thor");
        assert_eq!(json["nodes"][0]["onPath"], true);
        assert_eq!(json["links"][0]["source"], "Rand al'Thor");
        assert_eq!(json["links"][0]["strength"], 0.9);
    }

    #[test]
    fn test_path_not_found_shape() {
        let json =
            serde_json::to_value(PathResponse::not_found("No path found between these characters"))
                .unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(
            json["message"],
            "No path found between these characters"
        );
        assert!(json.get("distance").is_none());
    }

    #[test]
    fn test_connection_dto_renames_strength() {
        let dto = ConnectionDto::from(Connection {
            name: "Matrim Cauthon".to_string(),
            role: "General".to_string(),
            allegiance: "Band of the Red Hand".to_string(),
            strength: 0.9,
        });
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["connectionStrength"], 0.9);
        assert!(json.get("strength").is_none());
    }

    #[test]
    fn test_visualization_response_partial_flags() {
        let viz = Visualization {
            nodes: vec![],
            links: vec![],
            distance: None,
        };
        let json = serde_json::to_value(VisualizationResponse::from(viz)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["pathFound"], false);
        assert!(json.get("distance").is_none());
        assert_eq!(
            json["message"],
            "No path found between these characters"
        );

        let viz = Visualization {
            nodes: vec![],
            links: vec![],
            distance: Some(2),
        };
        let json = serde_json::to_value(VisualizationResponse::from(viz)).unwrap();
        assert_eq!(json["pathFound"], true);
        assert_eq!(json["distance"], 2);
        assert!(json.get("message").is_none());
    }

    #[test]
    fn test_network_node_uses_id_key() {
        let node = NetworkNode::from(&rand());
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["id"], "Rand al'Thor");
        assert_eq!(json["role"], "Dragon Reborn");
        assert!(json.get("name").is_none());
    }
}
