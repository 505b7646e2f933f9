//! Dataset loading: the character network as TOML.
//!
//! A dataset is a flat list of `[[characters]]` and `[[relationships]]`
//! records. Building the graph is all-or-nothing: any integrity error
//! (unknown endpoint, bad strength, conflicting duplicate) aborts the
//! load before anything is published, so a half-loaded graph is never
//! observable.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::error::{Result, SixdegError};
use crate::graph::{Character, CharacterGraph};

/// Seed network compiled into the binary, used when no dataset path is
/// configured.
const BUILTIN_DATASET: &str = include_str!("../data/characters.toml");

/// One `[[relationships]]` record. Order of source/target does not
/// matter; edges are symmetric.
#[derive(Debug, Clone, Deserialize)]
pub struct RelationshipRecord {
    pub source: String,
    pub target: String,
    pub strength: f64,
}

/// Parsed but not yet validated dataset file.
#[derive(Debug, Clone, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub characters: Vec<Character>,
    #[serde(default)]
    pub relationships: Vec<RelationshipRecord>,
}

impl Dataset {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| SixdegError::Parse(format!("invalid dataset: {}", e)))
    }

    /// Validate and assemble the graph.
    ///
    /// Character records load first, then relationships. A relationship
    /// listing a pair twice keeps the later strength; this is tolerated
    /// with a warning rather than rejected, since the records are
    /// hand-maintained.
    pub fn build_graph(&self) -> Result<CharacterGraph> {
        let mut graph = CharacterGraph::new();
        for character in &self.characters {
            if character.name.trim().is_empty() {
                return Err(SixdegError::Parse(
                    "character record with empty name".to_string(),
                ));
            }
            graph.add_character(character.clone())?;
        }
        for relationship in &self.relationships {
            if let Some(previous) =
                graph.edge_strength(&relationship.source, &relationship.target)
            {
                log::warn!(
                    "Dataset lists {} -- {} twice; keeping strength {} over {}",
                    relationship.source,
                    relationship.target,
                    relationship.strength,
                    previous
                );
            }
            graph.add_edge(
                &relationship.source,
                &relationship.target,
                relationship.strength,
            )?;
        }
        Ok(graph)
    }
}

/// Where the serving dataset comes from.
#[derive(Debug, Clone)]
pub enum DatasetSource {
    /// The compiled-in seed network.
    Builtin,
    /// A TOML file on disk, reloadable at runtime.
    File(PathBuf),
}

impl DatasetSource {
    pub fn from_path(path: Option<&Path>) -> Self {
        match path {
            Some(p) => DatasetSource::File(p.to_path_buf()),
            None => DatasetSource::Builtin,
        }
    }

    /// Human-readable origin for log lines and the health endpoint.
    pub fn describe(&self) -> String {
        match self {
            DatasetSource::Builtin => "builtin".to_string(),
            DatasetSource::File(path) => path.display().to_string(),
        }
    }

    /// Raw dataset text.
    pub fn read(&self) -> Result<String> {
        match self {
            DatasetSource::Builtin => Ok(BUILTIN_DATASET.to_string()),
            DatasetSource::File(path) => std::fs::read_to_string(path).map_err(|e| {
                SixdegError::Config(format!(
                    "failed to read dataset {}: {}",
                    path.display(),
                    e
                ))
            }),
        }
    }
}

/// A fully-built graph plus the provenance reported by `/api/health`.
#[derive(Debug, Clone)]
pub struct LoadedGraph {
    pub graph: CharacterGraph,
    pub fingerprint: String,
    pub loaded_at: DateTime<Utc>,
}

/// Read, parse, validate and assemble in one step.
pub fn load_graph(source: &DatasetSource) -> Result<LoadedGraph> {
    let raw = source.read()?;
    let dataset = Dataset::from_toml_str(&raw)?;
    let graph = dataset.build_graph()?;
    log::info!(
        "Dataset {} loaded: {} characters, {} relationships",
        source.describe(),
        graph.character_count(),
        graph.edge_count()
    );
    Ok(LoadedGraph {
        graph,
        fingerprint: fingerprint(&raw),
        loaded_at: Utc::now(),
    })
}

/// Hex SHA-256 of the raw dataset text, for reload change detection.
pub fn fingerprint(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_dataset_parses_and_builds() {
        let dataset = Dataset::from_toml_str(BUILTIN_DATASET).unwrap();
        assert_eq!(dataset.characters.len(), 15);
        assert_eq!(dataset.relationships.len(), 19);

        let graph = dataset.build_graph().unwrap();
        assert_eq!(graph.character_count(), 15);
        assert_eq!(graph.edge_count(), 19);
        assert_eq!(
            graph.edge_strength("Rand al'Thor", "Matrim Cauthon"),
            Some(0.9)
        );
        // Verin hangs off the network through Siuan alone.
        let verin = graph.neighbors_of("Verin Mathwin").unwrap();
        assert_eq!(verin.len(), 1);
        assert_eq!(verin.get("Siuan Sanche"), Some(&0.6));
    }

    #[test]
    fn test_malformed_toml_is_a_parse_error() {
        let result = Dataset::from_toml_str("characters = \"not a table\"");
        assert!(matches!(result, Err(SixdegError::Parse(_))));
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let dataset = Dataset::from_toml_str("").unwrap();
        assert!(dataset.characters.is_empty());
        assert!(dataset.relationships.is_empty());
        assert_eq!(dataset.build_graph().unwrap().character_count(), 0);
    }

    #[test]
    fn test_relationship_with_unknown_endpoint_aborts_build() {
        let dataset = Dataset::from_toml_str(
            r#"
[[characters]]
name = "Rand al'Thor"
role = "Dragon Reborn"
allegiance = "Dragon"

[[relationships]]
source = "Rand al'Thor"
target = "Padan Fain"
strength = 0.3
"#,
        )
        .unwrap();
        let result = dataset.build_graph();
        assert!(matches!(result, Err(SixdegError::UnknownCharacter(name)) if name == "Padan Fain"));
    }

    #[test]
    fn test_out_of_range_strength_aborts_build() {
        let dataset = Dataset::from_toml_str(
            r#"
[[characters]]
name = "Rand al'Thor"
role = "Dragon Reborn"
allegiance = "Dragon"

[[characters]]
name = "Matrim Cauthon"
role = "General"
allegiance = "Band of the Red Hand"

[[relationships]]
source = "Rand al'Thor"
target = "Matrim Cauthon"
strength = 1.5
"#,
        )
        .unwrap();
        assert!(matches!(
            dataset.build_graph(),
            Err(SixdegError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn test_conflicting_duplicate_character_aborts_build() {
        let dataset = Dataset::from_toml_str(
            r#"
[[characters]]
name = "Rand al'Thor"
role = "Dragon Reborn"
allegiance = "Dragon"

[[characters]]
name = "Rand al'Thor"
role = "Shepherd"
allegiance = "Two Rivers"
"#,
        )
        .unwrap();
        assert!(matches!(
            dataset.build_graph(),
            Err(SixdegError::DuplicateCharacter(_))
        ));
    }

    #[test]
    fn test_self_relationship_aborts_build() {
        let dataset = Dataset::from_toml_str(
            r#"
[[characters]]
name = "Rand al'Thor"
role = "Dragon Reborn"
allegiance = "Dragon"

[[relationships]]
source = "Rand al'Thor"
target = "Rand al'Thor"
strength = 1.0
"#,
        )
        .unwrap();
        assert!(matches!(dataset.build_graph(), Err(SixdegError::SelfEdge(_))));
    }

    #[test]
    fn test_duplicate_relationship_keeps_later_strength() {
        let dataset = Dataset::from_toml_str(
            r#"
[[characters]]
name = "Rand al'Thor"
role = "Dragon Reborn"
allegiance = "Dragon"

[[characters]]
name = "Matrim Cauthon"
role = "General"
allegiance = "Band of the Red Hand"

[[relationships]]
source = "Rand al'Thor"
target = "Matrim Cauthon"
strength = 0.5

[[relationships]]
source = "Matrim Cauthon"
target = "Rand al'Thor"
strength = 0.9
"#,
        )
        .unwrap();
        let graph = dataset.build_graph().unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(
            graph.edge_strength("Rand al'Thor", "Matrim Cauthon"),
            Some(0.9)
        );
    }

    #[test]
    fn test_fingerprint_is_hex_sha256_and_content_sensitive() {
        let a = fingerprint("characters");
        let b = fingerprint("characters ");
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
        assert_eq!(a, fingerprint("characters"));
    }

    #[test]
    fn test_load_graph_from_file_source() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("network.toml");
        fs::write(
            &path,
            r#"
[[characters]]
name = "Rand al'Thor"
role = "Dragon Reborn"
allegiance = "Dragon"
"#,
        )
        .unwrap();

        let source = DatasetSource::File(path.clone());
        let loaded = load_graph(&source).unwrap();
        assert_eq!(loaded.graph.character_count(), 1);
        assert_eq!(loaded.fingerprint.len(), 64);
        assert_eq!(source.describe(), path.display().to_string());
    }

    #[test]
    fn test_missing_dataset_file_is_a_config_error() {
        let source = DatasetSource::File(PathBuf::from("/nonexistent/network.toml"));
        assert!(matches!(source.read(), Err(SixdegError::Config(_))));
    }

    #[test]
    fn test_builtin_source_matches_bundled_graph() {
        let loaded = load_graph(&DatasetSource::Builtin).unwrap();
        assert_eq!(loaded.graph.character_count(), 15);
        assert_eq!(loaded.fingerprint, fingerprint(BUILTIN_DATASET));
        assert_eq!(DatasetSource::Builtin.describe(), "builtin");
    }
}
