pub mod api;
pub mod config;
pub mod dataset;
pub mod error;
pub mod graph;
pub mod watch;

pub use config::Config;
pub use error::{Result, SixdegError};
pub use graph::{build_visualization, shortest_path, top_connections, CharacterGraph};
