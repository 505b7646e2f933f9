//! HTTP server exposing the graph queries as JSON routes.
//!
//! All query handlers follow the same shape: clone the current graph
//! snapshot out of [`AppState`], run the pure graph function against it,
//! translate the result or error into the wire format. Reload swaps the
//! snapshot without touching requests already in flight.

use crate::api::types::*;
use crate::config::Config;
use crate::dataset::{fingerprint, Dataset, DatasetSource, LoadedGraph};
use crate::error::{Result, SixdegError};
use crate::graph::{
    build_visualization, ranked_connections, shortest_path, top_connections, CharacterGraph,
    SharedGraph,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::{Arc, RwLock};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Check if an address is available by attempting to bind to it
async fn check_port_available(addr: &str) -> bool {
    tokio::net::TcpListener::bind(addr).await.is_ok()
}

/// Dataset provenance reported by the health route, updated on reload.
#[derive(Debug, Clone)]
struct DatasetMeta {
    fingerprint: String,
    loaded_at: DateTime<Utc>,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    graph: Arc<SharedGraph>,
    meta: Arc<RwLock<DatasetMeta>>,
    source: DatasetSource,
    neighbor_limit: usize,
}

impl AppState {
    pub fn new(loaded: LoadedGraph, source: DatasetSource, neighbor_limit: usize) -> Self {
        Self {
            graph: Arc::new(SharedGraph::new(loaded.graph)),
            meta: Arc::new(RwLock::new(DatasetMeta {
                fingerprint: loaded.fingerprint,
                loaded_at: loaded.loaded_at,
            })),
            source,
            neighbor_limit,
        }
    }

    /// The snapshot each request runs against.
    pub fn snapshot(&self) -> Arc<CharacterGraph> {
        self.graph.snapshot()
    }

    /// Rebuild from the dataset source and swap it in. Returns the new
    /// (character, edge) counts. Any load error leaves the serving graph
    /// untouched.
    pub fn reload(&self) -> Result<(usize, usize)> {
        let raw = self.source.read()?;
        let dataset = Dataset::from_toml_str(&raw)?;
        let graph = dataset.build_graph()?;
        let counts = (graph.character_count(), graph.edge_count());
        self.publish(graph, fingerprint(&raw));
        log::info!(
            "Graph reloaded from {}: {} characters, {} edges",
            self.source.describe(),
            counts.0,
            counts.1
        );
        Ok(counts)
    }

    /// Like [`reload`](Self::reload), but a no-op when the dataset text
    /// is byte-identical to what is already serving. Used by the file
    /// watcher, which sees spurious change events.
    pub fn reload_if_changed(&self) -> Result<bool> {
        let raw = self.source.read()?;
        let new_fingerprint = fingerprint(&raw);
        // Guard dropped here; publish retakes the lock for write.
        let unchanged = self.meta.read().unwrap().fingerprint == new_fingerprint;
        if unchanged {
            log::debug!(
                "Dataset {} unchanged; skipping reload",
                self.source.describe()
            );
            return Ok(false);
        }
        let dataset = Dataset::from_toml_str(&raw)?;
        let graph = dataset.build_graph()?;
        log::info!(
            "Dataset {} changed: {} characters, {} edges",
            self.source.describe(),
            graph.character_count(),
            graph.edge_count()
        );
        self.publish(graph, new_fingerprint);
        Ok(true)
    }

    /// Graph snapshot plus the provenance recorded when it was
    /// published. Both reads happen under one meta guard so the pair
    /// never straddles a reload.
    fn serving_view(&self) -> (Arc<CharacterGraph>, DatasetMeta) {
        let meta = self.meta.read().unwrap();
        (self.graph.snapshot(), meta.clone())
    }

    /// The swap happens while meta is held for write, so a
    /// [`serving_view`](Self::serving_view) reader never pairs the new
    /// graph with the old fingerprint.
    fn publish(&self, graph: CharacterGraph, new_fingerprint: String) {
        let mut meta = self.meta.write().unwrap();
        self.graph.swap(graph);
        meta.fingerprint = new_fingerprint;
        meta.loaded_at = Utc::now();
    }
}

/// HTTP server wrapper
pub struct HttpServer {
    state: AppState,
    addr: String,
    port: u16,
    allowed_origins: Vec<String>,
}

impl HttpServer {
    pub fn new(state: AppState, config: &Config) -> Self {
        Self {
            state,
            addr: config.bind_addr(),
            port: config.server.port,
            allowed_origins: config.server.allowed_origins.clone(),
        }
    }

    /// Run the HTTP server until the process is stopped.
    pub async fn run(&self) -> Result<()> {
        let app = self.create_router();

        log::info!("Starting sixdeg HTTP server on http://{}", self.addr);
        log::info!("Full network: http://{}/api/network", self.addr);
        log::info!(
            "Shortest path: http://{}/api/path?source=A&target=B",
            self.addr
        );

        // Check if the port is free before attempting to bind, so the
        // common failure gets an actionable message.
        if !check_port_available(&self.addr).await {
            return Err(SixdegError::Config(format!(
                "Port {} is already in use. Stop the other process or change server.port in config.toml.",
                self.port
            )));
        }

        let listener = tokio::net::TcpListener::bind(&self.addr).await.map_err(|e| {
            let message = if e.kind() == std::io::ErrorKind::AddrInUse {
                format!(
                    "Port {} is already in use. Stop the other process or change server.port in config.toml.",
                    self.port
                )
            } else {
                format!("Failed to bind to {}: {}", self.addr, e)
            };
            SixdegError::Io(std::io::Error::new(e.kind(), message))
        })?;

        axum::serve(listener, app).await.map_err(|e| {
            SixdegError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("HTTP server error: {}", e),
            ))
        })?;

        Ok(())
    }

    /// Create the axum router
    pub fn create_router(&self) -> Router {
        // Build CORS layer.
        // - If allowed_origins is configured: restrict to that list.
        // - If empty (local dev): allow Any for convenience.
        let cors = if self.allowed_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<axum::http::HeaderValue> = self
                .allowed_origins
                .iter()
                .filter_map(|o| o.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .route("/api/network", get(handle_network))
            .route("/api/path", get(handle_path))
            .route("/api/connections/:name", get(handle_connections))
            .route("/api/visualization", get(handle_visualization))
            .route("/api/health", get(handle_health))
            .route("/api/reload", post(handle_reload))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(cors),
            )
            .with_state(self.state.clone())
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(serde_json::json!({
            "success": false,
            "message": message
        })),
    )
        .into_response()
}

/// Map a graph error onto the route's failure response. `NoPathFound`
/// never reaches this; routes that can see it handle it as a normal
/// negative result first.
fn error_for(err: SixdegError) -> Response {
    let status = match &err {
        SixdegError::UnknownCharacter(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        log::error!("Request failed: {}", err);
    }
    error_response(status, &err.to_string())
}

/// Negative `limit` query values behave like zero.
fn clamp_limit(limit: i64) -> usize {
    limit.max(0) as usize
}

async fn handle_network(State(state): State<AppState>) -> Response {
    let graph = state.snapshot();
    let nodes: Vec<NetworkNode> = graph.characters().map(NetworkNode::from).collect();
    let links: Vec<NetworkLink> = graph
        .edges()
        .map(|(source, target, strength)| NetworkLink {
            source: source.to_string(),
            target: target.to_string(),
            strength,
        })
        .collect();
    (StatusCode::OK, Json(NetworkResponse { nodes, links })).into_response()
}

#[derive(Debug, Deserialize)]
struct PathParams {
    source: Option<String>,
    target: Option<String>,
}

async fn handle_path(
    State(state): State<AppState>,
    Query(params): Query<PathParams>,
) -> Response {
    let (source, target) = match (params.source, params.target) {
        (Some(source), Some(target)) => (source, target),
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "source and target query parameters are required",
            )
        }
    };

    let graph = state.snapshot();
    match shortest_path(&graph, &source, &target) {
        Ok(path) => (StatusCode::OK, Json(PathResponse::found(&path))).into_response(),
        Err(SixdegError::NoPathFound { .. }) => (
            StatusCode::OK,
            Json(PathResponse::not_found(
                "No path found between these characters",
            )),
        )
            .into_response(),
        Err(e) => error_for(e),
    }
}

#[derive(Debug, Deserialize)]
struct ConnectionsParams {
    limit: Option<i64>,
}

async fn handle_connections(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<ConnectionsParams>,
) -> Response {
    let graph = state.snapshot();
    let result = match params.limit {
        Some(limit) => top_connections(&graph, &name, clamp_limit(limit)),
        None => ranked_connections(&graph, &name),
    };
    match result {
        Ok(connections) => {
            let body: Vec<ConnectionDto> =
                connections.into_iter().map(ConnectionDto::from).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => error_for(e),
    }
}

#[derive(Debug, Deserialize)]
struct VisualizationParams {
    source: Option<String>,
    target: Option<String>,
    limit: Option<i64>,
}

async fn handle_visualization(
    State(state): State<AppState>,
    Query(params): Query<VisualizationParams>,
) -> Response {
    let (source, target) = match (params.source, params.target) {
        (Some(source), Some(target)) => (source, target),
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "source and target query parameters are required",
            )
        }
    };
    let limit = params
        .limit
        .map(clamp_limit)
        .unwrap_or(state.neighbor_limit);

    let graph = state.snapshot();
    match build_visualization(&graph, &source, &target, limit) {
        Ok(viz) => (StatusCode::OK, Json(VisualizationResponse::from(viz))).into_response(),
        Err(e) => error_for(e),
    }
}

/// Handle health check endpoint
async fn handle_health(State(state): State<AppState>) -> Response {
    let (graph, meta) = state.serving_view();
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "service": "sixdeg",
            "version": env!("CARGO_PKG_VERSION"),
            "characters": graph.character_count(),
            "edges": graph.edge_count(),
            "dataset": state.source.describe(),
            "datasetFingerprint": meta.fingerprint,
            "loadedAt": meta.loaded_at.to_rfc3339(),
        })),
    )
        .into_response()
}

async fn handle_reload(State(state): State<AppState>) -> Response {
    match state.reload() {
        Ok((characters, edges)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "message": "Graph reloaded",
                "characters": characters,
                "edges": edges,
            })),
        )
            .into_response(),
        Err(e) => {
            log::error!("Reload failed: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Reload failed: {}", e),
            )
        }
    }
}
