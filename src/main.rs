use anyhow::Result;
use clap::{Parser, Subcommand};
use sixdeg::api::{AppState, HttpServer};
use sixdeg::dataset::load_graph;
use sixdeg::error::SixdegError;
use sixdeg::graph::{ranked_connections, shortest_path, top_connections};
use sixdeg::watch::run_watcher;
use sixdeg::Config;

#[derive(Parser, Debug)]
#[command(name = "sixdeg")]
#[command(about = "Six-degrees query service over a character relationship graph")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API (the default when no command is given)
    Serve,
    /// Load the dataset, check its integrity, and print summary counts
    Verify,
    /// Print the shortest path between two characters
    Path { source: String, target: String },
    /// Print a character's connections, strongest first
    Connections {
        name: String,
        /// Keep only the strongest N connections
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger from environment variable or default to info level
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    let args = Args::parse();

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => run_server().await,
        Command::Verify => run_verify(),
        Command::Path { source, target } => run_path(&source, &target),
        Command::Connections { name, limit } => run_connections(&name, limit),
    }
}

/// Load everything and serve the HTTP API until stopped.
async fn run_server() -> Result<()> {
    log::info!("Starting sixdeg v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    let source = config.dataset_source();
    log::info!("Dataset source: {}", source.describe());

    let loaded = load_graph(&source)?;
    let state = AppState::new(loaded, source, config.graph.neighbor_limit);

    if config.graph.watch {
        if let Some(path) = config.graph.dataset_path.clone() {
            let watcher_state = state.clone();
            let debounce_ms = config.graph.watch_debounce_ms;
            tokio::spawn(async move {
                if let Err(e) = run_watcher(watcher_state, path, debounce_ms).await {
                    log::error!("dataset watcher exited: {}", e);
                }
            });
        }
    }

    let server = HttpServer::new(state, &config);
    server.run().await?;

    Ok(())
}

/// Load the dataset the way `serve` would and report what it contains.
fn run_verify() -> Result<()> {
    log::info!("Starting sixdeg v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    let source = config.dataset_source();
    let loaded = load_graph(&source)?;
    let graph = &loaded.graph;

    println!("Dataset: {}", source.describe());
    println!("Fingerprint: {}", loaded.fingerprint);
    println!("Characters: {}", graph.character_count());
    println!("Relationships: {}", graph.edge_count());

    let isolated: Vec<&str> = graph
        .characters()
        .filter(|c| {
            graph
                .neighbors_of(&c.name)
                .map(|n| n.is_empty())
                .unwrap_or(false)
        })
        .map(|c| c.name.as_str())
        .collect();
    if isolated.is_empty() {
        log::info!("✓ Every character has at least one connection");
    } else {
        log::warn!(
            "{} isolated character(s): {}",
            isolated.len(),
            isolated.join(", ")
        );
    }

    log::info!("✓ Dataset integrity OK");
    Ok(())
}

fn run_path(source_name: &str, target_name: &str) -> Result<()> {
    let config = Config::load()?;
    let loaded = load_graph(&config.dataset_source())?;

    match shortest_path(&loaded.graph, source_name, target_name) {
        Ok(path) => {
            let names: Vec<&str> = path.characters.iter().map(|c| c.name.as_str()).collect();
            println!("{} degree(s): {}", path.distance(), names.join(" -> "));
            for edge in &path.edges {
                println!("  {} -- {} (strength {})", edge.from, edge.to, edge.strength);
            }
            Ok(())
        }
        // A missing connection is an answer, not a failure.
        Err(e @ SixdegError::NoPathFound { .. }) => {
            println!("{}", e);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn run_connections(name: &str, limit: Option<usize>) -> Result<()> {
    let config = Config::load()?;
    let loaded = load_graph(&config.dataset_source())?;

    let connections = match limit {
        Some(limit) => top_connections(&loaded.graph, name, limit)?,
        None => ranked_connections(&loaded.graph, name)?,
    };

    if connections.is_empty() {
        println!("{} has no connections", name);
        return Ok(());
    }
    println!("Connections of {}:", name);
    for connection in &connections {
        println!(
            "  {:.2}  {} ({}, {})",
            connection.strength, connection.name, connection.role, connection.allegiance
        );
    }
    Ok(())
}
