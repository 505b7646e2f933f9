//! Dataset file watcher: reload the graph when the TOML changes on disk.
//!
//! Watches the dataset's parent directory with the notify crate,
//! debounces the event bursts editors produce, and triggers a
//! fingerprint-checked reload for events touching the dataset file. A
//! reload that fails (bad TOML, integrity error) logs and leaves the
//! previous graph serving.

mod watcher;

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use crate::api::AppState;
use crate::error::{Result, SixdegError};

/// True if a filesystem event path refers to the watched dataset file.
///
/// Compared by file name: save-via-rename means the event path and the
/// configured path are equal only by name, and the original inode may be
/// gone by the time we look.
fn is_dataset_event(path: &Path, dataset_file_name: Option<&OsStr>) -> bool {
    match dataset_file_name {
        Some(name) => path.file_name() == Some(name),
        None => true,
    }
}

/// Run the dataset watcher: spawn the watcher thread, then an async loop
/// that receives debounced paths and reloads when the dataset changed.
/// Runs until the watcher thread exits.
pub async fn run_watcher(state: AppState, dataset_path: PathBuf, debounce_ms: u64) -> Result<()> {
    let watch_dir = dataset_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = dataset_path.file_name().map(OsStr::to_os_string);

    log::info!(
        "Watching {} for dataset changes (debounce {}ms)",
        dataset_path.display(),
        debounce_ms
    );

    let (tx, rx) = mpsc::channel();
    let rx = Arc::new(Mutex::new(rx));

    std::thread::spawn(move || {
        if let Err(e) = watcher::run_watcher_thread(&watch_dir, debounce_ms, tx) {
            log::error!("watcher thread error: {}", e);
        }
    });

    loop {
        let rx_clone = rx.clone();
        let path = tokio::task::spawn_blocking(move || rx_clone.lock().unwrap().recv())
            .await
            .map_err(|e| SixdegError::Internal(format!("watcher task join: {}", e)))?;

        let path = match path {
            Ok(p) => p,
            Err(_) => break,
        };

        if !is_dataset_event(&path, file_name.as_deref()) {
            continue;
        }

        // reload_if_changed no-ops on identical content, so spurious
        // events (metadata-only touches, double saves) cost one read.
        if let Err(e) = state.reload_if_changed() {
            log::error!(
                "watch: reload after change to {} failed, keeping previous graph: {}",
                path.display(),
                e
            );
        }
    }
    Ok(())
}
