//! Watcher thread: notify + debounce, send changed paths to main.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use notify::{RecursiveMode, Watcher};

use crate::error::{Result, SixdegError};

/// Watch `dir` (non-recursively) and send debounced changed paths over
/// `tx`. Editors often save via temp file plus rename, so one logical
/// save produces a burst of events; paths are held back until they have
/// been quiet for the debounce window.
///
/// Blocks until `tx`'s receiver is dropped or the watcher fails; run it
/// on its own thread.
pub fn run_watcher_thread(
    dir: &Path,
    debounce_ms: u64,
    tx: mpsc::Sender<PathBuf>,
) -> Result<()> {
    let debounce = Duration::from_millis(debounce_ms);

    let (event_tx, event_rx) = mpsc::channel::<Vec<PathBuf>>();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if let Ok(event) = res {
            let _ = event_tx.send(event.paths);
        }
    })
    .map_err(|e| SixdegError::Config(format!("failed to create watcher: {}", e)))?;

    watcher
        .watch(dir, RecursiveMode::NonRecursive)
        .map_err(|e| SixdegError::Config(format!("failed to watch {}: {}", dir.display(), e)))?;

    let mut pending: HashMap<PathBuf, Instant> = HashMap::new();

    loop {
        match event_rx.recv_timeout(debounce) {
            Ok(paths) => {
                let now = Instant::now();
                for path in paths {
                    pending.insert(path, now);
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                let now = Instant::now();
                let ready: Vec<PathBuf> = pending
                    .iter()
                    .filter(|(_, seen)| now.duration_since(**seen) >= debounce)
                    .map(|(path, _)| path.clone())
                    .collect();
                for path in &ready {
                    pending.remove(path);
                }
                for path in ready {
                    if tx.send(path).is_err() {
                        return Ok(());
                    }
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
    Ok(())
}
