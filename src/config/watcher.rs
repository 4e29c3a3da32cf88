//! Route file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::RouterConfig;

/// Watches a route file and emits every successfully reloaded config.
///
/// Invalid edits are logged and skipped; the router keeps its current table.
pub struct ConfigWatcher {
    path: PathBuf,
    _watcher: RecommendedWatcher,
}

impl ConfigWatcher {
    /// Start watching `path`. Returns the watcher (dropping it stops the
    /// watch) and the receiver of reloaded configurations.
    pub fn spawn(path: &Path) -> Result<(Self, mpsc::UnboundedReceiver<RouterConfig>), ConfigError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let target = path.to_path_buf();
        let file_name = target.file_name().map(|name| name.to_os_string());

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let relevant = event.kind.is_modify() || event.kind.is_create();
                    let ours = event
                        .paths
                        .iter()
                        .any(|changed| changed.file_name().map(|n| n.to_os_string()) == file_name);
                    if !(relevant && ours) {
                        return;
                    }

                    tracing::info!(path = ?target, "Route file change detected, reloading");
                    match load_config(&target) {
                        Ok(config) => {
                            let _ = tx.send(config);
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to reload routes, keeping current table");
                        }
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        // watch the directory so editors that replace the file are still seen
        let watch_root = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        watcher.watch(watch_root, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Route file watcher started");
        Ok((
            Self {
                path: path.to_path_buf(),
                _watcher: watcher,
            },
            rx,
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
