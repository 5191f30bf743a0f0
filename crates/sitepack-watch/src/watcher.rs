//! File watching for rebuilds.

use std::path::{Component, Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

const DEBOUNCE: Duration = Duration::from_millis(100);

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// File was created
    Created(PathBuf),

    /// File was modified
    Modified(PathBuf),

    /// File was deleted
    Deleted(PathBuf),
}

impl WatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            WatchEvent::Created(p) | WatchEvent::Modified(p) | WatchEvent::Deleted(p) => p,
        }
    }
}

/// Errors raised while setting up the watcher.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("Invalid watch pattern {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("File watch error: {0}")]
    Notify(String),
}

/// Watches the directories under a set of glob patterns and reports changes
/// to matching files.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    roots: Vec<PathBuf>,
}

impl FileWatcher {
    /// Create a new file watcher for absolute glob patterns.
    ///
    /// Returns the watcher and a channel to receive events. Dropping the
    /// watcher stops the events.
    pub fn new(
        patterns: &[String],
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), WatchError> {
        let globs = build_glob_set(patterns)?;
        let roots = watch_roots(patterns);

        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(|e| WatchError::Notify(e.to_string()))?;

        for root in &roots {
            if root.exists() {
                watcher
                    .watch(root, RecursiveMode::Recursive)
                    .map_err(|e| WatchError::Notify(e.to_string()))?;
                tracing::debug!("Watching {}", root.display());
            } else {
                tracing::warn!("Not watching missing directory {}", root.display());
            }
        }

        std::thread::spawn(move || {
            while let Ok(event) = sync_rx.recv() {
                let first = matching_events(&globs, &event);
                if first.is_empty() {
                    continue;
                }

                for e in collect_burst(&sync_rx, &globs, first, DEBOUNCE) {
                    if async_tx.blocking_send(e).is_err() {
                        return;
                    }
                }
            }
        });

        Ok((
            Self {
                _watcher: watcher,
                roots,
            },
            async_rx,
        ))
    }

    /// Directories being watched.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, WatchError> {
    let invalid = |pattern: &str, e: globset::Error| WatchError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    };

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| invalid(pattern.as_str(), e))?;
        builder.add(glob);
    }

    builder.build().map_err(|e| invalid(&patterns.join(", "), e))
}

/// Deduplicated directories to watch, dropping any nested inside another.
fn watch_roots(patterns: &[String]) -> Vec<PathBuf> {
    let mut bases: Vec<PathBuf> = patterns.iter().map(|p| glob_base(p)).collect();
    bases.sort();
    bases.dedup();

    let mut roots: Vec<PathBuf> = Vec::with_capacity(bases.len());
    for base in bases {
        if !roots.iter().any(|r| base.starts_with(r)) {
            roots.push(base);
        }
    }
    roots
}

/// The literal directory prefix of a glob pattern.
///
/// A pattern without glob metacharacters names a file, so its parent is used.
fn glob_base(pattern: &str) -> PathBuf {
    let path = Path::new(pattern);
    let mut base = PathBuf::new();

    for component in path.components() {
        if let Component::Normal(part) = component {
            if part.to_string_lossy().contains(['*', '?', '[', '{']) {
                return base;
            }
        }
        base.push(component);
    }

    path.parent().map(Path::to_path_buf).unwrap_or(base)
}

/// Matching paths of a notify event, classified.
fn matching_events(globs: &GlobSet, event: &notify::Event) -> Vec<WatchEvent> {
    event
        .paths
        .iter()
        .filter(|p| globs.is_match(p))
        .filter_map(|p| classify_event(p, &event.kind))
        .collect()
}

/// Gather events until the stream has been quiet for `quiet`.
///
/// Every distinct matching event of the burst is kept, in arrival order. A
/// closed stream ends the burst early.
fn collect_burst(
    rx: &mpsc::Receiver<notify::Event>,
    globs: &GlobSet,
    mut burst: Vec<WatchEvent>,
    quiet: Duration,
) -> Vec<WatchEvent> {
    burst.dedup();

    while let Ok(event) = rx.recv_timeout(quiet) {
        for e in matching_events(globs, &event) {
            if !burst.contains(&e) {
                burst.push(e);
            }
        }
    }

    burst
}

/// Classify a notify event into a WatchEvent.
fn classify_event(path: &Path, kind: &notify::EventKind) -> Option<WatchEvent> {
    use notify::EventKind;

    match kind {
        EventKind::Create(_) => Some(WatchEvent::Created(path.to_path_buf())),
        EventKind::Remove(_) => Some(WatchEvent::Deleted(path.to_path_buf())),
        EventKind::Modify(_) => Some(WatchEvent::Modified(path.to_path_buf())),
        _ => None,
    }
}
