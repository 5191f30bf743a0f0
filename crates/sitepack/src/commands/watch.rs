//! Watch command: rebuild on changes to pages, locales, templates and assets.

use std::future::Future;

use anyhow::Result;
use sitepack_static::Mode;
use sitepack_watch::{FileWatcher, WatchEvent};
use tokio::sync::mpsc::Receiver;

use crate::commands::build::build_once;
use crate::config::ProjectConfig;

/// Run the watch command until interrupted.
pub async fn run(config: &ProjectConfig, mode: Mode) -> Result<()> {
    let (watcher, mut rx) = FileWatcher::new(&config.watch_patterns)?;

    // Hooks of earlier builds stay detached; their handles are dropped.
    if let Err(e) = build_once(config, mode).await {
        tracing::error!("Build failed: {:#}", e);
    }

    tracing::info!(
        "Watching {} patterns under {} directories",
        config.watch_patterns.len(),
        watcher.roots().len()
    );

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Stopping watch");
    };

    rebuild_on_change(&mut rx, shutdown, || async {
        if let Err(e) = build_once(config, mode).await {
            tracing::error!("Rebuild failed: {:#}", e);
        }
    })
    .await;

    drop(watcher);

    Ok(())
}

/// Call `rebuild` for every change until the channel closes or `shutdown`
/// resolves.
///
/// Changes that arrive while a rebuild runs may not be part of it, so they
/// are collapsed into a single follow-up rebuild.
async fn rebuild_on_change<S, F, Fut>(rx: &mut Receiver<WatchEvent>, shutdown: S, mut rebuild: F)
where
    S: Future<Output = ()>,
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else {
                    break;
                };
                tracing::info!("Changed: {}", event.path().display());
                rebuild().await;

                while drain_pending(rx) {
                    tracing::info!("Files changed during rebuild, rebuilding again");
                    rebuild().await;
                }
            }
            _ = &mut shutdown => break,
        }
    }
}

/// Discard queued events, reporting whether there were any.
fn drain_pending(rx: &mut Receiver<WatchEvent>) -> bool {
    let mut pending = false;
    while let Ok(event) = rx.try_recv() {
        tracing::debug!("Pending change: {}", event.path().display());
        pending = true;
    }
    pending
}
