//! Post-build hook execution.
//!
//! Hooks are fire-and-forget: a failing hook is logged and otherwise ignored.
//! Page generation is not on the build's critical path.

use std::fmt;
use std::path::{Path, PathBuf};

use sitepack_compose::PageCommand;
use tokio::process::Command;
use tokio::task::JoinHandle;

/// A command to run after a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hook {
    /// Composed page generator invocation, executed without a shell
    Page(PageCommand),

    /// Free-form script, executed with `sh -c`
    Script(String),
}

impl Hook {
    fn command(&self) -> Command {
        match self {
            Hook::Page(page) => {
                let mut cmd = Command::new(page.program());
                cmd.args(page.args());
                cmd
            }
            Hook::Script(script) => {
                let mut cmd = Command::new("sh");
                cmd.arg("-c").arg(script);
                cmd
            }
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hook::Page(page) => fmt::Display::fmt(page, f),
            Hook::Script(script) => f.write_str(script),
        }
    }
}

/// Outstanding hook tasks from one [`HookRunner::run`].
#[derive(Debug, Default)]
pub struct HookHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl HookHandle {
    /// Whether every hook has exited.
    pub fn is_finished(&self) -> bool {
        self.tasks.iter().all(JoinHandle::is_finished)
    }

    /// Wait for every hook to exit.
    ///
    /// Only meant for process shutdown; builds never wait on hooks.
    pub async fn settle(self) {
        for task in self.tasks {
            let _ = task.await;
        }
    }
}

/// Runs post-build hooks.
#[derive(Debug, Clone)]
pub struct HookRunner {
    /// Wait for the hooks before returning from [`run`](Self::run)
    pub blocking: bool,

    /// Start every hook at once instead of one after another
    pub parallel: bool,

    /// Working directory of every hook; inherited when unset
    current_dir: Option<PathBuf>,
}

impl Default for HookRunner {
    fn default() -> Self {
        Self {
            blocking: false,
            parallel: true,
            current_dir: None,
        }
    }
}

impl HookRunner {
    pub fn new(blocking: bool, parallel: bool) -> Self {
        Self {
            blocking,
            parallel,
            current_dir: None,
        }
    }

    /// Run hooks from `dir` instead of the caller's working directory.
    pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn current_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    /// Start `hooks`.
    ///
    /// Non-blocking runners return as soon as the hooks are spawned. Hook
    /// failures are never returned to the caller.
    pub async fn run(&self, hooks: Vec<Hook>) -> HookHandle {
        if hooks.is_empty() {
            return HookHandle::default();
        }

        let tasks: Vec<JoinHandle<()>> = if self.parallel {
            hooks
                .into_iter()
                .map(|h| tokio::spawn(run_hook(h, self.current_dir.clone())))
                .collect()
        } else {
            let dir = self.current_dir.clone();
            vec![tokio::spawn(async move {
                for hook in hooks {
                    run_hook(hook, dir.clone()).await;
                }
            })]
        };
        let handle = HookHandle { tasks };

        if self.blocking {
            handle.settle().await;
            HookHandle::default()
        } else {
            handle
        }
    }
}

async fn run_hook(hook: Hook, dir: Option<PathBuf>) {
    tracing::info!("Running hook: {}", hook);

    let mut cmd = hook.command();
    if let Some(dir) = &dir {
        cmd.current_dir(dir);
    }

    match cmd.status().await {
        Ok(status) if status.success() => {
            tracing::debug!("Hook finished: {}", hook);
        }
        Ok(status) => {
            tracing::warn!("Hook exited with {}: {}", status, hook);
        }
        Err(e) => {
            tracing::warn!("Failed to start hook {}: {}", hook, e);
        }
    }
}
