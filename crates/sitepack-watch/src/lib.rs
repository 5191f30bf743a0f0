//! Post-build hooks and file watching for sitepack.
//!
//! Hooks run after every build, by default detached from it. The watcher
//! reports changes to files matching a set of globs so the caller can
//! rebuild.

pub mod hooks;
pub mod watcher;

pub use hooks::{Hook, HookHandle, HookRunner};
pub use watcher::{FileWatcher, WatchError, WatchEvent};
