//! Asset bundling and static resource copying for sitepack.
//!
//! Emits the JavaScript entry and compiled stylesheets into the output
//! directory, then mirrors the resource directory next to them.

pub mod assets;
pub mod builder;
pub mod copier;

pub use assets::{AssetConfig, AssetError, AssetPipeline, Mode};
pub use builder::{BuildConfig, BuildError, BuildResult, StaticBuilder};
pub use copier::{CopyError, StaticCopier};
