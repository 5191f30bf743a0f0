//! Build orchestration: assets first, then static resources.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use crate::assets::{AssetConfig, AssetError, AssetPipeline};
use crate::copier::{CopyError, StaticCopier};

/// Configuration for one build.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Script and stylesheet bundling
    pub assets: AssetConfig,

    /// Static resources copied verbatim
    pub resources_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Resource file names to skip
    pub ignore: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            assets: AssetConfig::default(),
            resources_dir: PathBuf::from("src/res"),
            output_dir: PathBuf::from("dist"),
            ignore: vec![".*".to_string()],
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Bundled files written by the asset stage
    pub assets: Vec<PathBuf>,

    /// Number of static resources copied
    pub copied: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Copy(#[from] CopyError),

    #[error("Failed to create output directory: {0}")]
    WriteError(String),
}

/// Runs the asset stage and the resource copy for one build.
#[derive(Debug, Clone)]
pub struct StaticBuilder {
    config: BuildConfig,
}

impl StaticBuilder {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build the assets and copy resources into the output directory.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let assets = AssetPipeline::emit(&self.config.assets, &self.config.output_dir)?;
        for asset in &assets {
            tracing::debug!("Emitted {}", asset.display());
        }

        let copier = StaticCopier::new(
            self.config.resources_dir.clone(),
            self.config.output_dir.clone(),
            &self.config.ignore,
        )?;
        let copied = copier.copy()?;

        Ok(BuildResult {
            assets,
            copied,
            duration_ms: start.elapsed().as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }
}
