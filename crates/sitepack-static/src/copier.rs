//! Static resource copying.

use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use rayon::prelude::*;
use walkdir::{DirEntry, WalkDir};

/// Errors that can occur while copying resources.
#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    #[error("Invalid ignore pattern {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Failed to read resources: {0}")]
    ReadError(String),

    #[error("Failed to copy {path}: {message}")]
    WriteError { path: String, message: String },
}

/// Recursively mirrors a resource directory into the output directory.
///
/// Ignore patterns are matched against every path component's file name, so
/// `.*` skips dotfiles as well as everything below a dot-directory.
#[derive(Debug, Clone)]
pub struct StaticCopier {
    from: PathBuf,
    to: PathBuf,
    ignore: GlobSet,
}

impl StaticCopier {
    pub fn new(from: PathBuf, to: PathBuf, ignore: &[String]) -> Result<Self, CopyError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in ignore {
            let glob = Glob::new(pattern).map_err(|e| CopyError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
            builder.add(glob);
        }
        let ignore = builder.build().map_err(|e| CopyError::InvalidPattern {
            pattern: ignore.join(", "),
            message: e.to_string(),
        })?;

        Ok(Self { from, to, ignore })
    }

    /// Copy every non-ignored file. Returns the number of files copied.
    pub fn copy(&self) -> Result<usize, CopyError> {
        if !self.from.is_dir() {
            tracing::warn!("Resource directory not found: {}", self.from.display());
            return Ok(0);
        }

        let files = self.collect_files()?;

        files
            .par_iter()
            .try_for_each(|relative| self.copy_file(relative))?;

        tracing::debug!(
            "Copied {} files from {} to {}",
            files.len(),
            self.from.display(),
            self.to.display()
        );

        Ok(files.len())
    }

    fn collect_files(&self) -> Result<Vec<PathBuf>, CopyError> {
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.from)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| !self.is_ignored(e));

        for entry in walker {
            let entry = entry.map_err(|e| CopyError::ReadError(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(&self.from)
                .map_err(|e| CopyError::ReadError(e.to_string()))?;
            files.push(relative.to_path_buf());
        }

        Ok(files)
    }

    fn is_ignored(&self, entry: &DirEntry) -> bool {
        // The root itself is never ignored, whatever its name.
        entry.depth() > 0 && self.ignore.is_match(Path::new(entry.file_name()))
    }

    fn copy_file(&self, relative: &Path) -> Result<(), CopyError> {
        let source = self.from.join(relative);
        let target = self.to.join(relative);
        let write_error = |e: std::io::Error| CopyError::WriteError {
            path: target.display().to_string(),
            message: e.to_string(),
        };

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        fs::copy(&source, &target).map_err(write_error)?;

        Ok(())
    }
}
