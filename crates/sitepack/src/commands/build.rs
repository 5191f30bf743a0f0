//! One-shot build command.

use anyhow::{Context, Result};
use sitepack_static::{Mode, StaticBuilder};
use sitepack_watch::HookHandle;

use crate::config::ProjectConfig;

/// Run the build command.
///
/// The build itself completes without waiting on hooks; the process only
/// lingers until detached page generation has exited.
pub async fn run(config: &ProjectConfig, mode: Mode) -> Result<()> {
    let hooks = build_once(config, mode).await?;

    if !hooks.is_finished() {
        tracing::debug!("Waiting for post-build hooks to exit");
    }
    hooks.settle().await;

    Ok(())
}

/// Build assets, copy resources, then start the post-build hooks.
pub async fn build_once(config: &ProjectConfig, mode: Mode) -> Result<HookHandle> {
    tracing::info!("Building in {:?} mode...", mode);

    let builder = StaticBuilder::new(config.build_config(mode));
    let result = tokio::task::spawn_blocking(move || builder.build())
        .await
        .context("Build task panicked")??;

    tracing::info!(
        "Emitted {} assets and copied {} resources in {}ms",
        result.assets.len(),
        result.copied,
        result.duration_ms
    );
    tracing::info!("Output: {}", result.output_dir.display());

    // Recomposed on every build from the current configuration.
    let hooks = config.hook_runner().run(config.hooks()).await;

    Ok(hooks)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn project(root: &Path) -> ProjectConfig {
        fs::create_dir_all(root.join("src/res")).unwrap();
        fs::write(root.join("src/index.js"), "console.log(1);\n").unwrap();
        fs::write(root.join("src/style.scss"), "body { margin: 0; }\n").unwrap();
        fs::write(root.join("src/res/robots.txt"), "User-agent: *\n").unwrap();
        // Stand-in generator that records its arguments.
        fs::write(
            root.join("make-pages.sh"),
            format!("echo \"$@\" > {}\n", root.join("pages.txt").display()),
        )
        .unwrap();

        ProjectConfig::parse(
            &format!(
                "[pages]\nlangs = [\"it\", \"en\"]\ninterpreter = \"sh\"\nscript = \"{}\"\n\n[assets]\nstyles = [\"src/style.scss\"]\n",
                root.join("make-pages.sh").display()
            ),
            root,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn builds_and_runs_page_generation() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        let config = project(root);

        run(&config, Mode::Production).await.unwrap();

        assert!(root.join("dist/main.js").exists());
        assert!(root.join("dist/main.css").exists());
        assert!(root.join("dist/robots.txt").exists());

        let args = fs::read_to_string(root.join("pages.txt")).unwrap();
        assert_eq!(
            args.trim_end(),
            format!(
                "-s {} -t {} -l it,en {} {}",
                root.join("lang").display(),
                root.join("src/tpl").display(),
                root.join("site").display(),
                root.join("dist").display()
            )
        );
    }

    #[tokio::test]
    async fn relative_generator_script_runs_from_project_root() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        let mut config = project(root);
        config.script = "./make-pages.sh".to_string();
        assert_ne!(std::env::current_dir().unwrap(), root);

        run(&config, Mode::Production).await.unwrap();

        assert!(root.join("pages.txt").exists());
    }

    #[tokio::test]
    async fn generator_failure_does_not_fail_the_build() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        let mut config = project(root);
        config.script = root.join("missing.py").display().to_string();

        run(&config, Mode::Development).await.unwrap();

        assert!(root.join("dist/main.js").exists());
        assert!(!root.join("dist/main.css").exists());
    }

    #[tokio::test]
    async fn asset_errors_fail_the_build() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        let mut config = project(root);
        config.entry = root.join("src/missing.js");

        assert!(run(&config, Mode::Production).await.is_err());
        assert!(!root.join("pages.txt").exists());
    }
}
