//! Initialize sitepack in a project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
///
/// Files are created next to `config_path`; existing ones are kept unless
/// `yes` is set.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing sitepack...");

    let root = config_path.parent().unwrap_or(Path::new(""));

    if config_path.exists() && !yes {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
        return Ok(());
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    tracing::info!("Created {}", config_path.display());

    for dir in ["src/res", "src/tpl", "site", "lang"] {
        let path = root.join(dir);
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
    }

    let starters = [
        ("src/index.js", DEFAULT_ENTRY),
        ("src/style.scss", DEFAULT_STYLE),
    ];
    for (file, content) in starters {
        let path = root.join(file);
        if !path.exists() || yes {
            fs::write(&path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Created {}", path.display());
        }
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'sitepack watch' to start building.");

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# sitepack configuration

[paths]
# All paths are relative to this file
src = "src"
dist = "dist"
site = "site"
res = "src/res"
tpl = "src/tpl"
lang = "lang"

[pages]
# Passed to the page generator as -l it,en,es
langs = ["it", "en", "es"]
interpreter = "python3"
script = "./make-pages.py"

[assets]
entry = "src/index.js"
name = "main"
styles = ["src/style.scss"]

[copy]
ignore = [".*"]

[hooks]
# Page generation runs detached from the build
blocking = false
parallel = true
scripts = []
"#;

const DEFAULT_ENTRY: &str = r#"// Site script entry point
document.documentElement.classList.add('js');
"#;

const DEFAULT_STYLE: &str = r#"$text: #222;

body {
  color: $text;
  margin: 0;
}
"#;
