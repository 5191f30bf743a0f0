//! Asset pipeline for the script entry and its stylesheets.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Build mode, read once per build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Styles are injected into the page by the script bundle
    Development,

    /// Styles are extracted to a minified `[name].css`
    #[default]
    Production,
}

impl Mode {
    pub fn is_development(self) -> bool {
        self == Mode::Development
    }
}

/// What the asset stage bundles.
#[derive(Debug, Clone)]
pub struct AssetConfig {
    /// Script entry point
    pub entry: PathBuf,

    /// Output stem used for `[name].js` and `[name].css`
    pub name: String,

    /// SCSS entries, compiled in order
    pub styles: Vec<PathBuf>,

    /// Selects the CSS handling strategy
    pub mode: Mode,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            entry: PathBuf::from("src/index.js"),
            name: "main".to_string(),
            styles: vec![],
            mode: Mode::default(),
        }
    }
}

/// Errors produced by the asset stage.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Entry script not found: {0}")]
    MissingEntry(PathBuf),

    #[error("Failed to read {path}: {message}")]
    ReadError { path: String, message: String },

    #[error("Failed to compile stylesheet {path}: {message}")]
    StyleError { path: String, message: String },

    #[error("Failed to minify CSS: {0}")]
    MinifyError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Compile one SCSS file to expanded CSS.
    pub fn compile_scss(path: &Path) -> Result<String, AssetError> {
        use rsass::output::{Format, Style};

        if !path.exists() {
            return Err(AssetError::ReadError {
                path: path.display().to_string(),
                message: "file not found".to_string(),
            });
        }

        let format = Format {
            style: Style::Expanded,
            ..Default::default()
        };
        let css = rsass::compile_scss_path(path, format).map_err(|e| AssetError::StyleError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        String::from_utf8(css).map_err(|e| AssetError::StyleError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, AssetError> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| AssetError::MinifyError(format!("parse error: {}", e)))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| AssetError::MinifyError(e.to_string()))?;

        Ok(minified.code)
    }

    /// Script snippet that appends `css` to the document head at runtime.
    pub fn style_injector(css: &str) -> String {
        // Serializing a &str cannot fail.
        let literal = serde_json::to_string(css).unwrap_or_else(|_| "\"\"".to_string());

        format!(
            "\n;(function() {{\n  var style = document.createElement('style');\n  style.textContent = {};\n  document.head.appendChild(style);\n}})();\n",
            literal
        )
    }

    /// Bundle the configured assets into `output_dir`.
    ///
    /// Returns the paths of the files written.
    pub fn emit(config: &AssetConfig, output_dir: &Path) -> Result<Vec<PathBuf>, AssetError> {
        if !config.entry.is_file() {
            return Err(AssetError::MissingEntry(config.entry.clone()));
        }

        let mut script = fs::read_to_string(&config.entry).map_err(|e| AssetError::ReadError {
            path: config.entry.display().to_string(),
            message: e.to_string(),
        })?;

        let mut css = String::new();
        for style in &config.styles {
            css.push_str(&Self::compile_scss(style)?);
        }

        fs::create_dir_all(output_dir).map_err(|e| AssetError::WriteError(e.to_string()))?;
        let mut written = Vec::with_capacity(2);

        let css_path = output_dir.join(format!("{}.css", config.name));
        if !css.is_empty() && !config.mode.is_development() {
            let minified = Self::minify_css(&css)?;
            fs::write(&css_path, minified).map_err(|e| AssetError::WriteError(e.to_string()))?;
            tracing::debug!("Extracted styles to {}", css_path.display());
            written.push(css_path);
        } else {
            if !css.is_empty() {
                script.push_str(&Self::style_injector(&css));
            }
            // Drop any stylesheet left by an earlier production build.
            if css_path.is_file() {
                fs::remove_file(&css_path).map_err(|e| AssetError::WriteError(e.to_string()))?;
                tracing::debug!("Removed stale {}", css_path.display());
            }
        }

        let script_path = output_dir.join(format!("{}.js", config.name));
        fs::write(&script_path, script).map_err(|e| AssetError::WriteError(e.to_string()))?;
        written.push(script_path);

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn project(dir: &Path) -> AssetConfig {
        let src = dir.join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("index.js"), "console.log('hi');\n").unwrap();
        fs::write(
            src.join("style.scss"),
            "$accent: #ff0000;\n.button {\n  color: $accent;\n  .icon { padding: 10px; }\n}\n",
        )
        .unwrap();

        AssetConfig {
            entry: src.join("index.js"),
            name: "main".to_string(),
            styles: vec![src.join("style.scss")],
            mode: Mode::Production,
        }
    }

    #[test]
    fn compiles_scss() {
        let temp = tempdir().unwrap();
        let config = project(temp.path());

        let css = AssetPipeline::compile_scss(&config.styles[0]).unwrap();

        assert!(css.contains(".button .icon"));
        assert!(css.contains("#ff0000") || css.contains("red"));
        assert!(!css.contains("$accent"));
    }

    #[test]
    fn minifies_css() {
        let css = r#"
.button {
    background-color: blue;
    padding: 10px;
}
        "#;

        let minified = AssetPipeline::minify_css(css).unwrap();

        assert!(!minified.contains('\n'));
        assert!(minified.contains(".button"));
    }

    #[test]
    fn production_extracts_css() {
        let temp = tempdir().unwrap();
        let config = project(temp.path());
        let out = temp.path().join("dist");

        let written = AssetPipeline::emit(&config, &out).unwrap();

        assert_eq!(written.len(), 2);
        let css = fs::read_to_string(out.join("main.css")).unwrap();
        assert!(css.contains(".button"));
        let js = fs::read_to_string(out.join("main.js")).unwrap();
        assert!(!js.contains("createElement('style')"));
    }

    #[test]
    fn development_injects_css() {
        let temp = tempdir().unwrap();
        let config = AssetConfig {
            mode: Mode::Development,
            ..project(temp.path())
        };
        let out = temp.path().join("dist");

        let written = AssetPipeline::emit(&config, &out).unwrap();

        assert_eq!(written, vec![out.join("main.js")]);
        assert!(!out.join("main.css").exists());
        let js = fs::read_to_string(out.join("main.js")).unwrap();
        assert!(js.starts_with("console.log('hi');"));
        assert!(js.contains("createElement('style')"));
        assert!(js.contains(".button .icon"));
    }

    #[test]
    fn development_removes_extracted_css() {
        let temp = tempdir().unwrap();
        let config = project(temp.path());
        let out = temp.path().join("dist");

        AssetPipeline::emit(&config, &out).unwrap();
        assert!(out.join("main.css").exists());

        let config = AssetConfig {
            mode: Mode::Development,
            ..config
        };
        let written = AssetPipeline::emit(&config, &out).unwrap();

        assert_eq!(written, vec![out.join("main.js")]);
        assert!(!out.join("main.css").exists());
    }

    #[test]
    fn injector_escapes_css() {
        let snippet = AssetPipeline::style_injector("a::after { content: \"x\"; }\n");

        assert!(snippet.contains(r#"content: \"x\";"#));
        assert!(snippet.contains(r"\n"));
    }

    #[test]
    fn missing_entry_is_an_error() {
        let temp = tempdir().unwrap();
        let config = AssetConfig {
            entry: temp.path().join("nope.js"),
            ..Default::default()
        };

        let err = AssetPipeline::emit(&config, temp.path()).unwrap_err();
        assert!(matches!(err, AssetError::MissingEntry(_)));
    }

    #[test]
    fn missing_stylesheet_is_an_error() {
        let temp = tempdir().unwrap();
        let mut config = project(temp.path());
        config.styles.push(temp.path().join("src/missing.scss"));

        let err = AssetPipeline::emit(&config, &temp.path().join("dist")).unwrap_err();
        assert!(matches!(err, AssetError::ReadError { .. }));
    }

    #[test]
    fn script_only_without_styles() {
        let temp = tempdir().unwrap();
        let config = AssetConfig {
            styles: vec![],
            ..project(temp.path())
        };
        let out = temp.path().join("dist");

        let written = AssetPipeline::emit(&config, &out).unwrap();

        assert_eq!(written, vec![out.join("main.js")]);
    }
}
