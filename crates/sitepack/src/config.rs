//! Project configuration (sitepack.toml).
//!
//! Every path is resolved against the directory holding the config file once,
//! at load time. The result is immutable for the rest of the process.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use sitepack_compose::{Composer, PageCommand, DEFAULT_INTERPRETER, DEFAULT_SCRIPT};
use sitepack_static::{AssetConfig, BuildConfig, Mode};
use sitepack_watch::{Hook, HookRunner};

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    paths: PathsSection,
    #[serde(default)]
    pages: PagesSection,
    #[serde(default)]
    assets: AssetsSection,
    #[serde(default)]
    copy: CopySection,
    #[serde(default)]
    hooks: HooksSection,
    #[serde(default)]
    watch: WatchSection,
}

#[derive(Debug, Deserialize)]
struct PathsSection {
    #[serde(default = "default_src")]
    src: String,
    #[serde(default = "default_dist")]
    dist: String,
    #[serde(default = "default_site")]
    site: String,
    #[serde(default = "default_res")]
    res: String,
    #[serde(default = "default_tpl")]
    tpl: String,
    #[serde(default = "default_lang")]
    lang: String,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            src: default_src(),
            dist: default_dist(),
            site: default_site(),
            res: default_res(),
            tpl: default_tpl(),
            lang: default_lang(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PagesSection {
    #[serde(default = "default_langs")]
    langs: Vec<String>,
    /// Defaults to `[paths.tpl]`
    templates: Option<Vec<String>>,
    #[serde(default = "default_interpreter")]
    interpreter: String,
    #[serde(default = "default_script")]
    script: String,
}

impl Default for PagesSection {
    fn default() -> Self {
        Self {
            langs: default_langs(),
            templates: None,
            interpreter: default_interpreter(),
            script: default_script(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AssetsSection {
    #[serde(default = "default_entry")]
    entry: String,
    #[serde(default = "default_name")]
    name: String,
    #[serde(default)]
    styles: Vec<String>,
}

impl Default for AssetsSection {
    fn default() -> Self {
        Self {
            entry: default_entry(),
            name: default_name(),
            styles: vec![],
        }
    }
}

#[derive(Debug, Deserialize)]
struct CopySection {
    #[serde(default = "default_ignore")]
    ignore: Vec<String>,
}

impl Default for CopySection {
    fn default() -> Self {
        Self {
            ignore: default_ignore(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HooksSection {
    #[serde(default)]
    blocking: bool,
    #[serde(default = "default_true")]
    parallel: bool,
    #[serde(default)]
    scripts: Vec<String>,
}

impl Default for HooksSection {
    fn default() -> Self {
        Self {
            blocking: false,
            parallel: true,
            scripts: vec![],
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct WatchSection {
    patterns: Option<Vec<String>>,
}

fn default_src() -> String {
    "src".to_string()
}
fn default_dist() -> String {
    "dist".to_string()
}
fn default_site() -> String {
    "site".to_string()
}
fn default_res() -> String {
    "src/res".to_string()
}
fn default_tpl() -> String {
    "src/tpl".to_string()
}
fn default_lang() -> String {
    "lang".to_string()
}
fn default_langs() -> Vec<String> {
    vec!["it".to_string(), "en".to_string(), "es".to_string()]
}
fn default_interpreter() -> String {
    DEFAULT_INTERPRETER.to_string()
}
fn default_script() -> String {
    DEFAULT_SCRIPT.to_string()
}
fn default_entry() -> String {
    "src/index.js".to_string()
}
fn default_name() -> String {
    "main".to_string()
}
fn default_ignore() -> Vec<String> {
    vec![".*".to_string()]
}
fn default_true() -> bool {
    true
}

/// Symbolic directory roles of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRole {
    Src,
    Dist,
    Site,
    Res,
    Tpl,
    Lang,
}

/// Absolute directory for each [`PathRole`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub src: PathBuf,
    pub dist: PathBuf,
    pub site: PathBuf,
    pub res: PathBuf,
    pub tpl: PathBuf,
    pub lang: PathBuf,
}

impl ProjectPaths {
    fn from_section(root: &Path, section: &PathsSection) -> Self {
        Self {
            root: root.to_path_buf(),
            src: root.join(&section.src),
            dist: root.join(&section.dist),
            site: root.join(&section.site),
            res: root.join(&section.res),
            tpl: root.join(&section.tpl),
            lang: root.join(&section.lang),
        }
    }

    pub fn get(&self, role: PathRole) -> &Path {
        match role {
            PathRole::Src => &self.src,
            PathRole::Dist => &self.dist,
            PathRole::Site => &self.site,
            PathRole::Res => &self.res,
            PathRole::Tpl => &self.tpl,
            PathRole::Lang => &self.lang,
        }
    }

    /// Join `segments` onto the directory for `role`.
    pub fn resolve(&self, role: PathRole, segments: &[&str]) -> PathBuf {
        segments
            .iter()
            .fold(self.get(role).to_path_buf(), |path, s| path.join(s))
    }

    fn glob(&self, role: PathRole, pattern: &str) -> String {
        self.resolve(role, &[pattern]).to_string_lossy().into_owned()
    }
}

/// Post-build hook settings.
#[derive(Debug, Clone)]
pub struct HookSettings {
    pub blocking: bool,
    pub parallel: bool,
    /// Extra shell scripts run alongside page generation
    pub scripts: Vec<String>,
}

/// Resolved project configuration.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub paths: ProjectPaths,
    pub langs: Vec<String>,
    pub templates: Vec<PathBuf>,
    pub interpreter: String,
    pub script: String,
    pub entry: PathBuf,
    pub name: String,
    pub styles: Vec<PathBuf>,
    pub ignore: Vec<String>,
    pub hooks: HookSettings,
    /// Absolute glob patterns that trigger a rebuild
    pub watch_patterns: Vec<String>,
}

impl ProjectConfig {
    /// Load configuration from `path`, falling back to defaults if the file
    /// does not exist. A malformed file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let root = project_root(path)?;

        if !path.exists() {
            tracing::debug!("{} not found, using defaults", path.display());
            return Ok(Self::resolve(&root, ConfigFile::default()));
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::parse(&content, &root)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        tracing::debug!("Project root: {}", config.paths.root.display());

        Ok(config)
    }

    /// Parse configuration text, resolving paths against `root`.
    pub fn parse(content: &str, root: &Path) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(Self::resolve(root, file))
    }

    fn resolve(root: &Path, file: ConfigFile) -> Self {
        let paths = ProjectPaths::from_section(root, &file.paths);

        let templates = match file.pages.templates {
            Some(templates) => templates.iter().map(|t| root.join(t)).collect(),
            None => vec![paths.tpl.clone()],
        };

        let watch_patterns = match file.watch.patterns {
            Some(patterns) => patterns
                .iter()
                .map(|p| root.join(p).to_string_lossy().into_owned())
                .collect(),
            None => vec![
                paths.glob(PathRole::Site, "**/*.html.jinja"),
                paths.glob(PathRole::Site, "**/*.yml"),
                paths.glob(PathRole::Lang, "**/*.json"),
                paths.glob(PathRole::Tpl, "**/*.html.jinja"),
                paths.glob(PathRole::Src, "**/*.js"),
                paths.glob(PathRole::Src, "**/*.scss"),
            ],
        };

        Self {
            langs: file.pages.langs,
            templates,
            interpreter: file.pages.interpreter,
            script: file.pages.script,
            entry: root.join(&file.assets.entry),
            name: file.assets.name,
            styles: file.assets.styles.iter().map(|s| root.join(s)).collect(),
            ignore: file.copy.ignore,
            hooks: HookSettings {
                blocking: file.hooks.blocking,
                parallel: file.hooks.parallel,
                scripts: file.hooks.scripts,
            },
            watch_patterns,
            paths,
        }
    }

    /// Static build settings for `mode`.
    pub fn build_config(&self, mode: Mode) -> BuildConfig {
        BuildConfig {
            assets: AssetConfig {
                entry: self.entry.clone(),
                name: self.name.clone(),
                styles: self.styles.clone(),
                mode,
            },
            resources_dir: self.paths.resolve(PathRole::Res, &[]),
            output_dir: self.paths.resolve(PathRole::Dist, &[]),
            ignore: self.ignore.clone(),
        }
    }

    /// The page generation command for the current configuration.
    pub fn page_command(&self) -> PageCommand {
        Composer::new()
            .with_interpreter(&self.interpreter)
            .with_script(&self.script)
            .compose(
                &self.paths.site,
                &self.paths.lang,
                self.langs.as_slice(),
                self.templates.as_slice(),
                &self.paths.dist,
            )
    }

    /// Hooks to run after a build, page generation first.
    pub fn hooks(&self) -> Vec<Hook> {
        std::iter::once(Hook::Page(self.page_command()))
            .chain(self.hooks.scripts.iter().cloned().map(Hook::Script))
            .collect()
    }

    /// Hooks run from the project root, so a relative generator script
    /// resolves the same way wherever sitepack is started.
    pub fn hook_runner(&self) -> HookRunner {
        HookRunner::new(self.hooks.blocking, self.hooks.parallel)
            .with_current_dir(&self.paths.root)
    }
}

/// Absolute directory containing the config file.
fn project_root(config_path: &Path) -> Result<PathBuf> {
    let cwd = env::current_dir().context("Failed to read current directory")?;

    match config_path.parent() {
        Some(parent) if parent.is_absolute() => Ok(parent.to_path_buf()),
        Some(parent) if !parent.as_os_str().is_empty() && parent != Path::new(".") => {
            Ok(cwd.join(parent))
        }
        _ => Ok(cwd),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn defaults_follow_project_layout() {
        let config = ProjectConfig::parse("", Path::new("/project")).unwrap();

        assert_eq!(config.paths.src, PathBuf::from("/project/src"));
        assert_eq!(config.paths.dist, PathBuf::from("/project/dist"));
        assert_eq!(config.paths.site, PathBuf::from("/project/site"));
        assert_eq!(config.paths.res, PathBuf::from("/project/src/res"));
        assert_eq!(config.paths.tpl, PathBuf::from("/project/src/tpl"));
        assert_eq!(config.paths.lang, PathBuf::from("/project/lang"));
        assert_eq!(config.templates, vec![PathBuf::from("/project/src/tpl")]);
        assert_eq!(config.langs, vec!["it", "en", "es"]);
        assert!(!config.hooks.blocking);
        assert!(config.hooks.parallel);
        assert_eq!(config.ignore, vec![".*".to_string()]);
    }

    #[test]
    fn every_path_is_absolute() {
        let config = ProjectConfig::parse(
            "[paths]\nsrc = \"assets\"\ndist = \"public\"\n",
            Path::new("/project"),
        )
        .unwrap();

        for role in [
            PathRole::Src,
            PathRole::Dist,
            PathRole::Site,
            PathRole::Res,
            PathRole::Tpl,
            PathRole::Lang,
        ] {
            assert!(config.paths.get(role).is_absolute(), "{:?}", role);
            assert!(config.paths.get(role).starts_with("/project"));
        }
        assert_eq!(config.paths.src, PathBuf::from("/project/assets"));
    }

    #[test]
    fn resolves_segments_under_a_role() {
        let config = ProjectConfig::parse("", Path::new("/project")).unwrap();

        assert_eq!(
            config.paths.resolve(PathRole::Src, &["index.js"]),
            PathBuf::from("/project/src/index.js")
        );
        assert_eq!(
            config.paths.resolve(PathRole::Site, &["blog", "post.yml"]),
            PathBuf::from("/project/site/blog/post.yml")
        );
        assert_eq!(
            config.paths.resolve(PathRole::Dist, &[]),
            PathBuf::from("/project/dist")
        );
    }

    #[test]
    fn composes_page_command_from_config() {
        let config = ProjectConfig::parse(
            "[pages]\nlangs = [\"it\", \"en\", \"es\"]\n",
            Path::new("/project"),
        )
        .unwrap();

        assert_eq!(
            config.page_command().to_command_line(),
            "python3 ./make-pages.py -s /project/lang -t /project/src/tpl -l it,en,es /project/site /project/dist"
        );
    }

    #[test]
    fn default_config_passes_languages() {
        let config = ProjectConfig::parse("", Path::new("/project")).unwrap();

        assert_eq!(
            config.page_command().to_command_line(),
            "python3 ./make-pages.py -s /project/lang -t /project/src/tpl -l it,en,es /project/site /project/dist"
        );
    }

    #[test]
    fn languages_can_be_cleared() {
        let config = ProjectConfig::parse("[pages]\nlangs = []\n", Path::new("/project")).unwrap();

        assert!(config.langs.is_empty());
        assert!(!config.page_command().args().iter().any(|a| a == "-l"));
    }

    #[test]
    fn hooks_run_from_project_root() {
        let config = ProjectConfig::parse("", Path::new("/project")).unwrap();

        assert_eq!(
            config.hook_runner().current_dir(),
            Some(Path::new("/project"))
        );
    }

    #[test]
    fn hooks_start_with_page_generation() {
        let config = ProjectConfig::parse(
            "[hooks]\nscripts = [\"echo done\"]\nparallel = false\n",
            Path::new("/project"),
        )
        .unwrap();

        let hooks = config.hooks();
        assert_eq!(hooks.len(), 2);
        assert!(matches!(hooks[0], Hook::Page(_)));
        assert_eq!(hooks[1], Hook::Script("echo done".to_string()));
        assert!(!config.hook_runner().parallel);
    }

    #[test]
    fn default_watch_patterns_cover_pages_and_assets() {
        let config = ProjectConfig::parse("", Path::new("/project")).unwrap();

        assert_eq!(
            config.watch_patterns,
            vec![
                "/project/site/**/*.html.jinja",
                "/project/site/**/*.yml",
                "/project/lang/**/*.json",
                "/project/src/tpl/**/*.html.jinja",
                "/project/src/**/*.js",
                "/project/src/**/*.scss",
            ]
        );
    }

    #[test]
    fn build_config_carries_mode() {
        let config = ProjectConfig::parse(
            "[assets]\nname = \"app\"\nstyles = [\"src/style.scss\"]\n",
            Path::new("/project"),
        )
        .unwrap();

        let build = config.build_config(Mode::Development);
        assert_eq!(build.assets.mode, Mode::Development);
        assert_eq!(build.assets.name, "app");
        assert_eq!(build.assets.entry, PathBuf::from("/project/src/index.js"));
        assert_eq!(build.assets.styles, vec![PathBuf::from("/project/src/style.scss")]);
        assert_eq!(build.output_dir, PathBuf::from("/project/dist"));
        assert_eq!(build.resources_dir, PathBuf::from("/project/src/res"));
    }

    #[test]
    fn load_missing_file_uses_defaults() {
        let temp = tempdir().unwrap();

        let config = ProjectConfig::load(&temp.path().join("sitepack.toml")).unwrap();

        assert_eq!(config.paths.root, temp.path());
        assert_eq!(config.paths.dist, temp.path().join("dist"));
    }

    #[test]
    fn load_rejects_malformed_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("sitepack.toml");
        fs::write(&path, "[pages\nlangs = ").unwrap();

        assert!(ProjectConfig::load(&path).is_err());
    }
}
