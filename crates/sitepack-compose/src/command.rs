//! The composed page-generation command.

use std::fmt;
use std::path::Path;

/// Interpreter used to run the page generator.
pub const DEFAULT_INTERPRETER: &str = "python3";

/// Page generator script, relative to the working directory.
pub const DEFAULT_SCRIPT: &str = "./make-pages.py";

/// A composed invocation of the page generator.
///
/// The command is kept as discrete tokens so it can be executed without a
/// shell. Its [`Display`](fmt::Display) form joins the tokens with single
/// spaces and performs no quoting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCommand {
    program: String,
    args: Vec<String>,
}

impl PageCommand {
    /// The executable (the interpreter).
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Every token after the program, script path included.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The single-line shell form of the command.
    pub fn to_command_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PageCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Builds [`PageCommand`]s for a given interpreter and script.
#[derive(Debug, Clone)]
pub struct Composer {
    interpreter: String,
    script: String,
}

impl Default for Composer {
    fn default() -> Self {
        Self {
            interpreter: DEFAULT_INTERPRETER.to_string(),
            script: DEFAULT_SCRIPT.to_string(),
        }
    }
}

impl Composer {
    /// Create a composer using `python3 ./make-pages.py`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the interpreter.
    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    /// Override the generator script path.
    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.script = script.into();
        self
    }

    /// Compose the generator invocation.
    ///
    /// Produces `<interpreter> <script> -s <stringdir> [-t <tpl>]... [-l <langs>] <root> <outdir>`.
    /// `-t` is repeated per template in input order, `-l` appears once with the
    /// comma-joined languages and only when `langs` is non-empty. Inputs are not
    /// validated.
    pub fn compose<L, T>(
        &self,
        root: &Path,
        stringdir: &Path,
        langs: &[L],
        templates: &[T],
        outdir: &Path,
    ) -> PageCommand
    where
        L: AsRef<str>,
        T: AsRef<Path>,
    {
        let mut args = Vec::with_capacity(5 + templates.len() * 2);
        args.push(self.script.clone());
        args.push("-s".to_string());
        args.push(path_token(stringdir));

        for template in templates {
            args.push("-t".to_string());
            args.push(path_token(template.as_ref()));
        }

        if !langs.is_empty() {
            let joined = langs.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(",");
            args.push("-l".to_string());
            args.push(joined);
        }

        args.push(path_token(root));
        args.push(path_token(outdir));

        PageCommand {
            program: self.interpreter.clone(),
            args,
        }
    }
}

/// Compose a page command with the default interpreter and script.
pub fn compose<L, T>(
    root: &Path,
    stringdir: &Path,
    langs: &[L],
    templates: &[T],
    outdir: &Path,
) -> PageCommand
where
    L: AsRef<str>,
    T: AsRef<Path>,
{
    Composer::default().compose(root, stringdir, langs, templates, outdir)
}

fn path_token(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
