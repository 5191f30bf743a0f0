//! Print the composed page generation command.

use crate::config::ProjectConfig;

/// Run the command command.
pub fn run(config: &ProjectConfig) {
    println!("{}", command_line(config));
}

/// The page command a build would run, as a single line.
pub fn command_line(config: &ProjectConfig) -> String {
    config.page_command().to_command_line()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    #[test]
    fn prints_default_command() {
        let config = ProjectConfig::parse("", Path::new("/project")).unwrap();

        assert_eq!(
            command_line(&config),
            "python3 ./make-pages.py -s /project/lang -t /project/src/tpl -l it,en,es /project/site /project/dist"
        );
    }

    #[test]
    fn follows_configured_pages() {
        let config = ProjectConfig::parse(
            "[pages]\nlangs = [\"en\"]\ntemplates = [\"src/tpl\", \"themes/base\"]\ninterpreter = \"python\"\nscript = \"tools/pages.py\"\n",
            Path::new("/project"),
        )
        .unwrap();

        assert_eq!(
            command_line(&config),
            "python tools/pages.py -s /project/lang -t /project/src/tpl -t /project/themes/base -l en /project/site /project/dist"
        );
    }
}
