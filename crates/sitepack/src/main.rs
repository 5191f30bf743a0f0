//! sitepack CLI - bundles site assets and regenerates static pages.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use sitepack_static::Mode;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ProjectConfig;

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "sitepack")]
#[command(about = "Bundle site assets and regenerate static pages")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to sitepack.toml config file
    #[arg(short, long, default_value = "sitepack.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default sitepack.toml and project skeleton
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// Build assets once and regenerate pages
    Build {
        /// Build mode
        #[arg(short, long, value_enum, default_value_t = ModeArg::Production)]
        mode: ModeArg,
    },

    /// Build, then rebuild whenever a watched file changes
    Watch {
        /// Build mode
        #[arg(short, long, value_enum, default_value_t = ModeArg::Development)]
        mode: ModeArg,
    },

    /// Print the page generation command without running it
    Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Development,
    Production,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Development => Mode::Development,
            ModeArg::Production => Mode::Production,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(&cli.config, yes).await?;
        }
        Commands::Build { mode } => {
            let config = ProjectConfig::load(&cli.config)?;
            commands::build::run(&config, mode.into()).await?;
        }
        Commands::Watch { mode } => {
            let config = ProjectConfig::load(&cli.config)?;
            commands::watch::run(&config, mode.into()).await?;
        }
        Commands::Command => {
            let config = ProjectConfig::load(&cli.config)?;
            commands::command::run(&config);
        }
    }

    Ok(())
}
