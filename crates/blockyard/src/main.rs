//! blockyard CLI - browse and publish a catalog of page-section blocks.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "blockyard")]
#[command(about = "Static catalog generator for page-section block registries")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to blockyard.toml config file
    #[arg(short, long, default_value = "blockyard.toml", global = true)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a sample config and registry.json
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// List the category and section routes the manifest produces
    Routes {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build the static catalog site
    Build {
        /// Output directory (defaults to config or "dist")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip minification
        #[arg(long)]
        no_minify: bool,
    },

    /// Start the live-reloading preview server
    Dev {
        /// Port to listen on
        #[arg(short, long, default_value = "7777")]
        port: u16,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,
    },

    /// Serve a built site
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// Directory to serve (defaults to config or "dist")
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(&cli.config, yes).await?;
        }
        Commands::Routes { json } => {
            let config = config::load_config(&cli.config)?;
            commands::routes::run(&config, json)?;
        }
        Commands::Build { output, no_minify } => {
            let config = config::load_config(&cli.config)?;
            let minify = if no_minify { Some(false) } else { None };
            commands::build::run(&config, output, minify).await?;
        }
        Commands::Dev { port, no_open } => {
            let config = config::load_config(&cli.config)?;
            commands::dev::run(&config, port, !no_open).await?;
        }
        Commands::Serve { port, dir } => {
            let config = config::load_config(&cli.config)?;
            commands::serve::run(&config, port, dir).await?;
        }
    }

    Ok(())
}
