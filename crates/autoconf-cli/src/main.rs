use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_directive = if cli.verbose { "autoconf=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init()
        .ok();

    match cli.command {
        Commands::Resolve { project, exclude } => {
            commands::handle_resolve(project.as_deref(), &exclude, cli.format)
        }
        Commands::Candidates { project } => commands::handle_candidates(project.as_deref(), cli.format),
        Commands::Check { project } => commands::handle_check(project.as_deref(), cli.format),
    }
}
