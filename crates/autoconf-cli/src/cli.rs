use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "autoconf")]
#[command(about = "Resolve, filter and order auto-configuration candidates")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Log engine decisions at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one resolution pass and print the ordered imports
    Resolve {
        /// Project root (defaults to CWD)
        #[arg(long)]
        project: Option<PathBuf>,

        /// Extra candidate to exclude; repeatable
        #[arg(long = "exclude", value_name = "ID")]
        exclude: Vec<String>,
    },

    /// Print the declared candidates after renames
    Candidates {
        /// Project root (defaults to CWD)
        #[arg(long)]
        project: Option<PathBuf>,
    },

    /// Validate settings and classpath roots
    Check {
        /// Project root (defaults to CWD)
        #[arg(long)]
        project: Option<PathBuf>,
    },
}

/// Output format for CLI responses
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
