//! CLI argument structures

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Generate CI job manifests from templated descriptions and lint them
#[derive(Parser, Debug)]
#[command(name = "jobsmith")]
#[command(about = "jobsmith - Generate and lint CI job manifests", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render every job description into its manifest
    Generate {
        /// Generator config file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Repository root (defaults to the enclosing git repository)
        #[arg(long)]
        repo_root: Option<PathBuf>,
    },

    /// Check presubmit manifests against policy constants
    Lint {
        /// Policy constants file (YAML)
        #[arg(long, env = "CONSTANTS_CONFIG_FILE")]
        constants: PathBuf,

        /// Base commit of the change under review
        #[arg(long, env = "PULL_BASE_SHA")]
        base_sha: Option<String>,

        /// Head commit of the change under review
        #[arg(long, env = "PULL_PULL_SHA")]
        head_sha: Option<String>,

        /// Repository root (defaults to the enclosing git repository)
        #[arg(long)]
        repo_root: Option<PathBuf>,

        /// Folder the rendered manifests live under
        #[arg(long, default_value = "jobs")]
        jobs_folder: String,

        /// Manifests to lint, relative to the repository root. When omitted,
        /// the files changed between the base and head commits are linted.
        files: Vec<PathBuf>,
    },
}
