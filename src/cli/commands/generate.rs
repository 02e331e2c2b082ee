use super::resolve_repo_root;
use crate::config::GeneratorConfig;
use crate::git::SystemGit;
use crate::jobs::generate_all;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

pub fn run_generate(config: Option<PathBuf>, repo_root: Option<PathBuf>) -> Result<()> {
    let config = GeneratorConfig::load(config.as_deref()).context("Failed to load generator config")?;
    let repo_root = resolve_repo_root(repo_root, &SystemGit)?;

    let summary = generate_all(&config, &repo_root)?;
    info!(
        "Generated {} manifests under {}",
        summary.written.len(),
        repo_root.join(&config.jobs_folder).display()
    );
    Ok(())
}
