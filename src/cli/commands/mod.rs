mod generate;
mod lint;

pub use generate::run_generate;
pub use lint::{run_lint, LintCommand};

use crate::git::GitReader;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// The explicit root if given, otherwise the git repository enclosing the
/// working directory.
fn resolve_repo_root(explicit: Option<PathBuf>, git: &dyn GitReader) -> Result<PathBuf> {
    if let Some(root) = explicit {
        return Ok(root);
    }
    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    git.repo_root(&cwd)
        .context("Failed to find the repository root; pass --repo-root")
}
