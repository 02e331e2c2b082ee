use super::resolve_repo_root;
use crate::config::PolicyConstants;
use crate::git::{GitReader, SystemGit};
use crate::lint::{default_checks, Linter};
use anyhow::{bail, Context, Result};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct LintCommand {
    pub constants: PathBuf,
    pub base_sha: Option<String>,
    pub head_sha: Option<String>,
    pub repo_root: Option<PathBuf>,
    pub jobs_folder: String,
    pub files: Vec<PathBuf>,
}

/// Lint the requested manifests and print the report. Returns whether every
/// check passed.
pub fn run_lint(cmd: LintCommand) -> Result<bool> {
    let git = SystemGit;
    let policy = Arc::new(PolicyConstants::load(&cmd.constants)?);
    let repo_root = resolve_repo_root(cmd.repo_root, &git)?;

    let files = if cmd.files.is_empty() {
        let (Some(base), Some(head)) = (cmd.base_sha.as_deref(), cmd.head_sha.as_deref()) else {
            bail!("No files given: set --base-sha and --head-sha (or PULL_BASE_SHA and PULL_PULL_SHA)");
        };
        git.changed_files(&repo_root, base, head)
            .context("Failed to list changed files")?
    } else {
        cmd.files
    };
    debug!("Linting {} candidate files", files.len());

    let linter = Linter::new(&repo_root, default_checks(policy)).with_jobs_folder(cmd.jobs_folder);
    let report = linter.lint_files(&files)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let failed = report.write_to(&mut out)?;
    if failed {
        writeln!(out, "\n❌ Validations failed!")?;
    } else {
        writeln!(out, "✅ Validations passed!")?;
    }
    Ok(!failed)
}
