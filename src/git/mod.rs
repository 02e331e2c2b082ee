//! Git queries the linter needs: the repository root and the files a pull
//! request changed.

pub mod error;
pub mod parsers;

pub use error::GitError;
pub use parsers::{parse_name_only, parse_toplevel};

use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Git read operations
pub trait GitReader: Send + Sync {
    /// Top-level directory of the repository containing `dir`.
    fn repo_root(&self, dir: &Path) -> Result<PathBuf, GitError>;

    /// Files changed between two commits, relative to `root`.
    fn changed_files(&self, root: &Path, base: &str, head: &str) -> Result<Vec<PathBuf>, GitError>;
}

/// [`GitReader`] backed by the `git` executable.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemGit;

impl SystemGit {
    fn run(&self, dir: &Path, args: &[&str]) -> Result<String, GitError> {
        debug!("git -C {} {}", dir.display(), args.join(" "));
        let output = Command::new("git")
            .arg("-C")
            .arg(dir)
            .args(args)
            .output()
            .map_err(|e| GitError::Spawn(e.to_string()))?;

        if !output.status.success() {
            return Err(GitError::from_stderr(&String::from_utf8_lossy(&output.stderr)));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl GitReader for SystemGit {
    fn repo_root(&self, dir: &Path) -> Result<PathBuf, GitError> {
        let output = self.run(dir, &["rev-parse", "--show-toplevel"])?;
        parse_toplevel(&output).ok_or_else(|| GitError::NotARepository(dir.display().to_string()))
    }

    fn changed_files(&self, root: &Path, base: &str, head: &str) -> Result<Vec<PathBuf>, GitError> {
        let output = self.run(root, &["diff", "--name-only", base, head])?;
        let files = parse_name_only(&output);
        debug!("{} files changed between {} and {}", files.len(), base, head);
        Ok(files)
    }
}
