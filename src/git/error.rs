//! Git operation error types

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GitError {
    #[error("Not a git repository: {0}")]
    NotARepository(String),

    #[error("Invalid git reference: {0}")]
    InvalidReference(String),

    #[error("Git command failed: {0}")]
    CommandFailed(String),

    #[error("Failed to run git: {0}")]
    Spawn(String),
}

impl GitError {
    /// Classify a failed git invocation from its stderr.
    pub fn from_stderr(stderr: &str) -> Self {
        let stderr = stderr.trim();
        if stderr.contains("not a git repository") {
            GitError::NotARepository(stderr.to_string())
        } else if stderr.contains("unknown revision") || stderr.contains("bad revision") {
            GitError::InvalidReference(stderr.to_string())
        } else {
            GitError::CommandFailed(stderr.to_string())
        }
    }
}
