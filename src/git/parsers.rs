//! Git output parsers

use std::path::PathBuf;

/// Parse `git diff --name-only` output into repository-relative paths.
pub fn parse_name_only(output: &str) -> Vec<PathBuf> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Parse `git rev-parse --show-toplevel` output.
pub fn parse_toplevel(output: &str) -> Option<PathBuf> {
    let path = output.trim();
    (!path.is_empty()).then(|| PathBuf::from(path))
}
