//! Command routing and execution

use crate::cli::args::Commands;
use crate::cli::commands::{run_generate, run_lint, LintCommand};
use anyhow::Result;

/// Run a command. `Ok(false)` means it ran but the result is a failure the
/// process should exit non-zero for.
pub fn execute_command(command: Commands) -> Result<bool> {
    match command {
        Commands::Generate { config, repo_root } => {
            run_generate(config, repo_root)?;
            Ok(true)
        }
        Commands::Lint {
            constants,
            base_sha,
            head_sha,
            repo_root,
            jobs_folder,
            files,
        } => run_lint(LintCommand {
            constants,
            base_sha,
            head_sha,
            repo_root,
            jobs_folder,
            files,
        }),
    }
}
