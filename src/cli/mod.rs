//! CLI command handlers
//!
//! Argument parsing lives in [`args`], the per-command implementations in
//! [`commands`], and [`router`] dispatches between them.

pub mod args;
pub mod commands;
pub mod router;

pub use args::{Cli, Commands};
pub use router::execute_command;

/// Log filter for the number of `-v` flags given.
pub fn get_log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}
