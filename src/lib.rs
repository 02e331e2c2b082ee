//! # jobsmith
//!
//! Generates CI job manifests from templated job descriptions and lints the
//! rendered presubmits against organizational policy.
//!
//! ## Usage
//!
//! ```bash
//! jobsmith generate [--config jobsmith.toml]
//! jobsmith lint --constants constants.yaml [FILES...]
//! ```
//!
//! ## Modules
//!
//! - `expansion` - Mapper chain that fans job descriptions out into derived entries
//! - `template` - Text substitution with the indent/join/trim helpers
//! - `jobs` - Job description schema, rendering and manifest generation
//! - `lint` - Policy checks over rendered presubmits and the findings report
//! - `config` - Generator settings and lint policy constants
//! - `git` - Repository root and changed-file discovery
//! - `cli` - Command-line entry points
pub mod cli;
pub mod config;
pub mod error;
pub mod expansion;
pub mod git;
pub mod jobs;
pub mod lint;
pub mod template;

pub use error::{Error, Result};
