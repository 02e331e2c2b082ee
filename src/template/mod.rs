//! Template substitution for job descriptions and manifests
//!
//! Templates use tera syntax. Every render builds its own engine, so there is
//! no state shared between renders and identical inputs always produce
//! identical output. Three helpers are available as filters:
//!
//! - `indent(spaces=N)` prefixes every line with N spaces
//! - `join(sep=S)` joins a list of strings
//! - `trim` strips surrounding whitespace

mod helpers;

use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;

pub use helpers::{indent_filter, join_filter, trim_filter};

/// Distinguishes a malformed template from one that failed while rendering
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("parsing template {template}: {message}")]
    Parse { template: String, message: String },

    #[error("substituting values for template {template}: {message}")]
    Render { template: String, message: String },
}

impl TemplateError {
    pub fn is_parse(&self) -> bool {
        matches!(self, TemplateError::Parse { .. })
    }
}

/// Render `body` (identified by `name` in error messages) against `data`.
///
/// `data` must serialize to a map; each top-level key becomes a template
/// variable.
pub fn render<T: Serialize>(name: &str, body: &str, data: &T) -> Result<String, TemplateError> {
    let mut engine = Tera::default();
    engine.autoescape_on(vec![]);
    register_helpers(&mut engine);

    engine
        .add_raw_template(name, body)
        .map_err(|e| TemplateError::Parse {
            template: name.to_string(),
            message: describe(&e),
        })?;

    let context = Context::from_serialize(data).map_err(|e| TemplateError::Render {
        template: name.to_string(),
        message: describe(&e),
    })?;

    engine
        .render(name, &context)
        .map_err(|e| TemplateError::Render {
            template: name.to_string(),
            message: describe(&e),
        })
}

/// Install the helper filters, replacing tera's built-ins of the same name.
pub fn register_helpers(engine: &mut Tera) {
    engine.register_filter("indent", indent_filter);
    engine.register_filter("join", join_filter);
    engine.register_filter("trim", trim_filter);
}

// tera keeps the useful detail (missing variable, bad filter argument) in the
// source chain rather than the top-level message.
fn describe(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
