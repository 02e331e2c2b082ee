use std::path::PathBuf;
use thiserror::Error;

use crate::git::GitError;
use crate::template::TemplateError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template error in {file}: {source}")]
    Template {
        file: String,
        #[source]
        source: TemplateError,
    },

    #[error("Lookup error: {0}")]
    Lookup(String),

    #[error("Unmarshaling contents of {file}: {source}")]
    Yaml {
        file: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Git(#[from] GitError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn yaml(file: impl Into<String>, source: serde_yaml::Error) -> Self {
        Error::Yaml {
            file: file.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
