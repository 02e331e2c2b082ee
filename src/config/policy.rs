//! Policy constants presubmit manifests are linted against

use crate::jobs::EnvVar;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Reference values every presubmit must use.
///
/// Loaded once per lint run from a YAML document and shared read-only by the
/// checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyConstants {
    pub bucket: String,
    pub cluster: String,
    pub service_account_name: String,
    pub default_make_target: String,
    #[serde(default)]
    pub env: Vec<EnvVar>,
    /// Jobs allowed to build something other than the default make target.
    #[serde(default)]
    pub make_target_exempt_jobs: Vec<String>,
}

impl PolicyConstants {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Job constants file does not exist: {}",
                path.display()
            )));
        }
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_yaml_str(&content, &path.display().to_string())
    }

    pub fn from_yaml_str(content: &str, source: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid job constants in {source}: {e}")))
    }

    /// The required variable with this name, if policy declares one.
    pub fn required_env(&self, name: &str) -> Option<&EnvVar> {
        self.env.iter().find(|env| env.name == name)
    }
}
