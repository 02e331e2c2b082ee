//! Generator configuration and lint policy
//!
//! The generator reads an optional TOML file; anything it leaves out falls
//! back to the stock values in [`GeneratorConfig::default`]. Tables of lists
//! (`[repos]`, `[curated_packages]`) are taken as written, so a list missing
//! from a table that is present is empty. `[image_cache]` fills missing keys
//! from the stock values, and each `[cluster_defaults.*]` table must set all
//! three of its keys. A few settings can be overridden from the environment:
//!
//! - `JOBSMITH_JOBS_FOLDER` - output folder for rendered manifests
//! - `JOBSMITH_BUILDER_BASE_TAG` - builder-base image tag

pub mod policy;

pub use policy::PolicyConstants;

use crate::jobs::JobType;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Where job descriptions live, relative to the repository root.
    pub source_folder: PathBuf,
    /// Where rendered manifests are written, relative to the repository root.
    pub jobs_folder: PathBuf,
    /// Manifest template overrides; the built-in templates are used when unset.
    pub template_folder: Option<PathBuf>,
    pub org: String,
    pub release_branch_placeholder: String,
    pub release_branches: Vec<String>,
    pub repos: RepoLists,
    pub cluster_defaults: ClusterDefaults,
    pub buildkit_image_tag: String,
    pub builder_base_tag: Option<String>,
    /// Read when `builder_base_tag` is unset, relative to the repository root.
    pub builder_base_tag_file: PathBuf,
    pub image_cache: ImageCacheRepos,
    pub curated_packages: NameMatcher,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            source_folder: PathBuf::from("templater/jobs"),
            jobs_folder: PathBuf::from("jobs"),
            template_folder: None,
            org: "aws".to_string(),
            release_branch_placeholder: "1-X".to_string(),
            release_branches: ["1-27", "1-28", "1-29", "1-30", "1-31"]
                .into_iter()
                .map(String::from)
                .collect(),
            repos: RepoLists::default(),
            cluster_defaults: ClusterDefaults::default(),
            buildkit_image_tag: "v0.12.5-rootless".to_string(),
            builder_base_tag: None,
            builder_base_tag_file: PathBuf::from("BUILDER_BASE_TAG_FILE"),
            image_cache: ImageCacheRepos::default(),
            curated_packages: NameMatcher::curated_packages(),
        }
    }
}

impl GeneratorConfig {
    /// Load from `path` if given, apply environment overrides, validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Generator config does not exist: {}",
                        path.display()
                    )));
                }
                debug!("Loading generator config from {}", path.display());
                let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
                toml::from_str(&content)?
            }
            None => Self::default(),
        };

        config.merge_env_vars();
        config.validate()?;
        Ok(config)
    }

    pub fn merge_env_vars(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(folder) = lookup("JOBSMITH_JOBS_FOLDER") {
            self.jobs_folder = PathBuf::from(folder);
        }
        if let Some(tag) = lookup("JOBSMITH_BUILDER_BASE_TAG") {
            self.builder_base_tag = Some(tag);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.release_branch_placeholder.is_empty() {
            return Err(Error::Config(
                "release_branch_placeholder cannot be empty".to_string(),
            ));
        }
        if self.release_branches.is_empty() {
            return Err(Error::Config(
                "release_branches must list at least one branch".to_string(),
            ));
        }
        if self.org.is_empty() || self.org.contains('/') {
            return Err(Error::Config(format!(
                "org must be a single path segment, got {:?}",
                self.org
            )));
        }
        Ok(())
    }

    /// Builder-base tag, inline or from the tag file under `repo_root`.
    pub fn resolve_builder_base_tag(&self, repo_root: &Path) -> Result<String> {
        if let Some(tag) = &self.builder_base_tag {
            return Ok(tag.trim().to_string());
        }
        let path = repo_root.join(&self.builder_base_tag_file);
        let tag = fs::read_to_string(&path).map_err(|e| {
            Error::Config(format!(
                "reading builder base tag from {}: {e}",
                path.display()
            ))
        })?;
        Ok(tag.trim().to_string())
    }
}

/// Repositories whose jobs are generated, per job type.
///
/// A `[repos]` table replaces the stock lists as a whole: job types it leaves
/// out get no repositories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoLists {
    #[serde(default)]
    pub periodic: Vec<String>,
    #[serde(default)]
    pub postsubmit: Vec<String>,
    #[serde(default)]
    pub presubmit: Vec<String>,
}

impl Default for RepoLists {
    fn default() -> Self {
        let list = |names: &[&str]| -> Vec<String> {
            names.iter().map(|s| s.to_string()).collect()
        };
        Self {
            periodic: list(&["eks-anywhere", "eks-anywhere-build-tooling"]),
            postsubmit: list(&["eks-anywhere"]),
            presubmit: list(&[
                "eks-anywhere",
                "eks-anywhere-build-tooling",
                "eks-anywhere-packages",
                "eks-anywhere-prow-jobs",
            ]),
        }
    }
}

impl RepoLists {
    pub fn for_job_type(&self, job_type: JobType) -> &[String] {
        match job_type {
            JobType::Periodic => &self.periodic,
            JobType::Postsubmit => &self.postsubmit,
            JobType::Presubmit => &self.presubmit,
        }
    }
}

/// Cluster, bucket and service account for a job that names no cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterDetails {
    pub cluster: String,
    pub bucket: String,
    pub service_account_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterDefaults {
    pub presubmit: ClusterDetails,
    /// Shared by postsubmits and periodics.
    pub postsubmit: ClusterDetails,
}

impl Default for ClusterDefaults {
    fn default() -> Self {
        Self {
            presubmit: ClusterDetails {
                cluster: "prow-presubmits-cluster".to_string(),
                bucket: "s3://prowpresubmitsdataclusterstack-prowbucket7c73355c-vfwwxd2eb4gp"
                    .to_string(),
                service_account_name: "presubmits-build-account".to_string(),
            },
            postsubmit: ClusterDetails {
                cluster: "prow-postsubmits-cluster".to_string(),
                bucket: "s3://prowdataclusterstack-316434458-prowbucket7c73355c-1n9f9v93wpjcm"
                    .to_string(),
                service_account_name: "postsubmits-build-account".to_string(),
            },
        }
    }
}

impl ClusterDefaults {
    pub fn for_job_type(&self, job_type: JobType) -> &ClusterDetails {
        match job_type {
            JobType::Presubmit => &self.presubmit,
            JobType::Postsubmit | JobType::Periodic => &self.postsubmit,
        }
    }
}

/// Image cache registries passed to image-building jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageCacheRepos {
    pub curated_packages: String,
    pub default: String,
}

impl Default for ImageCacheRepos {
    fn default() -> Self {
        Self {
            curated_packages: "067575901363.dkr.ecr.us-west-2.amazonaws.com".to_string(),
            default: "857151390494.dkr.ecr.us-west-2.amazonaws.com".to_string(),
        }
    }
}

/// Matches job names by substring or by exact name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameMatcher {
    pub substrings: Vec<String>,
    pub exact: Vec<String>,
}

impl NameMatcher {
    pub fn new<S: Into<String>>(
        substrings: impl IntoIterator<Item = S>,
        exact: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            substrings: substrings.into_iter().map(Into::into).collect(),
            exact: exact.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.substrings.iter().any(|s| name.contains(s.as_str()))
            || self.exact.iter().any(|e| e == name)
    }

    fn curated_packages() -> Self {
        Self::new(
            ["autoscaler", "cloud-provider-aws", "harbor", "prometheus"],
            [
                "aws-otel-collector-tooling-presubmit",
                "distribution-tooling-presubmit",
                "eks-anywhere-packages-image-tooling-presubmit",
                "emissary-tooling-presubmit",
                "hello-eks-anywhere-tooling-presubmit",
                "metallb-tooling-presubmit",
                "metrics-server-presubmit",
                "redis-tooling-presubmit",
                "rolesanywhere-credential-helper-presubmit",
                "trivy-tooling-presubmit",
            ],
        )
    }
}
