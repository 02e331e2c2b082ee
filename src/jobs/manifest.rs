//! Rendering of final job manifests from parsed job descriptions

use super::{EnvVar, JobConfig, JobType};
use crate::config::GeneratorConfig;
use crate::template;
use crate::{Error, Result};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

const EDIT_WARNING: &str = include_str!("../../templates/warning.txt");

/// Joins the commands of a job into the single shell line the build container runs.
pub const COMMAND_SEPARATOR: &str = "\n&&\n";

pub struct ManifestRenderer<'a> {
    config: &'a GeneratorConfig,
    builder_base_tag: String,
}

impl<'a> ManifestRenderer<'a> {
    pub fn new(config: &'a GeneratorConfig, builder_base_tag: impl Into<String>) -> Self {
        Self {
            config,
            builder_base_tag: builder_base_tag.into(),
        }
    }

    /// Environment variables of the rendered container: the job's own, then
    /// the buildx and image-cache settings it asked for.
    pub fn env_vars(&self, job: &JobConfig) -> Vec<EnvVar> {
        let mut env_vars = job.env_vars.clone();

        if job.use_docker_buildx {
            env_vars.push(EnvVar::new(
                "BUILDKITD_IMAGE",
                format!("moby/buildkit:{}", self.config.buildkit_image_tag),
            ));
            env_vars.push(EnvVar::new("USE_BUILDX", "true"));
        }

        if job.image_build {
            let cache = if self.config.curated_packages.matches(&job.job_name) {
                &self.config.image_cache.curated_packages
            } else {
                &self.config.image_cache.default
            };
            env_vars.push(EnvVar::new("ADDITIONAL_IMAGE_CACHE_REPOS", cache.as_str()));
        }

        env_vars
    }

    /// Cluster, bucket and service account. A job that names no cluster
    /// gets all three from the job type's defaults.
    pub fn cluster_details(&self, job_type: JobType, job: &JobConfig) -> (String, String, String) {
        match job.cluster.as_deref() {
            Some(cluster) if !cluster.is_empty() => (
                cluster.to_string(),
                job.bucket.clone().unwrap_or_default(),
                job.service_account_name.clone().unwrap_or_default(),
            ),
            _ => {
                let defaults = self.config.cluster_defaults.for_job_type(job_type);
                (
                    defaults.cluster.clone(),
                    defaults.bucket.clone(),
                    defaults.service_account_name.clone(),
                )
            }
        }
    }

    /// Template data for one job's manifest.
    pub fn manifest_data(&self, job_type: JobType, repo_name: &str, job: &JobConfig) -> Map<String, Value> {
        let (cluster, bucket, service_account_name) = self.cluster_details(job_type, job);

        let mut data = Map::new();
        let mut set = |key: &str, value: Value| {
            data.insert(key.to_string(), value);
        };

        set("architecture", json!(job.architecture));
        set("repoName", json!(repo_name));
        set("prowjobName", json!(job.job_name));
        set("runIfChanged", json!(job.run_if_changed));
        set("skipIfOnlyChanged", json!(job.skip_if_only_changed));
        set("branches", json!(job.branches));
        set("cronExpression", json!(job.cron_expression));
        set("maxConcurrency", json!(job.max_concurrency));
        set("timeout", json!(job.timeout));
        set("extraRefs", json!(job.extra_refs));
        set("imageBuild", json!(job.image_build));
        set("useDockerBuildX", json!(job.use_docker_buildx));
        set("prCreation", json!(job.pr_creation));
        set("runtimeImage", json!(job.runtime_image));
        set("localRegistry", json!(job.local_registry));
        set("serviceAccountName", json!(service_account_name));
        set("command", json!(job.commands.join(COMMAND_SEPARATOR)));
        set("builderBaseTag", json!(self.builder_base_tag));
        set("buildkitImageTag", json!(self.config.buildkit_image_tag));
        set("resources", json!(job.resources));
        set("envVars", json!(self.env_vars(job)));
        set("volumes", json!(job.volumes));
        set("volumeMounts", json!(job.volume_mounts));
        set("editWarning", json!(EDIT_WARNING));
        set("cluster", json!(cluster));
        set("bucket", json!(bucket));
        set("projectPath", json!(job.project_path));
        set("diskUsage", json!(true));
        set("runAsUser", json!(job.run_as_user));
        set("runAsGroup", json!(job.run_as_group));
        if let Some(automount) = job.automount_service_account_token {
            set("automountServiceAccountToken", json!(automount));
        }

        data
    }

    /// Render one manifest. `file_name` only labels errors.
    pub fn render(
        &self,
        job_type: JobType,
        template_body: &str,
        repo_name: &str,
        file_name: &str,
        job: &JobConfig,
    ) -> Result<String> {
        let data = self.manifest_data(job_type, repo_name, job);
        template::render(job_type.template_file_name(), template_body, &data).map_err(|source| {
            Error::Template {
                file: file_name.to_string(),
                source,
            }
        })
    }

    /// Render every job of one repository, keyed by output file name.
    pub fn render_all(
        &self,
        job_type: JobType,
        template_body: &str,
        repo_name: &str,
        jobs: &BTreeMap<String, JobConfig>,
    ) -> Result<BTreeMap<String, String>> {
        jobs.iter()
            .map(|(file_name, job)| {
                let rendered = self.render(job_type, template_body, repo_name, file_name, job)?;
                Ok((file_name.clone(), rendered))
            })
            .collect()
    }
}
