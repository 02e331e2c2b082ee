//! Job descriptions: loading, expansion and rendering
//!
//! A job directory holds one templated description per logical job. Loading
//! a directory expands the file names through the mapper chain, renders each
//! resulting entry from its template body and parses the result into a
//! [`JobConfig`].

pub mod generator;
pub mod manifest;
mod types;

pub use generator::{generate_all, GenerateSummary};
pub use manifest::ManifestRenderer;
pub use types::{
    EmptyDirVolume, EnvVar, ExtraRef, HostPathVolume, JobConfig, Resources, SecretVolume, Volume,
    VolumeMount,
};

use crate::expansion::{expand, initial_set, JobContext, Mapper};
use crate::template;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Command run before each command of the newest release-branch job.
pub const SUPPORTED_BRANCH_CHECK: &str =
    "make check-for-supported-release-branch -C $PROJECT_PATH";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobType {
    Periodic,
    Postsubmit,
    Presubmit,
}

impl JobType {
    pub const ALL: [JobType; 3] = [JobType::Periodic, JobType::Postsubmit, JobType::Presubmit];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::Periodic => "periodic",
            JobType::Postsubmit => "postsubmit",
            JobType::Presubmit => "presubmit",
        }
    }

    /// File name of the manifest template for this job type.
    pub fn template_file_name(&self) -> &'static str {
        match self {
            JobType::Periodic => "periodics.yaml",
            JobType::Postsubmit => "postsubmits.yaml",
            JobType::Presubmit => "presubmits.yaml",
        }
    }

    pub fn builtin_template(&self) -> &'static str {
        match self {
            JobType::Periodic => include_str!("../../templates/periodics.yaml"),
            JobType::Postsubmit => include_str!("../../templates/postsubmits.yaml"),
            JobType::Presubmit => include_str!("../../templates/presubmits.yaml"),
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "periodic" => Ok(JobType::Periodic),
            "postsubmit" => Ok(JobType::Postsubmit),
            "presubmit" => Ok(JobType::Presubmit),
            other => Err(Error::Config(format!("unsupported job type: {other}"))),
        }
    }
}

/// Expand and render in-memory job descriptions.
///
/// `bodies` maps file name to template body. The result maps every expanded
/// entry name to its parsed job.
pub fn render_job_configs(
    bodies: &BTreeMap<String, String>,
    mappers: &[Box<dyn Mapper>],
) -> Result<BTreeMap<String, JobConfig>> {
    let expanded = expand(initial_set(bodies.keys().cloned()), mappers);

    let mut configs = BTreeMap::new();
    for (name, context) in expanded {
        let config = render_job_config(&name, context, bodies)?;
        configs.insert(name, config);
    }
    Ok(configs)
}

/// Render one expanded entry. Consumes the context.
pub fn render_job_config(
    name: &str,
    mut context: JobContext,
    bodies: &BTreeMap<String, String>,
) -> Result<JobConfig> {
    let template_name = context.template_source().unwrap_or(name).to_string();
    let body = bodies.get(&template_name).ok_or_else(|| {
        Error::Lookup(format!(
            "no job description named {template_name} (needed by {name})"
        ))
    })?;

    let rendered = template::render(&template_name, body, &context.template_data()).map_err(
        |source| Error::Template {
            file: name.to_string(),
            source,
        },
    )?;
    let mut config: JobConfig =
        serde_yaml::from_str(&rendered).map_err(|e| Error::yaml(name, e))?;

    if apply_latest_guard(&mut config, &mut context) {
        debug!("Guarded commands of {} behind the release branch check", name);
    }
    Ok(config)
}

/// Wrap every command of the newest release-branch job so it only runs when
/// the branch is supported. Consumes the latest marker, so a second call on
/// the same context changes nothing.
pub fn apply_latest_guard(config: &mut JobConfig, context: &mut JobContext) -> bool {
    if !context.take_latest_marker() {
        return false;
    }
    for command in &mut config.commands {
        *command = format!("if {SUPPORTED_BRANCH_CHECK}; then {command}; fi");
    }
    true
}

/// Read every file directly inside `dir` and render it.
pub fn load_job_dir(dir: &Path, mappers: &[Box<dyn Mapper>]) -> Result<BTreeMap<String, JobConfig>> {
    let mut bodies = BTreeMap::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| Error::io(dir, e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let body = fs::read_to_string(entry.path()).map_err(|e| Error::io(entry.path(), e))?;
        bodies.insert(name, body);
    }

    debug!("Read {} job descriptions from {}", bodies.len(), dir.display());
    render_job_configs(&bodies, mappers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expansion::{ReleaseBranchMapper, LATEST_RELEASE_BRANCH_KEY};
    use crate::template::TemplateError;

    fn bodies(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn release_mappers() -> Vec<Box<dyn Mapper>> {
        vec![Box::new(ReleaseBranchMapper::new("1-X", ["1-27", "1-28"]))]
    }

    const TEMPLATED: &str = r#"
jobName: build-{{ releaseBranch }}-presubmit
commands:
  - make build RELEASE_BRANCH={{ releaseBranch }}
envVars:
  - name: OTHER_BRANCHES
    value: "{{ otherReleaseBranches }}"
"#;

    #[test]
    fn test_release_branch_jobs_render_from_base_file() {
        let configs =
            render_job_configs(&bodies(&[("build-1-X-presubmits.yaml", TEMPLATED)]), &release_mappers())
                .unwrap();

        assert_eq!(
            configs.keys().collect::<Vec<_>>(),
            vec!["build-1-27-presubmits.yaml", "build-1-28-presubmits.yaml"]
        );

        let older = &configs["build-1-27-presubmits.yaml"];
        assert_eq!(older.job_name, "build-1-27-presubmit");
        assert_eq!(older.commands, vec!["make build RELEASE_BRANCH=1-27"]);
        assert_eq!(older.env_vars[0].value, "1-28");
    }

    #[test]
    fn test_latest_branch_commands_are_guarded() {
        let configs =
            render_job_configs(&bodies(&[("build-1-X-presubmits.yaml", TEMPLATED)]), &release_mappers())
                .unwrap();

        assert_eq!(
            configs["build-1-28-presubmits.yaml"].commands,
            vec![format!(
                "if {SUPPORTED_BRANCH_CHECK}; then make build RELEASE_BRANCH=1-28; fi"
            )]
        );
    }

    #[test]
    fn test_plain_file_renders_as_is() {
        let configs = render_job_configs(
            &bodies(&[("lint-presubmits.yaml", "jobName: lint\ncommands: [make lint]\n")]),
            &release_mappers(),
        )
        .unwrap();

        assert_eq!(configs.len(), 1);
        assert_eq!(configs["lint-presubmits.yaml"].commands, vec!["make lint"]);
    }

    #[test]
    fn test_guard_applies_once() {
        let mut config = JobConfig {
            job_name: "x".to_string(),
            commands: vec!["make build".to_string()],
            ..Default::default()
        };
        let mut context = JobContext::new().with(LATEST_RELEASE_BRANCH_KEY, true);

        assert!(apply_latest_guard(&mut config, &mut context));
        assert!(!apply_latest_guard(&mut config, &mut context));
        assert_eq!(
            config.commands,
            vec![format!("if {SUPPORTED_BRANCH_CHECK}; then make build; fi")]
        );
    }

    #[test]
    fn test_template_error_names_the_derived_file() {
        let err = render_job_configs(
            &bodies(&[("job-1-X.yaml", "jobName: {{ missingKey }}")]),
            &release_mappers(),
        )
        .unwrap_err();

        match err {
            Error::Template { file, source } => {
                assert_eq!(file, "job-1-27.yaml");
                assert!(matches!(source, TemplateError::Render { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_template_body_is_lookup_error() {
        let context = JobContext::new().with_template_source("gone-1-X.yaml");
        let err = render_job_config("gone-1-27.yaml", context, &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, Error::Lookup(_)));
    }

    #[test]
    fn test_invalid_yaml_after_render() {
        let err = render_job_configs(&bodies(&[("bad.yaml", "commands: [make")]), &[]).unwrap_err();
        assert!(matches!(err, Error::Yaml { .. }));
    }

    #[test]
    fn test_load_job_dir_skips_directories() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        fs::write(dir.path().join("a-presubmits.yaml"), "jobName: a\n")?;
        fs::create_dir(dir.path().join("nested"))?;

        let configs = load_job_dir(dir.path(), &[])?;
        assert_eq!(configs.keys().collect::<Vec<_>>(), vec!["a-presubmits.yaml"]);
        Ok(())
    }

    #[test]
    fn test_load_missing_dir_fails() {
        let err = load_job_dir(Path::new("/nonexistent/jobs/presubmit/x"), &[]).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_job_type_round_trip_names() {
        for job_type in JobType::ALL {
            assert_eq!(job_type.as_str().parse::<JobType>().unwrap(), job_type);
        }
        assert!("batch".parse::<JobType>().is_err());
    }
}
