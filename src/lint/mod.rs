//! Presubmit manifest linting
//!
//! Changed manifest files are parsed into [`ProwJobFile`]s, the first
//! presubmit of each is reduced to a [`JobDefinition`], and every configured
//! [`PolicyCheck`] runs against it. Findings are collected per file into a
//! [`Report`].

pub mod checks;
mod engine;
mod report;

pub use checks::{default_checks, CheckResult, PolicyCheck};
pub use engine::{evaluate, Finding};
pub use report::Report;

use crate::jobs::EnvVar;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A generated manifest file as the linter reads it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProwJobFile {
    #[serde(default)]
    pub presubmits: BTreeMap<String, Vec<Presubmit>>,
    #[serde(default)]
    pub postsubmits: BTreeMap<String, Vec<serde_yaml::Value>>,
    #[serde(default)]
    pub periodics: Vec<serde_yaml::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Presubmit {
    pub name: String,
    #[serde(default)]
    pub always_run: bool,
    #[serde(default)]
    pub skip_report: bool,
    #[serde(default)]
    pub cluster: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub decoration_config: Option<DecorationConfig>,
    #[serde(default)]
    pub spec: Option<PodSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecorationConfig {
    #[serde(default)]
    pub gcs_configuration: Option<GcsConfiguration>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GcsConfiguration {
    #[serde(default)]
    pub bucket: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PodSpec {
    #[serde(default, rename = "serviceAccountName", alias = "serviceaccountName")]
    pub service_account_name: String,
    #[serde(default)]
    pub containers: Vec<Container>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Container {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub command: Vec<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: Vec<EnvVar>,
}

/// The fields of one presubmit that policy cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDefinition {
    pub name: String,
    pub architecture: Option<String>,
    pub always_run: bool,
    pub skip_report: bool,
    pub cluster: String,
    pub bucket: String,
    pub service_account_name: String,
    /// Never empty.
    pub containers: Vec<Container>,
}

impl JobDefinition {
    /// Command of the first container as one shell line. `args` are not
    /// part of it.
    pub fn command_line(&self) -> String {
        self.containers
            .first()
            .map(|c| c.command.join(" "))
            .unwrap_or_default()
    }
}

impl TryFrom<&Presubmit> for JobDefinition {
    type Error = Error;

    fn try_from(presubmit: &Presubmit) -> Result<Self> {
        let spec = presubmit.spec.as_ref().ok_or_else(|| {
            Error::Config(format!("presubmit {} has no pod spec", presubmit.name))
        })?;
        if spec.containers.is_empty() {
            return Err(Error::Config(format!(
                "presubmit {} declares no containers",
                presubmit.name
            )));
        }

        let bucket = presubmit
            .decoration_config
            .as_ref()
            .and_then(|d| d.gcs_configuration.as_ref())
            .map(|g| g.bucket.clone())
            .unwrap_or_default();

        Ok(Self {
            name: presubmit.name.clone(),
            architecture: presubmit.labels.get("architecture").cloned(),
            always_run: presubmit.always_run,
            skip_report: presubmit.skip_report,
            cluster: presubmit.cluster.clone(),
            bucket,
            service_account_name: spec.service_account_name.clone(),
            containers: spec.containers.clone(),
        })
    }
}

/// 1-based number of the first line of `raw` containing `needle`, or 0.
pub fn find_line_number(raw: &str, needle: &str) -> usize {
    raw.lines()
        .position(|line| line.contains(needle))
        .map_or(0, |index| index + 1)
}

/// Key of a manifest's repository in its presubmit map: the file's directory
/// relative to the jobs folder, e.g. `jobs/aws/widget/x.yaml` -> `aws/widget`.
pub fn repo_key(file: &Path, jobs_folder: &str) -> String {
    let dir = file
        .parent()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_default();
    dir.replacen(&format!("{}/", jobs_folder.trim_end_matches('/')), "", 1)
}

pub struct Linter {
    repo_root: PathBuf,
    jobs_folder: String,
    checks: Vec<Box<dyn PolicyCheck>>,
}

impl Linter {
    pub fn new(repo_root: impl Into<PathBuf>, checks: Vec<Box<dyn PolicyCheck>>) -> Self {
        Self {
            repo_root: repo_root.into(),
            jobs_folder: "jobs".to_string(),
            checks,
        }
    }

    pub fn with_jobs_folder(mut self, jobs_folder: impl Into<String>) -> Self {
        self.jobs_folder = jobs_folder.into();
        self
    }

    /// Lint one manifest, given relative to the repository root.
    ///
    /// Returns `None` for files that are skipped: anything outside a
    /// presubmits manifest, and files that no longer exist.
    pub fn lint_file(&self, file: &Path) -> Result<Option<Vec<Finding>>> {
        if !file.to_string_lossy().contains("presubmits") {
            debug!("Skipping {}: not a presubmit manifest", file.display());
            return Ok(None);
        }
        let path = self.repo_root.join(file);
        if !path.exists() {
            warn!("Skipping {}: file no longer exists", file.display());
            return Ok(None);
        }

        let raw = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let parsed: ProwJobFile =
            serde_yaml::from_str(&raw).map_err(|e| Error::yaml(file.display().to_string(), e))?;

        let key = repo_key(file, &self.jobs_folder);
        let presubmits = parsed.presubmits.get(&key).ok_or_else(|| {
            Error::Lookup(format!(
                "Key {key} does not exist in Presubmit configuration map"
            ))
        })?;
        let first = presubmits.first().ok_or_else(|| {
            Error::Config(format!(
                "Presubmit configuration for the {key} repo is empty"
            ))
        })?;

        let job = JobDefinition::try_from(first)?;
        Ok(Some(evaluate(&self.checks, &job, &raw)))
    }

    /// Lint every file, collecting findings per file in input order. A
    /// parse, lookup or structure error on any file aborts the run.
    pub fn lint_files<P: AsRef<Path>>(&self, files: &[P]) -> Result<Report> {
        let mut report = Report::new();
        let mut linted = 0;

        for file in files {
            let file = file.as_ref();
            if let Some(findings) = self.lint_file(file)? {
                linted += 1;
                report.record(file.display().to_string(), findings);
            }
        }

        info!(
            "Linted {} presubmit manifests, {} findings",
            linted,
            report.finding_count()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolicyConstants;
    use std::sync::Arc;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"presubmits:
  aws/widget:
  - name: widget-presubmit
    always_run: false
    skip_report: false
    cluster: "prow-presubmits-cluster"
    labels:
      architecture: amd64
    decoration_config:
      gcs_configuration:
        bucket: s3://presubmit-bucket
    spec:
      serviceaccountName: presubmits-build-account
      containers:
      - name: build-container
        image: builder:standard
        command:
        - bash
        - -c
        - >
          make build
        env:
        - name: GOPROXY
          value: direct
"#;

    fn policy() -> Arc<PolicyConstants> {
        Arc::new(PolicyConstants {
            bucket: "s3://presubmit-bucket".to_string(),
            cluster: "prow-presubmits-cluster".to_string(),
            service_account_name: "presubmits-build-account".to_string(),
            default_make_target: "build".to_string(),
            env: vec![EnvVar::new("GOPROXY", "direct")],
            make_target_exempt_jobs: vec![],
        })
    }

    fn write(root: &Path, rel: &str, contents: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        PathBuf::from(rel)
    }

    #[test]
    fn test_find_line_number() {
        let raw = "a: 1\nb: 2\nb: 3\n";
        assert_eq!(find_line_number(raw, "b:"), 2);
        assert_eq!(find_line_number(raw, "a:"), 1);
        assert_eq!(find_line_number(raw, "zzz"), 0);
    }

    #[test]
    fn test_repo_key() {
        assert_eq!(repo_key(Path::new("jobs/aws/widget/x-presubmits.yaml"), "jobs"), "aws/widget");
        assert_eq!(repo_key(Path::new("out/aws/widget/x.yaml"), "out/"), "aws/widget");
    }

    #[test]
    fn test_job_definition_from_presubmit() {
        let parsed: ProwJobFile = serde_yaml::from_str(MANIFEST).unwrap();
        let job = JobDefinition::try_from(&parsed.presubmits["aws/widget"][0]).unwrap();

        assert_eq!(job.name, "widget-presubmit");
        assert_eq!(job.architecture.as_deref(), Some("amd64"));
        assert_eq!(job.bucket, "s3://presubmit-bucket");
        assert_eq!(job.service_account_name, "presubmits-build-account");
        assert_eq!(job.command_line().trim(), "bash -c make build");
    }

    #[test]
    fn test_command_line_ignores_args() {
        let parsed: ProwJobFile = serde_yaml::from_str(MANIFEST).unwrap();
        let mut job = JobDefinition::try_from(&parsed.presubmits["aws/widget"][0]).unwrap();
        job.containers[0].command = vec!["bash".to_string(), "-c".to_string()];
        job.containers[0].args = vec!["make release".to_string()];

        assert_eq!(job.command_line(), "bash -c");
        let copy = job.clone();
        assert_eq!(copy, job);
    }

    #[test]
    fn test_job_without_containers_is_config_error() {
        let presubmit = Presubmit {
            name: "bare".to_string(),
            spec: Some(PodSpec::default()),
            ..Default::default()
        };
        assert!(matches!(JobDefinition::try_from(&presubmit), Err(Error::Config(_))));
        let no_spec = Presubmit {
            name: "bare".to_string(),
            ..Default::default()
        };
        assert!(matches!(JobDefinition::try_from(&no_spec), Err(Error::Config(_))));
    }

    #[test]
    fn test_conforming_manifest_has_no_findings() -> anyhow::Result<()> {
        let root = TempDir::new()?;
        let file = write(root.path(), "jobs/aws/widget/widget-presubmits.yaml", MANIFEST);

        let report = Linter::new(root.path(), default_checks(policy())).lint_files(&[file])?;
        assert!(!report.has_findings());
        Ok(())
    }

    #[test]
    fn test_wrong_cluster_is_the_only_finding() -> anyhow::Result<()> {
        let root = TempDir::new()?;
        let file = write(
            root.path(),
            "jobs/aws/widget/widget-presubmits.yaml",
            &MANIFEST.replace("\"prow-presubmits-cluster\"", "\"wrong-cluster\""),
        );

        let report = Linter::new(root.path(), default_checks(policy())).lint_files(&[file.clone()])?;
        let findings = report.findings(&file.display().to_string()).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].check, "cluster");
        assert_eq!(findings[0].line_number, 6);
        assert!(findings[0].message.contains("wrong-cluster"));
        Ok(())
    }

    #[test]
    fn test_every_failing_check_reports() -> anyhow::Result<()> {
        let root = TempDir::new()?;
        let broken = MANIFEST
            .replace("always_run: false", "always_run: true")
            .replace("skip_report: false", "skip_report: true")
            .replace("value: direct", "value: proxy.golang.org");
        let file = write(root.path(), "jobs/aws/widget/widget-presubmits.yaml", &broken);

        let report = Linter::new(root.path(), default_checks(policy())).lint_files(&[file.clone()])?;
        let checks: Vec<_> = report
            .findings(&file.display().to_string())
            .unwrap()
            .iter()
            .map(|f| f.check)
            .collect();
        assert_eq!(checks, vec!["always-run", "env-vars", "skip-report"]);
        Ok(())
    }

    #[test]
    fn test_non_presubmit_and_missing_files_are_skipped() -> anyhow::Result<()> {
        let root = TempDir::new()?;
        let postsubmit = write(root.path(), "jobs/aws/widget/widget-postsubmits.yaml", "postsubmits: {}\n");
        let gone = PathBuf::from("jobs/aws/widget/deleted-presubmits.yaml");

        let report = Linter::new(root.path(), default_checks(policy())).lint_files(&[postsubmit, gone])?;
        assert!(report.is_empty());
        Ok(())
    }

    #[test]
    fn test_missing_repo_key_is_lookup_error() {
        let root = TempDir::new().unwrap();
        let file = write(root.path(), "jobs/aws/other/widget-presubmits.yaml", MANIFEST);

        let err = Linter::new(root.path(), default_checks(policy()))
            .lint_files(&[file])
            .unwrap_err();
        assert!(matches!(err, Error::Lookup(_)));
    }

    #[test]
    fn test_empty_presubmit_list_is_config_error() {
        let root = TempDir::new().unwrap();
        let file = write(
            root.path(),
            "jobs/aws/widget/widget-presubmits.yaml",
            "presubmits:\n  aws/widget: []\n",
        );

        let err = Linter::new(root.path(), default_checks(policy()))
            .lint_files(&[file])
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_malformed_yaml_is_yaml_error() {
        let root = TempDir::new().unwrap();
        let file = write(root.path(), "jobs/aws/widget/widget-presubmits.yaml", "presubmits: [");

        let err = Linter::new(root.path(), default_checks(policy()))
            .lint_files(&[file])
            .unwrap_err();
        assert!(matches!(err, Error::Yaml { .. }));
    }
}
