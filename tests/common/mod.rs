//! Common test utilities and helpers

#![allow(dead_code)]

use anyhow::Result;
use jobsmith::config::GeneratorConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch repository tree.
pub struct TestRepo {
    temp_dir: TempDir,
}

impl TestRepo {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `contents` at `rel`, creating parent directories.
    pub fn write(&self, rel: &str, contents: &str) -> Result<PathBuf> {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn read(&self, rel: &str) -> Result<String> {
        Ok(fs::read_to_string(self.path().join(rel))?)
    }

    /// Policy constants matching the stock presubmit cluster defaults.
    pub fn write_constants(&self) -> Result<PathBuf> {
        let defaults = GeneratorConfig::default().cluster_defaults.presubmit;
        self.write(
            "constants.yaml",
            &format!(
                "bucket: {}\ncluster: {}\nserviceAccountName: {}\ndefaultMakeTarget: build\nenv:\n- name: GOPROXY\n  value: direct\n",
                defaults.bucket, defaults.cluster, defaults.service_account_name
            ),
        )
    }

    /// Generator config limited to one presubmit repository.
    pub fn write_generator_config(&self, repo: &str) -> Result<PathBuf> {
        self.write(
            "jobsmith.toml",
            &format!(
                "builder_base_tag = \"standard-1\"\nrelease_branches = [\"1-30\", \"1-31\"]\n\n[repos]\nperiodic = []\npostsubmit = []\npresubmit = [\"{repo}\"]\n"
            ),
        )
    }
}

/// A conforming presubmit manifest for `aws/widget`.
pub fn conforming_manifest() -> String {
    let defaults = GeneratorConfig::default().cluster_defaults.presubmit;
    format!(
        r#"presubmits:
  aws/widget:
  - name: widget-presubmit
    always_run: false
    cluster: "{cluster}"
    skip_report: false
    decoration_config:
      gcs_configuration:
        bucket: {bucket}
    spec:
      serviceaccountName: {sa}
      containers:
      - name: build-container
        command:
        - bash
        - -c
        - >
          make build
        env:
        - name: GOPROXY
          value: direct
"#,
        cluster = defaults.cluster,
        bucket = defaults.bucket,
        sa = defaults.service_account_name
    )
}
