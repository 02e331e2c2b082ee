//! Integration tests for the CLI interface

mod common;

use assert_cmd::Command;
use common::{conforming_manifest, TestRepo};
use predicates::prelude::*;

fn jobsmith() -> Command {
    let mut cmd = Command::cargo_bin("jobsmith").unwrap();
    cmd.env_remove("CONSTANTS_CONFIG_FILE")
        .env_remove("PULL_BASE_SHA")
        .env_remove("PULL_PULL_SHA")
        .env_remove("JOBSMITH_JOBS_FOLDER")
        .env_remove("JOBSMITH_BUILDER_BASE_TAG");
    cmd
}

#[test]
fn test_cli_help_flag() {
    jobsmith()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("lint"));
}

#[test]
fn test_invalid_command() {
    jobsmith()
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_lint_passes_conforming_manifest() -> anyhow::Result<()> {
    let repo = TestRepo::new()?;
    let constants = repo.write_constants()?;
    repo.write("jobs/aws/widget/widget-presubmits.yaml", &conforming_manifest())?;

    jobsmith()
        .arg("lint")
        .arg("--constants")
        .arg(&constants)
        .arg("--repo-root")
        .arg(repo.path())
        .arg("jobs/aws/widget/widget-presubmits.yaml")
        .assert()
        .success()
        .stdout(predicate::str::contains("✅ Validations passed!"));
    Ok(())
}

#[test]
fn test_lint_reports_wrong_cluster() -> anyhow::Result<()> {
    let repo = TestRepo::new()?;
    let constants = repo.write_constants()?;
    let manifest = conforming_manifest().replace("cluster: \"prow-presubmits-cluster\"", "cluster: \"wrong-cluster\"");
    repo.write("jobs/aws/widget/widget-presubmits.yaml", &manifest)?;

    jobsmith()
        .arg("lint")
        .arg("--constants")
        .arg(&constants)
        .arg("--repo-root")
        .arg(repo.path())
        .arg("jobs/aws/widget/widget-presubmits.yaml")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("jobs/aws/widget/widget-presubmits.yaml:"))
        .stdout(predicate::str::contains("5\tIncorrect cluster configuration \"wrong-cluster\""))
        .stdout(predicate::str::contains("❌ Validations failed!"));
    Ok(())
}

#[test]
fn test_lint_constants_from_env() -> anyhow::Result<()> {
    let repo = TestRepo::new()?;
    let constants = repo.write_constants()?;
    repo.write("jobs/aws/widget/widget-postsubmits.yaml", "postsubmits: {}\n")?;

    jobsmith()
        .env("CONSTANTS_CONFIG_FILE", &constants)
        .arg("lint")
        .arg("--repo-root")
        .arg(repo.path())
        .arg("jobs/aws/widget/widget-postsubmits.yaml")
        .assert()
        .success()
        .stdout(predicate::str::contains("✅ Validations passed!"));
    Ok(())
}

#[test]
fn test_lint_missing_constants_is_fatal() -> anyhow::Result<()> {
    let repo = TestRepo::new()?;

    jobsmith()
        .arg("lint")
        .arg("--constants")
        .arg(repo.path().join("absent.yaml"))
        .arg("--repo-root")
        .arg(repo.path())
        .arg("jobs/aws/widget/widget-presubmits.yaml")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Job constants file does not exist"));
    Ok(())
}

#[test]
fn test_lint_without_files_or_shas_fails() -> anyhow::Result<()> {
    let repo = TestRepo::new()?;
    let constants = repo.write_constants()?;

    jobsmith()
        .arg("lint")
        .arg("--constants")
        .arg(&constants)
        .arg("--repo-root")
        .arg(repo.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--base-sha"));
    Ok(())
}

#[test]
fn test_generate_writes_manifests() -> anyhow::Result<()> {
    let repo = TestRepo::new()?;
    let config = repo.write_generator_config("widget")?;
    repo.write(
        "templater/jobs/presubmit/widget/widget-1-X-presubmits.yaml",
        "jobName: widget-{{ releaseBranch }}-presubmit\ncommands:\n- make build\n",
    )?;

    jobsmith()
        .arg("generate")
        .arg("--config")
        .arg(&config)
        .arg("--repo-root")
        .arg(repo.path())
        .assert()
        .success();

    assert!(repo.read("jobs/aws/widget/widget-1-30-presubmits.yaml")?.contains("name: widget-1-30-presubmit"));
    assert!(repo.path().join("jobs/aws/widget/widget-1-31-presubmits.yaml").exists());
    Ok(())
}

#[test]
fn test_generate_template_error_names_file() -> anyhow::Result<()> {
    let repo = TestRepo::new()?;
    let config = repo.write_generator_config("widget")?;
    repo.write(
        "templater/jobs/presubmit/widget/broken-presubmits.yaml",
        "jobName: {{ undefinedKey }}\n",
    )?;

    jobsmith()
        .arg("generate")
        .arg("--config")
        .arg(&config)
        .arg("--repo-root")
        .arg(repo.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("broken-presubmits.yaml"));
    Ok(())
}
