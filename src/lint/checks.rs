//! Policy checks run against each presubmit
//!
//! Every check is an independent predicate over a [`JobDefinition`] and the
//! raw text of the manifest it came from. A failing check reports the first
//! line mentioning the offending field (0 when none does) and a message
//! telling the author what to change.

use super::{find_line_number, JobDefinition};
use crate::config::{NameMatcher, PolicyConstants};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

// Last `make <target>` in the command line, optionally followed by `-C <dir>`.
static MAKE_TARGET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"make (\w[-\w]*)(?: -C \S+)?").expect("make target pattern is valid")
});

/// Jobs that predate the make-target rule and keep their own targets.
/// `makeTargetExemptJobs` adds to this list.
pub const STOCK_MAKE_TARGET_EXEMPT_JOBS: [&str; 6] = [
    "eks-anywhere-attribution-files-presubmit",
    "eks-anywhere-cluster-controller-tooling-presubmit",
    "eks-anywhere-release-tooling-presubmit",
    "eks-anywhere-release-tooling-test-presubmit",
    "eks-anywhere-packages-presubmit",
    "eks-anywhere-packages-generatebundle-presubmit",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub passed: bool,
    /// 1-based; 0 when passed or when the location is unknown.
    pub line_number: usize,
    pub message: String,
}

impl CheckResult {
    pub fn pass() -> Self {
        Self {
            passed: true,
            line_number: 0,
            message: String::new(),
        }
    }

    pub fn fail(line_number: usize, message: impl Into<String>) -> Self {
        Self {
            passed: false,
            line_number,
            message: message.into(),
        }
    }
}

pub trait PolicyCheck: Send + Sync {
    fn name(&self) -> &'static str;

    fn check(&self, job: &JobDefinition, raw: &str) -> CheckResult;
}

pub struct AlwaysRunCheck;

impl PolicyCheck for AlwaysRunCheck {
    fn name(&self) -> &'static str {
        "always-run"
    }

    fn check(&self, job: &JobDefinition, raw: &str) -> CheckResult {
        if job.always_run {
            return CheckResult::fail(
                find_line_number(raw, "always_run:"),
                "Please set always_run to false",
            );
        }
        CheckResult::pass()
    }
}

pub struct SkipReportCheck;

impl PolicyCheck for SkipReportCheck {
    fn name(&self) -> &'static str {
        "skip-report"
    }

    fn check(&self, job: &JobDefinition, raw: &str) -> CheckResult {
        if job.skip_report {
            return CheckResult::fail(
                find_line_number(raw, "skip_report:"),
                "Please set skip_report to false",
            );
        }
        CheckResult::pass()
    }
}

/// Any env var policy declares must match it exactly (name, value and
/// source). Variables policy does not mention are ignored.
pub struct EnvVarsCheck {
    policy: Arc<PolicyConstants>,
}

impl EnvVarsCheck {
    pub fn new(policy: Arc<PolicyConstants>) -> Self {
        Self { policy }
    }
}

impl PolicyCheck for EnvVarsCheck {
    fn name(&self) -> &'static str {
        "env-vars"
    }

    fn check(&self, job: &JobDefinition, raw: &str) -> CheckResult {
        for container in &job.containers {
            for env in &container.env {
                let Some(required) = self.policy.required_env(&env.name) else {
                    continue;
                };
                if env != required {
                    return CheckResult::fail(
                        find_line_number(raw, &format!("name: {}", env.name)),
                        format!(
                            "Incorrect env var declared for {} in the {} container, update it to {}",
                            env.name, container.name, required
                        ),
                    );
                }
            }
        }
        CheckResult::pass()
    }
}

pub struct BucketCheck {
    policy: Arc<PolicyConstants>,
    exemptions: NameMatcher,
}

impl BucketCheck {
    pub fn new(policy: Arc<PolicyConstants>, exemptions: NameMatcher) -> Self {
        Self { policy, exemptions }
    }
}

impl PolicyCheck for BucketCheck {
    fn name(&self) -> &'static str {
        "bucket"
    }

    fn check(&self, job: &JobDefinition, raw: &str) -> CheckResult {
        if self.exemptions.matches(&job.name) || job.bucket == self.policy.bucket {
            return CheckResult::pass();
        }
        CheckResult::fail(
            find_line_number(raw, "bucket:"),
            format!(
                "Incorrect bucket configuration {:?}, please configure S3 bucket as => bucket: {}",
                job.bucket, self.policy.bucket
            ),
        )
    }
}

pub struct ClusterCheck {
    policy: Arc<PolicyConstants>,
    exemptions: NameMatcher,
}

impl ClusterCheck {
    pub fn new(policy: Arc<PolicyConstants>, exemptions: NameMatcher) -> Self {
        Self { policy, exemptions }
    }
}

impl PolicyCheck for ClusterCheck {
    fn name(&self) -> &'static str {
        "cluster"
    }

    fn check(&self, job: &JobDefinition, raw: &str) -> CheckResult {
        if self.exemptions.matches(&job.name) || job.cluster == self.policy.cluster {
            return CheckResult::pass();
        }
        CheckResult::fail(
            find_line_number(raw, "cluster:"),
            format!(
                "Incorrect cluster configuration {:?}, please configure cluster as => cluster: {:?}",
                job.cluster, self.policy.cluster
            ),
        )
    }
}

pub struct ServiceAccountCheck {
    policy: Arc<PolicyConstants>,
    exemptions: NameMatcher,
}

impl ServiceAccountCheck {
    pub fn new(policy: Arc<PolicyConstants>, exemptions: NameMatcher) -> Self {
        Self { policy, exemptions }
    }
}

impl PolicyCheck for ServiceAccountCheck {
    fn name(&self) -> &'static str {
        "service-account"
    }

    fn check(&self, job: &JobDefinition, raw: &str) -> CheckResult {
        if self.exemptions.matches(&job.name)
            || job.service_account_name == self.policy.service_account_name
        {
            return CheckResult::pass();
        }
        CheckResult::fail(
            find_line_number(raw, "serviceaccountName:"),
            format!(
                "Incorrect service account configuration {:?}, please configure service account as => serviceaccountName: {}",
                job.service_account_name, self.policy.service_account_name
            ),
        )
    }
}

pub struct MakeTargetCheck {
    policy: Arc<PolicyConstants>,
    exemptions: NameMatcher,
}

impl MakeTargetCheck {
    pub fn new(policy: Arc<PolicyConstants>, exemptions: NameMatcher) -> Self {
        Self { policy, exemptions }
    }
}

impl PolicyCheck for MakeTargetCheck {
    fn name(&self) -> &'static str {
        "make-target"
    }

    fn check(&self, job: &JobDefinition, raw: &str) -> CheckResult {
        if self.exemptions.matches(&job.name) {
            return CheckResult::pass();
        }
        let command_line = job.command_line();
        let target = make_target(&command_line).unwrap_or_default();
        if target == self.policy.default_make_target {
            return CheckResult::pass();
        }
        CheckResult::fail(
            find_line_number(raw, "make"),
            format!(
                "Invalid make target {:?}, please use the {:?} target",
                target, self.policy.default_make_target
            ),
        )
    }
}

/// Target of the last `make <target>` in `command_line`.
pub fn make_target(command_line: &str) -> Option<&str> {
    MAKE_TARGET
        .captures_iter(command_line)
        .last()
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// The standard check list, in reporting order.
pub fn default_checks(policy: Arc<PolicyConstants>) -> Vec<Box<dyn PolicyCheck>> {
    let arm64 = NameMatcher::new(["arm64"], []);
    let service_account_exempt = NameMatcher::new(["e2e", "arm64"], []);
    let make_target_exempt = NameMatcher::new(
        ["e2e".to_string(), "lint".to_string(), "mocks".to_string()],
        STOCK_MAKE_TARGET_EXEMPT_JOBS
            .iter()
            .map(|name| name.to_string())
            .chain(policy.make_target_exempt_jobs.iter().cloned()),
    );

    vec![
        Box::new(AlwaysRunCheck),
        Box::new(EnvVarsCheck::new(policy.clone())),
        Box::new(ClusterCheck::new(policy.clone(), arm64.clone())),
        Box::new(SkipReportCheck),
        Box::new(BucketCheck::new(policy.clone(), arm64)),
        Box::new(ServiceAccountCheck::new(policy.clone(), service_account_exempt)),
        Box::new(MakeTargetCheck::new(policy, make_target_exempt)),
    ]
}
