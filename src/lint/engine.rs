use super::{JobDefinition, PolicyCheck};
use tracing::debug;

/// One failed check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub check: &'static str,
    /// 1-based; 0 when the offending line could not be located.
    pub line_number: usize,
    pub message: String,
}

/// Run every check against `job`, in order, and collect the failures.
///
/// Checks are independent: each one runs whatever the others returned.
pub fn evaluate(checks: &[Box<dyn PolicyCheck>], job: &JobDefinition, raw: &str) -> Vec<Finding> {
    checks
        .iter()
        .filter_map(|check| {
            let result = check.check(job, raw);
            if result.passed {
                return None;
            }
            debug!("{} failed {}: {}", job.name, check.name(), result.message);
            Some(Finding {
                check: check.name(),
                line_number: result.line_number,
                message: result.message,
            })
        })
        .collect()
}
