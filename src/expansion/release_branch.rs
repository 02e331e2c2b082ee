use super::{JobContext, JobSet, Mapper, LATEST_RELEASE_BRANCH_KEY};

/// Fans a job description out to one entry per release branch.
///
/// Files whose name contains the placeholder (e.g. `build-1-X-presubmit.yaml`)
/// become one entry per branch with the placeholder replaced. Each entry
/// gets `releaseBranch` and `otherReleaseBranches` (the remaining branches
/// joined by `|`). The entry for the last branch is marked as latest.
#[derive(Debug, Clone)]
pub struct ReleaseBranchMapper {
    placeholder: String,
    branches: Vec<String>,
}

impl ReleaseBranchMapper {
    pub fn new<I, S>(placeholder: impl Into<String>, branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            placeholder: placeholder.into(),
            branches: branches.into_iter().map(Into::into).collect(),
        }
    }

    pub fn branches(&self) -> &[String] {
        &self.branches
    }
}

impl Mapper for ReleaseBranchMapper {
    fn map(&self, source: &str, context: &JobContext) -> JobSet {
        let mut derived = JobSet::new();
        if self.placeholder.is_empty() || !source.contains(&self.placeholder) {
            return derived;
        }

        let last = self.branches.len().saturating_sub(1);
        for (i, branch) in self.branches.iter().enumerate() {
            let others = self
                .branches
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, b)| b.as_str())
                .collect::<Vec<_>>()
                .join("|");

            let mut entry = context
                .with("releaseBranch", branch.as_str())
                .with("otherReleaseBranches", others);
            if i == last {
                entry.insert(LATEST_RELEASE_BRANCH_KEY, true);
            }

            derived.insert(source.replace(&self.placeholder, branch), entry);
        }

        derived
    }

    fn name(&self) -> &str {
        "release-branch"
    }
}
