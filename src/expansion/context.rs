//! Data context carried by each job-description entry during expansion

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Prefix shared by every control key. Keys with this prefix never reach a
/// template.
pub const RESERVED_PREFIX: &str = "__";

/// Name of the original template file a derived entry renders from.
pub const TEMPLATE_SOURCE_KEY: &str = "__templateFileName";

/// Set on the entry generated for the newest release branch.
pub const LATEST_RELEASE_BRANCH_KEY: &str = "__latestReleaseBranch";

/// Template data for one job-description entry.
///
/// Contexts are values: mappers build new ones with [`JobContext::with`] and
/// [`JobContext::merged`] instead of mutating the context they were given,
/// so entries fanned out from one base never share state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct JobContext(BTreeMap<String, Value>);

impl JobContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy of this context with one extra key.
    pub fn with(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut next = self.clone();
        next.insert(key, value);
        next
    }

    /// Copy of this context overlaid with `overlay`; overlay keys win.
    pub fn merged(&self, overlay: &JobContext) -> Self {
        let mut next = self.clone();
        for (key, value) in &overlay.0 {
            next.0.insert(key.clone(), value.clone());
        }
        next
    }

    pub fn template_source(&self) -> Option<&str> {
        self.0.get(TEMPLATE_SOURCE_KEY).and_then(Value::as_str)
    }

    pub fn with_template_source(&self, source: &str) -> Self {
        self.with(TEMPLATE_SOURCE_KEY, source)
    }

    pub fn is_latest(&self) -> bool {
        self.0
            .get(LATEST_RELEASE_BRANCH_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Remove the latest-branch marker, reporting whether it was set.
    pub fn take_latest_marker(&mut self) -> bool {
        self.0
            .remove(LATEST_RELEASE_BRANCH_KEY)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    /// The keys a template may see.
    pub fn template_data(&self) -> BTreeMap<&str, &Value> {
        self.0
            .iter()
            .filter(|(key, _)| !key.starts_with(RESERVED_PREFIX))
            .map(|(key, value)| (key.as_str(), value))
            .collect()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for JobContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
