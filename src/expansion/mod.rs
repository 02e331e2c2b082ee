//! Mapper-chain expansion of job-description entries
//!
//! A job directory is read as a set of named entries, each starting with an
//! empty [`JobContext`]. Mappers run one after another over the whole set; a
//! mapper may replace an entry with any number of derived entries. Derived
//! entries remember which file they came from so the renderer can find
//! their template body.

mod context;
mod release_branch;

pub use context::{
    JobContext, LATEST_RELEASE_BRANCH_KEY, RESERVED_PREFIX, TEMPLATE_SOURCE_KEY,
};
pub use release_branch::ReleaseBranchMapper;

use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

/// Entry name to context.
pub type JobSet = BTreeMap<String, JobContext>;

/// Turns one entry into replacement entries.
///
/// An empty result keeps the entry unchanged; a non-empty result removes it
/// and inserts every returned entry.
pub trait Mapper {
    fn map(&self, source: &str, context: &JobContext) -> JobSet;

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> Mapper for F
where
    F: Fn(&str, &JobContext) -> JobSet,
{
    fn map(&self, source: &str, context: &JobContext) -> JobSet {
        self(source, context)
    }
}

/// Run `mappers` in order over `initial` and return the final entry set.
///
/// Each pass reads the previous working set and writes a new one, so a
/// mapper never sees entries it produced itself. Replacement entries
/// without a template source inherit the consumed entry's source, or its
/// name when it had none.
pub fn expand(initial: JobSet, mappers: &[Box<dyn Mapper>]) -> JobSet {
    let mut working = initial;

    for mapper in mappers {
        let mut next = JobSet::new();

        for (source, context) in working {
            let replacements = mapper.map(&source, &context);
            if replacements.is_empty() {
                insert_entry(&mut next, source, context);
                continue;
            }

            let origin = context
                .template_source()
                .unwrap_or(source.as_str())
                .to_string();
            debug!(
                "{} expanded {} into {} entries",
                mapper.name(),
                source,
                replacements.len()
            );

            for (derived, derived_context) in replacements {
                let derived_context = if derived_context.template_source().is_some() {
                    derived_context
                } else {
                    derived_context.with_template_source(&origin)
                };
                trace!("{} -> {} (template {})", source, derived, origin);
                insert_entry(&mut next, derived, derived_context);
            }
        }

        working = next;
    }

    working
}

fn insert_entry(set: &mut JobSet, name: String, context: JobContext) {
    if set.contains_key(&name) {
        warn!("Expansion produced {} more than once; keeping the last entry", name);
    }
    set.insert(name, context);
}

/// Initial entry set for a list of file names.
pub fn initial_set<I, S>(names: I) -> JobSet
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names
        .into_iter()
        .map(|name| (name.into(), JobContext::new()))
        .collect()
}
