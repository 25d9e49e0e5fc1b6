//! Built-in filters driven by the precomputed metadata index.
//!
//! Only candidates with an index entry are judged here; everything else is
//! left for the full condition evaluation that runs later.

use tracing::trace;

use crate::classpath::ClassPresence;
use crate::filter::ImportFilter;
use crate::metadata::{MetadataIndex, ON_BEAN_KEY, ON_CLASS_KEY, ON_SINGLE_CANDIDATE_KEY};

/// Rejects candidates whose `ConditionalOnClass` types are missing.
pub struct OnClassFilter<P> {
    presence: P,
}

impl<P: ClassPresence> OnClassFilter<P> {
    pub fn new(presence: P) -> Self {
        Self { presence }
    }
}

impl<P: ClassPresence> ImportFilter for OnClassFilter<P> {
    fn name(&self) -> &str {
        "on-class"
    }

    fn matches(&self, candidates: &[Option<&str>], index: &MetadataIndex) -> Vec<bool> {
        candidates
            .iter()
            .map(|candidate| match candidate {
                Some(candidate) => {
                    all_present(&self.presence, candidate, index, &[ON_CLASS_KEY], self.name())
                }
                None => true,
            })
            .collect()
    }
}

/// Rejects candidates whose required bean types cannot exist because the
/// types themselves are not on the classpath.
pub struct OnBeanFilter<P> {
    presence: P,
}

impl<P: ClassPresence> OnBeanFilter<P> {
    pub fn new(presence: P) -> Self {
        Self { presence }
    }
}

impl<P: ClassPresence> ImportFilter for OnBeanFilter<P> {
    fn name(&self) -> &str {
        "on-bean"
    }

    fn matches(&self, candidates: &[Option<&str>], index: &MetadataIndex) -> Vec<bool> {
        candidates
            .iter()
            .map(|candidate| match candidate {
                Some(candidate) => all_present(
                    &self.presence,
                    candidate,
                    index,
                    &[ON_BEAN_KEY, ON_SINGLE_CANDIDATE_KEY],
                    self.name(),
                ),
                None => true,
            })
            .collect()
    }
}

fn all_present<P: ClassPresence>(
    presence: &P,
    candidate: &str,
    index: &MetadataIndex,
    keys: &[&str],
    filter: &str,
) -> bool {
    for key in keys {
        for required in index.get_set(candidate, key) {
            if !presence.is_present(&required) {
                trace!(
                    filter,
                    candidate,
                    condition = key,
                    missing = %required,
                    "required type not found"
                );
                return false;
            }
        }
    }
    true
}
