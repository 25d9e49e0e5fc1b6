//! Batch import filters applied to a request's candidate list.

use std::time::Instant;

use autoconf_core::AutoConfigError;
use tracing::{debug, trace};

use crate::metadata::MetadataIndex;

/// A predicate evaluated against a whole candidate batch at once.
///
/// Slots already rejected by an earlier filter are passed as `None`; their
/// outcome is ignored.
pub trait ImportFilter: Send + Sync {
    fn name(&self) -> &str;

    /// One outcome per slot, `true` to keep the candidate.
    fn matches(&self, candidates: &[Option<&str>], index: &MetadataIndex) -> Vec<bool>;
}

/// Ordered set of filters scoped to one resolution pass.
pub struct FilterChain<'a> {
    filters: &'a [Box<dyn ImportFilter>],
    index: &'a MetadataIndex,
}

impl<'a> FilterChain<'a> {
    pub fn new(filters: &'a [Box<dyn ImportFilter>], index: &'a MetadataIndex) -> Self {
        Self { filters, index }
    }

    /// Keep the candidates every filter accepts, preserving order.
    pub fn filter(&self, candidates: Vec<String>) -> Result<Vec<String>, AutoConfigError> {
        if self.filters.is_empty() {
            return Ok(candidates);
        }

        let started = Instant::now();
        let mut keep = vec![true; candidates.len()];

        for filter in self.filters {
            let slots: Vec<Option<&str>> = candidates
                .iter()
                .zip(&keep)
                .map(|(candidate, kept)| kept.then_some(candidate.as_str()))
                .collect();
            let outcomes = filter.matches(&slots, self.index);
            if outcomes.len() != slots.len() {
                return Err(AutoConfigError::FilterContract {
                    filter: filter.name().to_string(),
                    expected: slots.len(),
                    actual: outcomes.len(),
                });
            }
            for (index, matched) in outcomes.into_iter().enumerate() {
                if keep[index] && !matched {
                    trace!(
                        filter = filter.name(),
                        candidate = %candidates[index],
                        "filtered out auto-configuration candidate"
                    );
                    keep[index] = false;
                }
            }
        }

        let before = candidates.len();
        let result: Vec<String> = candidates
            .into_iter()
            .zip(keep)
            .filter_map(|(candidate, kept)| kept.then_some(candidate))
            .collect();
        debug!(
            filtered = before - result.len(),
            remaining = result.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "applied import filters"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Seen = Arc<Mutex<Vec<Vec<Option<String>>>>>;

    /// Rejects candidates containing a fragment and records what it was shown.
    struct RejectContaining {
        fragment: &'static str,
        seen: Seen,
    }

    impl RejectContaining {
        fn new(fragment: &'static str) -> Self {
            Self {
                fragment,
                seen: Seen::default(),
            }
        }
    }

    impl ImportFilter for RejectContaining {
        fn name(&self) -> &str {
            "reject-containing"
        }

        fn matches(&self, candidates: &[Option<&str>], _index: &MetadataIndex) -> Vec<bool> {
            self.seen
                .lock()
                .unwrap()
                .push(candidates.iter().map(|c| c.map(str::to_string)).collect());
            candidates
                .iter()
                .map(|candidate| candidate.is_none_or(|c| !c.contains(self.fragment)))
                .collect()
        }
    }

    struct WrongArity;

    impl ImportFilter for WrongArity {
        fn name(&self) -> &str {
            "wrong-arity"
        }

        fn matches(&self, _candidates: &[Option<&str>], _index: &MetadataIndex) -> Vec<bool> {
            vec![true]
        }
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_filters_returns_input_unchanged() {
        let index = MetadataIndex::default();
        let filters: Vec<Box<dyn ImportFilter>> = Vec::new();
        let chain = FilterChain::new(&filters, &index);
        let input = names(&["b.B", "a.A"]);
        assert_eq!(chain.filter(input.clone()).unwrap(), input);
    }

    #[test]
    fn test_filters_intersect_and_preserve_order() {
        let index = MetadataIndex::default();
        let filters: Vec<Box<dyn ImportFilter>> = vec![
            Box::new(RejectContaining::new("Jdbc")),
            Box::new(RejectContaining::new("Redis")),
        ];
        let chain = FilterChain::new(&filters, &index);
        let result = chain
            .filter(names(&["x.Web", "x.Jdbc", "x.Redis", "x.Cache"]))
            .unwrap();
        assert_eq!(result, names(&["x.Web", "x.Cache"]));
    }

    #[test]
    fn test_rejected_slots_are_hidden_from_later_filters() {
        let index = MetadataIndex::default();
        let second = RejectContaining::new("Nothing");
        let seen_by_second = Arc::clone(&second.seen);
        let filters: Vec<Box<dyn ImportFilter>> =
            vec![Box::new(RejectContaining::new("Jdbc")), Box::new(second)];
        let chain = FilterChain::new(&filters, &index);

        let result = chain.filter(names(&["x.Jdbc", "x.Web"])).unwrap();
        assert_eq!(result, names(&["x.Web"]));

        let seen = seen_by_second.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], vec![None, Some("x.Web".to_string())]);
    }

    #[test]
    fn test_wrong_outcome_count_is_contract_error() {
        let index = MetadataIndex::default();
        let filters: Vec<Box<dyn ImportFilter>> = vec![Box::new(WrongArity)];
        let chain = FilterChain::new(&filters, &index);
        let err = chain.filter(names(&["a.A", "b.B"])).unwrap_err();
        assert!(matches!(
            err,
            AutoConfigError::FilterContract {
                expected: 2,
                actual: 1,
                ..
            }
        ));
    }
}
