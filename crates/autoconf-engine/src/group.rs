//! Merges the requests of several import sites into one ordered result.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use autoconf_core::{AutoConfigError, ImportEntry, ImportSite};
use tracing::debug;

use crate::metadata::MetadataReader;
use crate::selector::{AutoConfigurationSelector, RequestState, ResolutionRequest};
use crate::snapshot::ClasspathSnapshot;
use crate::sorter::AutoConfigurationSorter;

/// State established by the first processed site.
struct SharedState {
    snapshot: Arc<ClasspathSnapshot>,
    reader: Arc<dyn MetadataReader>,
}

impl SharedState {
    fn check(&self, selector: &AutoConfigurationSelector) -> Result<(), AutoConfigError> {
        let snapshot = selector.snapshot();
        if self.snapshot.replacements() != snapshot.replacements() {
            return Err(inconsistent(
                "Auto-configuration replacements must be the same for each call to process",
            ));
        }
        if !Arc::ptr_eq(&self.snapshot, snapshot) && *self.snapshot != **snapshot {
            return Err(inconsistent(
                "Classpath snapshot must be the same for each call to process",
            ));
        }
        if !Arc::ptr_eq(&self.reader, selector.metadata_reader()) {
            return Err(inconsistent(
                "Metadata reader must be the same for each call to process",
            ));
        }
        Ok(())
    }
}

fn inconsistent(message: &str) -> AutoConfigError {
    AutoConfigError::InconsistentSharedState(message.to_string())
}

/// Collects resolution requests for one pass and emits the merged,
/// sorted import list.
#[derive(Default)]
pub struct ImportGroup {
    shared: Option<SharedState>,
    requests: Vec<ResolutionRequest>,
    origins: HashMap<String, String>,
}

impl ImportGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> &[ResolutionRequest] {
        &self.requests
    }

    /// Resolve `site` and keep its outcome for [`select_imports`](Self::select_imports).
    ///
    /// Every call within one pass must share the snapshot (classpath, marker,
    /// replacements and index) and the metadata reader used for sorting.
    pub fn process(
        &mut self,
        site: &ImportSite,
        selector: &AutoConfigurationSelector,
    ) -> Result<(), AutoConfigError> {
        match &self.shared {
            Some(shared) => shared.check(selector)?,
            None => {
                self.shared = Some(SharedState {
                    snapshot: Arc::clone(selector.snapshot()),
                    reader: Arc::clone(selector.metadata_reader()),
                });
            }
        }

        let request = selector.resolve(site)?;
        for configuration in request.configurations() {
            self.origins
                .entry(configuration.clone())
                .or_insert_with(|| site.origin.clone());
        }
        self.requests.push(request);
        Ok(())
    }

    /// Union of all requests minus the union of all exclusions, sorted.
    pub fn select_imports(&mut self) -> Result<Vec<ImportEntry>, AutoConfigError> {
        let Some(shared) = &self.shared else {
            return Ok(Vec::new());
        };

        let excluded: HashSet<&str> = self
            .requests
            .iter()
            .flat_map(|request| request.exclusions())
            .map(String::as_str)
            .collect();
        let mut seen = HashSet::new();
        let configurations: Vec<String> = self
            .requests
            .iter()
            .flat_map(|request| request.configurations())
            .filter(|candidate| !excluded.contains(candidate.as_str()))
            .filter(|candidate| seen.insert(candidate.as_str()))
            .cloned()
            .collect();

        let snapshot = &shared.snapshot;
        let sorted = AutoConfigurationSorter::new(
            snapshot.index(),
            shared.reader.as_ref(),
            snapshot.replacements(),
        )
        .in_priority_order(configurations)?;

        debug!(
            sites = self.requests.len(),
            exclusions = excluded.len(),
            selected = sorted.len(),
            "merged import sites"
        );

        let entries = sorted
            .into_iter()
            .map(|identifier| {
                let origin = self.origins.get(&identifier).cloned().unwrap_or_default();
                ImportEntry { identifier, origin }
            })
            .collect();
        for request in &mut self.requests {
            request.advance(RequestState::Merged);
        }
        Ok(entries)
    }
}

#[cfg(test)]
#[path = "group_tests.rs"]
mod tests;
