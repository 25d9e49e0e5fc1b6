//! Per-site resolution: load, normalize, exclude, filter.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use autoconf_core::{AutoConfigError, ImportSite};
use serde::Serialize;
use tracing::{debug, trace};

use crate::candidates::ImportCandidates;
use crate::classpath::ClassPresence;
use crate::filter::{FilterChain, ImportFilter};
use crate::listener::{ImportEvent, ImportListener};
use crate::metadata::MetadataReader;
use crate::snapshot::ClasspathSnapshot;

/// Switches supplied by the surrounding configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionOptions {
    /// When false every request resolves to nothing.
    pub enabled: bool,
    /// Property-driven exclusions applied to every site.
    pub excluded: Vec<String>,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            excluded: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    New,
    CandidatesLoaded,
    ExclusionsApplied,
    Filtered,
    Merged,
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::New => "new",
            Self::CandidatesLoaded => "candidates_loaded",
            Self::ExclusionsApplied => "exclusions_applied",
            Self::Filtered => "filtered",
            Self::Merged => "merged",
        };
        f.write_str(name)
    }
}

/// Result of resolving one import site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRequest {
    site: ImportSite,
    state: RequestState,
    configurations: Vec<String>,
    exclusions: Vec<String>,
}

impl ResolutionRequest {
    fn new(site: &ImportSite) -> Self {
        Self {
            site: site.clone(),
            state: RequestState::New,
            configurations: Vec::new(),
            exclusions: Vec::new(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.site.origin
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    /// Candidates that survived exclusion and filtering.
    pub fn configurations(&self) -> &[String] {
        &self.configurations
    }

    pub fn exclusions(&self) -> &[String] {
        &self.exclusions
    }

    pub(crate) fn advance(&mut self, next: RequestState) {
        trace!(
            origin = %self.site.origin,
            from = %self.state,
            to = %next,
            "resolution request state change"
        );
        self.state = next;
    }
}

/// Resolves import sites against one classpath snapshot.
pub struct AutoConfigurationSelector {
    snapshot: Arc<ClasspathSnapshot>,
    options: SelectionOptions,
    filters: Vec<Box<dyn ImportFilter>>,
    listeners: Vec<Arc<dyn ImportListener>>,
    presence: Arc<dyn ClassPresence>,
    reader: Arc<dyn MetadataReader>,
}

impl AutoConfigurationSelector {
    /// Selector with no filters or listeners; class presence and metadata
    /// are answered by the snapshot's classpath.
    pub fn new(snapshot: Arc<ClasspathSnapshot>, options: SelectionOptions) -> Self {
        let classpath = Arc::clone(snapshot.shared_classpath());
        Self {
            snapshot,
            options,
            filters: Vec::new(),
            listeners: Vec::new(),
            presence: classpath.clone(),
            reader: classpath,
        }
    }

    pub fn with_filter(mut self, filter: impl ImportFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn ImportListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn with_class_presence(mut self, presence: Arc<dyn ClassPresence>) -> Self {
        self.presence = presence;
        self
    }

    pub fn with_metadata_reader(mut self, reader: Arc<dyn MetadataReader>) -> Self {
        self.reader = reader;
        self
    }

    pub fn snapshot(&self) -> &Arc<ClasspathSnapshot> {
        &self.snapshot
    }

    pub fn metadata_reader(&self) -> &Arc<dyn MetadataReader> {
        &self.reader
    }

    pub fn is_enabled(&self) -> bool {
        self.options.enabled
    }

    /// Declared candidates after renames, first occurrence kept.
    pub fn candidate_configurations(&self) -> Result<Vec<String>, AutoConfigError> {
        let loaded = ImportCandidates::load(self.snapshot.marker(), self.snapshot.classpath())?;
        let replacements = self.snapshot.replacements();
        let mut seen = HashSet::new();
        Ok(loaded
            .into_candidates()
            .into_iter()
            .map(|candidate| replacements.replace(&candidate))
            .filter(|candidate| seen.insert(candidate.clone()))
            .collect())
    }

    /// Run one site through loading, exclusion and filtering.
    pub fn resolve(&self, site: &ImportSite) -> Result<ResolutionRequest, AutoConfigError> {
        let mut request = ResolutionRequest::new(site);
        if !self.is_enabled() {
            debug!(origin = %site.origin, "auto-configuration disabled");
            // Nothing is read; each stage completes on an empty candidate list.
            request.advance(RequestState::CandidatesLoaded);
            request.advance(RequestState::ExclusionsApplied);
            request.advance(RequestState::Filtered);
            return Ok(request);
        }

        let mut configurations = self.candidate_configurations()?;
        request.advance(RequestState::CandidatesLoaded);

        let exclusions = self.exclusions(site);
        self.check_excluded(&configurations, &exclusions)?;
        let excluded: HashSet<&str> = exclusions.iter().map(String::as_str).collect();
        configurations.retain(|candidate| !excluded.contains(candidate.as_str()));
        request.advance(RequestState::ExclusionsApplied);

        let configurations =
            FilterChain::new(&self.filters, self.snapshot.index()).filter(configurations)?;
        request.advance(RequestState::Filtered);

        debug!(
            origin = %site.origin,
            candidates = configurations.len(),
            exclusions = exclusions.len(),
            "resolved import site"
        );

        if !self.listeners.is_empty() {
            let event = ImportEvent {
                origin: &site.origin,
                candidates: &configurations,
                exclusions: &exclusions,
            };
            for listener in &self.listeners {
                listener.on_import(&event);
            }
        }

        request.configurations = configurations;
        request.exclusions = exclusions;
        Ok(request)
    }

    fn exclusions(&self, site: &ImportSite) -> Vec<String> {
        let requested = site
            .exclude
            .iter()
            .chain(&site.exclude_name)
            .chain(&self.options.excluded);
        self.snapshot.replacements().replace_all(requested)
    }

    /// Every exclusion that names a present class must name a candidate.
    fn check_excluded(
        &self,
        configurations: &[String],
        exclusions: &[String],
    ) -> Result<(), AutoConfigError> {
        let known: HashSet<&str> = configurations.iter().map(String::as_str).collect();
        let replacements = self.snapshot.replacements();
        let mut invalid = Vec::new();
        for exclusion in exclusions {
            if known.contains(exclusion.as_str())
                || known.contains(replacements.replace(exclusion).as_str())
            {
                continue;
            }
            if self.presence.is_present(exclusion) {
                invalid.push(exclusion.clone());
            } else {
                debug!(exclusion = %exclusion, "ignoring exclusion of absent class");
            }
        }
        if invalid.is_empty() {
            Ok(())
        } else {
            Err(AutoConfigError::InvalidExclusion { names: invalid })
        }
    }
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod tests;
