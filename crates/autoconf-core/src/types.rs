use serde::{Deserialize, Serialize};

/// Order value that sorts before everything else.
pub const HIGHEST_PRECEDENCE: i32 = i32::MIN;

/// Order value that sorts after everything else.
pub const LOWEST_PRECEDENCE: i32 = i32::MAX;

/// Order used when a candidate declares no preference.
///
/// One step above `LOWEST_PRECEDENCE` so a candidate can still explicitly
/// ask to run after all undecided ones.
pub const DEFAULT_ORDER: i32 = LOWEST_PRECEDENCE - 1;

/// One place in the application that asked for auto-configuration.
///
/// Several sites may contribute to a single resolution pass; the site that
/// first mentions a candidate is reported as its origin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportSite {
    /// Name of the importing unit (e.g. the application class).
    pub origin: String,
    /// Candidates excluded by type reference.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    /// Candidates excluded by name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_name: Vec<String>,
}

impl ImportSite {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            ..Self::default()
        }
    }

    pub fn excluding<I, S>(mut self, identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(identifiers.into_iter().map(Into::into));
        self
    }

    pub fn excluding_names<I, S>(mut self, identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_name
            .extend(identifiers.into_iter().map(Into::into));
        self
    }
}

/// A candidate selected for import, paired with the site that requested it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportEntry {
    pub identifier: String,
    pub origin: String,
}
