//! Candidate loading from `META-INF/autoconf/<marker>.imports` resources.

use autoconf_core::AutoConfigError;
use tracing::debug;

use crate::classpath::Classpath;

const IMPORTS_DIRECTORY: &str = "META-INF/autoconf";

/// Classpath-relative location of the imports resource for a marker type.
pub fn imports_location(marker: &str) -> String {
    format!("{IMPORTS_DIRECTORY}/{marker}.imports")
}

/// Candidate identifiers declared for one marker type, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportCandidates {
    candidates: Vec<String>,
}

impl ImportCandidates {
    /// Read and concatenate every imports resource for `marker`.
    ///
    /// Finding zero candidates is a packaging defect, never a transient state.
    pub fn load(marker: &str, classpath: &Classpath) -> Result<Self, AutoConfigError> {
        let location = imports_location(marker);
        let mut candidates = Vec::new();

        for path in classpath.resources(&location) {
            let content = std::fs::read_to_string(&path).map_err(|source| {
                AutoConfigError::ResourceUnreadable {
                    path: path.clone(),
                    source,
                }
            })?;
            let before = candidates.len();
            candidates.extend(read_candidates(&content));
            debug!(
                resource = %path.display(),
                count = candidates.len() - before,
                "read auto-configuration candidates"
            );
        }

        if candidates.is_empty() {
            return Err(AutoConfigError::NoCandidates { location });
        }
        Ok(Self { candidates })
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn into_candidates(self) -> Vec<String> {
        self.candidates
    }
}

fn read_candidates(content: &str) -> Vec<String> {
    content
        .lines()
        .map(strip_comment)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(index) => &line[..index],
        None => line,
    }
}
