//! Rename table for deprecated or moved auto-configuration candidates.
//!
//! Loaded from `META-INF/autoconf/<marker>.replacements` (properties format,
//! `old=new`). Chains are collapsed at load time so `replace` is idempotent.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use autoconf_core::AutoConfigError;
use tracing::{debug, warn};

use crate::classpath::Classpath;
use crate::properties;

pub fn replacements_location(marker: &str) -> String {
    format!("META-INF/autoconf/{marker}.replacements")
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementTable {
    replacements: BTreeMap<String, String>,
}

impl ReplacementTable {
    /// Load every replacements resource for `marker`.
    ///
    /// The first root to map a given name wins. A missing resource yields an
    /// empty table.
    pub fn load(marker: &str, classpath: &Classpath) -> Result<Self, AutoConfigError> {
        let mut pairs = Vec::new();
        for path in classpath.resources(&replacements_location(marker)) {
            let entries = properties::read_file(&path)?;
            for entry in entries {
                if entry.value.is_empty() {
                    return Err(AutoConfigError::MalformedResource {
                        path,
                        line: entry.line,
                        message: format!("no replacement given for '{}'", entry.key),
                    });
                }
                pairs.push((entry.key, entry.value));
            }
        }
        let table = Self::from_pairs(pairs);
        debug!(marker, entries = table.len(), "loaded replacement table");
        Ok(table)
    }

    /// Build a table from `(old, new)` pairs. Earlier pairs win on duplicate keys.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut raw: BTreeMap<String, String> = BTreeMap::new();
        for (old, new) in pairs {
            let (old, new) = (old.into(), new.into());
            if old != new {
                raw.entry(old).or_insert(new);
            }
        }
        Self {
            replacements: collapse_chains(&raw),
        }
    }

    pub fn len(&self) -> usize {
        self.replacements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }

    /// Current identifier for `identifier`; identity when unmapped.
    pub fn replace(&self, identifier: &str) -> String {
        self.replacements
            .get(identifier)
            .cloned()
            .unwrap_or_else(|| identifier.to_string())
    }

    /// Every input identifier followed by its replacement when it differs.
    ///
    /// Input order is kept and duplicates are collapsed.
    pub fn replace_all<I, S>(&self, identifiers: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for identifier in identifiers {
            let identifier = identifier.as_ref();
            if seen.insert(identifier.to_string()) {
                result.push(identifier.to_string());
            }
            let replaced = self.replace(identifier);
            if replaced != identifier && seen.insert(replaced.clone()) {
                result.push(replaced);
            }
        }
        result
    }
}

/// Resolve `a -> b -> c` to `a -> c` so a single lookup reaches the final name.
///
/// Cyclic renames have no final name; every member of the cycle is mapped to
/// its smallest member instead.
fn collapse_chains(raw: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    let mut resolved = BTreeMap::new();
    for start in raw.keys() {
        let mut path = vec![start.clone()];
        let mut visited: BTreeSet<String> = BTreeSet::from([start.clone()]);
        let mut current = start.clone();
        let target = loop {
            match raw.get(&current) {
                Some(next) if visited.contains(next) => {
                    warn!(identifier = %start, "replacement table contains a rename cycle");
                    let cycle_start = path.iter().position(|p| p == next).unwrap_or(0);
                    break path[cycle_start..]
                        .iter()
                        .min()
                        .cloned()
                        .unwrap_or_else(|| next.clone());
                }
                Some(next) => {
                    visited.insert(next.clone());
                    path.push(next.clone());
                    current = next.clone();
                }
                None => break current,
            }
        };
        if &target != start {
            resolved.insert(start.clone(), target);
        }
    }
    resolved
}
