//! Candidate metadata: ordering facts read without loading candidates.
//!
//! Two sources feed the [`MetadataStore`]:
//! - the precomputed index (`META-INF/autoconf-metadata.properties`), and
//! - on-demand class descriptors read through a [`MetadataReader`].
//!
//! A candidate that has an index entry is answered purely from the index.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use autoconf_core::{AutoConfigError, DEFAULT_ORDER};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::classpath::{Classpath, nested_variant};
use crate::properties;
use crate::replacements::ReplacementTable;

pub const METADATA_LOCATION: &str = "META-INF/autoconf-metadata.properties";

pub const ORDER_KEY: &str = "AutoConfigureOrder";
pub const BEFORE_KEY: &str = "AutoConfigureBefore";
pub const AFTER_KEY: &str = "AutoConfigureAfter";
pub const ON_CLASS_KEY: &str = "ConditionalOnClass";
pub const ON_BEAN_KEY: &str = "ConditionalOnBean";
pub const ON_SINGLE_CANDIDATE_KEY: &str = "ConditionalOnSingleCandidate";

/// Precomputed `<identifier>.<Key>=value` facts merged from every root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataIndex {
    properties: BTreeMap<String, String>,
}

impl MetadataIndex {
    pub fn load(classpath: &Classpath) -> Result<Self, AutoConfigError> {
        let mut properties = BTreeMap::new();
        for path in classpath.resources(METADATA_LOCATION) {
            for entry in properties::read_file(&path)? {
                if entry.key.ends_with(&format!(".{ORDER_KEY}"))
                    && entry.value.parse::<i32>().is_err()
                {
                    return Err(AutoConfigError::MalformedResource {
                        path,
                        line: entry.line,
                        message: format!(
                            "'{}' must be an integer, got '{}'",
                            entry.key, entry.value
                        ),
                    });
                }
                properties.entry(entry.key).or_insert(entry.value);
            }
        }
        debug!(entries = properties.len(), "loaded metadata index");
        Ok(Self { properties })
    }

    /// Build an index from raw `key=value` pairs. Earlier pairs win.
    pub fn from_properties<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut properties = BTreeMap::new();
        for (key, value) in pairs {
            properties.entry(key.into()).or_insert(value.into());
        }
        Self { properties }
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// True when the index holds an entry for the candidate itself.
    pub fn was_processed(&self, identifier: &str) -> bool {
        self.properties.contains_key(identifier)
    }

    pub fn get(&self, identifier: &str, key: &str) -> Option<&str> {
        self.properties
            .get(&format!("{identifier}.{key}"))
            .map(String::as_str)
    }

    pub fn get_integer(&self, identifier: &str, key: &str) -> Option<i32> {
        self.get(identifier, key)
            .and_then(|value| value.trim().parse().ok())
    }

    pub fn get_set(&self, identifier: &str, key: &str) -> Vec<String> {
        self.get(identifier, key)
            .map(properties::split_list)
            .unwrap_or_default()
    }
}

/// Declared facts for one class, as stored in its descriptor file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    /// Canonical declared name, when it differs from the lookup name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub before: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub after: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditional_on_class: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditional_on_bean: Vec<String>,
}

/// Structural reader for class descriptors.
pub trait MetadataReader: Send + Sync {
    /// Descriptor declared under exactly `identifier`, or `None` when no such
    /// class exists.
    fn read(&self, identifier: &str) -> Result<Option<ClassDescriptor>, AutoConfigError>;
}

impl MetadataReader for Classpath {
    fn read(&self, identifier: &str) -> Result<Option<ClassDescriptor>, AutoConfigError> {
        let Some(path) = self.descriptor_path(identifier) else {
            return Ok(None);
        };
        let content =
            std::fs::read_to_string(&path).map_err(|source| AutoConfigError::ResourceUnreadable {
                path: path.clone(),
                source,
            })?;
        toml::from_str(&content)
            .map(Some)
            .map_err(|err| AutoConfigError::InvalidDescriptor {
                class_name: identifier.to_string(),
                message: err.to_string(),
            })
    }
}

impl MetadataReader for HashMap<String, ClassDescriptor> {
    fn read(&self, identifier: &str) -> Result<Option<ClassDescriptor>, AutoConfigError> {
        Ok(self.get(identifier).cloned())
    }
}

/// Ordering facts for one candidate, with constraint names already normalized
/// through the replacement table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateMetadata {
    /// Canonical identifier.
    pub identifier: String,
    pub order: i32,
    pub before: BTreeSet<String>,
    pub after: BTreeSet<String>,
}

/// Per-pass metadata lookup with canonical-name tracking.
///
/// Lookups are cached; a name corrected by the on-demand reader (nested type
/// written in source form, or an explicit declared name) resolves to the same
/// entry as its canonical name.
pub struct MetadataStore<'a> {
    index: &'a MetadataIndex,
    reader: &'a dyn MetadataReader,
    replacements: &'a ReplacementTable,
    entries: HashMap<String, CandidateMetadata>,
    aliases: HashMap<String, String>,
    missing: HashSet<String>,
}

impl<'a> MetadataStore<'a> {
    pub fn new(
        index: &'a MetadataIndex,
        reader: &'a dyn MetadataReader,
        replacements: &'a ReplacementTable,
    ) -> Self {
        Self {
            index,
            reader,
            replacements,
            entries: HashMap::new(),
            aliases: HashMap::new(),
            missing: HashSet::new(),
        }
    }

    /// Metadata for `identifier`, or `None` when the candidate cannot be found
    /// by either source.
    pub fn lookup(
        &mut self,
        identifier: &str,
    ) -> Result<Option<&CandidateMetadata>, AutoConfigError> {
        let key = match self.resolve_key(identifier)? {
            Some(key) => key,
            None => return Ok(None),
        };
        Ok(self.entries.get(&key))
    }

    /// Canonical identifier for `identifier`, or the input when unknown.
    pub fn canonical_name(&mut self, identifier: &str) -> Result<String, AutoConfigError> {
        Ok(self
            .resolve_key(identifier)?
            .unwrap_or_else(|| identifier.to_string()))
    }

    fn resolve_key(&mut self, identifier: &str) -> Result<Option<String>, AutoConfigError> {
        if self.entries.contains_key(identifier) {
            return Ok(Some(identifier.to_string()));
        }
        if let Some(canonical) = self.aliases.get(identifier) {
            return Ok(Some(canonical.clone()));
        }
        if self.missing.contains(identifier) {
            return Ok(None);
        }

        if self.index.was_processed(identifier) {
            let metadata = self.metadata_from_index(identifier);
            self.entries.insert(identifier.to_string(), metadata);
            return Ok(Some(identifier.to_string()));
        }
        if let Some(nested) = nested_variant(identifier) {
            if self.index.was_processed(&nested) {
                trace!(identifier, canonical = %nested, "canonicalized candidate name");
                self.aliases.insert(identifier.to_string(), nested.clone());
                if !self.entries.contains_key(&nested) {
                    let metadata = self.metadata_from_index(&nested);
                    self.entries.insert(nested.clone(), metadata);
                }
                return Ok(Some(nested));
            }
        }

        let found = match self.reader.read(identifier)? {
            Some(descriptor) => Some((identifier.to_string(), descriptor)),
            None => match nested_variant(identifier) {
                Some(nested) => self
                    .reader
                    .read(&nested)?
                    .map(|descriptor| (nested, descriptor)),
                None => None,
            },
        };

        let Some((read_as, descriptor)) = found else {
            trace!(identifier, "no metadata found");
            self.missing.insert(identifier.to_string());
            return Ok(None);
        };

        let canonical = descriptor.name.clone().unwrap_or(read_as);
        if canonical != identifier {
            trace!(identifier, canonical = %canonical, "canonicalized candidate name");
            self.aliases
                .insert(identifier.to_string(), canonical.clone());
        }
        if !self.entries.contains_key(&canonical) {
            let metadata = if self.index.was_processed(&canonical) {
                self.metadata_from_index(&canonical)
            } else {
                self.metadata_from_descriptor(&canonical, &descriptor)
            };
            self.entries.insert(canonical.clone(), metadata);
        }
        Ok(Some(canonical))
    }

    fn metadata_from_index(&self, identifier: &str) -> CandidateMetadata {
        CandidateMetadata {
            identifier: identifier.to_string(),
            order: self
                .index
                .get_integer(identifier, ORDER_KEY)
                .unwrap_or(DEFAULT_ORDER),
            before: self.normalize(self.index.get_set(identifier, BEFORE_KEY)),
            after: self.normalize(self.index.get_set(identifier, AFTER_KEY)),
        }
    }

    fn metadata_from_descriptor(
        &self,
        identifier: &str,
        descriptor: &ClassDescriptor,
    ) -> CandidateMetadata {
        CandidateMetadata {
            identifier: identifier.to_string(),
            order: descriptor.order.unwrap_or(DEFAULT_ORDER),
            before: self.normalize(descriptor.before.iter().cloned()),
            after: self.normalize(descriptor.after.iter().cloned()),
        }
    }

    fn normalize<I: IntoIterator<Item = String>>(&self, names: I) -> BTreeSet<String> {
        names
            .into_iter()
            .map(|name| self.replacements.replace(&name))
            .collect()
    }
}

#[cfg(test)]
#[path = "metadata_tests.rs"]
mod tests;
