//! Immutable per-classpath state shared by every resolution pass.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use autoconf_core::AutoConfigError;
use tracing::debug;

use crate::classpath::Classpath;
use crate::metadata::MetadataIndex;
use crate::replacements::ReplacementTable;

/// Replacement table and metadata index for one `(classpath, marker)` pair.
#[derive(Debug, PartialEq, Eq)]
pub struct ClasspathSnapshot {
    classpath: Arc<Classpath>,
    marker: String,
    replacements: ReplacementTable,
    index: MetadataIndex,
}

impl ClasspathSnapshot {
    pub fn load(classpath: Classpath, marker: &str) -> Result<Self, AutoConfigError> {
        let replacements = ReplacementTable::load(marker, &classpath)?;
        let index = MetadataIndex::load(&classpath)?;
        Ok(Self::from_parts(classpath, marker, replacements, index))
    }

    pub fn from_parts(
        classpath: Classpath,
        marker: &str,
        replacements: ReplacementTable,
        index: MetadataIndex,
    ) -> Self {
        Self {
            classpath: Arc::new(classpath),
            marker: marker.to_string(),
            replacements,
            index,
        }
    }

    pub fn classpath(&self) -> &Classpath {
        &self.classpath
    }

    /// The classpath as one shared handle, so every selector built on this
    /// snapshot answers presence and metadata through the same instance.
    pub fn shared_classpath(&self) -> &Arc<Classpath> {
        &self.classpath
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn replacements(&self) -> &ReplacementTable {
        &self.replacements
    }

    pub fn index(&self) -> &MetadataIndex {
        &self.index
    }
}

type SnapshotKey = (Classpath, String);
type SnapshotSlot = Arc<Mutex<Option<Arc<ClasspathSnapshot>>>>;

/// Publishes at most one snapshot per `(classpath, marker)`.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    slots: Mutex<HashMap<SnapshotKey, SnapshotSlot>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache.
    pub fn shared() -> &'static SnapshotCache {
        static SHARED: OnceLock<SnapshotCache> = OnceLock::new();
        SHARED.get_or_init(SnapshotCache::new)
    }

    /// Cached snapshot, loading it on first use.
    ///
    /// Only the slot for this key stays locked while loading, so callers of
    /// the same key wait for one load and other keys load in parallel. A
    /// failed load leaves the slot empty for the next caller.
    pub fn get_or_load(
        &self,
        classpath: &Classpath,
        marker: &str,
    ) -> Result<Arc<ClasspathSnapshot>, AutoConfigError> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(
                slots
                    .entry((classpath.clone(), marker.to_string()))
                    .or_default(),
            )
        };

        let mut published = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(snapshot) = published.as_ref() {
            return Ok(Arc::clone(snapshot));
        }
        let snapshot = Arc::new(ClasspathSnapshot::load(classpath.clone(), marker)?);
        debug!(
            marker,
            roots = classpath.roots().len(),
            "published classpath snapshot"
        );
        *published = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Number of published snapshots.
    pub fn len(&self) -> usize {
        let slots: Vec<SnapshotSlot> = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        slots
            .iter()
            .filter(|slot| {
                slot.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .is_some()
            })
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
