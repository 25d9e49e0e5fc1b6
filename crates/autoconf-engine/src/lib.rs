//! Auto-configuration candidate selection, filtering and ordering.
//!
//! A pass starts from a [`ClasspathSnapshot`], resolves each import site
//! with an [`AutoConfigurationSelector`] and merges the sites through an
//! [`ImportGroup`], which hands the union to the [`AutoConfigurationSorter`].

pub mod candidates;
pub mod classpath;
pub mod conditions;
pub mod filter;
pub mod group;
pub mod listener;
pub mod metadata;
mod properties;
pub mod replacements;
pub mod selector;
pub mod snapshot;
pub mod sorter;

pub use candidates::ImportCandidates;
pub use classpath::{ClassPresence, Classpath};
pub use conditions::{OnBeanFilter, OnClassFilter};
pub use filter::{FilterChain, ImportFilter};
pub use group::ImportGroup;
pub use listener::{ConditionReport, ImportEvent, ImportListener, SiteRecord};
pub use metadata::{ClassDescriptor, MetadataIndex, MetadataReader, MetadataStore};
pub use replacements::ReplacementTable;
pub use selector::{AutoConfigurationSelector, RequestState, ResolutionRequest, SelectionOptions};
pub use snapshot::{ClasspathSnapshot, SnapshotCache};
pub use sorter::AutoConfigurationSorter;
