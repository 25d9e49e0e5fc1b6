//! Shared vocabulary for the auto-configuration engine: error taxonomy,
//! ordering constants and import-site types.

pub mod error;
pub mod types;

pub use error::AutoConfigError;
pub use types::{DEFAULT_ORDER, HIGHEST_PRECEDENCE, ImportEntry, ImportSite, LOWEST_PRECEDENCE};
