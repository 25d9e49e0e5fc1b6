//! Settings loading and validation (`.autoconf/config.toml`).

pub mod paths;
pub mod settings;
pub mod validate;

pub use settings::{AutoConfigureSettings, ClasspathSettings, EXCLUDE_ENV, Settings};
pub use validate::{validate_project, validate_settings};
