use anyhow::{Result, bail};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use crate::settings::Settings;

/// Dotted identifier; `$` separates nested type names.
static IDENTIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*(\.[A-Za-z_$][A-Za-z0-9_$]*)*$")
        .expect("identifier pattern is valid")
});

pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER_RE.is_match(name)
}

/// Load and validate the settings for a project.
pub fn validate_project(project_root: &Path) -> Result<Settings> {
    let settings = Settings::load(project_root)?;
    validate_settings(&settings)?;
    Ok(settings)
}

/// Returns Ok(()) if valid, or Err with a descriptive message.
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_marker(settings)?;
    validate_exclusions(settings)?;
    validate_roots(settings)?;
    Ok(())
}

fn validate_marker(settings: &Settings) -> Result<()> {
    let marker = settings.autoconfigure.marker.trim();
    if marker.is_empty() {
        bail!("autoconfigure.marker cannot be empty");
    }
    if !is_valid_identifier(marker) {
        bail!("autoconfigure.marker '{marker}' is not a valid type name");
    }
    Ok(())
}

fn validate_exclusions(settings: &Settings) -> Result<()> {
    for (index, exclusion) in settings.autoconfigure.exclude.iter().enumerate() {
        if exclusion.trim().is_empty() {
            bail!("autoconfigure.exclude[{index}] cannot be blank");
        }
        if !is_valid_identifier(exclusion) {
            bail!("autoconfigure.exclude[{index}] '{exclusion}' is not a valid type name");
        }
    }
    Ok(())
}

fn validate_roots(settings: &Settings) -> Result<()> {
    if settings.classpath.roots.is_empty() {
        bail!("classpath.roots must name at least one directory");
    }
    for root in &settings.classpath.roots {
        if !root.is_dir() {
            bail!("classpath root '{}' does not exist or is not a directory", root.display());
        }
    }
    Ok(())
}
