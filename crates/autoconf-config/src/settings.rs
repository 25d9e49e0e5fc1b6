use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::paths;

/// Environment variable holding extra comma-separated exclusions.
pub const EXCLUDE_ENV: &str = "AUTOCONF_EXCLUDE";

pub const DEFAULT_MARKER: &str = "org.example.boot.AutoConfiguration";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoConfigureSettings {
    pub enabled: bool,
    /// Marker type naming the imports resource to read.
    pub marker: String,
    pub exclude: Vec<String>,
}

impl Default for AutoConfigureSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            marker: DEFAULT_MARKER.to_string(),
            exclude: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClasspathSettings {
    /// Classpath roots in lookup order. Relative entries are resolved
    /// against the project root.
    pub roots: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub autoconfigure: AutoConfigureSettings,
    pub classpath: ClasspathSettings,
}

impl Settings {
    /// Load settings for `project_root`.
    ///
    /// `.autoconf/config.toml` in the project is deep-merged over the user
    /// config, and [`EXCLUDE_ENV`] is appended to the exclusion list. Missing
    /// files fall back to defaults.
    pub fn load(project_root: &Path) -> Result<Self> {
        let user_path = paths::user_config_path();
        let mut settings = Self::load_with_paths(user_path.as_deref(), project_root)?;
        settings.apply_env_exclusions(std::env::var(EXCLUDE_ENV).ok().as_deref());
        Ok(settings)
    }

    /// Load from an explicit user config path. Testable without global state.
    pub(crate) fn load_with_paths(user_path: Option<&Path>, project_root: &Path) -> Result<Self> {
        let project_path = paths::project_config_path(project_root);
        let user = match user_path.filter(|p| p.exists()) {
            Some(path) => Some(read_value(path, "user")?),
            None => None,
        };
        let project = if project_path.exists() {
            Some(read_value(&project_path, "project")?)
        } else {
            None
        };

        let merged = match (user, project) {
            (None, None) => toml::Value::Table(toml::Table::new()),
            (Some(value), None) | (None, Some(value)) => value,
            (Some(user), Some(project)) => merge_toml_values(user, project),
        };

        // Roundtrip through string for reliable deserialization
        let merged_str = toml::to_string(&merged).context("Failed to serialize merged settings")?;
        let mut settings: Self =
            toml::from_str(&merged_str).context("Failed to deserialize merged settings")?;
        settings.resolve_roots(project_root);
        debug!(
            project = %project_root.display(),
            roots = settings.classpath.roots.len(),
            exclusions = settings.autoconfigure.exclude.len(),
            "loaded settings"
        );
        Ok(settings)
    }

    /// Append exclusions from a comma-separated list, skipping blanks and
    /// names already present.
    pub fn apply_env_exclusions(&mut self, raw: Option<&str>) {
        let Some(raw) = raw else {
            return;
        };
        for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if !self.autoconfigure.exclude.iter().any(|e| e == name) {
                self.autoconfigure.exclude.push(name.to_string());
            }
        }
    }

    /// Make roots absolute. With no configured roots the project root itself
    /// is the only classpath entry.
    fn resolve_roots(&mut self, project_root: &Path) {
        if self.classpath.roots.is_empty() {
            self.classpath.roots.push(project_root.to_path_buf());
            return;
        }
        for root in &mut self.classpath.roots {
            if root.is_relative() {
                *root = project_root.join(&*root);
            }
        }
    }
}

fn read_value(path: &Path, label: &str) -> Result<toml::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {label} config: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse {label} config: {}", path.display()))
}

/// Deep merge two TOML values. Overlay wins for non-table values; tables
/// are merged recursively.
pub(crate) fn merge_toml_values(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_map), toml::Value::Table(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                let merged_val = match base_map.remove(&key) {
                    Some(base_val) => merge_toml_values(base_val, overlay_val),
                    None => overlay_val,
                };
                base_map.insert(key, merged_val);
            }
            toml::Value::Table(base_map)
        }
        (_, overlay) => overlay,
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
