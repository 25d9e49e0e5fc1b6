use std::path::{Path, PathBuf};

/// XDG application name for user-level files.
pub const APP_NAME: &str = "autoconf";
/// Per-project settings directory, relative to the project root.
pub const PROJECT_DIR: &str = ".autoconf";
pub const CONFIG_FILE: &str = "config.toml";

/// User config directory (`~/.config/autoconf` on Linux).
///
/// None when no home directory can be determined (e.g. in containers).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

pub fn user_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE))
}

pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_DIR).join(CONFIG_FILE)
}
