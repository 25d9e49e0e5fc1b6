use super::*;
use serial_test::serial;
use tempfile::tempdir;

fn write_project_config(project_root: &Path, content: &str) {
    let path = paths::project_config_path(project_root);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn restore_env_var(key: &str, original: Option<String>) {
    // SAFETY: test-scoped env mutation serialized by #[serial].
    unsafe {
        match original {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }
}

#[test]
fn test_defaults_without_any_config() {
    let project = tempdir().unwrap();
    let settings = Settings::load_with_paths(None, project.path()).unwrap();

    assert!(settings.autoconfigure.enabled);
    assert_eq!(settings.autoconfigure.marker, DEFAULT_MARKER);
    assert!(settings.autoconfigure.exclude.is_empty());
    assert_eq!(settings.classpath.roots, vec![project.path().to_path_buf()]);
}

#[test]
fn test_project_config_deep_merges_over_user_config() {
    let project = tempdir().unwrap();
    let user_dir = tempdir().unwrap();
    let user_path = user_dir.path().join("config.toml");
    std::fs::write(
        &user_path,
        "[autoconfigure]\nenabled = false\nmarker = \"user.Marker\"\nexclude = [\"u.A\"]\n",
    )
    .unwrap();
    write_project_config(project.path(), "[autoconfigure]\nenabled = true\n");

    let settings = Settings::load_with_paths(Some(&user_path), project.path()).unwrap();
    assert!(settings.autoconfigure.enabled);
    assert_eq!(settings.autoconfigure.marker, "user.Marker");
    assert_eq!(settings.autoconfigure.exclude, vec!["u.A"]);
}

#[test]
fn test_user_config_alone_is_used() {
    let project = tempdir().unwrap();
    let user_dir = tempdir().unwrap();
    let user_path = user_dir.path().join("config.toml");
    std::fs::write(&user_path, "[autoconfigure]\nexclude = [\"u.A\", \"u.B\"]\n").unwrap();

    let settings = Settings::load_with_paths(Some(&user_path), project.path()).unwrap();
    assert_eq!(settings.autoconfigure.exclude, vec!["u.A", "u.B"]);
}

#[test]
fn test_relative_roots_resolve_against_project() {
    let project = tempdir().unwrap();
    write_project_config(
        project.path(),
        "[classpath]\nroots = [\"build/classes\", \"/opt/starter\"]\n",
    );

    let settings = Settings::load_with_paths(None, project.path()).unwrap();
    assert_eq!(
        settings.classpath.roots,
        vec![
            project.path().join("build/classes"),
            PathBuf::from("/opt/starter"),
        ]
    );
}

#[test]
fn test_parse_error_names_the_file() {
    let project = tempdir().unwrap();
    write_project_config(project.path(), "[autoconfigure\nenabled = true\n");

    let err = Settings::load_with_paths(None, project.path()).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("Failed to parse project config"), "{message}");
}

#[test]
fn test_env_exclusions_append_without_duplicates() {
    let mut settings = Settings::default();
    settings.autoconfigure.exclude.push("a.B".to_string());
    settings.apply_env_exclusions(Some(" a.B, ,c.D,e.F "));
    assert_eq!(settings.autoconfigure.exclude, vec!["a.B", "c.D", "e.F"]);

    settings.apply_env_exclusions(None);
    assert_eq!(settings.autoconfigure.exclude.len(), 3);
}

#[test]
fn test_merge_toml_values_recurses_into_tables() {
    let base: toml::Value =
        toml::from_str("[a]\nx = 1\ny = 2\n[b]\nz = [1]\n").unwrap();
    let overlay: toml::Value = toml::from_str("[a]\ny = 3\n[b]\nz = [2, 3]\n").unwrap();
    let merged = merge_toml_values(base, overlay);

    assert_eq!(merged["a"]["x"].as_integer(), Some(1));
    assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    assert_eq!(merged["b"]["z"].as_array().map(Vec::len), Some(2));
}

#[test]
#[serial]
fn test_load_reads_exclusions_from_environment() {
    let project = tempdir().unwrap();
    let config_home = tempdir().unwrap();
    let original_exclude = std::env::var(EXCLUDE_ENV).ok();
    let original_config_home = std::env::var("XDG_CONFIG_HOME").ok();
    // SAFETY: serialized by #[serial]; restored below.
    unsafe {
        std::env::set_var(EXCLUDE_ENV, "env.One,env.Two");
        std::env::set_var("XDG_CONFIG_HOME", config_home.path());
    }
    write_project_config(project.path(), "[autoconfigure]\nexclude = [\"cfg.Zero\"]\n");

    let result = Settings::load(project.path());

    restore_env_var(EXCLUDE_ENV, original_exclude);
    restore_env_var("XDG_CONFIG_HOME", original_config_home);

    let settings = result.unwrap();
    assert_eq!(
        settings.autoconfigure.exclude,
        vec!["cfg.Zero", "env.One", "env.Two"]
    );
}
