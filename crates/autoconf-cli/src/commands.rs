use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use autoconf_config::{Settings, validate_project};
use autoconf_core::{ImportEntry, ImportSite};
use autoconf_engine::{
    AutoConfigurationSelector, Classpath, ImportGroup, OnBeanFilter, OnClassFilter,
    SelectionOptions, SnapshotCache,
};

use crate::cli::OutputFormat;

pub(crate) fn handle_resolve(
    project: Option<&Path>,
    exclude: &[String],
    format: OutputFormat,
) -> Result<()> {
    let project_root = determine_project_root(project)?;
    let settings = validate_project(&project_root)?;
    let selector = build_selector(&settings)?;

    let site = ImportSite::new(site_origin(&project_root)).excluding_names(exclude.iter().cloned());
    let mut group = ImportGroup::new();
    group
        .process(&site, &selector)
        .context("Failed to resolve auto-configuration candidates")?;
    let entries = group
        .select_imports()
        .context("Failed to order auto-configuration candidates")?;

    println!("{}", render_entries(&entries, format)?);
    Ok(())
}

pub(crate) fn handle_candidates(project: Option<&Path>, format: OutputFormat) -> Result<()> {
    let project_root = determine_project_root(project)?;
    let settings = validate_project(&project_root)?;
    let candidates = build_selector(&settings)?.candidate_configurations()?;

    let output = match format {
        OutputFormat::Text => candidates.join("\n"),
        OutputFormat::Json => serde_json::to_string_pretty(&candidates)?,
    };
    println!("{output}");
    Ok(())
}

pub(crate) fn handle_check(project: Option<&Path>, format: OutputFormat) -> Result<()> {
    let project_root = determine_project_root(project)?;
    let settings = validate_project(&project_root)?;

    match format {
        OutputFormat::Text => eprintln!(
            "Settings are valid ({} classpath root(s), marker {})",
            settings.classpath.roots.len(),
            settings.autoconfigure.marker
        ),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "valid": true,
                "settings": settings,
            }))?
        ),
    }
    Ok(())
}

fn determine_project_root(project: Option<&Path>) -> Result<PathBuf> {
    let root = match project {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    root.canonicalize()
        .with_context(|| format!("Project root not found: {}", root.display()))
}

fn site_origin(project_root: &Path) -> String {
    project_root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| project_root.display().to_string())
}

fn build_selector(settings: &Settings) -> Result<AutoConfigurationSelector> {
    let classpath = Classpath::new(settings.classpath.roots.iter().cloned());
    let snapshot = SnapshotCache::shared()
        .get_or_load(&classpath, &settings.autoconfigure.marker)
        .context("Failed to load classpath metadata")?;
    let options = SelectionOptions {
        enabled: settings.autoconfigure.enabled,
        excluded: settings.autoconfigure.exclude.clone(),
    };
    debug!(
        roots = classpath.roots().len(),
        enabled = options.enabled,
        "built selector"
    );
    Ok(AutoConfigurationSelector::new(snapshot, options)
        .with_filter(OnClassFilter::new(classpath.clone()))
        .with_filter(OnBeanFilter::new(classpath)))
}

fn render_entries(entries: &[ImportEntry], format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => entries
            .iter()
            .map(|entry| entry.identifier.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Json => serde_json::to_string_pretty(entries)?,
    })
}
