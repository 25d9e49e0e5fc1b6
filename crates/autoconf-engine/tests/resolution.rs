//! End-to-end resolution over an on-disk classpath with two roots.

use std::path::Path;
use std::sync::Arc;

use autoconf_core::{AutoConfigError, ImportSite};
use autoconf_engine::{
    AutoConfigurationSelector, Classpath, ConditionReport, ImportGroup, OnBeanFilter,
    OnClassFilter, SelectionOptions, SnapshotCache,
};
use tempfile::{TempDir, tempdir};

const MARKER: &str = "org.example.boot.AutoConfiguration";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

struct Workspace {
    starter: TempDir,
    app: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let starter = tempdir().unwrap();
        write_file(
            starter.path(),
            &format!("META-INF/autoconf/{MARKER}.imports"),
            "# starter auto-configurations\n\
             x.web.WebMvc\n\
             x.data.DataSource\n\
             x.data.Jdbc\n\
             old.Cache\n\
             x.tx.Transaction\n\
             x.redis.Redis\n",
        );
        write_file(
            starter.path(),
            &format!("META-INF/autoconf/{MARKER}.replacements"),
            "old.Cache=x.cache.Cache\n",
        );
        write_file(
            starter.path(),
            "META-INF/autoconf-metadata.properties",
            "x.data.DataSource=\n\
             x.data.DataSource.AutoConfigureOrder=-10\n\
             x.data.Jdbc=\n\
             x.data.Jdbc.AutoConfigureAfter=x.data.DataSource\n\
             x.redis.Redis=\n\
             x.redis.Redis.ConditionalOnClass=redis.Client\n\
             x.tx.Transaction=\n\
             x.tx.Transaction.AutoConfigureAfter=x.data.Jdbc\n\
             x.tx.Transaction.ConditionalOnSingleCandidate=javax.sql.DataSource\n",
        );
        write_file(starter.path(), "x/web/WebMvc.toml", "after = [\"old.Cache\"]\n");
        write_file(starter.path(), "x/cache/Cache.toml", "after = [\"x.tx.Transaction\"]\n");

        let app = tempdir().unwrap();
        write_file(
            app.path(),
            &format!("META-INF/autoconf/{MARKER}.imports"),
            "app.extra.Extra\n",
        );
        write_file(app.path(), "app/extra/Extra.toml", "before = [\"x.data.DataSource\"]\n");
        write_file(app.path(), "javax/sql/DataSource.toml", "");

        Self { starter, app }
    }

    fn classpath(&self) -> Classpath {
        Classpath::new([self.starter.path(), self.app.path()])
    }

    fn selector(&self, cache: &SnapshotCache, options: SelectionOptions) -> AutoConfigurationSelector {
        let classpath = self.classpath();
        let snapshot = cache.get_or_load(&classpath, MARKER).unwrap();
        AutoConfigurationSelector::new(snapshot, options)
            .with_filter(OnClassFilter::new(classpath.clone()))
            .with_filter(OnBeanFilter::new(classpath))
    }
}

#[test]
fn resolves_filters_and_orders_two_sites() {
    init_tracing();
    let workspace = Workspace::new();
    let cache = SnapshotCache::new();
    let report = Arc::new(ConditionReport::new());
    let selector = workspace
        .selector(&cache, SelectionOptions::default())
        .with_listener(report.clone());

    let mut group = ImportGroup::new();
    group.process(&ImportSite::new("app.Main"), &selector).unwrap();
    group
        .process(
            &ImportSite::new("app.Test").excluding_names(["x.web.WebMvc"]),
            &selector,
        )
        .unwrap();
    let entries = group.select_imports().unwrap();

    let identifiers: Vec<&str> = entries.iter().map(|e| e.identifier.as_str()).collect();
    assert_eq!(
        identifiers,
        [
            "app.extra.Extra",
            "x.data.DataSource",
            "x.data.Jdbc",
            "x.tx.Transaction",
            "x.cache.Cache",
        ]
    );
    assert!(entries.iter().all(|e| e.origin == "app.Main"));

    let main = report.candidates("app.Main");
    assert!(main.contains(&"x.web.WebMvc".to_string()));
    assert!(!main.contains(&"x.redis.Redis".to_string()));
    assert_eq!(report.exclusions(), ["x.web.WebMvc"]);
}

#[test]
fn snapshot_is_reused_across_passes() {
    let workspace = Workspace::new();
    let cache = SnapshotCache::new();

    let first = workspace.selector(&cache, SelectionOptions::default());
    let second = workspace.selector(&cache, SelectionOptions::default());
    assert!(Arc::ptr_eq(first.snapshot(), second.snapshot()));
    assert_eq!(cache.len(), 1);
}

#[test]
fn property_exclusion_of_present_non_candidate_fails() {
    let workspace = Workspace::new();
    let cache = SnapshotCache::new();
    let selector = workspace.selector(
        &cache,
        SelectionOptions {
            excluded: vec!["javax.sql.DataSource".to_string()],
            ..SelectionOptions::default()
        },
    );

    let mut group = ImportGroup::new();
    let err = group
        .process(&ImportSite::new("app.Main"), &selector)
        .unwrap_err();
    assert!(matches!(err, AutoConfigError::InvalidExclusion { .. }));
    assert!(err.to_string().contains("javax.sql.DataSource"));
}

#[test]
fn disabled_pass_selects_nothing() {
    let workspace = Workspace::new();
    let cache = SnapshotCache::new();
    let selector = workspace.selector(
        &cache,
        SelectionOptions {
            enabled: false,
            ..SelectionOptions::default()
        },
    );

    let mut group = ImportGroup::new();
    group.process(&ImportSite::new("app.Main"), &selector).unwrap();
    assert!(group.select_imports().unwrap().is_empty());
}
