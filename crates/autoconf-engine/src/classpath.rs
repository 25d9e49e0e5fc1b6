//! Filesystem-backed classpath: an ordered list of root directories.
//!
//! Resources are looked up relative to every root. A class is considered
//! present when its descriptor (`<package path>/<SimpleName>.toml`) exists
//! under any root.

use std::collections::BTreeSet;
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Classpath {
    roots: Vec<PathBuf>,
}

impl Classpath {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Every existing `<root>/<relative>` file, in root order.
    pub fn resources(&self, relative: &str) -> Vec<PathBuf> {
        self.roots
            .iter()
            .map(|root| root.join(relative))
            .filter(|path| path.is_file())
            .collect()
    }

    /// Locate the descriptor for exactly `identifier` (no nested-name fallback).
    pub fn descriptor_path(&self, identifier: &str) -> Option<PathBuf> {
        let relative = descriptor_file_name(identifier)?;
        self.roots
            .iter()
            .map(|root| root.join(&relative))
            .find(|path| path.is_file())
    }
}

/// Answers whether a class can be found, without loading it.
pub trait ClassPresence: Send + Sync {
    fn is_present(&self, identifier: &str) -> bool;
}

impl ClassPresence for Classpath {
    fn is_present(&self, identifier: &str) -> bool {
        self.descriptor_path(identifier).is_some()
            || nested_variant(identifier)
                .is_some_and(|nested| self.descriptor_path(&nested).is_some())
    }
}

impl ClassPresence for HashSet<String> {
    fn is_present(&self, identifier: &str) -> bool {
        self.contains(identifier)
    }
}

impl ClassPresence for BTreeSet<String> {
    fn is_present(&self, identifier: &str) -> bool {
        self.contains(identifier)
    }
}

/// Binary-style name for a nested type written in source form.
///
/// `a.b.Outer.Inner` becomes `a.b.Outer$Inner`. Returns `None` when there is
/// no package separator to rewrite.
pub fn nested_variant(identifier: &str) -> Option<String> {
    let split = identifier.rfind('.')?;
    if split == 0 || split + 1 == identifier.len() {
        return None;
    }
    Some(format!(
        "{}${}",
        &identifier[..split],
        &identifier[split + 1..]
    ))
}

/// Root-relative descriptor path for an identifier.
///
/// Rejects names that could escape the classpath root.
pub fn descriptor_file_name(identifier: &str) -> Option<PathBuf> {
    if identifier.is_empty()
        || identifier.contains(['/', '\\'])
        || identifier.split('.').any(str::is_empty)
    {
        return None;
    }
    let mut path: PathBuf = identifier.split('.').collect();
    path.set_extension("toml");
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::tempdir;

    fn write_descriptor(root: &Path, identifier: &str) {
        let path = root.join(descriptor_file_name(identifier).unwrap());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }

    #[test]
    fn test_nested_variant_rewrites_last_separator() {
        assert_eq!(
            nested_variant("com.example.Outer.Inner").as_deref(),
            Some("com.example.Outer$Inner")
        );
        assert_eq!(nested_variant("Plain"), None);
        assert_eq!(nested_variant("trailing."), None);
    }

    #[test]
    fn test_descriptor_path_rejects_traversal() {
        assert!(descriptor_file_name("../etc/passwd").is_none());
        assert!(descriptor_file_name("a..b").is_none());
        assert!(descriptor_file_name("").is_none());
        assert_eq!(
            descriptor_file_name("com.example.Foo").unwrap(),
            PathBuf::from("com/example/Foo.toml")
        );
    }

    #[test]
    fn test_presence_checks_every_root_and_nested_form() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        write_descriptor(second.path(), "com.example.Foo");
        write_descriptor(first.path(), "com.example.Outer$Inner");

        let classpath = Classpath::new([first.path(), second.path()]);
        assert!(classpath.is_present("com.example.Foo"));
        assert!(classpath.is_present("com.example.Outer$Inner"));
        assert!(classpath.is_present("com.example.Outer.Inner"));
        assert!(!classpath.is_present("com.example.Missing"));
    }

    #[test]
    fn test_resources_returns_matches_in_root_order() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        let third = tempdir().unwrap();
        for root in [first.path(), third.path()] {
            std::fs::create_dir_all(root.join("META-INF")).unwrap();
            std::fs::write(root.join("META-INF/x.imports"), "a").unwrap();
        }

        let classpath = Classpath::new([first.path(), second.path(), third.path()]);
        let found = classpath.resources("META-INF/x.imports");
        assert_eq!(
            found,
            vec![
                first.path().join("META-INF/x.imports"),
                third.path().join("META-INF/x.imports"),
            ]
        );
    }
}
