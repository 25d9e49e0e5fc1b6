//! Minimal reader for properties-style resources (`key=value` lines).
//!
//! Supports `#`/`!` comment lines, `=` or `:` separators and a trailing
//! backslash to continue a value on the next line. Escapes beyond that are
//! not interpreted.

use std::path::Path;

use autoconf_core::AutoConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Property {
    pub line: usize,
    pub key: String,
    pub value: String,
}

pub(crate) fn read_file(path: &Path) -> Result<Vec<Property>, AutoConfigError> {
    let content =
        std::fs::read_to_string(path).map_err(|source| AutoConfigError::ResourceUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
    parse(&content, path)
}

pub(crate) fn parse(content: &str, path: &Path) -> Result<Vec<Property>, AutoConfigError> {
    let mut properties = Vec::new();
    let mut lines = content.lines().enumerate();

    while let Some((index, raw)) = lines.next() {
        let line_number = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let mut logical = line.to_string();
        while logical.ends_with('\\') {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim()),
                None => break,
            }
        }

        let (key, value) = match logical.find(['=', ':']) {
            Some(split) => (&logical[..split], &logical[split + 1..]),
            None => (logical.as_str(), ""),
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(AutoConfigError::MalformedResource {
                path: path.to_path_buf(),
                line: line_number,
                message: "missing key before separator".to_string(),
            });
        }

        properties.push(Property {
            line: line_number,
            key: key.to_string(),
            value: value.trim().to_string(),
        });
    }

    Ok(properties)
}

/// Split a comma-separated value into trimmed, non-empty entries.
pub(crate) fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
