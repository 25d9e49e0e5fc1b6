use std::path::PathBuf;

/// Fatal conditions raised while resolving auto-configuration candidates.
///
/// None of these are retried. They abort the current resolution pass and
/// carry a diagnostic meant to be shown verbatim at startup.
#[derive(thiserror::Error, Debug)]
pub enum AutoConfigError {
    #[error(
        "No auto-configuration candidates found in {location}. If you are using a custom packaging, make sure that file is correct."
    )]
    NoCandidates { location: String },

    #[error("Failed to read resource {}: {source}", .path.display())]
    ResourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed resource {} (line {line}): {message}", .path.display())]
    MalformedResource {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Invalid class descriptor for '{class_name}': {message}")]
    InvalidDescriptor { class_name: String, message: String },

    #[error(
        "The following classes could not be excluded because they are not auto-configuration classes:\n{}",
        format_names(.names)
    )]
    InvalidExclusion { names: Vec<String> },

    #[error("AutoConfigure cycle detected between {current} and {after}")]
    OrderingCycle { current: String, after: String },

    #[error("Inconsistent shared state: {0}")]
    InconsistentSharedState(String),

    #[error("Import filter '{filter}' answered {actual} outcomes for {expected} candidates")]
    FilterContract {
        filter: String,
        expected: usize,
        actual: usize,
    },
}

impl AutoConfigError {
    /// True for errors caused by broken or missing packaged resources.
    pub fn is_packaging_defect(&self) -> bool {
        matches!(
            self,
            Self::NoCandidates { .. }
                | Self::ResourceUnreadable { .. }
                | Self::MalformedResource { .. }
                | Self::InvalidDescriptor { .. }
        )
    }
}

fn format_names(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("\t- {name}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_no_candidates() {
        let err = AutoConfigError::NoCandidates {
            location: "META-INF/autoconf/x.Marker.imports".into(),
        };
        assert!(
            err.to_string()
                .starts_with("No auto-configuration candidates found in META-INF/autoconf/x.Marker.imports.")
        );
        assert!(err.is_packaging_defect());
    }

    #[test]
    fn test_display_invalid_exclusion_lists_every_name() {
        let err = AutoConfigError::InvalidExclusion {
            names: vec!["a.First".into(), "b.Second".into()],
        };
        assert_eq!(
            err.to_string(),
            "The following classes could not be excluded because they are not auto-configuration classes:\n\t- a.First\n\t- b.Second"
        );
        assert!(!err.is_packaging_defect());
    }

    #[test]
    fn test_display_ordering_cycle_names_both_sides() {
        let err = AutoConfigError::OrderingCycle {
            current: "com.A".into(),
            after: "com.B".into(),
        };
        assert_eq!(
            err.to_string(),
            "AutoConfigure cycle detected between com.A and com.B"
        );
    }

    #[test]
    fn test_display_malformed_resource() {
        let err = AutoConfigError::MalformedResource {
            path: PathBuf::from("/cp/META-INF/autoconf-metadata.properties"),
            line: 7,
            message: "expected integer".into(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed resource /cp/META-INF/autoconf-metadata.properties (line 7): expected integer"
        );
        assert!(err.is_packaging_defect());
    }

    #[test]
    fn test_display_inconsistent_shared_state() {
        let err = AutoConfigError::InconsistentSharedState("replacements differ".into());
        assert_eq!(err.to_string(), "Inconsistent shared state: replacements differ");
    }

    #[test]
    fn test_display_filter_contract() {
        let err = AutoConfigError::FilterContract {
            filter: "on-class".into(),
            expected: 3,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "Import filter 'on-class' answered 2 outcomes for 3 candidates"
        );
    }

    #[test]
    fn test_unreadable_keeps_source() {
        let err = AutoConfigError::ResourceUnreadable {
            path: PathBuf::from("/missing"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("/missing"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AutoConfigError>();
    }
}
