//! Error types.
//!
//! Manager operations never surface errors to callers: a preference toggle must
//! not take the page down. These types appear at the capability seams (stores)
//! and when parsing configuration or catalogs, where the caller decides what to
//! do with them.

use std::io;
use std::path::PathBuf;

/// Errors reported by a [`Store`](crate::Store) backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The context has no durable storage (pre-render, sandboxed frame, no
    /// config directory).
    #[error("persistent storage is not available in this context")]
    Unavailable,

    /// Reading or writing the backing file failed.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The backing file exists but is not a valid preference map.
    #[error("malformed preference file {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The backend refused the operation (quota exceeded, security error).
    #[error("storage backend rejected the operation: {0}")]
    Backend(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Error returned when a string is not one of `light`, `dark` or `system`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mode '{0}', expected one of: light, dark, system")]
pub struct ParseModeError(pub String);

/// Errors from parsing a [`SwitcherConfig`](crate::SwitcherConfig) or a
/// [`ThemeCatalog`](crate::ThemeCatalog) definition.
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    #[error("invalid YAML definition: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON definition: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode_error_display() {
        let err = ParseModeError("sepia".to_string());
        let msg = err.to_string();
        assert!(msg.contains("sepia"));
        assert!(msg.contains("light, dark, system"));
    }

    #[test]
    fn test_store_error_io_display_includes_path() {
        let err = StoreError::io(
            "/tmp/prefs.json",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/prefs.json"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_definition_error_from_yaml() {
        let yaml_err = serde_yaml::from_str::<Vec<String>>("{").unwrap_err();
        let err: DefinitionError = yaml_err.into();
        assert!(matches!(err, DefinitionError::Yaml(_)));
    }
}
