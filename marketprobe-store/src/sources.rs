//! File-backed credential sources.
//!
//! - `identities.json`: a list of identity strings
//! - `proxies.json`: a list of `{"scheme": "proxy-uri"}` objects
//!
//! Entries that do not convert are skipped one by one with a warning. A
//! file that is missing or not a JSON list yields `None`.

use std::path::{Path, PathBuf};

use marketprobe_core::{
    CoreError, Diagnostics, Identity, IdentitySource, ProxyRoute, ProxySource,
};
use serde_json::Value;

use crate::persistence::load_json;

/// Reads a JSON list, logging why it could not be read.
fn load_list(path: &Path, what: &str, diag: &Diagnostics) -> Option<Vec<Value>> {
    match load_json::<Value>(path) {
        Ok(Value::Array(entries)) => Some(entries),
        Ok(_) => {
            diag.error(format!(
                "{} must contain a JSON list of {what}.",
                path.display()
            ));
            None
        }
        Err(e) if e.is_not_found() => {
            diag.error(format!("{} not found.", path.display()));
            None
        }
        Err(e) => {
            diag.error(format!("Could not read {}: {e}", path.display()));
            None
        }
    }
}

/// Converts every entry, skipping and reporting the ones that fail.
fn convert_entries<T>(entries: Vec<Value>, path: &Path, diag: &Diagnostics) -> Vec<T>
where
    T: TryFrom<Value, Error = CoreError>,
{
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match T::try_from(entry) {
            Ok(value) => Some(value),
            Err(e) => {
                diag.warn(format!("Skipping entry {index} of {}: {e}", path.display()));
                None
            }
        })
        .collect()
}

// ============================================================================
// Identity File
// ============================================================================

/// Identity list stored in a JSON file.
#[derive(Debug, Clone)]
pub struct FileIdentitySource {
    path: PathBuf,
    diag: Diagnostics,
}

impl FileIdentitySource {
    /// Creates a source reading `path`.
    pub fn new(path: impl Into<PathBuf>, diag: Diagnostics) -> Self {
        Self {
            path: path.into(),
            diag,
        }
    }

    /// File path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IdentitySource for FileIdentitySource {
    fn load_identities(&self) -> Option<Vec<Identity>> {
        let entries = load_list(&self.path, "strings", &self.diag)?;
        Some(convert_entries(entries, &self.path, &self.diag))
    }
}

// ============================================================================
// Proxy File
// ============================================================================

/// Proxy route list stored in a JSON file.
#[derive(Debug, Clone)]
pub struct FileProxySource {
    path: PathBuf,
    diag: Diagnostics,
}

impl FileProxySource {
    /// Creates a source reading `path`.
    pub fn new(path: impl Into<PathBuf>, diag: Diagnostics) -> Self {
        Self {
            path: path.into(),
            diag,
        }
    }

    /// File path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProxySource for FileProxySource {
    fn load_proxies(&self) -> Option<Vec<ProxyRoute>> {
        let entries = load_list(&self.path, "objects", &self.diag)?;
        Some(convert_entries(entries, &self.path, &self.diag))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn diag() -> Diagnostics {
        Diagnostics::disabled("sources")
    }

    #[test]
    fn test_identity_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("identities.json");
        fs::write(&path, r#"["A", "", 3, null, "B"]"#).unwrap();

        let identities = FileIdentitySource::new(&path, diag()).load_identities().unwrap();
        assert_eq!(
            identities,
            vec![Identity::new("A"), Identity::new(""), Identity::new("B")]
        );
    }

    #[test]
    fn test_proxy_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("proxies.json");
        fs::write(
            &path,
            r#"[{"http": "http://p1:3128", "https": "http://p1:3128"}, "junk", {}, {"http": 5}]"#,
        )
        .unwrap();

        let routes = FileProxySource::new(&path, diag()).load_proxies().unwrap();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].http(), Some("http://p1:3128"));
        assert_eq!(routes[0].https(), Some("http://p1:3128"));
        assert!(routes[1].is_empty());
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let source = FileIdentitySource::new(dir.path().join("nope.json"), diag());
        assert!(source.load_identities().is_none());
    }

    #[test]
    fn test_wrong_shape_is_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("proxies.json");
        fs::write(&path, r#"{"http": "http://p1:3128"}"#).unwrap();
        assert!(FileProxySource::new(&path, diag()).load_proxies().is_none());

        fs::write(&path, "not json").unwrap();
        assert!(FileProxySource::new(&path, diag()).load_proxies().is_none());
    }
}
