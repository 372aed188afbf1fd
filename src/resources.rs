//! Resource loading: resolves engine-resource paths and URLs to bytes or
//! property maps.
//!
//! The builder only depends on the [`ResourceLoader`] trait; the default
//! implementation resolves resource paths against a list of filesystem search
//! roots and supports `file://` URLs. Property documents come in two forms:
//! line-oriented `key=value` files and TOML files (flattened to dotted keys).

use crate::document::Properties;
use crate::error::BuildError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolves declared resource references to their contents.
pub trait ResourceLoader {
    /// Read a resource path (engine-relative reference) as bytes.
    fn resource_bytes(&self, path: &str) -> Result<Vec<u8>, BuildError>;

    /// Read a URL reference as bytes.
    fn url_bytes(&self, url: &str) -> Result<Vec<u8>, BuildError>;

    /// Read a resource path as a property map.
    fn resource_properties(&self, path: &str) -> Result<Properties, BuildError> {
        parse_property_document(&self.resource_bytes(path)?, path)
    }

    /// Read a URL reference as a property map.
    fn url_properties(&self, url: &str) -> Result<Properties, BuildError> {
        parse_property_document(&self.url_bytes(url)?, url)
    }
}

/// Filesystem-backed resource loader.
pub struct FsResourceLoader {
    roots: Vec<PathBuf>,
}

impl FsResourceLoader {
    /// Loader resolving resources against the current directory.
    pub fn new() -> Self {
        Self {
            roots: vec![PathBuf::from(".")],
        }
    }

    /// Loader resolving resources against a single search root.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            roots: vec![root.into()],
        }
    }

    /// Append another search root; roots are tried in order.
    pub fn add_root(&mut self, root: impl Into<PathBuf>) {
        self.roots.push(root.into());
    }

    fn read(path: &Path, label: &str) -> Result<Vec<u8>, BuildError> {
        std::fs::read(path).map_err(|e| BuildError::Resource {
            resource: label.to_string(),
            reason: e.to_string(),
        })
    }
}

impl Default for FsResourceLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceLoader for FsResourceLoader {
    fn resource_bytes(&self, path: &str) -> Result<Vec<u8>, BuildError> {
        for root in &self.roots {
            let candidate = root.join(path);
            if candidate.is_file() {
                debug!(resource = path, candidate = %candidate.display(), "loading resource");
                return Self::read(&candidate, path);
            }
        }
        Err(BuildError::Resource {
            resource: path.to_string(),
            reason: "not found under any search root".to_string(),
        })
    }

    fn url_bytes(&self, url: &str) -> Result<Vec<u8>, BuildError> {
        match url.strip_prefix("file://") {
            Some(path) => Self::read(Path::new(path), url),
            None => Err(BuildError::Resource {
                resource: url.to_string(),
                reason: "only file:// URLs are supported".to_string(),
            }),
        }
    }
}

/// Parse a property document. TOML when the label ends in `.toml`, otherwise
/// the line-oriented `key=value` format (`#`/`!` comment lines, blank lines
/// skipped).
pub fn parse_property_document(bytes: &[u8], label: &str) -> Result<Properties, BuildError> {
    let text = std::str::from_utf8(bytes).map_err(|e| BuildError::Resource {
        resource: label.to_string(),
        reason: format!("not valid UTF-8: {}", e),
    })?;
    if label.ends_with(".toml") {
        parse_toml_properties(text, label)
    } else {
        Ok(parse_line_properties(text))
    }
}

fn parse_line_properties(text: &str) -> Properties {
    let mut props = Properties::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            props.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    props
}

fn parse_toml_properties(text: &str, label: &str) -> Result<Properties, BuildError> {
    let table: toml::Table = toml::from_str(text).map_err(|e| BuildError::Resource {
        resource: label.to_string(),
        reason: format!("invalid TOML: {}", e),
    })?;
    let mut props = Properties::new();
    flatten_toml("", &toml::Value::Table(table), &mut props);
    Ok(props)
}

fn flatten_toml(prefix: &str, value: &toml::Value, out: &mut Properties) {
    match value {
        toml::Value::Table(table) => {
            for (key, value) in table {
                let key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_toml(&key, value, out);
            }
        }
        toml::Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        other => {
            out.insert(prefix.to_string(), other.to_string());
        }
    }
}
