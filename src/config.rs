//! Per-document metadata and caller configuration.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::transform::ScriptOptions;

/// Prefix that turns a content hash into a valid attribute name.
pub const SCOPE_HASH_PREFIX: &str = "__v";

/// What the host knows about the document being compiled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    /// Path of the document inside its package or app.
    pub path: String,
    pub package_name: Option<String>,
    /// Content hash supplied by the host, stable per document.
    pub source_hash: String,
}

impl FileMeta {
    pub fn new(
        path: impl Into<String>,
        package_name: Option<String>,
        source_hash: impl Into<String>,
    ) -> Self {
        FileMeta {
            path: path.into(),
            package_name,
            source_hash: source_hash.into(),
        }
    }

    /// Build metadata for a host that has no content hash of its own.
    pub fn from_source(path: impl Into<String>, package_name: Option<String>, source: &str) -> Self {
        Self::new(path, package_name, compute_hash(source))
    }

    /// The scope hash: attribute on every template tag and selector suffix
    /// on every scoped style rule.
    pub fn scope_hash(&self) -> String {
        format!("{}{}", SCOPE_HASH_PREFIX, self.source_hash)
    }

    /// Package-qualified path used as the script's file name in source maps.
    pub fn virtual_path(&self) -> String {
        match self.package_name.as_deref() {
            Some(package) if !package.is_empty() => {
                format!("/packages/{}/{}", package, self.path)
            }
            _ => format!("/{}", self.path),
        }
    }
}

/// Hex sha256 of the document text.
pub fn compute_hash(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Caller configuration for a compilation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOptions {
    /// Settings for the script engine. The source-map fields are always
    /// overwritten by the compiler.
    #[serde(default)]
    pub script: ScriptOptions,
}

impl CompileOptions {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
