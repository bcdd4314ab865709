//! Configuration types

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// ldleak configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Header scan configuration
    pub index: IndexConfig,

    /// Declaration parser configuration
    pub parser: ParserConfig,

    /// Shim generator configuration
    pub codegen: CodegenConfig,
}

impl Config {
    /// Load a configuration file, YAML or JSON by extension
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match ext {
            "yaml" | "yml" => {
                serde_yaml::from_str(&content).map_err(|e| Error::Config(e.to_string()))
            }
            "json" => serde_json::from_str(&content).map_err(|e| Error::Config(e.to_string())),
            _ => Err(Error::Config(format!(
                "unsupported config format: {}",
                path.display()
            ))),
        }
    }
}

/// Header scan configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Follow symbolic links while walking roots
    pub follow_links: bool,

    /// File name globs to scan (empty scans every file)
    pub include: Vec<String>,

    /// File name globs to skip
    pub exclude: Vec<String>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            follow_links: false,
            include: vec![],
            exclude: vec![],
        }
    }
}

/// Declaration parser configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Qualifiers removed during normalization
    pub dropped_qualifiers: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            dropped_qualifiers: vec![
                "restrict".into(),
                "__restrict".into(),
                "__restrict__".into(),
            ],
        }
    }
}

/// Shim generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenConfig {
    /// Return addresses at or above this value are not logged
    pub trusted_address_limit: u64,

    /// File descriptor the shims log to
    pub log_fd: i32,

    /// Abort at load time when a real symbol cannot be resolved
    pub strict_binding: bool,

    /// `#include` the headers the declarations were resolved from
    pub include_resolved_headers: bool,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            trusted_address_limit: 0x7000_0000_0000,
            log_fd: 2,
            strict_binding: false,
            include_resolved_headers: false,
        }
    }
}
