//! Source code location types

use serde::{Deserialize, Serialize};

/// Where a declaration was found inside a header
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Header path
    pub file: String,
    /// Line of the `extern` keyword (1-based)
    pub line: u32,
}

impl Location {
    /// Create a new location
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Compute the location of a byte offset inside `text`
    pub fn at_offset(file: impl Into<String>, text: &str, offset: usize) -> Self {
        let end = offset.min(text.len());
        let line = text.as_bytes()[..end].iter().filter(|b| **b == b'\n').count() + 1;
        Self::new(file, line as u32)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}
