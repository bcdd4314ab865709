//! Core type definitions

use crate::location::Location;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Words ignored when deciding whether a type is a C string
const CLASSIFY_QUALIFIERS: &[&str] = &["const", "volatile", "unsigned", "signed"];

/// How a value is rendered in a shim log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamKind {
    /// `char*`, printed as a quoted string
    CString,
    /// Any other pointer, printed as a bare address
    Pointer,
    /// Everything else, printed as an unsigned integer
    Integral,
}

impl ParamKind {
    /// Classify a normalized C type (`const char*`, `size_t`, `void*`, ...)
    pub fn classify(type_name: &str) -> Self {
        // Qualifiers may sit on either side of the star (`char* const`).
        let bare: String = type_name
            .replace('*', " * ")
            .split_whitespace()
            .filter(|word| !CLASSIFY_QUALIFIERS.contains(word))
            .collect();

        if bare == "char*" {
            ParamKind::CString
        } else if bare.contains('*') {
            ParamKind::Pointer
        } else {
            ParamKind::Integral
        }
    }

    /// Conversion as it appears inside a C string literal
    pub fn format(&self) -> &'static str {
        match self {
            ParamKind::CString => "\\\"%s\\\"",
            ParamKind::Pointer => "%p",
            ParamKind::Integral => "%lu",
        }
    }
}

/// Function parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Normalized parameter type
    pub type_name: String,
    /// Log classification of `type_name`
    pub kind: ParamKind,
}

impl Parameter {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self {
            name: name.into(),
            kind: ParamKind::classify(&type_name),
            type_name,
        }
    }
}

/// A parsed `extern` function declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    /// Symbol name
    pub name: String,
    /// Normalized return type
    pub return_type: String,
    /// Named parameters in declaration order, without the ellipsis
    pub params: Vec<Parameter>,
    /// Whether the parameter list ends in `...`
    pub is_variadic: bool,
    /// Normalized declaration text, e.g. `int strcmp(const char* __s1,const char* __s2)`
    pub signature: String,
    /// Where the declaration was found
    pub location: Option<Location>,
}

impl Declaration {
    /// Whether the function returns no value
    pub fn returns_void(&self) -> bool {
        self.return_type == "void"
    }

    /// Log classification of the return type
    pub fn return_kind(&self) -> ParamKind {
        ParamKind::classify(&self.return_type)
    }
}

/// Per-symbol header files whose text matched the symbol's declaration pattern
///
/// Keeps the order symbols were requested in; each symbol's list is an
/// ordered set in scan order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderCandidateSet {
    entries: Vec<(String, Vec<PathBuf>)>,
}

impl HeaderCandidateSet {
    /// Create a set with an empty candidate list for every symbol
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        for symbol in symbols {
            let symbol = symbol.into();
            if set.get(&symbol).is_none() {
                set.entries.push((symbol, Vec::new()));
            }
        }
        set
    }

    /// Record that `header` declares `symbol`
    pub fn insert(&mut self, symbol: &str, header: &Path) {
        let idx = match self.entries.iter().position(|(s, _)| s == symbol) {
            Some(idx) => idx,
            None => {
                self.entries.push((symbol.to_string(), Vec::new()));
                self.entries.len() - 1
            }
        };
        let headers = &mut self.entries[idx].1;
        if !headers.iter().any(|h| h == header) {
            headers.push(header.to_path_buf());
        }
    }

    /// Candidates of a symbol
    pub fn get(&self, symbol: &str) -> Option<&[PathBuf]> {
        self.entries
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, headers)| headers.as_slice())
    }

    /// Iterate over `(symbol, candidates)` in request order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.entries
            .iter()
            .map(|(s, headers)| (s.as_str(), headers.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Exactly one chosen header per symbol, in request order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedHeader {
    entries: Vec<(String, PathBuf)>,
}

impl ResolvedHeader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the header of a symbol
    pub fn insert(&mut self, symbol: impl Into<String>, header: PathBuf) {
        let symbol = symbol.into();
        match self.entries.iter_mut().find(|(s, _)| *s == symbol) {
            Some(entry) => entry.1 = header,
            None => self.entries.push((symbol, header)),
        }
    }

    /// Header chosen for a symbol
    pub fn get(&self, symbol: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, h)| h.as_path())
    }

    /// Iterate over `(symbol, header)` in request order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries.iter().map(|(s, h)| (s.as_str(), h.as_path()))
    }

    /// Chosen headers with the symbols they declare, in first-seen order
    pub fn by_header(&self) -> Vec<(&Path, Vec<&str>)> {
        let mut grouped: Vec<(&Path, Vec<&str>)> = Vec::new();
        for (symbol, header) in self.iter() {
            match grouped.iter_mut().find(|(h, _)| *h == header) {
                Some((_, symbols)) => symbols.push(symbol),
                None => grouped.push((header, vec![symbol])),
            }
        }
        grouped
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
