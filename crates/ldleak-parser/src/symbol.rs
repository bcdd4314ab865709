//! Requested symbols and their declaration patterns

use ldleak_core::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

pub(crate) static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// A function name to intercept plus the pattern matching its `extern` declaration
///
/// The pattern accepts an `extern` keyword at the start of a line, one or
/// more return type tokens, the symbol name and a parenthesized parameter
/// list made of identifiers, whitespace, pointers, commas and ellipses. Any
/// of these may be split across lines.
#[derive(Debug, Clone)]
pub struct Symbol {
    name: String,
    pattern: Regex,
}

impl Symbol {
    /// Build a symbol, rejecting names that are not C identifiers
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if !IDENTIFIER.is_match(&name) {
            return Err(Error::InvalidInvocation(format!(
                "'{}' is not a valid C function name",
                name
            )));
        }

        let pattern = Regex::new(&format!(
            r"(?m)^[ \t]*extern\s+(?:[A-Za-z0-9_]+\s*\**\s+)+\**{}\s*\([A-Za-z0-9_\s\*,\.]*\)",
            regex::escape(&name)
        ))
        .map_err(|e| Error::InvalidInvocation(e.to_string()))?;

        Ok(Self { name, pattern })
    }

    /// Parse a comma separated symbol list (`strcmp,malloc`), keeping first occurrences
    pub fn parse_list(list: &str) -> Result<Vec<Symbol>> {
        let mut symbols: Vec<Symbol> = Vec::new();
        for name in list.split(',').map(str::trim) {
            if name.is_empty() {
                return Err(Error::InvalidInvocation(format!(
                    "empty entry in symbol list '{}'",
                    list
                )));
            }
            if symbols.iter().any(|s| s.name == name) {
                continue;
            }
            symbols.push(Symbol::new(name)?);
        }
        Ok(symbols)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Whether `text` contains a declaration of this symbol
    pub fn is_declared_in(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Symbol {}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
