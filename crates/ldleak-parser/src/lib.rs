//! ldleak Parser
//!
//! Finds and parses `extern` function declarations in C headers.
//!
//! ## Modules
//!
//! - `symbol` - Requested symbols and their declaration patterns
//! - `normalize` - Canonical spacing of declaration text
//!
//! Only single-line, non-macro declarations whose parameters are primitive
//! or pointer types are understood. Variadic functions must have exactly one
//! named parameter before the ellipsis.

pub mod normalize;
pub mod symbol;

pub use normalize::{normalize, Normalizer};
pub use symbol::Symbol;

use ldleak_core::config::ParserConfig;
use ldleak_core::{Declaration, Error, Location, Parameter, Result};
use std::path::Path;
use tracing::{debug, warn};

/// Parser trait for declaration sources
pub trait DeclarationParser {
    /// Parse the declaration of `symbol` out of header text
    fn parse(&self, symbol: &Symbol, header_text: &str) -> Result<Declaration>;

    /// Parse the declaration of `symbol` out of a header file
    fn parse_file(&self, symbol: &Symbol, path: &Path) -> Result<Declaration> {
        let text = std::fs::read_to_string(path)?;
        let mut decl = self.parse(symbol, &text)?;
        if let Some(loc) = decl.location.as_mut() {
            loc.file = path.to_string_lossy().into_owned();
        }
        Ok(decl)
    }
}

/// Regex and split based signature parser
#[derive(Debug, Clone, Default)]
pub struct SignatureParser {
    normalizer: Normalizer,
}

impl SignatureParser {
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            normalizer: Normalizer::new(config.dropped_qualifiers.clone()),
        }
    }

    /// Split normalized declaration text into a [`Declaration`]
    pub fn parse_normalized(&self, symbol: &str, text: &str) -> Result<Declaration> {
        let open = text
            .find('(')
            .ok_or_else(|| Error::parse(symbol, "missing parameter list"))?;
        let close = text
            .rfind(')')
            .filter(|close| *close > open)
            .ok_or_else(|| Error::parse(symbol, "unterminated parameter list"))?;

        let head: Vec<&str> = text[..open].split_whitespace().collect();
        let (name, return_tokens) = match head.split_last() {
            Some((name, rest)) if !rest.is_empty() => (*name, rest),
            _ => return Err(Error::parse(symbol, "missing return type")),
        };
        if name != symbol {
            return Err(Error::parse(
                symbol,
                format!("declaration names '{}'", name),
            ));
        }

        let inner = text[open + 1..close].trim();
        let mut entries: Vec<&str> = if inner.is_empty() || inner == "void" {
            Vec::new()
        } else {
            inner.split(',').map(str::trim).collect()
        };

        let is_variadic = entries.last() == Some(&"...");
        if is_variadic {
            entries.pop();
            if entries.len() != 1 {
                return Err(Error::UnsupportedVariadic {
                    symbol: symbol.to_string(),
                    named: entries.len(),
                });
            }
        }

        let params = entries
            .iter()
            .map(|entry| parse_param(symbol, entry))
            .collect::<Result<Vec<_>>>()?;

        Ok(Declaration {
            name: name.to_string(),
            return_type: return_tokens.join(" "),
            params,
            is_variadic,
            signature: text.to_string(),
            location: None,
        })
    }
}

impl DeclarationParser for SignatureParser {
    fn parse(&self, symbol: &Symbol, header_text: &str) -> Result<Declaration> {
        let mut matches = symbol.pattern().find_iter(header_text);
        let first = matches
            .next()
            .ok_or_else(|| Error::parse(symbol.name(), "no matching extern declaration"))?;

        let text = self.normalizer.normalize(first.as_str());
        debug!("Normalized {}: {}", symbol, text);

        // Only the first declaration is used; differing redeclarations are reported.
        for other in matches {
            let redeclared = self.normalizer.normalize(other.as_str());
            if redeclared != text {
                warn!(
                    "{} is redeclared differently, keeping '{}' over '{}'",
                    symbol, text, redeclared
                );
            }
        }

        let mut decl = self.parse_normalized(symbol.name(), &text)?;
        decl.location = Some(Location::at_offset("<header>", header_text, first.start()));
        Ok(decl)
    }
}

/// Words that can only be part of a parameter's type, never its name
const TYPE_WORDS: &[&str] = &[
    "void", "char", "short", "int", "long", "float", "double", "signed", "unsigned", "const",
    "volatile", "struct", "union", "enum", "_Bool",
];

/// Words that qualify a type without naming one
const QUALIFIERS: &[&str] = &["const", "volatile"];

fn parse_param(symbol: &str, entry: &str) -> Result<Parameter> {
    if entry == "..." {
        return Err(Error::parse(symbol, "ellipsis must be the last parameter"));
    }
    let unnamed = || Error::parse(symbol, format!("parameter '{}' has no name", entry));

    let (type_name, name) = entry.rsplit_once(' ').ok_or_else(unnamed)?;
    if !crate::symbol::IDENTIFIER.is_match(name) || TYPE_WORDS.contains(&name) {
        return Err(unnamed());
    }
    // `const size_t` leaves only a qualifier in front of the last word.
    if type_name
        .split_whitespace()
        .all(|word| QUALIFIERS.contains(&word))
    {
        return Err(unnamed());
    }
    Ok(Parameter::new(name, type_name))
}

/// Parse the declaration of `symbol` in `header_text` with the default configuration
pub fn parse(symbol: &Symbol, header_text: &str) -> Result<Declaration> {
    SignatureParser::default().parse(symbol, header_text)
}

#[cfg(test)]
mod tests;
