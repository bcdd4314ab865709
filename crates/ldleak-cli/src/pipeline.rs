//! End-to-end shim generation
//!
//! Runs header scan, selection, parsing and generation strictly in sequence.
//! The first failure aborts the run; no partial unit is ever produced.

use ldleak_codegen::{generate_with, GeneratedUnit};
use ldleak_core::{Config, Declaration, Error, ResolvedHeader, Result};
use ldleak_index::{parse_roots, select, HeaderIndex};
use ldleak_parser::{DeclarationParser, SignatureParser, Symbol};
use tracing::info;

/// Everything a successful run produced
#[derive(Debug)]
pub struct PipelineOutput {
    pub resolved: ResolvedHeader,
    pub declarations: Vec<Declaration>,
    pub unit: GeneratedUnit,
}

pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run on comma separated symbol and root lists
    pub fn run(&self, symbols: &str, roots: &str) -> Result<PipelineOutput> {
        let symbols = Symbol::parse_list(symbols)?;
        let roots = parse_roots(roots)?;

        let mut index = HeaderIndex::new(&self.config.index)?;
        let candidates = index.scan(&roots, &symbols);
        let resolved = select(&roots, candidates)?;

        let parser = SignatureParser::new(&self.config.parser);
        let declarations = symbols
            .iter()
            .map(|symbol| {
                let header = resolved
                    .get(symbol.name())
                    .ok_or_else(|| Error::SymbolNotFound(symbol.name().to_string()))?;
                parser.parse_file(symbol, header)
            })
            .collect::<Result<Vec<_>>>()?;

        let unit = generate_with(&self.config.codegen, &declarations);
        info!("Generated shims for {} symbols", declarations.len());

        Ok(PipelineOutput {
            resolved,
            declarations,
            unit,
        })
    }
}
