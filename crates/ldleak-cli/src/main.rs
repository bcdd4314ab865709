//! ldleak CLI
//!
//! Generates an LD_PRELOAD shim that logs calls into C library functions.

mod pipeline;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};
use ldleak_core::Config;
use ldleak_index::HeaderTree;
use pipeline::{Pipeline, PipelineOutput};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ldleak")]
#[command(author, version, about = "LD_PRELOAD call logger generator", long_about = None)]
struct Cli {
    /// Comma separated function names (strcmp,malloc)
    #[arg(value_name = "SYMBOLS")]
    symbols: String,

    /// Comma separated header search roots (/usr/include)
    #[arg(value_name = "ROOTS")]
    roots: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file (YAML or JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::C)]
    format: Format,

    /// Abort at load time when a real symbol cannot be resolved
    #[arg(long)]
    strict_binding: bool,

    /// Log only calls from return addresses below this limit
    #[arg(long, value_name = "ADDR", value_parser = parse_address)]
    trusted_limit: Option<u64>,

    /// File descriptor the shim logs to
    #[arg(long, value_name = "FD")]
    log_fd: Option<i32>,

    /// Include the resolved headers in the generated unit
    #[arg(long)]
    include_headers: bool,

    /// Do not print the header tree
    #[arg(long)]
    no_tree: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Compilable C unit
    C,
    /// Parsed declarations
    Json,
}

/// One entry of the `--format json` report
#[derive(Serialize)]
struct Entry<'a> {
    header: &'a Path,
    #[serde(flatten)]
    declaration: &'a ldleak_core::Declaration,
}

fn parse_address(value: &str) -> std::result::Result<u64, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|e| format!("invalid address '{}': {}", value, e))
}

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };

    init_logging(cli.verbose);

    let config = load_config(&cli)?;
    let output = match Pipeline::new(config).run(&cli.symbols, &cli.roots) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("ldleak: {}", e);
            std::process::exit(1);
        }
    };

    report(&output, cli.no_tree);

    let text = render(&output, cli.format)?;
    write_output(cli.output.as_deref(), &text)?;

    Ok(())
}

/// Render a successful run in the requested format
fn render(output: &PipelineOutput, format: Format) -> Result<String> {
    match format {
        Format::C => Ok(output.unit.to_string()),
        Format::Json => {
            let entries: Vec<Entry> = output
                .declarations
                .iter()
                .filter_map(|d| {
                    output.resolved.get(&d.name).map(|header| Entry {
                        header,
                        declaration: d,
                    })
                })
                .collect();
            let mut json = serde_json::to_string_pretty(&entries)?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Write to `path`, or stdout without one
fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{}", text),
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Configuration file first, then command line overrides
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    if cli.strict_binding {
        config.codegen.strict_binding = true;
    }
    if cli.include_headers {
        config.codegen.include_resolved_headers = true;
    }
    if let Some(limit) = cli.trusted_limit {
        config.codegen.trusted_address_limit = limit;
    }
    if let Some(fd) = cli.log_fd {
        config.codegen.log_fd = fd;
    }
    Ok(config)
}

/// Echo each normalized declaration and the header tree on stderr
fn report(output: &PipelineOutput, no_tree: bool) {
    for decl in &output.declarations {
        match &decl.location {
            Some(location) => eprintln!("{}  [{}]", decl.signature, location),
            None => eprintln!("{}", decl.signature),
        }
    }

    if no_tree {
        return;
    }
    let tree = HeaderTree::from_resolved(&output.resolved);
    if !tree.is_empty() {
        eprintln!();
        eprint!("{}", tree);
    }
}
