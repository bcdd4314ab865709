//! ldleak Index
//!
//! Scans header search roots for `extern` declarations of the requested
//! symbols and picks one header per symbol.
//!
//! The scan is best effort: files that cannot be opened or are not valid
//! UTF-8 are skipped. Directory entries are visited in file name order so
//! candidate lists are identical across runs on an unchanged tree.

use globset::{Glob, GlobSet, GlobSetBuilder};
use ldleak_core::config::IndexConfig;
use ldleak_core::{Error, HeaderCandidateSet, Result};
use ldleak_parser::Symbol;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

mod selector;
mod tree;

pub use selector::{depth_score, select, NO_ROOT_SCORE};
pub use tree::HeaderTree;

/// Scan statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub matches: usize,
}

/// Header scanner
pub struct HeaderIndex {
    follow_links: bool,
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
    stats: ScanStats,
}

impl HeaderIndex {
    /// Create a header index from configuration
    pub fn new(config: &IndexConfig) -> Result<Self> {
        Ok(Self {
            follow_links: config.follow_links,
            include: build_globset(&config.include)?,
            exclude: build_globset(&config.exclude)?,
            stats: ScanStats::default(),
        })
    }

    /// Scan every file under `roots` for declarations of `symbols`
    ///
    /// Every symbol gets an entry in the result, possibly with no candidates.
    pub fn scan(&mut self, roots: &[PathBuf], symbols: &[Symbol]) -> HeaderCandidateSet {
        let mut candidates = HeaderCandidateSet::new(symbols.iter().map(Symbol::name));
        self.stats = ScanStats::default();

        for root in roots {
            debug!("Scanning {}", root.display());
            let walker = WalkDir::new(root)
                .follow_links(self.follow_links)
                .sort_by_file_name();

            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        debug!("Skipping unreadable entry: {}", e);
                        self.stats.files_skipped += 1;
                        continue;
                    }
                };
                if entry.file_type().is_dir() || !self.should_scan(entry.path()) {
                    continue;
                }
                self.scan_file(entry.path(), symbols, &mut candidates);
            }
        }

        info!(
            "Scanned {} files ({} skipped), {} declarations matched",
            self.stats.files_scanned, self.stats.files_skipped, self.stats.matches
        );
        candidates
    }

    fn scan_file(&mut self, path: &Path, symbols: &[Symbol], candidates: &mut HeaderCandidateSet) {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                debug!("Skipping {}: {}", path.display(), e);
                self.stats.files_skipped += 1;
                return;
            }
        };
        self.stats.files_scanned += 1;

        for symbol in symbols {
            if symbol.is_declared_in(&content) {
                debug!("{} declared in {}", symbol, path.display());
                candidates.insert(symbol.name(), path);
                self.stats.matches += 1;
            }
        }
    }

    /// Check if a file should be scanned based on the configured globs
    fn should_scan(&self, path: &Path) -> bool {
        let Some(filename) = path.file_name() else {
            return false;
        };
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(filename) {
                return false;
            }
        }
        match &self.include {
            Some(include) => include.is_match(filename),
            None => true,
        }
    }

    /// Statistics of the last scan
    pub fn stats(&self) -> ScanStats {
        self.stats
    }
}

impl Default for HeaderIndex {
    fn default() -> Self {
        Self {
            follow_links: false,
            include: None,
            exclude: None,
            stats: ScanStats::default(),
        }
    }
}

fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| Error::Config(e.to_string()))?;
        builder.add(glob);
    }
    builder
        .build()
        .map(Some)
        .map_err(|e| Error::Config(e.to_string()))
}

/// Scan `roots` with the default configuration
pub fn index(roots: &[PathBuf], symbols: &[Symbol]) -> HeaderCandidateSet {
    HeaderIndex::default().scan(roots, symbols)
}

/// Parse and validate a comma separated root list (`/usr/include,/opt/inc/`)
///
/// Trailing slashes are stripped and duplicates dropped, keeping the first
/// occurrence. Every root must be an existing directory.
pub fn parse_roots(list: &str) -> Result<Vec<PathBuf>> {
    let mut roots: Vec<PathBuf> = Vec::new();
    for raw in list.split(',') {
        if raw.trim().is_empty() {
            return Err(Error::InvalidInvocation(format!(
                "empty entry in root list '{}'",
                list
            )));
        }
        let trimmed = raw.trim().trim_end_matches('/');
        let root = PathBuf::from(if trimmed.is_empty() { "/" } else { trimmed });
        if !roots.contains(&root) {
            roots.push(root);
        }
    }

    for root in &roots {
        if !root.is_dir() {
            return Err(Error::RootNotDirectory(root.clone()));
        }
    }
    Ok(roots)
}
