//! Declaration Selector
//!
//! Picks one header per symbol. A declaration in the shallowest header
//! relative to its search root wins, so `/usr/include/string.h` is chosen
//! over a vendored `/usr/include/vendor/compat/string.h`.

use ldleak_core::{Error, HeaderCandidateSet, ResolvedHeader, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Score of a candidate that lies under none of the roots
pub const NO_ROOT_SCORE: usize = 99_999;

/// Depth of `header` below `root`, or `None` if `root` is not a prefix of it
pub fn depth_score(root: &Path, header: &Path) -> Option<usize> {
    if !header.starts_with(root) {
        return None;
    }
    Some(header.components().count() - root.components().count())
}

/// Choose exactly one header for every symbol in `candidates`
///
/// Ties keep the first candidate in scan order. Fails on the first symbol
/// without candidates.
pub fn select(roots: &[PathBuf], candidates: HeaderCandidateSet) -> Result<ResolvedHeader> {
    let mut resolved = ResolvedHeader::new();

    for (symbol, headers) in candidates.iter() {
        let mut best: Option<(&PathBuf, usize)> = None;

        for header in headers {
            let score = roots
                .iter()
                .filter_map(|root| depth_score(root, header))
                .min()
                .unwrap_or(NO_ROOT_SCORE);
            debug!("{} candidate {} scored {}", symbol, header.display(), score);

            if best.map_or(true, |(_, best_score)| score < best_score) {
                best = Some((header, score));
            }
        }

        let (header, _) = best.ok_or_else(|| Error::SymbolNotFound(symbol.to_string()))?;
        info!("{} resolved to {}", symbol, header.display());
        resolved.insert(symbol, header.clone());
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(symbol: &str, headers: &[&str]) -> HeaderCandidateSet {
        let mut set = HeaderCandidateSet::new([symbol]);
        for h in headers {
            set.insert(symbol, Path::new(h));
        }
        set
    }

    #[test]
    fn test_depth_score() {
        let root = Path::new("/usr/include");
        assert_eq!(depth_score(root, Path::new("/usr/include/string.h")), Some(1));
        assert_eq!(
            depth_score(root, Path::new("/usr/include/vendor/compat/string.h")),
            Some(3)
        );
        assert_eq!(depth_score(root, Path::new("/usr/include2/string.h")), None);
        assert_eq!(depth_score(root, Path::new("/opt/string.h")), None);
    }

    #[test]
    fn test_shallowest_wins() {
        let roots = vec![PathBuf::from("/usr/include")];
        let set = candidates(
            "strcmp",
            &["/usr/include/vendor/compat/string.h", "/usr/include/string.h"],
        );

        let resolved = select(&roots, set).unwrap();
        assert_eq!(
            resolved.get("strcmp").unwrap(),
            Path::new("/usr/include/string.h")
        );
    }

    #[test]
    fn test_depth_is_relative_to_root() {
        let roots = vec![
            PathBuf::from("/usr/include"),
            PathBuf::from("/opt/sdk/deep/include"),
        ];
        let set = candidates(
            "f",
            &["/usr/include/sys/f.h", "/opt/sdk/deep/include/f.h"],
        );

        let resolved = select(&roots, set).unwrap();
        assert_eq!(resolved.get("f").unwrap(), Path::new("/opt/sdk/deep/include/f.h"));
    }

    #[test]
    fn test_nested_roots_take_minimum() {
        let roots = vec![
            PathBuf::from("/usr/include"),
            PathBuf::from("/usr/include/x86_64-linux-gnu"),
        ];
        let set = candidates(
            "f",
            &["/usr/include/bits/f.h", "/usr/include/x86_64-linux-gnu/f.h"],
        );

        let resolved = select(&roots, set).unwrap();
        assert_eq!(
            resolved.get("f").unwrap(),
            Path::new("/usr/include/x86_64-linux-gnu/f.h")
        );
    }

    #[test]
    fn test_tie_keeps_first_encountered() {
        let roots = vec![PathBuf::from("/inc")];
        let set = candidates("f", &["/inc/z.h", "/inc/a.h"]);

        let resolved = select(&roots, set).unwrap();
        assert_eq!(resolved.get("f").unwrap(), Path::new("/inc/z.h"));
    }

    #[test]
    fn test_outside_roots_only_as_fallback() {
        let roots = vec![PathBuf::from("/inc")];
        let set = candidates("f", &["/elsewhere/f.h", "/inc/a/b/c/f.h"]);
        let resolved = select(&roots, set).unwrap();
        assert_eq!(resolved.get("f").unwrap(), Path::new("/inc/a/b/c/f.h"));

        let set = candidates("f", &["/elsewhere/f.h"]);
        let resolved = select(&roots, set).unwrap();
        assert_eq!(resolved.get("f").unwrap(), Path::new("/elsewhere/f.h"));
    }

    #[test]
    fn test_symbol_not_found() {
        let roots = vec![PathBuf::from("/usr/include")];
        let mut set = HeaderCandidateSet::new(["strcmp", "nosuchfn"]);
        set.insert("strcmp", Path::new("/usr/include/string.h"));

        let err = select(&roots, set).unwrap_err();
        assert!(matches!(err, Error::SymbolNotFound(s) if s == "nosuchfn"));
    }

    #[test]
    fn test_keeps_request_order() {
        let roots = vec![PathBuf::from("/inc")];
        let mut set = HeaderCandidateSet::new(["b", "a"]);
        set.insert("a", Path::new("/inc/a.h"));
        set.insert("b", Path::new("/inc/b.h"));

        let resolved = select(&roots, set).unwrap();
        let order: Vec<_> = resolved.iter().map(|(s, _)| s).collect();
        assert_eq!(order, vec!["b", "a"]);
    }
}
