//! Integration tests for header resolution
//!
//! Builds small include trees on disk and runs the scan and selection
//! passes over them.

use ldleak_core::Error;
use ldleak_index::{index, parse_roots, select, HeaderTree};
use ldleak_parser::Symbol;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const STRCMP_DECL: &str = "\n/* Compare S1 and S2.  */\nextern int strcmp (const char *__s1, const char *__s2)\n     __THROW __attribute_pure__ __nonnull ((1, 2));\n";

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn symbols(list: &str) -> Vec<Symbol> {
    Symbol::parse_list(list).unwrap()
}

/// A vendored copy deeper in the tree loses to the system header
#[test]
fn test_system_header_beats_vendored_copy() {
    let dir = TempDir::new().unwrap();
    let include = dir.path().join("usr/include");
    write(&include, "vendor/compat/string.h", STRCMP_DECL);
    write(&include, "string.h", STRCMP_DECL);

    let roots = parse_roots(&include.to_string_lossy()).unwrap();
    let candidates = index(&roots, &symbols("strcmp"));
    assert_eq!(candidates.get("strcmp").unwrap().len(), 2);

    let resolved = select(&roots, candidates).unwrap();
    assert_eq!(resolved.get("strcmp").unwrap(), include.join("string.h"));
}

/// A missing symbol aborts resolution
#[test]
fn test_missing_symbol() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "string.h", STRCMP_DECL);

    let roots = parse_roots(&dir.path().to_string_lossy()).unwrap();
    let candidates = index(&roots, &symbols("strcmp,not_a_libc_function"));

    let err = select(&roots, candidates).unwrap_err();
    assert!(matches!(err, Error::SymbolNotFound(s) if s == "not_a_libc_function"));
}

/// Macros and prototypes without `extern` are not declarations
#[test]
fn test_ignores_non_extern_mentions() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "macros.h",
        "#define strcmp(a, b) __builtin_strcmp (a, b)\nint strcmp (const char *a, const char *b);\n",
    );

    let roots = parse_roots(&dir.path().to_string_lossy()).unwrap();
    let candidates = index(&roots, &symbols("strcmp"));
    assert!(candidates.get("strcmp").unwrap().is_empty());
}

/// Two roots, each symbol resolved in its own tree
#[test]
fn test_multiple_roots() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    write(&a, "string.h", STRCMP_DECL);
    write(&b, "stdlib.h", "extern void free (void *__ptr) __THROW;\n");

    let list = format!("{},{}/", a.display(), b.display());
    let roots = parse_roots(&list).unwrap();
    let candidates = index(&roots, &symbols("free,strcmp"));
    let resolved = select(&roots, candidates).unwrap();

    let order: Vec<_> = resolved.iter().map(|(s, _)| s).collect();
    assert_eq!(order, vec!["free", "strcmp"]);
    assert_eq!(resolved.get("free").unwrap(), b.join("stdlib.h"));

    let tree = HeaderTree::from_resolved(&resolved).to_string();
    assert!(tree.contains("stdlib.h : free"));
    assert!(tree.contains("string.h : strcmp"));
}

/// Resolution is stable across repeated scans
#[test]
fn test_deterministic() {
    let dir = TempDir::new().unwrap();
    for rel in ["x/string.h", "y/string.h", "z/string.h"] {
        write(dir.path(), rel, STRCMP_DECL);
    }

    let roots = parse_roots(&dir.path().to_string_lossy()).unwrap();
    let first = select(&roots, index(&roots, &symbols("strcmp"))).unwrap();
    let second = select(&roots, index(&roots, &symbols("strcmp"))).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.get("strcmp").unwrap(), dir.path().join("x/string.h"));
}
