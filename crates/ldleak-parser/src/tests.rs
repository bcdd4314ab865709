//! Extended tests for the ldleak declaration parser
//!
//! Declarations are taken from, or shaped like, glibc's public headers.

use super::*;
use ldleak_core::ParamKind;
use pretty_assertions::assert_eq;

fn parse_one(name: &str, text: &str) -> Result<Declaration> {
    let symbol = Symbol::new(name).unwrap();
    parse(&symbol, text)
}

/// Two string parameters, the canonical case
#[test]
fn test_strcmp() {
    let decl = parse_one(
        "strcmp",
        "extern int strcmp (const char *__s1, const char *__s2);",
    )
    .unwrap();

    assert_eq!(decl.name, "strcmp");
    assert_eq!(decl.return_type, "int");
    assert!(!decl.is_variadic);
    assert_eq!(
        decl.params,
        vec![
            Parameter::new("__s1", "const char*"),
            Parameter::new("__s2", "const char*"),
        ]
    );
    assert!(decl.params.iter().all(|p| p.kind == ParamKind::CString));
    assert_eq!(decl.signature, "int strcmp(const char* __s1,const char* __s2)");
}

/// `(void)` means no parameters
#[test]
fn test_void_params() {
    let decl = parse_one("getpid", "extern __pid_t getpid (void);").unwrap();
    assert!(decl.params.is_empty());
    assert_eq!(decl.return_type, "__pid_t");
    assert_eq!(decl.signature, "__pid_t getpid(void)");
}

/// Pointer return type and an integral parameter
#[test]
fn test_malloc() {
    let decl = parse_one(
        "malloc",
        "extern void *malloc (size_t __size) __THROW __attribute_malloc__;",
    )
    .unwrap();
    assert_eq!(decl.return_type, "void*");
    assert_eq!(decl.return_kind(), ParamKind::Pointer);
    assert_eq!(decl.params[0].kind, ParamKind::Integral);
}

/// Void return
#[test]
fn test_free() {
    let decl = parse_one("free", "extern void free (void *__ptr) __THROW;").unwrap();
    assert!(decl.returns_void());
    assert_eq!(decl.params[0].kind, ParamKind::Pointer);
}

/// Multi-word return types stay intact
#[test]
fn test_multi_word_return_type() {
    let text = "\nextern unsigned long int strtoul (const char *__restrict __nptr,\n\t\t\t\t  char **__restrict __endptr, int __base)\n     __THROW __nonnull ((1));\n";
    let decl = parse_one("strtoul", text).unwrap();
    assert_eq!(decl.return_type, "unsigned long int");
    assert_eq!(decl.params.len(), 3);
    assert_eq!(decl.params[1], Parameter::new("__endptr", "char**"));
    assert_eq!(decl.params[1].kind, ParamKind::Pointer);
    assert_eq!(decl.params[2].kind, ParamKind::Integral);
}

/// One named parameter before the ellipsis is supported
#[test]
fn test_printf_variadic() {
    let decl = parse_one("printf", "extern int printf(const char *fmt, ...);").unwrap();
    assert!(decl.is_variadic);
    assert_eq!(decl.params, vec![Parameter::new("fmt", "const char*")]);
    assert_eq!(decl.signature, "int printf(const char* fmt,...)");
}

/// Zero or several named parameters before the ellipsis are rejected
#[test]
fn test_unsupported_variadic() {
    let err = parse_one(
        "fprintf",
        "extern int fprintf (FILE *__restrict __stream, const char *__restrict __format, ...);",
    )
    .unwrap_err();
    assert!(matches!(err, Error::UnsupportedVariadic { named: 2, .. }));

    let err = parse_one("oddity", "extern int oddity (...);").unwrap_err();
    assert!(matches!(err, Error::UnsupportedVariadic { named: 0, .. }));
}

/// Unnamed parameters cannot be logged or forwarded
#[test]
fn test_unnamed_parameter() {
    let err = parse_one("f", "extern int f (int);").unwrap_err();
    assert!(matches!(err, Error::ParseFailure { .. }));
}

/// Multi-word types without a name are not mistaken for `type name`
#[test]
fn test_unnamed_multi_word_parameter() {
    for (name, text) in [
        ("puts", "extern int puts (const char *);"),
        ("f", "extern int f (unsigned int);"),
        ("g", "extern int g (const size_t);"),
        ("h", "extern int h (int __a, unsigned long);"),
    ] {
        let err = parse_one(name, text).unwrap_err();
        assert!(
            matches!(err, Error::ParseFailure { .. }),
            "{} parsed: {:?}",
            text,
            err
        );
    }
}

/// Named parameters with qualified types still parse
#[test]
fn test_qualified_named_parameters() {
    let decl = parse_one(
        "f",
        "extern int f (const size_t __n, unsigned int __flags, char *const __p);",
    )
    .unwrap();
    assert_eq!(
        decl.params,
        vec![
            Parameter::new("__n", "const size_t"),
            Parameter::new("__flags", "unsigned int"),
            Parameter::new("__p", "char* const"),
        ]
    );
    assert_eq!(decl.params[2].kind, ParamKind::CString);
}

/// A header without the declaration is a parse failure
#[test]
fn test_missing_declaration() {
    let err = parse_one("strcmp", "extern int strlen (const char *__s);").unwrap_err();
    assert!(matches!(err, Error::ParseFailure { .. }));
}

/// Only the first of several declarations is used
#[test]
fn test_first_match_wins() {
    let text = "extern int f (int __a);\n#ifdef X\nextern int f (long __b);\n#endif\n";
    let decl = parse_one("f", text).unwrap();
    assert_eq!(decl.params, vec![Parameter::new("__a", "int")]);
}

/// The declaration line is recorded
#[test]
fn test_location() {
    let text = "#pragma once\n\n/* strings */\nextern int strcmp (const char *__s1, const char *__s2);\n";
    let decl = parse_one("strcmp", text).unwrap();
    assert_eq!(decl.location.unwrap().line, 4);
}

/// parse_file records the header path
#[test]
fn test_parse_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("string.h");
    std::fs::write(&path, "extern size_t strlen (const char *__s);\n").unwrap();

    let symbol = Symbol::new("strlen").unwrap();
    let decl = SignatureParser::default().parse_file(&symbol, &path).unwrap();
    let loc = decl.location.unwrap();
    assert_eq!(loc.file, path.to_string_lossy());
    assert_eq!(loc.line, 1);
}

/// Parsing normalized text directly agrees with parsing the raw header
#[test]
fn test_parse_normalized_round() {
    let parser = SignatureParser::default();
    let raw = parse_one("strcmp", "extern int strcmp (const char *__s1, const char *__s2);").unwrap();
    let direct = parser.parse_normalized("strcmp", &raw.signature).unwrap();
    assert_eq!(direct.params, raw.params);
    assert_eq!(direct.return_type, raw.return_type);
}

/// Mismatched names are rejected by parse_normalized
#[test]
fn test_parse_normalized_wrong_name() {
    let parser = SignatureParser::default();
    let err = parser.parse_normalized("strlen", "int strcmp(const char* a)").unwrap_err();
    assert!(matches!(err, Error::ParseFailure { .. }));
}
