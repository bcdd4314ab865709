//! Shim IR
//!
//! One generated translation unit is a flat list of fragments. Each fragment
//! renders to one block of C; the unit renders them in order.

use ldleak_core::ParamKind;

/// A complete shim translation unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShimUnit {
    pub fragments: Vec<Fragment>,
}

/// Top level block of the generated C source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Preamble(Preamble),
    Indirection(Indirection),
    /// Shared `__get_dladdr` helper
    DladdrHelper,
    Wrapper(Wrapper),
    Loader(Loader),
}

/// Feature macros and includes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preamble {
    pub defines: Vec<String>,
    pub includes: Vec<Include>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Include {
    /// `#include <name>`
    System(String),
    /// `#include "path"`
    Local(String),
}

/// Typed call macro plus the storage for the real symbol address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indirection {
    pub symbol: String,
    /// `STRCMP`
    pub macro_name: String,
    /// `__STRCMP`
    pub storage: String,
}

impl Indirection {
    pub fn new(symbol: &str) -> Self {
        let macro_name = symbol.to_uppercase();
        Self {
            symbol: symbol.to_string(),
            storage: format!("__{}", macro_name),
            macro_name,
        }
    }
}

/// A value printed in a log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogArg {
    pub name: String,
    pub kind: ParamKind,
}

/// Non-void return value of a wrapper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnValue {
    pub type_name: String,
    pub kind: ParamKind,
}

/// Intercepting definition of one symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wrapper {
    pub symbol: String,
    /// Normalized declaration, used verbatim as the definition head
    pub signature: String,
    pub macro_name: String,
    /// Named parameters in declaration order
    pub args: Vec<LogArg>,
    /// Last named parameter, passed to `va_start`, when variadic
    pub variadic_anchor: Option<String>,
    /// `None` for void functions
    pub returns: Option<ReturnValue>,
    pub log_fd: i32,
    pub trusted_address_limit: u64,
}

impl Wrapper {
    pub fn is_variadic(&self) -> bool {
        self.variadic_anchor.is_some()
    }
}

/// Constructor binding every storage variable to the next definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loader {
    pub entries: Vec<Indirection>,
    /// Abort when `dlsym` finds nothing
    pub strict: bool,
    pub log_fd: i32,
}
