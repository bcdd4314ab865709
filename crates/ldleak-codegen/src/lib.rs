//! ldleak Codegen
//!
//! Generates the C source of an `LD_PRELOAD` interposition library from
//! parsed declarations.
//!
//! Each intercepted function gets:
//! - a typed call macro plus a `void*` holding the real function's address
//! - a wrapper with the exact declared signature that logs its arguments,
//!   caller address and caller module, forwards the call and logs the result
//! - a `dlsym(RTLD_NEXT, ...)` entry in the load-time constructor
//!
//! Declarations are lowered into a [`ShimUnit`] by [`ShimBuilder`] and
//! rendered by the unit's `Display` implementation.

pub mod builder;
pub mod ir;
mod render;

pub use builder::ShimBuilder;
pub use ir::{Fragment, ShimUnit, Wrapper};

use ldleak_core::config::CodegenConfig;
use ldleak_core::Declaration;
use std::fmt;

/// Generated C translation unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit(String);

impl GeneratedUnit {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for GeneratedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&ShimUnit> for GeneratedUnit {
    fn from(unit: &ShimUnit) -> Self {
        GeneratedUnit(unit.to_string())
    }
}

/// Generate the shim library for `declarations` with the given configuration
pub fn generate_with(config: &CodegenConfig, declarations: &[Declaration]) -> GeneratedUnit {
    let unit = ShimBuilder::new(config.clone()).build(declarations);
    GeneratedUnit::from(&unit)
}

/// Generate the shim library for `declarations` with the default configuration
pub fn generate(declarations: &[Declaration]) -> GeneratedUnit {
    generate_with(&CodegenConfig::default(), declarations)
}
