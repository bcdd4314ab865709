//! Declaration to IR lowering

use crate::ir::{
    Fragment, Include, Indirection, Loader, LogArg, Preamble, ReturnValue, ShimUnit, Wrapper,
};
use ldleak_core::config::CodegenConfig;
use ldleak_core::Declaration;
use tracing::debug;

const SYSTEM_HEADERS: &[&str] = &["stdio.h", "dlfcn.h", "stdarg.h"];

/// Lowers parsed declarations into a [`ShimUnit`]
#[derive(Debug, Clone, Default)]
pub struct ShimBuilder {
    config: CodegenConfig,
}

impl ShimBuilder {
    pub fn new(config: CodegenConfig) -> Self {
        Self { config }
    }

    /// Build the unit for `declarations`, keeping their order
    pub fn build(&self, declarations: &[Declaration]) -> ShimUnit {
        let mut fragments = vec![Fragment::Preamble(self.preamble(declarations))];

        fragments.extend(
            declarations
                .iter()
                .map(|decl| Fragment::Indirection(Indirection::new(&decl.name))),
        );
        fragments.push(Fragment::DladdrHelper);
        fragments.extend(
            declarations
                .iter()
                .map(|decl| Fragment::Wrapper(self.wrapper(decl))),
        );
        fragments.push(Fragment::Loader(Loader {
            entries: declarations
                .iter()
                .map(|decl| Indirection::new(&decl.name))
                .collect(),
            strict: self.config.strict_binding,
            log_fd: self.config.log_fd,
        }));

        debug!("Built shim unit with {} fragments", fragments.len());
        ShimUnit { fragments }
    }

    fn preamble(&self, declarations: &[Declaration]) -> Preamble {
        let mut includes: Vec<Include> = SYSTEM_HEADERS
            .iter()
            .map(|h| Include::System(h.to_string()))
            .collect();
        if self.config.strict_binding {
            includes.push(Include::System("stdlib.h".into()));
        }

        if self.config.include_resolved_headers {
            for decl in declarations {
                let Some(loc) = &decl.location else {
                    continue;
                };
                let include = Include::Local(loc.file.clone());
                if !includes.contains(&include) {
                    includes.push(include);
                }
            }
        }

        Preamble {
            defines: vec!["_GNU_SOURCE".into()],
            includes,
        }
    }

    fn wrapper(&self, decl: &Declaration) -> Wrapper {
        let indirection = Indirection::new(&decl.name);
        Wrapper {
            symbol: decl.name.clone(),
            signature: decl.signature.clone(),
            macro_name: indirection.macro_name,
            args: decl
                .params
                .iter()
                .map(|p| LogArg {
                    name: p.name.clone(),
                    kind: p.kind,
                })
                .collect(),
            variadic_anchor: if decl.is_variadic {
                decl.params.last().map(|p| p.name.clone())
            } else {
                None
            },
            returns: (!decl.returns_void()).then(|| ReturnValue {
                type_name: decl.return_type.clone(),
                kind: decl.return_kind(),
            }),
            log_fd: self.config.log_fd,
            trusted_address_limit: self.config.trusted_address_limit,
        }
    }
}
