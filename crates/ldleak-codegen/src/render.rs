//! C rendering of the shim IR
//!
//! Fragments are separated by one blank line and every fragment ends with a
//! newline. Nothing here depends on iteration order of hashed containers, so
//! equal units always render to equal bytes.

use crate::ir::{Fragment, Include, Indirection, Loader, LogArg, Preamble, ShimUnit, Wrapper};
use ldleak_core::ParamKind;
use std::fmt;

const INDENT: &str = "    ";

impl fmt::Display for ShimUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, fragment) in self.fragments.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", fragment)?;
        }
        Ok(())
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fragment::Preamble(p) => fmt::Display::fmt(p, f),
            Fragment::Indirection(i) => fmt::Display::fmt(i, f),
            Fragment::DladdrHelper => {
                writeln!(f, "Dl_info __get_dladdr(const void* addr)")?;
                writeln!(f, "{{")?;
                writeln!(f, "{}Dl_info info = {{0}};", INDENT)?;
                writeln!(f, "{}dladdr(addr, &info);", INDENT)?;
                writeln!(f, "{}return info;", INDENT)?;
                writeln!(f, "}}")
            }
            Fragment::Wrapper(w) => fmt::Display::fmt(w, f),
            Fragment::Loader(l) => fmt::Display::fmt(l, f),
        }
    }
}

impl fmt::Display for Preamble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for define in &self.defines {
            writeln!(f, "#define {}", define)?;
        }
        for include in &self.includes {
            match include {
                Include::System(name) => writeln!(f, "#include <{}>", name)?,
                Include::Local(path) => writeln!(f, "#include \"{}\"", path)?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for Indirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "#define {} ((typeof (&{})){})",
            self.macro_name, self.symbol, self.storage
        )?;
        writeln!(f, "void* {};", self.storage)
    }
}

/// Expression passed to `dprintf` for a value of `kind`
fn log_value(name: &str, kind: ParamKind) -> String {
    match kind {
        ParamKind::Integral => format!("(unsigned long){}", name),
        ParamKind::CString | ParamKind::Pointer => name.to_string(),
    }
}

impl Wrapper {
    /// Format string of the call log line, as it appears inside the C literal
    pub fn log_format(&self) -> String {
        let mut parts: Vec<String> = self
            .args
            .iter()
            .map(|a| format!("{}={}", a.name, a.kind.format()))
            .collect();
        if self.is_variadic() {
            parts.push("...".into());
        }

        let mut line = format!("{}({}) @ %p [%s->%p]", self.symbol, parts.join(", "));
        if self.returns.is_none() {
            line.push_str(" -> (void)\\n");
        }
        line
    }

    /// Forwarding call through the indirection macro
    pub fn forward_call(&self) -> String {
        let mut args: Vec<&str> = self.args.iter().map(|a| a.name.as_str()).collect();
        if self.is_variadic() {
            args.push("__argp");
        }
        format!("{}({})", self.macro_name, args.join(", "))
    }

    fn log_values(&self) -> String {
        let mut values: Vec<String> = self
            .args
            .iter()
            .map(|LogArg { name, kind }| log_value(name, *kind))
            .collect();
        values.extend(
            ["__retaddr", "__info.dli_fname", "__offset"]
                .iter()
                .map(|v| v.to_string()),
        );
        values.join(", ")
    }
}

impl fmt::Display for Wrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = format!("{}{}", INDENT, INDENT);
        let call = self.forward_call();

        writeln!(f, "{}", self.signature)?;
        writeln!(f, "{{")?;
        writeln!(f, "{}void* __retaddr = __builtin_return_address(0);", INDENT)?;
        if let Some(anchor) = &self.variadic_anchor {
            writeln!(f, "{}va_list __argp;", INDENT)?;
            writeln!(f, "{}va_start(__argp, {});", INDENT, anchor)?;
        }

        writeln!(
            f,
            "{}if ((unsigned long)__retaddr < {:#x}) {{",
            INDENT, self.trusted_address_limit
        )?;
        writeln!(f, "{}Dl_info __info = __get_dladdr(__retaddr);", inner)?;
        writeln!(
            f,
            "{}void* __offset = (void*)((char*)__retaddr - (char*)__info.dli_fbase);",
            inner
        )?;
        writeln!(
            f,
            "{}dprintf({}, \"{}\", {});",
            inner,
            self.log_fd,
            self.log_format(),
            self.log_values()
        )?;

        match &self.returns {
            Some(ret) => {
                writeln!(f, "{}{} __result = {};", inner, ret.type_name, call)?;
                if self.is_variadic() {
                    writeln!(f, "{}va_end(__argp);", inner)?;
                }
                writeln!(
                    f,
                    "{}dprintf({}, \" -> {}\\n\", {});",
                    inner,
                    self.log_fd,
                    ret.kind.format(),
                    log_value("__result", ret.kind)
                )?;
                writeln!(f, "{}return __result;", inner)?;
                writeln!(f, "{}}}", INDENT)?;

                if self.is_variadic() {
                    writeln!(f, "{}{} __result = {};", INDENT, ret.type_name, call)?;
                    writeln!(f, "{}va_end(__argp);", INDENT)?;
                    writeln!(f, "{}return __result;", INDENT)?;
                } else {
                    writeln!(f, "{}return {};", INDENT, call)?;
                }
            }
            None => {
                writeln!(f, "{}}}", INDENT)?;
                writeln!(f, "{}{};", INDENT, call)?;
                if self.is_variadic() {
                    writeln!(f, "{}va_end(__argp);", INDENT)?;
                }
            }
        }
        writeln!(f, "}}")
    }
}

impl fmt::Display for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "__attribute__((constructor))")?;
        writeln!(f, "static void __load_functions()")?;
        writeln!(f, "{{")?;
        for entry in &self.entries {
            writeln!(
                f,
                "{}{} = dlsym(RTLD_NEXT, \"{}\");",
                INDENT, entry.storage, entry.symbol
            )?;
            if self.strict {
                writeln!(f, "{}if (!{}) {{", INDENT, entry.storage)?;
                writeln!(
                    f,
                    "{}{}dprintf({}, \"ldleak: unable to resolve {}\\n\");",
                    INDENT, INDENT, self.log_fd, entry.symbol
                )?;
                writeln!(f, "{}{}abort();", INDENT, INDENT)?;
                writeln!(f, "{}}}", INDENT)?;
            }
        }
        writeln!(f, "}}")
    }
}
