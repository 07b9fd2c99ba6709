//! crates/catalog/src/render.rs
//! Rust source emitted for a parsed [`Catalog`].
//!
//! Two files are produced:
//!
//! - the **definitions** file holds one `pub mod` per catalog module with the
//!   id, severity, registered name and format of every message, plus the
//!   per-module logging macros;
//! - the **init** file holds `<lib>_init_logdef`, which registers every
//!   message with a logger context.
//!
//! The macros expand to [`l4c::LoggerContext`] calls with the message id and
//! format literal inlined, so call sites need no path to the constants:
//!
//! ```text
//! foo_log!(ctx, l4c::Severity::Info, QWE, port)?;
//! foo_error!(ctx, ASD, path, err)?;
//! ```

use std::io::{self, Write};

use crate::parse::{Catalog, Module};

const HEADER: &str = "// @generated by l4cdefgen. Do not edit.\n";

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut",
    "pub", "ref", "return", "self", "static", "struct", "super", "trait", "true", "type", "unsafe",
    "use", "where", "while", "yield",
];

/// Severity wrapper macros generated per module: suffix and variant.
const WRAPPERS: &[(&str, &str)] = &[
    ("error", "Error"),
    ("warning", "Warning"),
    ("info", "Info"),
    ("debug", "Debug"),
];

/// Maps catalog text to a Rust identifier: characters outside `[A-Za-z0-9_]`
/// become `_`, and a leading digit gets a `_` prefix.
pub fn identifier(raw: &str) -> String {
    let mut ident: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

/// Rust module name of a catalog module.
pub fn module_name(module: &Module) -> String {
    let name = identifier(&module.id).to_ascii_lowercase();
    if KEYWORDS.contains(&name.as_str()) {
        format!("{name}_")
    } else {
        name
    }
}

/// Prefix of the constants generated for a message id.
pub fn constant_name(raw: &str) -> String {
    identifier(raw).to_ascii_uppercase()
}

/// Name of the generated registration function.
pub fn init_function(lib: &str) -> String {
    format!("{}_init_logdef", identifier(lib).to_ascii_lowercase())
}

/// A quoted catalog value is kept as written; anything else is quoted.
pub fn string_literal(value: &str) -> String {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        value.to_owned()
    } else {
        format!("{value:?}")
    }
}

/// Writes the definitions file.
pub fn render_defs<W: Write>(catalog: &Catalog, out: &mut W) -> io::Result<()> {
    out.write_all(HEADER.as_bytes())?;
    let mut entries = catalog.entries().peekable();
    for module in catalog.modules() {
        let name = module_name(module);
        writeln!(out)?;
        writeln!(out, "#[allow(dead_code, missing_docs)]")?;
        writeln!(out, "pub mod {name} {{")?;
        writeln!(
            out,
            "    pub const NAME: &str = {};",
            string_literal(&module.display_name)
        )?;

        let mut arms = Vec::with_capacity(module.messages.len());
        while let Some(entry) = entries.next_if(|entry| std::ptr::eq(entry.module, module)) {
            let constant = constant_name(&entry.message.id);
            let format = string_literal(&entry.message.format);
            writeln!(out)?;
            writeln!(out, "    pub const {constant}_ID: usize = {};", entry.index)?;
            writeln!(
                out,
                "    pub const {constant}_SEVERITY: ::l4c::Severity = ::l4c::Severity::{:?};",
                entry.message.severity
            )?;
            writeln!(
                out,
                "    pub const {constant}_NAME: &str = {:?};",
                module.registered_name(entry.message)
            )?;
            writeln!(out, "    pub const {constant}_FMT: &str = {format};")?;
            arms.push((entry.message.id.as_str(), entry.index, format));
        }
        writeln!(out, "}}")?;

        render_macros(out, &name, &arms)?;
    }
    Ok(())
}

fn render_macros<W: Write>(out: &mut W, module: &str, arms: &[(&str, usize, String)]) -> io::Result<()> {
    if arms.is_empty() {
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "#[macro_export]")?;
    writeln!(out, "macro_rules! {module}_log {{")?;
    for (id, index, format) in arms {
        writeln!(
            out,
            "    ($ctx:expr, $severity:expr, {} $(, $arg:expr)*) => {{\n        $ctx.emit($severity, {index}, ::std::format_args!({format} $(, $arg)*))\n    }};",
            identifier(id)
        )?;
    }
    writeln!(out, "}}")?;

    writeln!(out)?;
    writeln!(out, "#[macro_export]")?;
    writeln!(out, "macro_rules! {module}_log_with {{")?;
    for (id, index, format) in arms {
        writeln!(
            out,
            "    ($ctx:expr, $style:expr, $severity:expr, {} $(, $arg:expr)*) => {{\n        $ctx.emit_with(&$style, $severity, {index}, ::std::format_args!({format} $(, $arg)*))\n    }};",
            identifier(id)
        )?;
    }
    writeln!(out, "}}")?;

    writeln!(out)?;
    writeln!(out, "#[macro_export]")?;
    writeln!(out, "macro_rules! {module}_start {{")?;
    for (id, index, format) in arms {
        writeln!(
            out,
            "    ($ctx:expr, $severity:expr, {} $(, $arg:expr)*) => {{\n        $ctx.start($severity, {index}, ::std::format_args!({format} $(, $arg)*))\n    }};",
            identifier(id)
        )?;
    }
    writeln!(out, "}}")?;

    writeln!(out)?;
    writeln!(out, "#[macro_export]")?;
    writeln!(out, "macro_rules! {module}_do_at {{")?;
    for (id, index, _) in arms {
        writeln!(
            out,
            "    ($ctx:expr, $severity:expr, {}, $f:expr) => {{\n        $ctx.do_at($severity, {index}, $f)\n    }};",
            identifier(id)
        )?;
    }
    writeln!(out, "}}")?;

    // Wrappers repeat the arms instead of calling `{module}_log!`: macros
    // expanded from `include!` cannot be reached through `$crate` paths.
    for (suffix, variant) in WRAPPERS {
        writeln!(out)?;
        writeln!(out, "#[macro_export]")?;
        writeln!(out, "macro_rules! {module}_{suffix} {{")?;
        for (id, index, format) in arms {
            writeln!(
                out,
                "    ($ctx:expr, {} $(, $arg:expr)*) => {{\n        $ctx.emit(::l4c::Severity::{variant}, {index}, ::std::format_args!({format} $(, $arg)*))\n    }};",
                identifier(id)
            )?;
        }
        writeln!(out, "}}")?;
    }
    Ok(())
}

/// Writes the init file.
pub fn render_init<W: Write>(catalog: &Catalog, lib: &str, out: &mut W) -> io::Result<()> {
    out.write_all(HEADER.as_bytes())?;
    writeln!(out)?;
    writeln!(out, "/// Registers every catalog message with `ctx`.")?;
    writeln!(
        out,
        "pub fn {}(ctx: &::l4c::LoggerContext) -> ::std::result::Result<(), ::l4c::Error> {{",
        init_function(lib)
    )?;
    for entry in catalog.entries() {
        writeln!(
            out,
            "    ctx.register_message({}, ::l4c::Severity::{:?}, {:?})?;",
            entry.index,
            entry.message.severity,
            entry.module.registered_name(entry.message)
        )?;
    }
    writeln!(out, "    Ok(())")?;
    writeln!(out, "}}")?;
    Ok(())
}
