#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `catalog` turns plain-text message catalogs into Rust source for the
//! [`l4c`] runtime. It backs the `l4cdefgen` binary.
//!
//! # Design
//!
//! - [`Catalog`] parses catalog files line by line. Modules keep the order of
//!   their first appearance and messages get dense ids in that order, so the
//!   same inputs always produce the same ids.
//! - [`render`] writes two files: per-module constants and macros, and a
//!   `<lib>_init_logdef` function that registers every message with a
//!   [`l4c::LoggerContext`].
//! - [`cli`] wires both together behind a `clap` command line.
//!
//! # Errors
//!
//! Only output failures are fatal. Unreadable catalogs and malformed lines are
//! reported through `tracing` and skipped.
//!
//! # Examples
//!
//! ```
//! use catalog::{Catalog, render};
//!
//! let mut catalog = Catalog::new();
//! catalog.parse_str("inline", "NET \"net\"\nLOG_WARNING DOWN \"link {} down\"\n");
//!
//! let mut init = Vec::new();
//! render::render_init(&catalog, "app", &mut init)?;
//! let init = String::from_utf8(init)?;
//! assert!(init.contains("ctx.register_message(0, ::l4c::Severity::Warning, \"NET_DOWN\")?;"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
mod error;
mod parse;
pub mod render;

pub use error::{Error, Result};
pub use parse::{Catalog, Entry, MessageDef, Module};
