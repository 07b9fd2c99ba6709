//! crates/catalog/src/parse.rs
//! Line-oriented catalog parser.
//!
//! A catalog is plain text. Atoms are separated by spaces and leading spaces
//! are ignored:
//!
//! ```text
//! # comment
//! FOO "foo"
//! LOG_INFO  QWE "started with {} workers"
//! LOG_ERR   ASD "cannot bind {}: {}"
//! ```
//!
//! - A line whose first atom starts with `#` is a comment.
//! - Two atoms open a module (`ID display-name`). Naming a module that was
//!   already seen re-opens it; its display name is kept from the first time.
//! - Three atoms declare a message of the current module
//!   (`SEVERITY MSG_ID format`). The format is the rest of the line.
//!
//! Anything else is skipped with a warning, as are messages that appear
//! before any module, carry an unknown severity, or repeat an id within
//! their module.

use std::fs;
use std::path::Path;

use l4c::Severity;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// One message declaration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MessageDef {
    /// Message id as written in the catalog.
    pub id: String,
    /// Registered severity.
    pub severity: Severity,
    /// Format value as written in the catalog (quoted or not).
    pub format: String,
}

/// A module and the messages declared under it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Module {
    /// Module id as written in the catalog.
    pub id: String,
    /// Display name value as written in the catalog.
    pub display_name: String,
    /// Messages in declaration order.
    pub messages: Vec<MessageDef>,
}

impl Module {
    fn new(id: &str, display_name: &str) -> Self {
        Self {
            id: id.to_owned(),
            display_name: display_name.to_owned(),
            messages: Vec::new(),
        }
    }

    /// Name registered with the runtime for `message`: `<MODULE>_<MESSAGE>`.
    pub fn registered_name(&self, message: &MessageDef) -> String {
        format!("{}_{}", self.id, message.id)
    }
}

/// A message together with its assigned numeric id.
#[derive(Clone, Copy, Debug)]
pub struct Entry<'a> {
    /// Dense message id.
    pub index: usize,
    /// Owning module.
    pub module: &'a Module,
    /// The declaration.
    pub message: &'a MessageDef,
}

/// Parsed catalog: modules in order of first appearance.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Catalog {
    modules: Vec<Module>,
}

#[derive(Debug, Eq, PartialEq)]
enum Line<'a> {
    Blank,
    Comment,
    Module { id: &'a str, name: &'a str },
    Message { level: &'a str, id: &'a str, format: &'a str },
    Invalid,
}

fn classify(line: &str) -> Line<'_> {
    let line = line.trim_end_matches(['\r', '\n']).trim_start_matches(' ');
    if line.is_empty() {
        return Line::Blank;
    }
    if line.starts_with('#') {
        return Line::Comment;
    }
    let Some((first, rest)) = line.split_once(' ') else {
        return Line::Invalid;
    };
    let rest = rest.trim_start_matches(' ');
    if rest.is_empty() {
        return Line::Invalid;
    }
    match rest.split_once(' ') {
        None => Line::Module {
            id: first,
            name: rest,
        },
        Some((second, format)) => {
            let format = format.trim_matches(' ');
            if format.is_empty() {
                Line::Module {
                    id: first,
                    name: second,
                }
            } else {
                Line::Message {
                    level: first,
                    id: second,
                    format,
                }
            }
        }
    }
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses every readable file in `paths`, in order.
    ///
    /// Unreadable files are skipped with a warning.
    pub fn load<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut catalog = Self::new();
        for path in paths {
            if let Err(error) = catalog.read_file(path.as_ref()) {
                warn!(target: "catalog", %error, "ignoring catalog file");
            }
        }
        catalog
    }

    /// Parses one catalog file into this catalog.
    pub fn read_file(&mut self, path: &Path) -> Result<()> {
        let source = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_str(&path.display().to_string(), &source);
        Ok(())
    }

    /// Parses catalog text. `origin` only labels diagnostics.
    ///
    /// # Examples
    ///
    /// ```
    /// use catalog::Catalog;
    ///
    /// let mut catalog = Catalog::new();
    /// catalog.parse_str("inline", "FOO \"Foo\"\nLOG_INFO QWE \"hello {}\"\n");
    /// let entry = catalog.entries().next().unwrap();
    /// assert_eq!(entry.index, 0);
    /// assert_eq!(entry.module.registered_name(entry.message), "FOO_QWE");
    /// ```
    pub fn parse_str(&mut self, origin: &str, source: &str) {
        // Module state is per input; a file never continues the previous one.
        let mut current: Option<usize> = None;
        for (number, line) in source.lines().enumerate() {
            let number = number + 1;
            match classify(line) {
                Line::Blank | Line::Comment => {}
                Line::Invalid => {
                    warn!(target: "catalog", origin, line = number, text = line, "skipping invalid line");
                }
                Line::Module { id, name } => {
                    current = Some(self.open_module(id, name));
                }
                Line::Message { level, id, format } => {
                    let Some(module) = current else {
                        warn!(target: "catalog", origin, line = number, text = line, "no module context, ignoring line");
                        continue;
                    };
                    let severity = match level.parse::<Severity>() {
                        Ok(severity) => severity,
                        Err(error) => {
                            warn!(target: "catalog", origin, line = number, %error, "ignoring message");
                            continue;
                        }
                    };
                    let module = &mut self.modules[module];
                    if module.messages.iter().any(|message| message.id == id) {
                        warn!(target: "catalog", origin, line = number, module = %module.id, msg = id, "duplicate message id, ignoring");
                        continue;
                    }
                    debug!(target: "catalog", module = %module.id, msg = id, ?severity, "declared message");
                    module.messages.push(MessageDef {
                        id: id.to_owned(),
                        severity,
                        format: format.to_owned(),
                    });
                }
            }
        }
    }

    fn open_module(&mut self, id: &str, name: &str) -> usize {
        if let Some(index) = self.modules.iter().position(|module| module.id == id) {
            return index;
        }
        debug!(target: "catalog", module = id, "opened module");
        self.modules.push(Module::new(id, name));
        self.modules.len() - 1
    }

    /// Modules in order of first appearance.
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Every message with its dense id: modules in first-appearance order,
    /// messages in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = Entry<'_>> {
        self.modules
            .iter()
            .flat_map(|module| module.messages.iter().map(move |message| (module, message)))
            .enumerate()
            .map(|(index, (module, message))| Entry {
                index,
                module,
                message,
            })
    }

    /// Total number of messages.
    pub fn len(&self) -> usize {
        self.modules.iter().map(|module| module.messages.len()).sum()
    }

    /// Whether no message was declared.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
