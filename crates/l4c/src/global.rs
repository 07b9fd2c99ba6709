//! crates/l4c/src/global.rs
//! Process-wide context table.
//!
//! Libraries that want a shared table without threading one through their
//! APIs call [`init`] once at startup and [`global`] afterwards. The table
//! lives for the rest of the process; [`shutdown`] flushes and closes its
//! contexts but leaves the (now empty) table usable.

use std::sync::{Arc, OnceLock};

use crate::clock::SystemClock;
use crate::config::TableConfig;
use crate::error::Result;
use crate::table::ContextTable;

static GLOBAL: OnceLock<ContextTable> = OnceLock::new();

/// Initializes the process-wide table with default sizing.
pub fn init() -> &'static ContextTable {
    init_with(TableConfig::default())
}

/// Initializes the process-wide table with `config`.
///
/// The first call wins; later calls return the existing table and ignore
/// their `config`.
pub fn init_with(config: TableConfig) -> &'static ContextTable {
    GLOBAL.get_or_init(|| ContextTable::with_config(config, Arc::new(SystemClock)))
}

/// The process-wide table, if [`init`] has run.
pub fn global() -> Option<&'static ContextTable> {
    GLOBAL.get()
}

/// Tears down every context of the process-wide table.
pub fn shutdown() -> Result<()> {
    GLOBAL.get().map_or(Ok(()), ContextTable::shutdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::destination::Destination;

    #[test]
    fn init_is_idempotent_and_shutdown_empties() {
        let first = init();
        let second = init_with(TableConfig::default().with_max_contexts(1));
        assert!(std::ptr::eq(first, second));
        assert!(global().is_some());

        let handle = first.open(Destination::Stderr).unwrap();
        shutdown().unwrap();
        assert!(first.get(handle).is_none());
        assert_eq!(first.live_contexts(), 0);
    }
}
