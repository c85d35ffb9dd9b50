//! Symbols: named algebraic indeterminates with process-unique serials.
//!
//! Two symbols with the same display name but distinct serials are distinct
//! algebraic entities; the serial, not the name, drives ordering and
//! equality. Serials are handed out by a global atomic counter, so creation
//! order fixes the canonical order deterministically within a process.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for symbol serials.
static NEXT_SYMBOL_SERIAL: AtomicU64 = AtomicU64::new(1);

fn next_serial() -> u64 {
    NEXT_SYMBOL_SERIAL.fetch_add(1, Ordering::Relaxed)
}

/// A named indeterminate.
#[derive(Debug, Clone)]
pub struct Symbol {
    name: Arc<str>,
    serial: u64,
}

impl Symbol {
    /// Create a fresh symbol. Each call mints a new serial, so calling this
    /// twice with the same name yields two distinct symbols.
    pub fn new(name: impl AsRef<str>) -> Self {
        Symbol {
            name: Arc::from(name.as_ref()),
            serial: next_serial(),
        }
    }

    /// Rebuild a symbol under an existing serial (archive support).
    pub(crate) fn with_serial(name: impl AsRef<str>, serial: u64) -> Self {
        // Keep the global counter ahead of resurrected serials so future
        // fresh symbols cannot collide.
        NEXT_SYMBOL_SERIAL.fetch_max(serial + 1, Ordering::Relaxed);
        Symbol {
            name: Arc::from(name.as_ref()),
            serial,
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Process-unique serial.
    pub fn serial(&self) -> u64 {
        self.serial
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.serial == other.serial
    }
}

impl Eq for Symbol {}

impl std::hash::Hash for Symbol {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.serial.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_distinct_serial() {
        let a = Symbol::new("x");
        let b = Symbol::new("x");
        assert_ne!(a, b);
        assert_eq!(a.name(), b.name());
        assert!(a.serial() < b.serial());
    }
}
