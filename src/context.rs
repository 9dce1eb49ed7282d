//! Execution context identity.
//!
//! Every protected browsing context (a frame, canvas element, or WebGL
//! context) is tracked under a logical identifier minted once at
//! registration time. Identifiers are never derived from memory
//! addresses: an address can be reused after teardown, which would
//! silently alias two unrelated contexts and leak spoofing state
//! between them.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque identity of a protected execution context.
///
/// Stable for the lifetime of the context. The collaborator that
/// registered the context must stop using the id after teardown and
/// must never hand it to a different context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u64);

impl ContextId {
    /// Wraps an externally managed identifier.
    ///
    /// For bindings that already maintain a stable context numbering
    /// of their own. External and engine-minted identifiers must not
    /// share a numbering space within one process.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier value.
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx-{}", self.0)
    }
}

/// Monotonic source of fresh [`ContextId`]s.
///
/// Identifiers start at 1 and never repeat within a process, so a
/// destroyed context cannot alias a live one.
#[derive(Debug)]
pub struct ContextMinter {
    next: AtomicU64,
}

impl ContextMinter {
    /// Creates a minter starting at identifier 1.
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Mints the next unused identifier.
    pub fn mint(&self) -> ContextId {
        ContextId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ContextMinter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minted_ids_are_unique_and_increasing() {
        let minter = ContextMinter::new();
        let a = minter.mint();
        let b = minter.mint();
        let c = minter.mint();

        assert!(a < b && b < c);
    }

    #[test]
    fn test_display_format() {
        assert_eq!(ContextId::from_raw(42).to_string(), "ctx-42");
    }

    #[test]
    fn test_raw_round_trip() {
        assert_eq!(ContextId::from_raw(7).as_u64(), 7);
    }
}
