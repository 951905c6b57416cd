//! Context type for tracking which run produced an event

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Context identifying the origin of dispatched input
///
/// Every run of the sequencer carries a Context, and every key event it
/// synthesizes is stamped with it, so subscribers can tell runs apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Context {
    /// Unique identifier for this context (ULID)
    pub id: String,
}

impl Context {
    /// Create a new context with a fresh ULID
    pub fn new() -> Self {
        Self {
            id: Ulid::new().to_string(),
        }
    }

    /// Create a new context with a specific ID
    pub fn with_id(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_id() {
        assert_eq!(Context::with_id("run-1").id, "run-1");
    }

    #[test]
    fn test_fresh_ids_are_unique() {
        assert_ne!(Context::new().id, Context::new().id);
    }
}
