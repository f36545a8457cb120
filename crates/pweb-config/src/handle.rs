//! Shared, swappable handle to the active section tree.
//!
//! Readers take an `Arc` snapshot and resolve against it; a reload builds a
//! complete new tree and replaces the snapshot in one step. A snapshot held
//! by an in-flight request is never modified.

use std::sync::{Arc, RwLock};
use tracing::info;

use crate::tree::SectionTree;

#[derive(Debug)]
pub struct TreeHandle {
    current: RwLock<Arc<SectionTree>>,
}

impl TreeHandle {
    pub fn new(tree: SectionTree) -> Self {
        Self {
            current: RwLock::new(Arc::new(tree)),
        }
    }

    /// Snapshot of the active tree.
    pub fn current(&self) -> Arc<SectionTree> {
        // A poisoned lock still guards a complete Arc; the tree itself is immutable.
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Replace the active tree, returning the previous one.
    pub fn swap(&self, tree: SectionTree) -> Arc<SectionTree> {
        let next = Arc::new(tree);
        let sections = next.path_sections().count();
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        let previous = std::mem::replace(&mut *guard, next);
        drop(guard);
        info!(sections, "Swapped site configuration");
        previous
    }
}
