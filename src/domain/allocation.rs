//! Allocated-hour bookkeeping for one chromosome construction.

use std::collections::HashMap;

use super::types::{GroupId, ModuleId};

/// Counts the hours already emitted per (group, module).
///
/// A tracker lives for exactly one call to
/// [`Individual::from_seed`](crate::ga::Individual::from_seed); the domain
/// model itself is never mutated while seeding.
#[derive(Debug, Default, Clone)]
pub struct AllocationTracker {
    allocated: HashMap<(GroupId, ModuleId), u32>,
}

impl AllocationTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one more allocated hour.
    pub fn increase(&mut self, group: GroupId, module: ModuleId) {
        *self.allocated.entry((group, module)).or_insert(0) += 1;
    }

    /// Hours allocated so far.
    pub fn allocated(&self, group: GroupId, module: ModuleId) -> u32 {
        self.allocated.get(&(group, module)).copied().unwrap_or(0)
    }

    /// Whether the allocation has reached `required`.
    pub fn is_satisfied(&self, group: GroupId, module: ModuleId, required: u32) -> bool {
        self.allocated(group, module) >= required
    }

    /// Total hours allocated across all groups and modules.
    pub fn total(&self) -> u32 {
        self.allocated.values().sum()
    }
}
