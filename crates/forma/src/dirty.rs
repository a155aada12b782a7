//! Dirty Tracking
//!
//! Whether live input should win over externally supplied defaults.

use std::cell::Cell;

/// Dirty flag of one control instance.
///
/// False at construction and after a form reset. Set by user input and by
/// programmatic value assignment, never by attribute-driven updates.
#[derive(Debug, Default)]
pub struct DirtyTracker {
    dirty: Cell<bool>,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_dirty(&self) {
        self.dirty.set(true);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    pub fn reset(&self) {
        self.dirty.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_clean() {
        assert!(!DirtyTracker::new().is_dirty());
    }

    #[test]
    fn test_mark_and_reset() {
        let dirty = DirtyTracker::new();
        dirty.mark_dirty();
        dirty.mark_dirty();
        assert!(dirty.is_dirty());
        dirty.reset();
        assert!(!dirty.is_dirty());
    }
}
