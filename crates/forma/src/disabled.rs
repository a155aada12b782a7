//! Disabled State
//!
//! Composition of the element's own `disabled` attribute with the state
//! inherited from a disabled ancestor field group.

use std::cell::Cell;

/// Two independently tracked disabled sources, OR-composed
#[derive(Debug, Default)]
pub struct DisabledState {
    attribute: Cell<bool>,
    ancestor: Cell<bool>,
}

impl DisabledState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the source driven by the element's own attribute.
    /// Returns whether the composed state changed.
    pub fn set_attribute_source(&self, disabled: bool) -> bool {
        let before = self.is_disabled();
        self.attribute.set(disabled);
        before != self.is_disabled()
    }

    /// Update the source driven by an ancestor field group.
    /// Returns whether the composed state changed.
    pub fn set_ancestor_source(&self, disabled: bool) -> bool {
        let before = self.is_disabled();
        self.ancestor.set(disabled);
        before != self.is_disabled()
    }

    pub fn attribute_disabled(&self) -> bool {
        self.attribute.get()
    }

    pub fn ancestor_disabled(&self) -> bool {
        self.ancestor.get()
    }

    /// Composed state
    pub fn is_disabled(&self) -> bool {
        self.attribute.get() || self.ancestor.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_either_source_disables() {
        let state = DisabledState::new();
        assert!(!state.is_disabled());

        assert!(state.set_attribute_source(true));
        assert!(state.is_disabled());
        assert!(!state.ancestor_disabled());
    }

    #[test]
    fn test_clearing_one_source_keeps_other() {
        let state = DisabledState::new();
        state.set_attribute_source(true);
        assert!(!state.set_ancestor_source(true));

        assert!(!state.set_attribute_source(false));
        assert!(state.is_disabled());
        assert!(state.ancestor_disabled());

        assert!(state.set_ancestor_source(false));
        assert!(!state.is_disabled());
    }
}
