//! Fieldset
//!
//! Field group whose disabled state is inherited by the form elements and
//! field groups inside it.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::element::FormElement;

/// Fieldset element - groups related form controls
#[derive(Debug, Default)]
pub struct Fieldset {
    /// Fieldset name
    pub name: Option<String>,
    /// Legend text
    pub legend: Option<String>,
    disabled: Cell<bool>,
    inherited: Cell<bool>,
    elements: RefCell<Vec<Weak<FormElement>>>,
    fieldsets: RefCell<Vec<Weak<Fieldset>>>,
}

impl Fieldset {
    /// Create a new fieldset
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the legend
    pub fn with_legend(mut self, text: impl Into<String>) -> Self {
        self.legend = Some(text.into());
        self
    }

    /// Disabled by its own attribute or by an enclosing fieldset
    pub fn is_disabled(&self) -> bool {
        self.disabled.get() || self.inherited.get()
    }

    /// Add a form element; it immediately inherits the current state
    pub fn add_element(&self, element: &Rc<FormElement>) {
        self.elements.borrow_mut().push(Rc::downgrade(element));
        if self.is_disabled() {
            element.form_disabled_callback(true);
        }
    }

    /// Nest another fieldset
    pub fn add_fieldset(&self, fieldset: &Rc<Fieldset>) {
        self.fieldsets.borrow_mut().push(Rc::downgrade(fieldset));
        fieldset.set_inherited(self.is_disabled());
    }

    /// Set the `disabled` attribute
    pub fn set_disabled(&self, disabled: bool) {
        let before = self.is_disabled();
        self.disabled.set(disabled);
        self.propagate(before);
    }

    fn set_inherited(&self, disabled: bool) {
        let before = self.is_disabled();
        self.inherited.set(disabled);
        self.propagate(before);
    }

    fn propagate(&self, before: bool) {
        let now = self.is_disabled();
        if now == before {
            return;
        }
        tracing::debug!("Fieldset {:?} disabled: {}", self.name, now);

        // Drop elements that no longer exist
        self.elements.borrow_mut().retain(|e| e.strong_count() > 0);
        self.fieldsets.borrow_mut().retain(|f| f.strong_count() > 0);

        let elements: Vec<_> = self.elements.borrow().iter().filter_map(Weak::upgrade).collect();
        for element in elements {
            element.form_disabled_callback(now);
        }
        let fieldsets: Vec<_> = self.fieldsets.borrow().iter().filter_map(Weak::upgrade).collect();
        for fieldset in fieldsets {
            fieldset.set_inherited(now);
        }
    }

    /// Number of live form elements in this fieldset
    pub fn len(&self) -> usize {
        self.elements
            .borrow()
            .iter()
            .filter(|e| e.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internals::ElementInternals;
    use crate::nested::ControlList;
    use crate::registry::{FormElementBuilder, FormElementDefinition};
    use crate::store::{RenderTrigger, ViewState};

    struct NoRender;

    impl RenderTrigger for NoRender {
        fn request_render(&self, _view: &ViewState) {}
    }

    fn element() -> Rc<FormElement> {
        let controls = Rc::new(ControlList::empty());
        let element = FormElementBuilder::new(Rc::new(FormElementDefinition::new("x-field")))
            .nested(controls.clone())
            .internals(Rc::new(ElementInternals::new(controls)))
            .render(Rc::new(NoRender))
            .build()
            .unwrap();
        Rc::new(element)
    }

    #[test]
    fn test_disabling_fieldset_disables_elements() {
        let fieldset = Fieldset::new().with_legend("Colors");
        let element = element();
        fieldset.add_element(&element);

        fieldset.set_disabled(true);
        assert!(element.disabled_state());
        assert!(!element.disabled());

        fieldset.set_disabled(false);
        assert!(!element.disabled_state());
    }

    #[test]
    fn test_added_element_inherits_state() {
        let fieldset = Fieldset::new();
        fieldset.set_disabled(true);
        let element = element();
        fieldset.add_element(&element);
        assert!(element.disabled_state());
    }

    #[test]
    fn test_nested_fieldsets() {
        let outer = Fieldset::new();
        let inner = Rc::new(Fieldset::new());
        outer.add_fieldset(&inner);
        let element = element();
        inner.add_element(&element);

        outer.set_disabled(true);
        assert!(inner.is_disabled());
        assert!(element.disabled_state());

        inner.set_disabled(true);
        outer.set_disabled(false);
        assert!(element.disabled_state());
    }

    #[test]
    fn test_dropped_elements_are_forgotten() {
        let fieldset = Fieldset::new();
        {
            let element = element();
            fieldset.add_element(&element);
            assert_eq!(fieldset.len(), 1);
        }
        assert!(fieldset.is_empty());
        fieldset.set_disabled(true);
    }
}
