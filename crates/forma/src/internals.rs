//! Form Integration Surface
//!
//! What a form-associated element pushes its submission value and validity
//! into, and what it reads `form`, `labels` and `willValidate` from.
//! [`ElementInternals`] is an in-memory implementation following the
//! `ElementInternals` rules of the HTML standard.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::error::ValidityError;
use crate::nested::{Anchor, NestedControls};
use crate::validity::ValidityFlags;
use crate::value::{SubmissionState, ValueState};

/// The form element owning a control
pub trait FormOwner {
    /// Run constraint validation on the whole form
    fn report_validity(&self) -> bool;

    /// Submit the form as if by its submit button
    fn request_submit(&self);
}

/// Form-participation surface of one element
pub trait FormInternals {
    /// Set the submission value and the restore state
    fn set_form_value(&self, submission: SubmissionState, state: ValueState);

    /// Set validity flags, message and focus anchor
    fn set_validity(
        &self,
        flags: ValidityFlags,
        message: &str,
        anchor: Option<Anchor>,
    ) -> Result<(), ValidityError>;

    /// Last submission value pushed
    fn submission(&self) -> Option<SubmissionState>;

    fn validity(&self) -> ValidityFlags;

    fn validation_message(&self) -> String;

    /// Whether the element is a candidate for constraint validation
    fn will_validate(&self) -> bool;

    fn check_validity(&self) -> bool {
        !self.will_validate() || self.validity().is_valid()
    }

    fn report_validity(&self) -> bool;

    fn form(&self) -> Option<Rc<dyn FormOwner>>;

    fn labels(&self) -> Vec<String>;

    /// Disabled and read-only elements are barred from constraint validation
    fn set_barred(&self, _disabled: bool, _read_only: bool) {}
}

/// Form data entries an element contributes under `name`.
///
/// Entry sets are contributed as-is; a string or file needs a non-empty name.
pub fn construct_entries(name: &str, submission: Option<&SubmissionState>) -> ValueState {
    let mut entries = ValueState::new();
    match submission {
        Some(SubmissionState::Entries(set)) => {
            for (n, v) in set.entries() {
                entries.append(n, v.clone());
            }
        }
        Some(SubmissionState::Text(s)) if !name.is_empty() => entries.append(name, s.as_str()),
        Some(SubmissionState::File(f)) if !name.is_empty() => entries.append(name, f.clone()),
        _ => {}
    }
    entries
}

/// In-memory form-integration surface
pub struct ElementInternals {
    controls: Rc<dyn NestedControls>,
    form: RefCell<Option<Rc<dyn FormOwner>>>,
    labels: RefCell<Vec<String>>,
    submission: RefCell<Option<SubmissionState>>,
    state: RefCell<Option<ValueState>>,
    flags: Cell<ValidityFlags>,
    message: RefCell<String>,
    anchor: RefCell<Option<Anchor>>,
    reported_anchor: RefCell<Option<String>>,
    disabled: Cell<bool>,
    read_only: Cell<bool>,
}

impl fmt::Debug for ElementInternals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementInternals")
            .field("submission", &self.submission.borrow())
            .field("flags", &self.flags.get())
            .field("message", &self.message.borrow())
            .field("has_form", &self.form.borrow().is_some())
            .finish()
    }
}

impl ElementInternals {
    /// Surface for an element whose nested controls are `controls`.
    /// Only those controls are accepted as validation anchors.
    pub fn new(controls: Rc<dyn NestedControls>) -> Self {
        Self {
            controls,
            form: RefCell::new(None),
            labels: RefCell::new(Vec::new()),
            submission: RefCell::new(None),
            state: RefCell::new(None),
            flags: Cell::new(ValidityFlags::valid()),
            message: RefCell::new(String::new()),
            anchor: RefCell::new(None),
            reported_anchor: RefCell::new(None),
            disabled: Cell::new(false),
            read_only: Cell::new(false),
        }
    }

    pub fn set_form_owner(&self, form: Option<Rc<dyn FormOwner>>) {
        *self.form.borrow_mut() = form;
    }

    pub fn set_labels(&self, labels: Vec<String>) {
        *self.labels.borrow_mut() = labels;
    }

    /// Restore state pushed with the last submission value
    pub fn state(&self) -> Option<ValueState> {
        self.state.borrow().clone()
    }

    /// Name of the current validation anchor
    pub fn anchor_name(&self) -> Option<String> {
        self.anchor.borrow().as_ref().map(|a| a.name())
    }

    /// Anchor focused by the last failed `report_validity`
    pub fn reported_anchor(&self) -> Option<String> {
        self.reported_anchor.borrow().clone()
    }

    fn owns(&self, anchor: &Anchor) -> bool {
        self.controls
            .query()
            .is_some_and(|controls| controls.iter().any(|c| Rc::ptr_eq(c, anchor)))
    }
}

impl FormInternals for ElementInternals {
    fn set_form_value(&self, submission: SubmissionState, state: ValueState) {
        *self.submission.borrow_mut() = Some(submission);
        *self.state.borrow_mut() = Some(state);
    }

    fn set_validity(
        &self,
        flags: ValidityFlags,
        message: &str,
        anchor: Option<Anchor>,
    ) -> Result<(), ValidityError> {
        if !flags.is_valid() && message.is_empty() {
            return Err(ValidityError::MissingMessage);
        }
        if let Some(anchor) = &anchor {
            if !self.owns(anchor) {
                return Err(ValidityError::ForeignAnchor(anchor.name()));
            }
        }

        self.flags.set(flags);
        *self.message.borrow_mut() = if flags.is_valid() {
            String::new()
        } else {
            message.to_string()
        };
        *self.anchor.borrow_mut() = anchor;
        Ok(())
    }

    fn submission(&self) -> Option<SubmissionState> {
        self.submission.borrow().clone()
    }

    fn validity(&self) -> ValidityFlags {
        self.flags.get()
    }

    fn validation_message(&self) -> String {
        if self.will_validate() {
            self.message.borrow().clone()
        } else {
            String::new()
        }
    }

    fn will_validate(&self) -> bool {
        !self.disabled.get() && !self.read_only.get()
    }

    fn report_validity(&self) -> bool {
        if self.check_validity() {
            return true;
        }
        let focused = self.anchor_name();
        tracing::debug!(
            "Reporting invalid control: {} (anchor: {:?})",
            self.message.borrow(),
            focused
        );
        *self.reported_anchor.borrow_mut() = focused;
        false
    }

    fn form(&self) -> Option<Rc<dyn FormOwner>> {
        self.form.borrow().clone()
    }

    fn labels(&self) -> Vec<String> {
        self.labels.borrow().clone()
    }

    fn set_barred(&self, disabled: bool, read_only: bool) {
        self.disabled.set(disabled);
        self.read_only.set(read_only);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nested::{ControlList, InputControl, InputType};
    use crate::value::FileEntry;

    fn internals_with(control: &Anchor) -> ElementInternals {
        ElementInternals::new(Rc::new(ControlList::new(vec![control.clone()])))
    }

    #[test]
    fn test_invalid_requires_message() {
        let internals = ElementInternals::new(Rc::new(ControlList::empty()));
        assert_eq!(
            internals.set_validity(ValidityFlags::custom_error(), "", None),
            Err(ValidityError::MissingMessage)
        );
        assert!(internals.set_validity(ValidityFlags::custom_error(), "Bad", None).is_ok());
        assert_eq!(internals.validation_message(), "Bad");
        assert!(!internals.check_validity());
    }

    #[test]
    fn test_valid_clears_message() {
        let internals = ElementInternals::new(Rc::new(ControlList::empty()));
        internals
            .set_validity(ValidityFlags::custom_error(), "Bad", None)
            .unwrap();
        internals
            .set_validity(ValidityFlags::valid(), "ignored", None)
            .unwrap();
        assert_eq!(internals.validation_message(), "");
        assert!(internals.check_validity());
    }

    #[test]
    fn test_foreign_anchor_rejected() {
        let own: Anchor = Rc::new(InputControl::new("own", InputType::Text));
        let foreign: Anchor = Rc::new(InputControl::new("foreign", InputType::Text));
        let internals = internals_with(&own);

        assert!(internals
            .set_validity(ValidityFlags::custom_error(), "Bad", Some(own.clone()))
            .is_ok());
        assert_eq!(internals.anchor_name().as_deref(), Some("own"));
        assert_eq!(
            internals.set_validity(ValidityFlags::custom_error(), "Bad", Some(foreign)),
            Err(ValidityError::ForeignAnchor("foreign".into()))
        );
    }

    #[test]
    fn test_barred_element_is_valid() {
        let internals = ElementInternals::new(Rc::new(ControlList::empty()));
        internals
            .set_validity(ValidityFlags::custom_error(), "Bad", None)
            .unwrap();
        internals.set_barred(true, false);
        assert!(!internals.will_validate());
        assert!(internals.check_validity());
        assert_eq!(internals.validation_message(), "");
    }

    #[test]
    fn test_report_validity_records_anchor() {
        let own: Anchor = Rc::new(InputControl::new("day", InputType::Text));
        let internals = internals_with(&own);
        internals
            .set_validity(ValidityFlags::custom_error(), "Pick a day", Some(own))
            .unwrap();
        assert!(!internals.report_validity());
        assert_eq!(internals.reported_anchor().as_deref(), Some("day"));
    }

    #[test]
    fn test_entry_construction() {
        let text = SubmissionState::Text("7".into());
        assert_eq!(
            construct_entries("count", Some(&text)),
            ValueState::from_entries([("count", "7")])
        );
        assert!(construct_entries("", Some(&text)).is_empty());
        assert!(construct_entries("count", None).is_empty());

        let file = FileEntry::new("a.txt", "text/plain", vec![]);
        let entries = construct_entries("upload", Some(&SubmissionState::File(file.clone())));
        assert_eq!(entries, ValueState::from_entries([("upload", file)]));

        let set = ValueState::from_entries([("a", "1"), ("b", "2")]);
        assert_eq!(
            construct_entries("", Some(&SubmissionState::Entries(set.clone()))),
            set
        );
    }
}
