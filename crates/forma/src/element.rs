//! Form Element
//!
//! The form-control contract of a composite element: `value`,
//! `defaultValue`, `disabled`, reflected attributes, constraint validation
//! and the entry points that run the update cycle.

use std::cell::RefCell;
use std::rc::Rc;

use crate::attributes::{Attr, AttributeMap};
use crate::codec::CodecContext;
use crate::config::Config;
use crate::cycle::{CycleOutcome, CycleSteps, Trigger, UpdateCycle};
use crate::dirty::DirtyTracker;
use crate::disabled::DisabledState;
use crate::error::{CodecError, FormError, Result, ValidityError};
use crate::internals::{construct_entries, FormInternals, FormOwner};
use crate::nested::{first_control_name, read_value_state, NestedControls};
use crate::registry::FormElementDefinition;
use crate::store::{RenderTrigger, Store, ViewState};
use crate::validity::{compose_validity, ValidityFlags};
use crate::value::{SubmissionState, ValueState};

const FALLBACK_MESSAGE: &str = "Please enter a valid value.";

/// A form-associated composite control
pub struct FormElement {
    definition: Rc<FormElementDefinition>,
    config: Config,
    nested: Rc<dyn NestedControls>,
    internals: Rc<dyn FormInternals>,
    attributes: RefCell<AttributeMap>,
    view: Store<ViewState>,
    dirty: DirtyTracker,
    disabled: DisabledState,
    cycle: UpdateCycle,
    custom_message: RefCell<String>,
}

impl std::fmt::Debug for FormElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormElement")
            .field("tag", &self.definition.name)
            .field("attributes", &self.attributes.borrow())
            .field("view", &self.view.get())
            .field("dirty", &self.dirty.is_dirty())
            .finish()
    }
}

impl FormElement {
    pub(crate) fn new(
        definition: Rc<FormElementDefinition>,
        nested: Rc<dyn NestedControls>,
        internals: Rc<dyn FormInternals>,
        render: Rc<dyn RenderTrigger>,
        config: Config,
    ) -> Self {
        let view = Store::with_max_rounds(ViewState::default(), config.max_notify_rounds);
        view.subscribe(move |view: &ViewState| render.request_render(view));
        Self {
            definition,
            config,
            nested,
            internals,
            attributes: RefCell::new(AttributeMap::new()),
            view,
            dirty: DirtyTracker::new(),
            disabled: DisabledState::new(),
            cycle: UpdateCycle::new(),
            custom_message: RefCell::new(String::new()),
        }
    }

    pub fn tag_name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &FormElementDefinition {
        &self.definition
    }

    pub fn internals(&self) -> &Rc<dyn FormInternals> {
        &self.internals
    }

    pub fn cycle(&self) -> &UpdateCycle {
        &self.cycle
    }

    // ------------------------------------------------------------------
    // Value surface
    // ------------------------------------------------------------------

    /// `value` getter: the current value state as attribute text
    pub fn value(&self) -> Result<String> {
        let value = self.view.with(|view| self.definition.codec.value_to_attribute(&view.value))?;
        Ok(value)
    }

    /// `value` setter
    pub fn set_value(&self, value: &str) -> Result<CycleOutcome> {
        let state = self
            .with_codec_context(|cx| self.definition.codec.attribute_to_value(value, cx))?;
        let outcome = self.run_cycle(Trigger::ValueAssigned, state)?;
        if outcome.is_applied() {
            self.dirty.mark_dirty();
        }
        Ok(outcome)
    }

    /// `defaultValue` getter: the `value` content attribute, literally
    pub fn default_value(&self) -> String {
        self.get_attribute("value").unwrap_or_default()
    }

    /// `defaultValue` setter
    pub fn set_default_value(&self, value: &str) -> Result<CycleOutcome> {
        let mut outcome = CycleOutcome::SkippedDirty;
        if !self.dirty.is_dirty() {
            let state = self
                .with_codec_context(|cx| self.definition.codec.attribute_to_value(value, cx))?;
            outcome = self.run_cycle(Trigger::DefaultValue, state)?;
        }
        self.set_attribute("value", value)?;
        Ok(outcome)
    }

    /// Current value state, as the last cycle cached it
    pub fn value_state(&self) -> ValueState {
        self.view.with(|view| view.value.clone())
    }

    /// Render-facing state
    pub fn view(&self) -> ViewState {
        self.view.get()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.is_dirty()
    }

    /// Form data entries this element contributes on submission
    pub fn form_entries(&self) -> ValueState {
        if self.disabled.is_disabled() {
            return ValueState::new();
        }
        construct_entries(&self.name(), self.internals.submission().as_ref())
    }

    // ------------------------------------------------------------------
    // Reflected attributes
    // ------------------------------------------------------------------

    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow().get(name).map(str::to_string)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.borrow().has(name)
    }

    /// Set a content attribute and react if it is observed
    pub fn set_attribute(&self, name: &str, value: &str) -> Result<CycleOutcome> {
        let old = self.attributes.borrow_mut().set(name, value);
        self.notify_attribute(name, old, Some(value.to_string()))
    }

    /// Remove a content attribute and react if it is observed
    pub fn remove_attribute(&self, name: &str) -> Result<CycleOutcome> {
        let old = self.attributes.borrow_mut().remove(name);
        if old.is_none() {
            return Ok(CycleOutcome::NotRun);
        }
        self.notify_attribute(name, old, None)
    }

    fn toggle_attribute(&self, name: &str, present: bool) -> Result<CycleOutcome> {
        if present {
            if self.has_attribute(name) {
                return Ok(CycleOutcome::NotRun);
            }
            self.set_attribute(name, "")
        } else {
            self.remove_attribute(name)
        }
    }

    fn notify_attribute(
        &self,
        name: &str,
        old: Option<String>,
        new: Option<String>,
    ) -> Result<CycleOutcome> {
        if !self.definition.observes(name) {
            return Ok(CycleOutcome::NotRun);
        }
        self.attribute_changed(&name.to_ascii_lowercase(), old.as_deref(), new.as_deref())
    }

    /// `disabled` getter: only the element's own attribute
    pub fn disabled(&self) -> bool {
        self.has_attribute("disabled")
    }

    pub fn set_disabled(&self, disabled: bool) -> Result<CycleOutcome> {
        self.toggle_attribute("disabled", disabled)
    }

    /// Composed disabled state, including a disabled ancestor field group
    pub fn disabled_state(&self) -> bool {
        self.disabled.is_disabled()
    }

    pub fn name(&self) -> String {
        self.get_attribute("name").unwrap_or_default()
    }

    pub fn set_name(&self, name: &str) -> Result<CycleOutcome> {
        self.set_attribute("name", name)
    }

    pub fn required(&self) -> bool {
        self.has_attribute("required")
    }

    pub fn set_required(&self, required: bool) -> Result<CycleOutcome> {
        self.toggle_attribute("required", required)
    }

    pub fn read_only(&self) -> bool {
        self.has_attribute("readonly")
    }

    pub fn set_read_only(&self, read_only: bool) -> Result<CycleOutcome> {
        self.toggle_attribute("readonly", read_only)
    }

    /// `type` IDL attribute
    pub fn type_name(&self) -> String {
        self.definition.type_name()
    }

    // ------------------------------------------------------------------
    // Constraint validation
    // ------------------------------------------------------------------

    pub fn check_validity(&self) -> bool {
        self.internals.check_validity()
    }

    pub fn report_validity(&self) -> bool {
        self.internals.report_validity()
    }

    /// Set a custom error message; an empty message clears it
    pub fn set_custom_validity(&self, message: &str) -> Result<()> {
        *self.custom_message.borrow_mut() = message.to_string();
        self.update_validity()
    }

    /// Recompose validity from the nested controls without running a cycle,
    /// e.g. after their constraints changed
    pub fn update_validity(&self) -> Result<()> {
        self.refresh_validity()?;
        Ok(())
    }

    pub fn validity(&self) -> ValidityFlags {
        self.internals.validity()
    }

    pub fn validation_message(&self) -> String {
        self.internals.validation_message()
    }

    pub fn will_validate(&self) -> bool {
        self.internals.will_validate()
    }

    pub fn labels(&self) -> Vec<String> {
        self.internals.labels()
    }

    pub fn form(&self) -> Option<Rc<dyn FormOwner>> {
        self.internals.form()
    }

    // ------------------------------------------------------------------
    // Entry points
    // ------------------------------------------------------------------

    /// User input inside the nested structure
    pub fn handle_input(&self) -> Result<CycleOutcome> {
        let outcome = self.run_cycle(Trigger::Input, self.read_nested())?;
        if outcome.is_applied() {
            self.dirty.mark_dirty();
        }
        Ok(outcome)
    }

    /// Observed attribute changed
    pub fn attribute_changed(
        &self,
        name: &str,
        old: Option<&str>,
        new: Option<&str>,
    ) -> Result<CycleOutcome> {
        tracing::debug!(
            "<{}> attribute {} changed: {:?} -> {:?}",
            self.tag_name(),
            name,
            old,
            new
        );
        match name {
            "value" => {
                if self.dirty.is_dirty() {
                    tracing::debug!(
                        "<{}> value attribute ignored, live value is dirty",
                        self.tag_name()
                    );
                    return Ok(CycleOutcome::SkippedDirty);
                }
                let state = match new {
                    Some(text) => self.value_from_attribute(text)?,
                    None => self.read_nested(),
                };
                self.run_cycle(Trigger::AttributeChanged, state)
            }
            "disabled" => {
                self.disabled.set_attribute_source(new.is_some());
                self.refresh_view();
                self.refresh_validity()?;
                Ok(CycleOutcome::NotRun)
            }
            // required, readonly and definition-specific attributes render
            // into the nested controls, which may change their validity
            _ => {
                self.refresh_view();
                self.refresh_validity()?;
                Ok(CycleOutcome::NotRun)
            }
        }
    }

    /// Form owner reset
    pub fn form_reset(&self) -> Result<CycleOutcome> {
        let attribute = self
            .get_attribute("value")
            .unwrap_or_else(|| self.config.reset_fallback.clone());
        let outcome = self
            .value_from_attribute(&attribute)
            .map_err(FormError::from)
            .and_then(|state| self.run_cycle(Trigger::Reset, state));
        self.dirty.reset();
        outcome
    }

    /// An ancestor field group changed its disabled state.
    /// Re-renders only; value, submission and validity are unaffected.
    pub fn form_disabled_callback(&self, disabled: bool) {
        tracing::debug!("<{}> form disabled: {}", self.tag_name(), disabled);
        if self.disabled.set_ancestor_source(disabled) {
            self.refresh_view();
        }
    }

    /// Element connected to a document; takes the nested structure as baseline
    pub fn connected(&self) -> Result<CycleOutcome> {
        self.run_cycle(Trigger::Connected, self.read_nested())
    }

    /// Restore a previously pushed state, e.g. after navigation
    pub fn form_state_restore(
        &self,
        state: &SubmissionState,
        mode: crate::lifecycle::RestoreMode,
    ) -> Result<CycleOutcome> {
        tracing::debug!("<{}> form state restore ({:?})", self.tag_name(), mode);
        let value = self
            .with_codec_context(|cx| self.definition.codec.submission_to_value(state, cx))?;
        let outcome = self.run_cycle(Trigger::Restore, value)?;
        if outcome.is_applied() {
            self.dirty.mark_dirty();
        }
        Ok(outcome)
    }

    /// Submit of the nested structure's own form, redirected to the form owner.
    /// Returns whether a submission was requested.
    pub fn handle_inner_submit(&self) -> bool {
        let Some(form) = self.form() else {
            tracing::debug!("<{}> inner submit without form owner", self.tag_name());
            return false;
        };
        if !form.report_validity() {
            return false;
        }
        form.request_submit();
        true
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn run_cycle(&self, trigger: Trigger, value: ValueState) -> Result<CycleOutcome> {
        self.cycle.run(self.tag_name(), trigger, value, self)
    }

    fn read_nested(&self) -> ValueState {
        read_value_state(self.nested.query().as_deref())
    }

    fn with_codec_context<R>(&self, f: impl FnOnce(CodecContext<'_>) -> R) -> R {
        let first = first_control_name(self.nested.query().as_deref());
        f(CodecContext::new(first.as_deref()))
    }

    /// Value state for attribute text. A custom `submission_to_value`
    /// strategy takes precedence over `attribute_to_value`.
    fn value_from_attribute(&self, text: &str) -> std::result::Result<ValueState, CodecError> {
        let codec = &self.definition.codec;
        self.with_codec_context(|cx| {
            if codec.has_submission_to_value() {
                codec.submission_to_value(&SubmissionState::Text(text.to_string()), cx)
            } else {
                codec.attribute_to_value(text, cx)
            }
        })
    }

    fn refresh_view(&self) {
        let disabled = self.disabled.is_disabled();
        let read_only = self.read_only();
        let required = self.required();
        let attributes: Vec<Attr> = self
            .attributes
            .borrow()
            .iter()
            .filter(|a| self.definition.observes(&a.name))
            .cloned()
            .collect();
        self.internals.set_barred(disabled, read_only);
        self.view.update(|view| {
            view.disabled = disabled;
            view.read_only = read_only;
            view.required = required;
            view.attributes = attributes;
        });
    }

    fn refresh_validity(&self) -> std::result::Result<(), ValidityError> {
        let controls = self.nested.query().unwrap_or_default();
        let composed = compose_validity(&controls, self.definition.validation_message.as_deref());
        let custom = self.custom_message.borrow().clone();

        let mut flags = composed.flags;
        let mut message = composed.message;
        if !custom.is_empty() {
            flags.custom_error = true;
            message = custom;
        }
        if !flags.is_valid() && message.is_empty() {
            message = match flags.default_message() {
                "" => FALLBACK_MESSAGE.to_string(),
                m => m.to_string(),
            };
        }
        self.internals.set_validity(flags, &message, composed.anchor)
    }
}

impl CycleSteps for FormElement {
    fn cache(&self, value: ValueState) {
        self.view.stage(|view| view.value = value);
    }

    fn notify_render(&self) {
        self.view.notify();
    }

    fn to_submission(&self, value: &ValueState) -> std::result::Result<SubmissionState, CodecError> {
        self.definition.codec.value_to_submission(value)
    }

    fn push_form_value(&self, submission: SubmissionState, value: ValueState) {
        self.internals.set_form_value(submission, value);
    }

    fn push_validity(&self) -> std::result::Result<(), ValidityError> {
        self.refresh_validity()
    }
}
