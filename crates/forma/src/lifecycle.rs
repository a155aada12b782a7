//! Lifecycle Reactions
//!
//! Custom element lifecycle callbacks delivered to a form element.

use crate::cycle::CycleOutcome;
use crate::element::FormElement;
use crate::error::Result;
use crate::value::SubmissionState;

/// Why a form state is being restored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreMode {
    /// Session history navigation or reload
    Restore,
    /// User agent autofill
    Autocomplete,
}

/// Lifecycle reaction
#[derive(Debug, Clone, PartialEq)]
pub enum Reaction {
    Connected,
    Disconnected,
    /// A content attribute was set (`Some`) or removed (`None`)
    AttributeChanged {
        name: String,
        value: Option<String>,
    },
    FormAssociated {
        has_form: bool,
    },
    FormDisabled(bool),
    FormReset,
    FormStateRestore {
        state: SubmissionState,
        mode: RestoreMode,
    },
    /// Input event from the nested structure
    Input,
    /// Submit event from the nested structure
    InnerSubmit,
}

impl FormElement {
    /// Route a lifecycle reaction to its handler
    pub fn dispatch(&self, reaction: Reaction) -> Result<CycleOutcome> {
        match reaction {
            Reaction::Connected => self.connected(),
            Reaction::Disconnected => {
                tracing::debug!("<{}> disconnected", self.tag_name());
                Ok(CycleOutcome::NotRun)
            }
            Reaction::AttributeChanged { name, value } => match value {
                Some(value) => self.set_attribute(&name, &value),
                None => self.remove_attribute(&name),
            },
            Reaction::FormAssociated { has_form } => {
                tracing::debug!("<{}> form associated: {}", self.tag_name(), has_form);
                Ok(CycleOutcome::NotRun)
            }
            Reaction::FormDisabled(disabled) => {
                self.form_disabled_callback(disabled);
                Ok(CycleOutcome::NotRun)
            }
            Reaction::FormReset => self.form_reset(),
            Reaction::FormStateRestore { state, mode } => self.form_state_restore(&state, mode),
            Reaction::Input => self.handle_input(),
            Reaction::InnerSubmit => {
                self.handle_inner_submit();
                Ok(CycleOutcome::NotRun)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use crate::internals::ElementInternals;
    use crate::nested::{Anchor, ControlList, InputControl, InputType};
    use crate::registry::{FormElementBuilder, FormElementDefinition};
    use crate::store::{RenderTrigger, ViewState};
    use crate::value::ValueState;

    struct NoRender;

    impl RenderTrigger for NoRender {
        fn request_render(&self, _view: &ViewState) {}
    }

    fn element(input: &Rc<InputControl>) -> FormElement {
        let anchor: Anchor = input.clone();
        let controls = Rc::new(ControlList::new(vec![anchor]));
        FormElementBuilder::new(Rc::new(FormElementDefinition::new("x-field")))
            .nested(controls.clone())
            .internals(Rc::new(ElementInternals::new(controls)))
            .render(Rc::new(NoRender))
            .build()
            .unwrap()
    }

    #[test]
    fn test_dispatch_connected_and_input() {
        let input = Rc::new(InputControl::new("input", InputType::Text).with_value("a"));
        let element = element(&input);

        assert_eq!(element.dispatch(Reaction::Connected), Ok(CycleOutcome::Applied));
        assert!(!element.is_dirty());

        input.set_value("b");
        assert_eq!(element.dispatch(Reaction::Input), Ok(CycleOutcome::Applied));
        assert!(element.is_dirty());
        assert_eq!(element.value().unwrap(), "b");
    }

    #[test]
    fn test_dispatch_attribute_changes() {
        let input = Rc::new(InputControl::new("input", InputType::Text));
        let element = element(&input);

        let outcome = element.dispatch(Reaction::AttributeChanged {
            name: "value".into(),
            value: Some("x".into()),
        });
        assert_eq!(outcome, Ok(CycleOutcome::Applied));
        assert_eq!(element.default_value(), "x");

        element
            .dispatch(Reaction::AttributeChanged {
                name: "disabled".into(),
                value: Some(String::new()),
            })
            .unwrap();
        assert!(element.disabled());
    }

    #[test]
    fn test_dispatch_restore_marks_dirty() {
        let input = Rc::new(InputControl::new("input", InputType::Text));
        let element = element(&input);

        let outcome = element.dispatch(Reaction::FormStateRestore {
            state: SubmissionState::Text("saved".into()),
            mode: RestoreMode::Restore,
        });
        assert_eq!(outcome, Ok(CycleOutcome::Applied));
        assert!(element.is_dirty());
        assert_eq!(
            element.value_state(),
            ValueState::from_entries([("input", "saved")])
        );
    }

    #[test]
    fn test_dispatch_form_disabled_runs_no_cycle() {
        let input = Rc::new(InputControl::new("input", InputType::Text));
        let element = element(&input);

        assert_eq!(
            element.dispatch(Reaction::FormDisabled(true)),
            Ok(CycleOutcome::NotRun)
        );
        assert!(element.disabled_state());
        assert_eq!(element.cycle().completed(), 0);
    }

    #[test]
    fn test_dispatch_inner_submit_without_form() {
        let input = Rc::new(InputControl::new("input", InputType::Text));
        let element = element(&input);
        assert_eq!(
            element.dispatch(Reaction::InnerSubmit),
            Ok(CycleOutcome::NotRun)
        );
        assert!(!element.handle_inner_submit());
    }
}
