//! Integer Input
//!
//! Single numeric input with step 1. Attribute text reads as its leading
//! base-10 integer, or 0. The `min` and `max` attributes render into the
//! nested input.

use std::rc::Rc;

use forma::{
    Anchor, ConfigError, ControlList, ElementInternals, FieldValue, FormCodec, FormElement,
    FormElementDefinition, FormElementRegistry, InputControl, InputType, RawState, RenderTrigger,
    Result, ValidationConstraints, ValueState, ViewState,
};

pub const TAG: &str = "integer-input";

const FIELD: &str = "input";

/// Leading base-10 integer of `text`; 0 when there is none
pub fn parse_integer(text: &str) -> i64 {
    let text = text.trim_start();
    let (sign, digits) = match text.as_bytes().first() {
        Some(b'-') => (-1, &text[1..]),
        Some(b'+') => (1, &text[1..]),
        _ => (1, text),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end]
        .parse::<i64>()
        .map(|n| sign * n)
        .unwrap_or(0)
}

fn parse_bound(view: &ViewState, name: &str) -> Option<f64> {
    let text = view.attribute(name)?;
    (!text.trim().is_empty()).then(|| parse_integer(text) as f64)
}

pub fn codec() -> FormCodec {
    FormCodec::new().with_attribute_to_value(|text| {
        RawState::Entries(ValueState::from_entries([(FIELD, parse_integer(text))]))
    })
}

pub fn definition() -> FormElementDefinition {
    FormElementDefinition::new(TAG)
        .with_codec(codec())
        .with_type("number")
        .observe("min")
        .observe("max")
}

struct IntegerInputView {
    input: Rc<InputControl>,
}

impl RenderTrigger for IntegerInputView {
    fn request_render(&self, view: &ViewState) {
        if let Some(value) = view.value.get(FIELD) {
            self.input.set_value(&value.to_form_string());
        }
        self.input.set_min(parse_bound(view, "min"));
        self.input.set_max(parse_bound(view, "max"));
        self.input.set_disabled(view.disabled);
        self.input.set_read_only(view.read_only);
        self.input.set_required(view.required);
    }
}

/// Integer input element with its nested input
pub struct IntegerInput {
    pub element: Rc<FormElement>,
    pub internals: Rc<ElementInternals>,
    pub input: Rc<InputControl>,
}

impl IntegerInput {
    pub fn new(registry: &FormElementRegistry) -> std::result::Result<Self, ConfigError> {
        let input = Rc::new(
            InputControl::new(FIELD, InputType::Number).with_constraints(ValidationConstraints {
                step: Some(1.0),
                ..Default::default()
            }),
        );
        let controls = Rc::new(ControlList::new(vec![input.clone() as Anchor]));
        let internals = Rc::new(ElementInternals::new(controls.clone()));
        let view = Rc::new(IntegerInputView {
            input: input.clone(),
        });
        let element = registry
            .builder(TAG)?
            .nested(controls)
            .internals(internals.clone())
            .render(view)
            .build()?;

        Ok(Self {
            element: Rc::new(element),
            internals,
            input,
        })
    }

    /// Current value as an integer
    pub fn value_as_integer(&self) -> Option<i64> {
        self.element
            .value_state()
            .get(FIELD)
            .and_then(FieldValue::as_integer)
    }

    pub fn min(&self) -> Option<i64> {
        self.element.get_attribute("min").map(|v| parse_integer(&v))
    }

    /// Set or clear the `min` attribute
    pub fn set_min(&self, min: Option<i64>) -> Result<()> {
        self.set_bound("min", min)
    }

    pub fn max(&self) -> Option<i64> {
        self.element.get_attribute("max").map(|v| parse_integer(&v))
    }

    /// Set or clear the `max` attribute
    pub fn set_max(&self, max: Option<i64>) -> Result<()> {
        self.set_bound("max", max)
    }

    // The attribute change renders the bound into the nested input
    fn set_bound(&self, name: &str, bound: Option<i64>) -> Result<()> {
        match bound {
            Some(v) => self.element.set_attribute(name, &v.to_string())?,
            None => self.element.remove_attribute(name)?,
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("42"), 42);
        assert_eq!(parse_integer(" -7 "), -7);
        assert_eq!(parse_integer("4.5"), 4);
        assert_eq!(parse_integer("12px"), 12);
        assert_eq!(parse_integer("+3"), 3);
        assert_eq!(parse_integer("-"), 0);
        assert_eq!(parse_integer(""), 0);
        assert_eq!(parse_integer("abc"), 0);
    }

    #[test]
    fn test_codec_attribute_to_value() {
        let value = codec()
            .attribute_to_value("12", forma::CodecContext::default())
            .unwrap();
        assert_eq!(value.get(FIELD), Some(&FieldValue::Number(12.0)));
        assert_eq!(codec().value_to_attribute(&value), Ok("12".to_string()));
    }
}
