//! Color Picker
//!
//! RGB color plus alpha channel. Submits `#rrggbbaa`.

use std::rc::Rc;

use forma::{
    Anchor, ConfigError, ControlList, ElementInternals, FieldValue, FormCodec, FormElement,
    FormElementDefinition, FormElementRegistry, InputControl, InputType, RawState, RenderTrigger,
    ValidationConstraints, ValueState, ViewState,
};

pub const TAG: &str = "color-picker";

/// Parse `#rrggbbaa` into `{rgb, alpha}`
pub fn parse_color(text: &str) -> Option<ValueState> {
    let hex = text.trim().strip_prefix('#')?;
    if hex.len() != 8 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let alpha = u32::from_str_radix(&hex[6..], 16).ok()?;
    Some(ValueState::from_entries([
        ("rgb", FieldValue::from(format!("#{}", hex[..6].to_ascii_lowercase()))),
        ("alpha", FieldValue::from(alpha)),
    ]))
}

/// Format `{rgb, alpha}` as `#rrggbbaa`
pub fn format_color(value: &ValueState) -> Option<String> {
    let rgb = value.get("rgb")?.as_text()?;
    let alpha = value.get("alpha")?.as_integer()?;
    let valid_rgb = rgb.len() == 7
        && rgb.starts_with('#')
        && rgb[1..].bytes().all(|b| b.is_ascii_hexdigit());
    if !valid_rgb || !(0..=255).contains(&alpha) {
        return None;
    }
    Some(format!("{}{:02x}", rgb.to_ascii_lowercase(), alpha))
}

fn raw(value: Option<String>) -> RawState {
    value.map_or(RawState::Absent, RawState::Text)
}

pub fn codec() -> FormCodec {
    FormCodec::new()
        .with_value_to_submission(|value| raw(format_color(value)))
        .with_submission_to_value(|submission| {
            submission
                .as_text()
                .and_then(parse_color)
                .into()
        })
        .with_value_to_attribute(|value| raw(format_color(value)))
        .with_attribute_to_value(|text| parse_color(text).into())
}

pub fn definition() -> FormElementDefinition {
    FormElementDefinition::new(TAG)
        .with_codec(codec())
        .with_type("color")
}

/// Writes the cached value state back into the nested inputs
struct ColorPickerView {
    rgb: Rc<InputControl>,
    alpha: Rc<InputControl>,
}

impl RenderTrigger for ColorPickerView {
    fn request_render(&self, view: &ViewState) {
        if let Some(rgb) = view.value.get("rgb") {
            self.rgb.set_value(&rgb.to_form_string());
        }
        if let Some(alpha) = view.value.get("alpha") {
            self.alpha.set_value(&alpha.to_form_string());
        }
        for input in [&self.rgb, &self.alpha] {
            input.set_disabled(view.disabled);
            input.set_read_only(view.read_only);
            input.set_required(view.required);
        }
    }
}

/// Color picker element with its nested inputs
pub struct ColorPicker {
    pub element: Rc<FormElement>,
    pub internals: Rc<ElementInternals>,
    pub rgb: Rc<InputControl>,
    pub alpha: Rc<InputControl>,
}

impl ColorPicker {
    /// Build a picker from a registry where [`definition`] is defined
    pub fn new(registry: &FormElementRegistry) -> Result<Self, ConfigError> {
        let rgb = Rc::new(InputControl::new("rgb", InputType::Color));
        let alpha = Rc::new(
            InputControl::new("alpha", InputType::Number)
                .with_constraints(ValidationConstraints {
                    min: Some(0.0),
                    max: Some(255.0),
                    step: Some(1.0),
                    ..Default::default()
                })
                .with_value("255"),
        );

        let controls = Rc::new(ControlList::new(vec![
            rgb.clone() as Anchor,
            alpha.clone() as Anchor,
        ]));
        let internals = Rc::new(ElementInternals::new(controls.clone()));
        let view = Rc::new(ColorPickerView {
            rgb: rgb.clone(),
            alpha: alpha.clone(),
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
            rgb,
            alpha,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pads_alpha() {
        let value = ValueState::from_entries([
            ("rgb", FieldValue::from("#112233")),
            ("alpha", FieldValue::from(8i64)),
        ]);
        assert_eq!(format_color(&value).as_deref(), Some("#11223308"));
    }

    #[test]
    fn test_parse() {
        let value = parse_color("#AABBCCFF").unwrap();
        assert_eq!(value.get("rgb"), Some(&FieldValue::from("#aabbcc")));
        assert_eq!(value.get("alpha").and_then(FieldValue::as_integer), Some(255));
    }

    #[test]
    fn test_malformed() {
        assert!(parse_color("red").is_none());
        assert!(parse_color("#aabbcc").is_none());
        assert!(parse_color("#gghhiijj").is_none());

        let out_of_range = ValueState::from_entries([
            ("rgb", FieldValue::from("#112233")),
            ("alpha", FieldValue::from(300i64)),
        ]);
        assert!(format_color(&out_of_range).is_none());
    }

    #[test]
    fn test_alpha_from_text_input() {
        let value = ValueState::from_entries([("rgb", "#000000"), ("alpha", "128")]);
        assert_eq!(format_color(&value).as_deref(), Some("#00000080"));
    }
}
