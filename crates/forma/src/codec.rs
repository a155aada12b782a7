//! Form State Codec
//!
//! Conversions between value state, submission state and attribute value.
//! Each conversion can be replaced per control type by an optional strategy;
//! absent strategies fall back to the defaults below.
//!
//! | conversion            | default                                                  |
//! |-----------------------|----------------------------------------------------------|
//! | value → submission    | the single entry's value, else the whole set              |
//! | submission → value    | used as-is; a bare string/file is keyed by the first control |
//! | value → attribute     | first entry as a string, else `""`                        |
//! | attribute → value     | one entry keyed by the first control, else empty          |

use std::fmt;
use std::rc::Rc;

use crate::error::{CodecError, CodecOperation};
use crate::value::{FieldValue, RawState, SubmissionState, ValueState};

pub type ValueToSubmissionFn = Rc<dyn Fn(&ValueState) -> RawState>;
pub type SubmissionToValueFn = Rc<dyn Fn(&SubmissionState) -> RawState>;
pub type ValueToAttributeFn = Rc<dyn Fn(&ValueState) -> RawState>;
pub type AttributeToValueFn = Rc<dyn Fn(&str) -> RawState>;

const FORM_STATE_SHAPES: &str = "string, file, or entries";

/// What the defaults need to know about the live nested structure
#[derive(Debug, Clone, Copy, Default)]
pub struct CodecContext<'a> {
    /// Name of the first nested form-associated control
    pub first_control: Option<&'a str>,
}

impl<'a> CodecContext<'a> {
    pub fn new(first_control: Option<&'a str>) -> Self {
        Self { first_control }
    }
}

/// Per control type codec with optional strategy overrides
#[derive(Clone, Default)]
pub struct FormCodec {
    value_to_submission: Option<ValueToSubmissionFn>,
    submission_to_value: Option<SubmissionToValueFn>,
    value_to_attribute: Option<ValueToAttributeFn>,
    attribute_to_value: Option<AttributeToValueFn>,
}

impl fmt::Debug for FormCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormCodec")
            .field("value_to_submission", &self.value_to_submission.is_some())
            .field("submission_to_value", &self.submission_to_value.is_some())
            .field("value_to_attribute", &self.value_to_attribute.is_some())
            .field("attribute_to_value", &self.attribute_to_value.is_some())
            .finish()
    }
}

impl FormCodec {
    /// Codec using only the defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value_to_submission(
        mut self,
        f: impl Fn(&ValueState) -> RawState + 'static,
    ) -> Self {
        self.value_to_submission = Some(Rc::new(f));
        self
    }

    pub fn with_submission_to_value(
        mut self,
        f: impl Fn(&SubmissionState) -> RawState + 'static,
    ) -> Self {
        self.submission_to_value = Some(Rc::new(f));
        self
    }

    pub fn with_value_to_attribute(
        mut self,
        f: impl Fn(&ValueState) -> RawState + 'static,
    ) -> Self {
        self.value_to_attribute = Some(Rc::new(f));
        self
    }

    pub fn with_attribute_to_value(mut self, f: impl Fn(&str) -> RawState + 'static) -> Self {
        self.attribute_to_value = Some(Rc::new(f));
        self
    }

    /// Whether a custom `submission_to_value` strategy is installed
    pub fn has_submission_to_value(&self) -> bool {
        self.submission_to_value.is_some()
    }

    /// Serialize a value state for form submission
    pub fn value_to_submission(&self, value: &ValueState) -> Result<SubmissionState, CodecError> {
        let Some(strategy) = &self.value_to_submission else {
            return Ok(default_value_to_submission(value));
        };
        match strategy(value) {
            RawState::Absent => Ok(SubmissionState::Text(String::new())),
            RawState::Text(s) => Ok(SubmissionState::Text(s)),
            RawState::File(f) => Ok(SubmissionState::File(f)),
            RawState::Entries(v) => Ok(SubmissionState::Entries(v)),
            other => Err(violation(
                CodecOperation::ValueToSubmission,
                FORM_STATE_SHAPES,
                &other,
            )),
        }
    }

    /// Deserialize a submission state (or restored state) into a value state
    pub fn submission_to_value(
        &self,
        submission: &SubmissionState,
        cx: CodecContext<'_>,
    ) -> Result<ValueState, CodecError> {
        let raw = match &self.submission_to_value {
            Some(strategy) => strategy(submission),
            None => RawState::from(submission.clone()),
        };
        lift_to_value_state(raw, cx, CodecOperation::SubmissionToValue)
    }

    /// Serialize a value state for the `value` IDL attribute
    pub fn value_to_attribute(&self, value: &ValueState) -> Result<String, CodecError> {
        let Some(strategy) = &self.value_to_attribute else {
            return Ok(value
                .first()
                .map(|(_, v)| v.to_form_string())
                .unwrap_or_default());
        };
        match strategy(value) {
            RawState::Absent => Ok(String::new()),
            RawState::Text(s) => Ok(s),
            other => Err(violation(CodecOperation::ValueToAttribute, "string", &other)),
        }
    }

    /// Deserialize an attribute string into a value state
    pub fn attribute_to_value(
        &self,
        attribute: &str,
        cx: CodecContext<'_>,
    ) -> Result<ValueState, CodecError> {
        let raw = match &self.attribute_to_value {
            Some(strategy) => strategy(attribute),
            None => RawState::Text(attribute.to_string()),
        };
        lift_to_value_state(raw, cx, CodecOperation::AttributeToValue)
    }
}

fn default_value_to_submission(value: &ValueState) -> SubmissionState {
    if value.len() == 1 {
        if let Some((_, entry)) = value.first() {
            return match entry {
                FieldValue::Text(s) => SubmissionState::Text(s.clone()),
                FieldValue::File(f) => SubmissionState::File(f.clone()),
                other => SubmissionState::Text(other.to_form_string()),
            };
        }
    }
    SubmissionState::Entries(value.clone())
}

fn lift_to_value_state(
    raw: RawState,
    cx: CodecContext<'_>,
    operation: CodecOperation,
) -> Result<ValueState, CodecError> {
    let single = match raw {
        RawState::Absent => return Ok(ValueState::new()),
        RawState::Entries(v) => return Ok(v),
        RawState::Text(s) => FieldValue::Text(s),
        RawState::File(f) => FieldValue::File(f),
        other => return Err(violation(operation, FORM_STATE_SHAPES, &other)),
    };
    let mut state = ValueState::new();
    if let Some(name) = cx.first_control {
        state.set(name, single);
    }
    Ok(state)
}

fn violation(operation: CodecOperation, expected: &'static str, found: &RawState) -> CodecError {
    let err = CodecError::ContractViolation {
        operation,
        expected,
        found: found.kind(),
    };
    tracing::error!("{}", err);
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FileEntry;

    fn cx() -> CodecContext<'static> {
        CodecContext::new(Some("input"))
    }

    #[test]
    fn test_default_single_entry_submission() {
        let codec = FormCodec::new();
        let value = ValueState::from_entries([("input", "42")]);
        assert_eq!(
            codec.value_to_submission(&value),
            Ok(SubmissionState::Text("42".into()))
        );
    }

    #[test]
    fn test_default_numeric_entry_is_stringified() {
        let codec = FormCodec::new();
        let value = ValueState::from_entries([("alpha", 8i64)]);
        assert_eq!(
            codec.value_to_submission(&value),
            Ok(SubmissionState::Text("8".into()))
        );
    }

    #[test]
    fn test_default_file_entry_stays_file() {
        let codec = FormCodec::new();
        let file = FileEntry::new("a.png", "image/png", vec![0, 1]);
        let value = ValueState::from_entries([("upload", file.clone())]);
        assert_eq!(
            codec.value_to_submission(&value),
            Ok(SubmissionState::File(file))
        );
    }

    #[test]
    fn test_default_multi_entry_submission() {
        let codec = FormCodec::new();
        let value = ValueState::from_entries([("a", "1"), ("b", "2")]);
        assert_eq!(
            codec.value_to_submission(&value),
            Ok(SubmissionState::Entries(value.clone()))
        );
    }

    #[test]
    fn test_default_submission_to_value() {
        let codec = FormCodec::new();
        let entries = ValueState::from_entries([("a", "1"), ("b", "2")]);
        assert_eq!(
            codec.submission_to_value(&SubmissionState::Entries(entries.clone()), cx()),
            Ok(entries)
        );
        assert_eq!(
            codec.submission_to_value(&SubmissionState::Text("7".into()), cx()),
            Ok(ValueState::from_entries([("input", "7")]))
        );
        assert_eq!(
            codec.submission_to_value(&SubmissionState::Text("7".into()), CodecContext::default()),
            Ok(ValueState::new())
        );
    }

    #[test]
    fn test_default_attribute_conversions() {
        let codec = FormCodec::new();
        let value = codec.attribute_to_value("hello", cx()).unwrap();
        assert_eq!(value, ValueState::from_entries([("input", "hello")]));
        assert_eq!(codec.value_to_attribute(&value), Ok("hello".to_string()));
        assert_eq!(codec.value_to_attribute(&ValueState::new()), Ok(String::new()));
        assert_eq!(
            codec.attribute_to_value("hello", CodecContext::default()),
            Ok(ValueState::new())
        );
    }

    #[test]
    fn test_custom_strategy_wins() {
        let codec = FormCodec::new().with_value_to_submission(|v| {
            RawState::Text(format!("{} entries", v.len()))
        });
        let value = ValueState::from_entries([("a", "1"), ("b", "2")]);
        assert_eq!(
            codec.value_to_submission(&value),
            Ok(SubmissionState::Text("2 entries".into()))
        );
    }

    #[test]
    fn test_absent_falls_back() {
        let codec = FormCodec::new()
            .with_value_to_submission(|_| RawState::Absent)
            .with_submission_to_value(|_| RawState::Absent)
            .with_value_to_attribute(|_| RawState::Absent);
        let value = ValueState::from_entries([("a", "1")]);
        assert_eq!(
            codec.value_to_submission(&value),
            Ok(SubmissionState::Text(String::new()))
        );
        assert_eq!(
            codec.submission_to_value(&SubmissionState::Text("x".into()), cx()),
            Ok(ValueState::new())
        );
        assert_eq!(codec.value_to_attribute(&value), Ok(String::new()));
    }

    #[test]
    fn test_malformed_strategy_output_is_rejected() {
        let codec = FormCodec::new()
            .with_value_to_submission(|_| RawState::Number(3.0))
            .with_submission_to_value(|_| RawState::Bool(true))
            .with_value_to_attribute(|v| RawState::Entries(v.clone()))
            .with_attribute_to_value(|_| RawState::Number(1.0));
        let value = ValueState::from_entries([("a", "1")]);

        assert!(matches!(
            codec.value_to_submission(&value),
            Err(CodecError::ContractViolation { found: "number", .. })
        ));
        assert!(matches!(
            codec.submission_to_value(&SubmissionState::Text("x".into()), cx()),
            Err(CodecError::ContractViolation { found: "boolean", .. })
        ));
        assert!(matches!(
            codec.value_to_attribute(&value),
            Err(CodecError::ContractViolation { expected: "string", .. })
        ));
        assert!(codec.attribute_to_value("x", cx()).is_err());
    }
}
