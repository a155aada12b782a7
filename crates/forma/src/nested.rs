//! Nested Controls
//!
//! The contained form-associable elements of a composite control. The engine
//! only sees them through [`NestedControl`] and [`NestedControls`]; the
//! [`InputControl`] and [`ControlList`] types are in-memory implementations
//! usable by render adapters and tests.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::validity::{ValidationConstraints, ValidityFlags};
use crate::value::{FieldValue, FileEntry, ValueState};

/// A contained form-associable element
pub trait NestedControl {
    /// Name under which the control contributes to the value state
    fn name(&self) -> String;

    /// Value contributed to the value state, `None` when it contributes nothing
    fn entry(&self) -> Option<FieldValue>;

    /// Current validity flags
    fn validity(&self) -> ValidityFlags;

    /// Message describing the current validity
    fn validation_message(&self) -> String;

    /// Whether the control is attached to a live document tree
    fn is_connected(&self) -> bool;
}

/// Reference to a nested control, used as validation anchor
pub type Anchor = Rc<dyn NestedControl>;

/// Query for the ordered nested controls of an element
pub trait NestedControls {
    /// Ordered controls, or `None` while the nested structure does not exist
    fn query(&self) -> Option<Vec<Anchor>>;
}

/// Read the value state the nested structure currently holds.
///
/// A missing structure reads as the empty value state.
pub fn read_value_state(controls: Option<&[Anchor]>) -> ValueState {
    let mut state = ValueState::new();
    for control in controls.unwrap_or_default() {
        let name = control.name();
        if name.is_empty() {
            continue;
        }
        if let Some(value) = control.entry() {
            state.append(name, value);
        }
    }
    state
}

/// Name of the first nested control, used by the default codec
pub fn first_control_name(controls: Option<&[Anchor]>) -> Option<String> {
    controls.and_then(|c| c.first()).map(|c| c.name())
}

/// Nested input types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputType {
    #[default]
    Text,
    Number,
    Email,
    Url,
    Color,
    Select,
    File,
    Hidden,
}

impl InputType {
    /// Parse from string
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "number" => Self::Number,
            "email" => Self::Email,
            "url" => Self::Url,
            "color" => Self::Color,
            "select" | "select-one" => Self::Select,
            "file" => Self::File,
            "hidden" => Self::Hidden,
            _ => Self::Text,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct InputState {
    value: String,
    file: Option<FileEntry>,
    options: Vec<String>,
    constraints: ValidationConstraints,
    disabled: bool,
    read_only: bool,
    connected: bool,
    custom_message: String,
}

/// In-memory nested input or select with constraint validation
pub struct InputControl {
    name: String,
    input_type: InputType,
    state: RefCell<InputState>,
}

impl fmt::Debug for InputControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputControl")
            .field("name", &self.name)
            .field("input_type", &self.input_type)
            .field("state", &self.state.borrow())
            .finish()
    }
}

impl InputControl {
    /// Create a connected control with an empty value
    pub fn new(name: impl Into<String>, input_type: InputType) -> Self {
        let control = Self {
            name: name.into(),
            input_type,
            state: RefCell::new(InputState {
                connected: true,
                ..Default::default()
            }),
        };
        if input_type == InputType::Color {
            control.state.borrow_mut().value = "#000000".to_string();
        }
        control
    }

    /// Select with the given option values
    pub fn select(name: impl Into<String>, options: Vec<String>) -> Self {
        let control = Self::new(name, InputType::Select);
        control.state.borrow_mut().options = options;
        control
    }

    pub fn with_constraints(self, constraints: ValidationConstraints) -> Self {
        self.state.borrow_mut().constraints = constraints;
        self
    }

    pub fn with_value(self, value: &str) -> Self {
        self.set_value(value);
        self
    }

    pub fn input_type(&self) -> InputType {
        self.input_type
    }

    pub fn value(&self) -> String {
        self.state.borrow().value.clone()
    }

    /// Set the value, sanitized the way the native control would
    pub fn set_value(&self, value: &str) {
        let mut state = self.state.borrow_mut();
        state.value = match self.input_type {
            InputType::Color => sanitize_color(value),
            InputType::Select => {
                if state.options.iter().any(|o| o == value) {
                    value.to_string()
                } else {
                    String::new()
                }
            }
            _ => value.to_string(),
        };
    }

    pub fn set_file(&self, file: Option<FileEntry>) {
        self.state.borrow_mut().file = file;
    }

    pub fn options(&self) -> Vec<String> {
        self.state.borrow().options.clone()
    }

    /// Replace select options; a value no longer offered is cleared
    pub fn set_options(&self, options: Vec<String>) {
        let mut state = self.state.borrow_mut();
        if !options.iter().any(|o| *o == state.value) {
            state.value.clear();
        }
        state.options = options;
    }

    pub fn is_disabled(&self) -> bool {
        self.state.borrow().disabled
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.state.borrow_mut().disabled = disabled;
    }

    pub fn is_read_only(&self) -> bool {
        self.state.borrow().read_only
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.state.borrow_mut().read_only = read_only;
    }

    pub fn set_required(&self, required: bool) {
        self.state.borrow_mut().constraints.required = required;
    }

    pub fn set_min(&self, min: Option<f64>) {
        self.state.borrow_mut().constraints.min = min;
    }

    pub fn set_max(&self, max: Option<f64>) {
        self.state.borrow_mut().constraints.max = max;
    }

    pub fn set_connected(&self, connected: bool) {
        self.state.borrow_mut().connected = connected;
    }

    pub fn set_custom_validity(&self, message: &str) {
        self.state.borrow_mut().custom_message = message.to_string();
    }

    fn compute_validity(&self, state: &InputState) -> ValidityFlags {
        // Barred from constraint validation
        if state.disabled || state.read_only || self.input_type == InputType::Hidden {
            return ValidityFlags::valid();
        }

        let value = state.value.as_str();
        let mut flags = if self.input_type == InputType::File {
            ValidityFlags {
                value_missing: state.constraints.required && state.file.is_none(),
                ..Default::default()
            }
        } else {
            state.constraints.validate_string(value)
        };

        if !value.is_empty() {
            match self.input_type {
                InputType::Number => match value.parse::<f64>() {
                    Ok(number) => flags = flags.union(state.constraints.validate_number(number)),
                    Err(_) => flags.bad_input = true,
                },
                InputType::Email => flags.type_mismatch |= !is_valid_email(value),
                InputType::Url => flags.type_mismatch |= !is_valid_url(value),
                _ => {}
            }
        }

        flags.custom_error = !state.custom_message.is_empty();
        flags
    }
}

impl NestedControl for InputControl {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn entry(&self) -> Option<FieldValue> {
        let state = self.state.borrow();
        if state.disabled {
            return None;
        }
        match self.input_type {
            InputType::File => state.file.clone().map(FieldValue::File),
            _ => Some(FieldValue::Text(state.value.clone())),
        }
    }

    fn validity(&self) -> ValidityFlags {
        self.compute_validity(&self.state.borrow())
    }

    fn validation_message(&self) -> String {
        let state = self.state.borrow();
        if !state.custom_message.is_empty() {
            return state.custom_message.clone();
        }
        self.compute_validity(&state).default_message().to_string()
    }

    fn is_connected(&self) -> bool {
        self.state.borrow().connected
    }
}

fn sanitize_color(value: &str) -> String {
    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 7
        && bytes[0] == b'#'
        && bytes[1..].iter().all(|b| b.is_ascii_hexdigit());
    if well_formed {
        value.to_ascii_lowercase()
    } else {
        "#000000".to_string()
    }
}

fn is_valid_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.ends_with('.'),
        None => false,
    }
}

fn is_valid_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://") || value.starts_with("ftp://")
}

/// Ordered, replaceable list of nested controls
#[derive(Default)]
pub struct ControlList {
    controls: RefCell<Option<Vec<Anchor>>>,
}

impl ControlList {
    /// A list whose nested structure has not been created yet
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(controls: Vec<Anchor>) -> Self {
        Self {
            controls: RefCell::new(Some(controls)),
        }
    }

    /// Replace the whole nested structure
    pub fn replace(&self, controls: Vec<Anchor>) {
        *self.controls.borrow_mut() = Some(controls);
    }

    pub fn push(&self, control: Anchor) {
        self.controls
            .borrow_mut()
            .get_or_insert_with(Vec::new)
            .push(control);
    }

    /// Drop the nested structure entirely
    pub fn clear(&self) {
        *self.controls.borrow_mut() = None;
    }
}

impl NestedControls for ControlList {
    fn query(&self) -> Option<Vec<Anchor>> {
        self.controls.borrow().clone()
    }
}
