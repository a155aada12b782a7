//! Validity Composition
//!
//! Constraint validation flags, per-input constraints, and composition of a
//! single verdict from the nested controls of a composite element.

use std::fmt;

use crate::nested::Anchor;

/// Validity flags for a form control
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidityFlags {
    /// The element's value is missing (for required)
    pub value_missing: bool,
    /// The element's value doesn't match the type
    pub type_mismatch: bool,
    /// The element's value doesn't match the pattern
    pub pattern_mismatch: bool,
    /// The element's value is too long
    pub too_long: bool,
    /// The element's value is too short
    pub too_short: bool,
    /// The element's value is below the minimum
    pub range_underflow: bool,
    /// The element's value is above the maximum
    pub range_overflow: bool,
    /// The element's value doesn't match step
    pub step_mismatch: bool,
    /// The element has a bad input format
    pub bad_input: bool,
    /// Custom validity message set
    pub custom_error: bool,
}

impl ValidityFlags {
    /// All flags clear
    pub fn valid() -> Self {
        Self::default()
    }

    /// Only the custom error flag set
    pub fn custom_error() -> Self {
        Self {
            custom_error: true,
            ..Self::default()
        }
    }

    /// Flags set in either operand
    pub fn union(self, other: Self) -> Self {
        Self {
            value_missing: self.value_missing || other.value_missing,
            type_mismatch: self.type_mismatch || other.type_mismatch,
            pattern_mismatch: self.pattern_mismatch || other.pattern_mismatch,
            too_long: self.too_long || other.too_long,
            too_short: self.too_short || other.too_short,
            range_underflow: self.range_underflow || other.range_underflow,
            range_overflow: self.range_overflow || other.range_overflow,
            step_mismatch: self.step_mismatch || other.step_mismatch,
            bad_input: self.bad_input || other.bad_input,
            custom_error: self.custom_error || other.custom_error,
        }
    }

    /// Check if all constraints are satisfied
    pub fn is_valid(&self) -> bool {
        !self.value_missing
            && !self.type_mismatch
            && !self.pattern_mismatch
            && !self.too_long
            && !self.too_short
            && !self.range_underflow
            && !self.range_overflow
            && !self.step_mismatch
            && !self.bad_input
            && !self.custom_error
    }

    /// Default user-facing message for the first failing flag
    pub fn default_message(&self) -> &'static str {
        if self.value_missing {
            "Please fill out this field."
        } else if self.type_mismatch || self.bad_input || self.step_mismatch {
            "Please enter a valid value."
        } else if self.pattern_mismatch {
            "Please match the requested format."
        } else if self.too_long {
            "Please shorten this text."
        } else if self.too_short {
            "Please lengthen this text."
        } else if self.range_underflow {
            "Value must be greater or equal to minimum."
        } else if self.range_overflow {
            "Value must be less or equal to maximum."
        } else {
            ""
        }
    }
}

/// Validation constraints for a nested input
#[derive(Debug, Clone, Default)]
pub struct ValidationConstraints {
    pub required: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub step: Option<f64>,
}

impl ValidationConstraints {
    /// Validate a string value
    pub fn validate_string(&self, value: &str) -> ValidityFlags {
        let mut state = ValidityFlags::default();

        if self.required && value.is_empty() {
            state.value_missing = true;
        }

        let length = value.chars().count();
        if let Some(max) = self.max_length {
            if length > max {
                state.too_long = true;
            }
        }

        if let Some(min) = self.min_length {
            if !value.is_empty() && length < min {
                state.too_short = true;
            }
        }

        state
    }

    /// Validate a numeric value
    pub fn validate_number(&self, value: f64) -> ValidityFlags {
        let mut state = ValidityFlags::default();

        if let Some(min) = self.min {
            if value < min {
                state.range_underflow = true;
            }
        }

        if let Some(max) = self.max {
            if value > max {
                state.range_overflow = true;
            }
        }

        if let Some(step) = self.step {
            if step > 0.0 {
                let base = self.min.unwrap_or(0.0);
                let diff = value - base;
                if (diff % step).abs() > 1e-10 {
                    state.step_mismatch = true;
                }
            }
        }

        state
    }
}

/// Composite verdict pushed to the form-integration surface
#[derive(Clone, Default)]
pub struct Validity {
    pub flags: ValidityFlags,
    pub message: String,
    /// Failing nested control, only while it is attached to a document
    pub anchor: Option<Anchor>,
}

impl Validity {
    pub fn valid() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.flags.is_valid()
    }

    /// Name of the anchor control, if any
    pub fn anchor_name(&self) -> Option<String> {
        self.anchor.as_ref().map(|a| a.name())
    }
}

impl fmt::Debug for Validity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validity")
            .field("flags", &self.flags)
            .field("message", &self.message)
            .field("anchor", &self.anchor_name())
            .finish()
    }
}

impl PartialEq for Validity {
    fn eq(&self, other: &Self) -> bool {
        self.flags == other.flags
            && self.message == other.message
            && self.anchor_name() == other.anchor_name()
    }
}

/// Compose one verdict from nested controls.
///
/// The first invalid control in iteration order wins. `override_message`
/// replaces that control's own message when given.
pub fn compose_validity(controls: &[Anchor], override_message: Option<&str>) -> Validity {
    for control in controls {
        let flags = control.validity();
        if flags.is_valid() {
            continue;
        }
        let message = match override_message {
            Some(message) => message.to_string(),
            None => control.validation_message(),
        };
        let anchor = control.is_connected().then(|| control.clone());
        return Validity {
            flags,
            message,
            anchor,
        };
    }
    Validity::valid()
}
