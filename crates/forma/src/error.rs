//! Error types

/// Codec strategy produced something outside the allowed shapes
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodecError {
    #[error("Expected {operation} to be {expected}, but got {found}")]
    ContractViolation {
        operation: CodecOperation,
        expected: &'static str,
        found: &'static str,
    },
}

/// Which codec conversion ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecOperation {
    ValueToSubmission,
    SubmissionToValue,
    ValueToAttribute,
    AttributeToValue,
}

impl std::fmt::Display for CodecOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ValueToSubmission => "submission state",
            Self::SubmissionToValue => "value state",
            Self::ValueToAttribute => "attribute value",
            Self::AttributeToValue => "value state from attribute",
        };
        f.write_str(name)
    }
}

/// Setup-time errors. Fatal, never recovered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid form element name: {0}")]
    InvalidName(String),

    #[error("Form element already defined: {0}")]
    AlreadyDefined(String),

    #[error("Form element not defined: {0}")]
    NotDefined(String),

    #[error("Missing collaborator for <{tag}>: {collaborator}")]
    MissingCollaborator {
        tag: String,
        collaborator: &'static str,
    },
}

/// Arguments rejected by the form-integration surface
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidityError {
    #[error("Setting an element to invalid requires a non-empty validation message")]
    MissingMessage,

    #[error("Validation anchor '{0}' is not a nested control of this element")]
    ForeignAnchor(String),
}

/// Top-level error for operations on a form element
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validity error: {0}")]
    Validity(#[from] ValidityError),
}

pub type Result<T> = std::result::Result<T, FormError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_violation_message() {
        let err = CodecError::ContractViolation {
            operation: CodecOperation::ValueToSubmission,
            expected: "string, file, or entries",
            found: "number",
        };
        assert_eq!(
            err.to_string(),
            "Expected submission state to be string, file, or entries, but got number"
        );
    }

    #[test]
    fn test_form_error_from() {
        let err: FormError = ConfigError::InvalidName("nohyphen".into()).into();
        assert!(matches!(err, FormError::Config(ConfigError::InvalidName(_))));
    }
}
