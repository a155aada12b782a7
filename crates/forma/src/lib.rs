//! forma - Form-Associated Element Engine
//!
//! Gives composite custom controls the contract of native form controls:
//! a `value`, form submission, constraint validation, disabled inheritance
//! from field groups, and reset.
//!
//! # Components
//! - [`FormCodec`]: conversions between value state, submission state and
//!   attribute text, each overridable per control type
//! - [`compose_validity`]: one verdict from the nested controls
//! - [`DirtyTracker`]: live input wins over attribute defaults
//! - [`UpdateCycle`]: the fixed cache, render, submit, validate sequence
//! - [`FormElement`]: the externally observable element surface
//!
//! # Example
//! ```rust,ignore
//! use forma::{FormElementDefinition, FormElementRegistry};
//!
//! let mut registry = FormElementRegistry::new();
//! registry.define(FormElementDefinition::new("x-input"))?;
//! let element = registry
//!     .builder("x-input")?
//!     .nested(controls.clone())
//!     .internals(internals)
//!     .render(render)
//!     .build()?;
//! element.connected()?;
//! element.set_value("42")?;
//! ```

pub mod attributes;
pub mod codec;
mod config;
pub mod cycle;
pub mod dirty;
pub mod disabled;
pub mod element;
pub mod error;
pub mod fieldset;
pub mod internals;
pub mod lifecycle;
pub mod nested;
pub mod registry;
pub mod store;
pub mod validity;
pub mod value;

pub use attributes::{Attr, AttributeMap};
pub use codec::{CodecContext, FormCodec};
pub use config::Config;
pub use cycle::{CycleOutcome, CyclePhase, CycleSteps, Trigger, UpdateCycle};
pub use dirty::DirtyTracker;
pub use disabled::DisabledState;
pub use element::FormElement;
pub use error::{CodecError, CodecOperation, ConfigError, FormError, Result, ValidityError};
pub use fieldset::Fieldset;
pub use internals::{construct_entries, ElementInternals, FormInternals, FormOwner};
pub use lifecycle::{Reaction, RestoreMode};
pub use nested::{
    read_value_state, Anchor, ControlList, InputControl, InputType, NestedControl, NestedControls,
};
pub use registry::{FormElementBuilder, FormElementDefinition, FormElementRegistry};
pub use store::{RenderTrigger, Store, SubscriptionId, ViewState};
pub use validity::{compose_validity, ValidationConstraints, Validity, ValidityFlags};
pub use value::{FieldValue, FileEntry, RawState, SubmissionState, ValueState};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
