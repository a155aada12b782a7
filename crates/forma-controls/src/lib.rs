//! forma controls
//!
//! Composite form controls built on the forma engine, each with a codec,
//! nested inputs and a render adapter that writes the cached value state
//! back into them.

pub mod color_picker;
pub mod date_picker;
pub mod integer_input;

pub use color_picker::ColorPicker;
pub use date_picker::{Date, DatePicker};
pub use integer_input::IntegerInput;

use forma::{ConfigError, FormElementRegistry};

/// Define every control of this crate in `registry`
pub fn define_all(registry: &mut FormElementRegistry) -> Result<(), ConfigError> {
    registry.define(color_picker::definition())?;
    registry.define(date_picker::definition())?;
    registry.define(integer_input::definition())?;
    Ok(())
}
