//! Form Element Registry
//!
//! Per control type definitions, registered explicitly by the host, and the
//! builder wiring one element to its collaborators.

use std::collections::HashMap;
use std::rc::Rc;

use crate::codec::FormCodec;
use crate::config::Config;
use crate::element::FormElement;
use crate::error::ConfigError;
use crate::internals::FormInternals;
use crate::nested::NestedControls;
use crate::store::RenderTrigger;

/// Attributes every form element observes
pub const DEFAULT_OBSERVED_ATTRIBUTES: &[&str] = &["value", "disabled", "required", "readonly"];

/// Form element definition
#[derive(Debug, Clone)]
pub struct FormElementDefinition {
    pub name: String,
    pub codec: FormCodec,
    /// Value of the `type` IDL attribute, defaults to the tag name
    pub type_name: Option<String>,
    /// Replaces the nested control's own message in composed validity
    pub validation_message: Option<String>,
    pub observed_attributes: Vec<String>,
}

impl FormElementDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            codec: FormCodec::default(),
            type_name: None,
            validation_message: None,
            observed_attributes: DEFAULT_OBSERVED_ATTRIBUTES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    pub fn with_codec(mut self, codec: FormCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_validation_message(mut self, message: impl Into<String>) -> Self {
        self.validation_message = Some(message.into());
        self
    }

    /// Observe an extra attribute
    pub fn observe(mut self, attribute: &str) -> Self {
        let attribute = attribute.to_ascii_lowercase();
        if !self.observed_attributes.contains(&attribute) {
            self.observed_attributes.push(attribute);
        }
        self
    }

    pub fn observes(&self, attribute: &str) -> bool {
        self.observed_attributes
            .iter()
            .any(|a| a.eq_ignore_ascii_case(attribute))
    }

    /// `type` IDL attribute value
    pub fn type_name(&self) -> String {
        self.type_name
            .clone()
            .unwrap_or_else(|| self.name.to_ascii_lowercase())
    }
}

/// Form element registry
#[derive(Debug, Default)]
pub struct FormElementRegistry {
    definitions: HashMap<String, Rc<FormElementDefinition>>,
}

impl FormElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a form element
    pub fn define(
        &mut self,
        definition: FormElementDefinition,
    ) -> Result<Rc<FormElementDefinition>, ConfigError> {
        let name = definition.name.clone();
        if !is_valid_name(&name) {
            return Err(ConfigError::InvalidName(name));
        }
        if self.definitions.contains_key(&name) {
            return Err(ConfigError::AlreadyDefined(name));
        }

        tracing::debug!("Defined form element <{}>", name);
        let definition = Rc::new(definition);
        self.definitions.insert(name, definition.clone());
        Ok(definition)
    }

    pub fn get(&self, name: &str) -> Option<Rc<FormElementDefinition>> {
        self.definitions.get(name).cloned()
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Start building an element of a defined type
    pub fn builder(&self, name: &str) -> Result<FormElementBuilder, ConfigError> {
        self.get(name)
            .map(FormElementBuilder::new)
            .ok_or_else(|| ConfigError::NotDefined(name.to_string()))
    }
}

/// Validate a custom element name
pub fn is_valid_name(name: &str) -> bool {
    if !name.contains('-') {
        return false;
    }

    if !name.chars().next().is_some_and(|c| c.is_ascii_lowercase()) {
        return false;
    }

    if name.chars().any(|c| c.is_ascii_uppercase() || c.is_whitespace()) {
        return false;
    }

    let reserved = [
        "annotation-xml",
        "color-profile",
        "font-face",
        "font-face-src",
        "font-face-uri",
        "font-face-format",
        "font-face-name",
        "missing-glyph",
    ];
    !reserved.contains(&name)
}

/// Wires one element to its collaborators
pub struct FormElementBuilder {
    definition: Rc<FormElementDefinition>,
    nested: Option<Rc<dyn NestedControls>>,
    internals: Option<Rc<dyn FormInternals>>,
    render: Option<Rc<dyn RenderTrigger>>,
    config: Config,
}

impl FormElementBuilder {
    pub fn new(definition: Rc<FormElementDefinition>) -> Self {
        Self {
            definition,
            nested: None,
            internals: None,
            render: None,
            config: Config::default(),
        }
    }

    pub fn nested(mut self, nested: Rc<dyn NestedControls>) -> Self {
        self.nested = Some(nested);
        self
    }

    pub fn internals(mut self, internals: Rc<dyn FormInternals>) -> Self {
        self.internals = Some(internals);
        self
    }

    pub fn render(mut self, render: Rc<dyn RenderTrigger>) -> Self {
        self.render = Some(render);
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<FormElement, ConfigError> {
        let missing = |collaborator| ConfigError::MissingCollaborator {
            tag: self.definition.name.clone(),
            collaborator,
        };
        let nested = self.nested.clone().ok_or_else(|| missing("nested controls"))?;
        let internals = self
            .internals
            .clone()
            .ok_or_else(|| missing("form internals"))?;
        let render = self.render.clone().ok_or_else(|| missing("render trigger"))?;

        Ok(FormElement::new(
            self.definition,
            nested,
            internals,
            render,
            self.config,
        ))
    }
}
