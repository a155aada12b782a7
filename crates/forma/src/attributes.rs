//! Element Attributes
//!
//! Content attributes of a form element: get, set, remove, has.
//! Names are matched ASCII case-insensitively, as in HTML.

/// Single attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub value: String,
}

impl Attr {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
            value: value.into(),
        }
    }
}

/// Ordered attribute collection
#[derive(Debug, Clone, Default)]
pub struct AttributeMap {
    attributes: Vec<Attr>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.attributes
            .iter()
            .position(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// Get attribute value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.attributes[i].value.as_str())
    }

    /// Set attribute, returning the previous value
    pub fn set(&mut self, name: &str, value: &str) -> Option<String> {
        match self.position(name) {
            Some(i) => Some(std::mem::replace(
                &mut self.attributes[i].value,
                value.to_string(),
            )),
            None => {
                self.attributes.push(Attr::new(name, value));
                None
            }
        }
    }

    /// Remove attribute, returning its value
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|i| self.attributes.remove(i).value)
    }

    pub fn has(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Set or remove a boolean attribute
    pub fn set_bool(&mut self, name: &str, present: bool) -> Option<String> {
        if present {
            if self.has(name) {
                return self.get(name).map(str::to_string);
            }
            self.set(name, "")
        } else {
            self.remove(name)
        }
    }

    /// Attribute names in insertion order
    pub fn names(&self) -> Vec<&str> {
        self.attributes.iter().map(|a| a.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attr> {
        self.attributes.iter()
    }
}
