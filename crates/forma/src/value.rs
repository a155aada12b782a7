//! Value, Submission and Raw States
//!
//! The three data shapes a form-associated control moves between: the
//! structured value state, the submission state handed to the form owner, and
//! the untyped output of author-supplied codec strategies.

use serde::{Deserialize, Serialize};

/// A single value inside a value state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    File(FileEntry),
}

/// File-like value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub mime_type: String,
    pub content: Vec<u8>,
}

impl FileEntry {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            content,
        }
    }
}

impl FieldValue {
    /// String form as a form data entry would carry it.
    ///
    /// Integral numbers print without a fraction (`8`, not `8.0`). Files have
    /// no string form and yield their file name.
    pub fn to_form_string(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Bool(b) => b.to_string(),
            Self::File(f) => f.name.clone(),
        }
    }

    /// Text slice, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view of a numeric or numeric-looking text value
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Number(n) if n.is_finite() && n.fract() == 0.0 => Some(*n as i64),
            Self::Text(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<FileEntry> for FieldValue {
    fn from(value: FileEntry) -> Self {
        Self::File(value)
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Structured value state of a control.
///
/// Ordered and allowed to hold several entries under one name, the way form
/// data does. The empty state is the "no value" sentinel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueState {
    entries: Vec<(String, FieldValue)>,
}

impl ValueState {
    /// Create an empty value state
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from ordered entries
    pub fn from_entries<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut state = Self::new();
        for (name, value) in entries {
            state.append(name, value);
        }
        state
    }

    /// Append an entry, keeping existing ones with the same name
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Replace the first entry with this name and drop the others
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter().position(|(n, _)| *n == name) {
            Some(index) => {
                self.entries[index].1 = value;
                let mut seen = 0usize;
                self.entries.retain(|(n, _)| {
                    if *n != name {
                        return true;
                    }
                    seen += 1;
                    seen == 1
                });
            }
            None => self.entries.push((name, value)),
        }
    }

    /// Get the first value by name
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Get all values by name
    pub fn get_all(&self, name: &str) -> Vec<&FieldValue> {
        self.entries
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v)
            .collect()
    }

    /// Check if key exists
    pub fn has(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Delete all entries with name
    pub fn delete(&mut self, name: &str) {
        self.entries.retain(|(n, _)| n != name);
    }

    /// Iterate over entries in insertion order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// First entry, if any
    pub fn first(&self) -> Option<(&str, &FieldValue)> {
        self.entries.first().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert to URL-encoded string. File entries are skipped.
    pub fn to_url_encoded(&self) -> String {
        self.entries
            .iter()
            .filter(|(_, value)| !value.is_file())
            .map(|(name, value)| {
                format!(
                    "{}={}",
                    urlencoding_encode(name),
                    urlencoding_encode(&value.to_form_string())
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn urlencoding_encode(s: &str) -> String {
    let mut result = String::new();
    for c in s.chars() {
        match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' | '.' | '~' => result.push(c),
            ' ' => result.push('+'),
            _ => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).as_bytes() {
                    result.push_str(&format!("%{:02X}", byte));
                }
            }
        }
    }
    result
}

/// What the form owner receives for submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SubmissionState {
    Text(String),
    File(FileEntry),
    /// Flattened multi-entry set
    Entries(ValueState),
}

impl SubmissionState {
    /// Short shape name used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "string",
            Self::File(_) => "file",
            Self::Entries(_) => "entries",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl Default for SubmissionState {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for SubmissionState {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SubmissionState {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<ValueState> for SubmissionState {
    fn from(value: ValueState) -> Self {
        Self::Entries(value)
    }
}

/// Untyped result of an author-supplied codec strategy.
///
/// Strategies may return anything; the codec checks the shape before the
/// result reaches the form-integration surface.
#[derive(Debug, Clone, PartialEq)]
pub enum RawState {
    /// Nothing returned; the codec substitutes its documented fallback
    Absent,
    Text(String),
    Number(f64),
    Bool(bool),
    File(FileEntry),
    Entries(ValueState),
}

impl RawState {
    /// Shape name used in contract violation messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Absent => "nothing",
            Self::Text(_) => "string",
            Self::Number(_) => "number",
            Self::Bool(_) => "boolean",
            Self::File(_) => "file",
            Self::Entries(_) => "entries",
        }
    }
}

impl From<Option<ValueState>> for RawState {
    fn from(value: Option<ValueState>) -> Self {
        value.map_or(Self::Absent, Self::Entries)
    }
}

impl From<ValueState> for RawState {
    fn from(value: ValueState) -> Self {
        Self::Entries(value)
    }
}

impl From<String> for RawState {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for RawState {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<SubmissionState> for RawState {
    fn from(value: SubmissionState) -> Self {
        match value {
            SubmissionState::Text(s) => Self::Text(s),
            SubmissionState::File(f) => Self::File(f),
            SubmissionState::Entries(v) => Self::Entries(v),
        }
    }
}
