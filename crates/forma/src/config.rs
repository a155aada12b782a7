//! Engine Configuration

/// Engine configuration options
#[derive(Debug, Clone)]
pub struct Config {
    /// Attribute text used when a form reset finds no `value` attribute
    pub reset_fallback: String,

    /// Notification rounds a store runs before dropping re-entrant writes
    pub max_notify_rounds: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reset_fallback: String::new(),
            max_notify_rounds: 8,
        }
    }
}

impl Config {
    pub fn with_reset_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.reset_fallback = fallback.into();
        self
    }

    pub fn with_max_notify_rounds(mut self, rounds: usize) -> Self {
        self.max_notify_rounds = rounds.max(1);
        self
    }
}
