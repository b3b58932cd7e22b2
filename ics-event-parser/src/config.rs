//! Parser configuration types
//!
//! The defaults reproduce the strict behavior: an unparseable date aborts the
//! whole parse and physical lines are matched exactly as they appear.

use serde::{Deserialize, Serialize};

/// What to do when a date value in a record cannot be parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Abort the parse at the first bad date
    #[default]
    Strict,
    /// Drop only the record containing the bad date
    Lenient,
}

/// Configuration for the parser
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// How date errors are propagated
    #[serde(default)]
    pub error_policy: ErrorPolicy,

    /// Join folded continuation lines (leading space or tab) before matching
    #[serde(default)]
    pub unfold_lines: bool,
}

impl ParserConfig {
    /// Create a new parser configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the error policy
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Builder method: enable or disable line unfolding
    pub fn with_line_unfolding(mut self, enabled: bool) -> Self {
        self.unfold_lines = enabled;
        self
    }

    pub fn is_lenient(&self) -> bool {
        self.error_policy == ErrorPolicy::Lenient
    }
}
