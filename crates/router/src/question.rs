//! Question value object.

use serde::Serialize;

/// A user question, immutable once created.
///
/// Keeps the raw text for the pipelines and a lower-cased copy for the
/// pattern rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    raw: String,
    #[serde(skip)]
    normalized: String,
}

impl Question {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let normalized = raw.to_lowercase();
        Self { raw, normalized }
    }

    /// Text exactly as the user typed it.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Lower-cased text.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// True for empty or whitespace-only input.
    pub fn is_blank(&self) -> bool {
        self.raw.trim().is_empty()
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for Question {
    fn from(s: &str) -> Self {
        Question::new(s)
    }
}

impl From<String> for Question {
    fn from(s: String) -> Self {
        Question::new(s)
    }
}
