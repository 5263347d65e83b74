//! Document formats used by the file-backed serializer.

mod yaml;

pub use yaml::YamlFormat;

use crate::error::RuleError;
use elim_model::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Top-level key/value view of one rule document.
pub type Document = BTreeMap<String, Value>;

/// Text representation of a [`Document`].
pub trait DocumentFormat: fmt::Debug + Send + Sync {
    /// File extension without the leading dot.
    fn extension(&self) -> &str;

    /// Parses document text. Empty text is an empty document.
    ///
    /// # Errors
    /// Returns `RuleError::Format` for malformed text and `RuleError::InvalidDocument` when the
    /// top level is not a mapping.
    fn parse(&self, text: &str) -> Result<Document, RuleError>;

    /// # Errors
    /// Returns `RuleError::Format` if the document cannot be emitted.
    fn render(&self, document: &Document) -> Result<String, RuleError>;
}
