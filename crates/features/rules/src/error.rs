use elim_model::ModelError;
use elim_storage::StorageError;
use std::borrow::Cow;

/// Errors raised while mapping rules to and from documents.
///
/// `Configuration` and `Internal` are fatal for an engine. `Persistence` is fatal when it concerns
/// the rules directory itself; raised while handling one document it only skips that document,
/// like the remaining variants.
#[elim_derive::elim_error]
pub enum RuleError {
    #[error("Model configuration error{}: {source}", format_context(.context))]
    Configuration { source: ModelError, context: Option<Cow<'static, str>> },

    #[error("Persistence error{}: {source}", format_context(.context))]
    Persistence { source: StorageError, context: Option<Cow<'static, str>> },

    #[error("Malformed document{}: {source}", format_context(.context))]
    Format { source: serde_yaml::Error, context: Option<Cow<'static, str>> },

    #[error("Unexpected document shape{}: {message}", format_context(.context))]
    InvalidDocument { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Missing property{}: {message}", format_context(.context))]
    PropertyMissing { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Conversion exhausted{}: {message}", format_context(.context))]
    ConversionExhausted { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Property type rejected{}: {message}", format_context(.context))]
    PropertyType { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid model{}: {message}", format_context(.context))]
    InvalidModel { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("No file associated with context{}: {message}", format_context(.context))]
    MissingFileKey { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal rule engine error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl RuleError {
    /// `true` when the content of a document caused the failure.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Configuration { .. } | Self::Persistence { .. } | Self::Internal { .. })
    }

    /// `true` for failures that abort a directory scan.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::Internal { .. })
    }
}
