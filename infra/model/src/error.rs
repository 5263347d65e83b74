use elim_derive::elim_error;
use std::borrow::Cow;

#[elim_error]
pub enum ModelError {
    #[error("No builder path found{}: {message}", format_context(.context))]
    NoBuilderPathFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Missing builder mutator{}: {message}", format_context(.context))]
    MissingMutator { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Mutator kind mismatch{}: {message}", format_context(.context))]
    MutatorKindMismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Duplicate property{}: {message}", format_context(.context))]
    DuplicateProperty { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid model{}: {message}", format_context(.context))]
    InvalidModel { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Conversion exhausted{}: {message}", format_context(.context))]
    ConversionExhausted { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal model error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl ModelError {
    pub fn invalid(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidModel { message: message.into(), context: None }
    }
}
