use std::borrow::Cow;

/// A specialized [`StorageError`] enum of this crate.
#[elim_derive::elim_error]
pub enum StorageError {
    #[error("Directory not found{}: {message}", format_context(.context))]
    DirectoryNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Not a directory{}: {message}", format_context(.context))]
    NotADirectory { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("File not found{}: {message}", format_context(.context))]
    FileNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Path traversal security violation{}: {message}", format_context(.context))]
    PathTraversalAttempt { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid UTF-8 content{}: {source}", format_context(.context))]
    Encoding { source: std::string::FromUtf8Error, context: Option<Cow<'static, str>> },

    #[error("Hardware I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },
}
