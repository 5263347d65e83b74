use elim_derive::elim_error;
use std::borrow::Cow;

#[elim_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<(), DemoError> {
    Err(std::io::Error::other("disk gone")).context("reading rules")
}

fn internal() -> Result<(), DemoError> {
    Err(DemoError::from("boom")).context("scanning")
}

fn main() {
    let err = read().unwrap_err();
    assert_eq!(err.to_string(), "IO error (reading rules): disk gone");

    let err = internal().unwrap_err();
    assert_eq!(err.to_string(), "Internal error (scanning): boom");

    let plain: DemoError = String::from("plain").into();
    assert_eq!(plain.to_string(), "Internal error: plain");
}
