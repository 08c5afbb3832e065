use helm_derive::helm_error;
use std::borrow::Cow;

#[helm_error]
pub enum KeyFileError {
    #[error("Key file I/O error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read_key() -> Result<Vec<u8>, KeyFileError> {
    std::fs::read("/nonexistent/helm.key").context("Reading key file")
}

fn main() {
    let err = read_key().unwrap_err();
    assert!(err.to_string().contains("(Reading key file)"));

    let internal: KeyFileError = "boom".into();
    assert!(matches!(internal, KeyFileError::Internal { .. }));
}
