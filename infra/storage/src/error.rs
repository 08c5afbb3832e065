use std::borrow::Cow;

/// Failures of the sandboxed data directory.
#[helm_derive::helm_error]
pub enum StorageError {
    #[error("File not found{}: {message}", format_context(.context))]
    FileNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Path escapes the data directory{}: {message}", format_context(.context))]
    PathTraversalAttempt { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Internal storage error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl StorageError {
    pub(crate) fn not_found(path: &std::path::Path) -> Self {
        Self::FileNotFound { message: path.display().to_string().into(), context: None }
    }

    pub(crate) fn escape(path: &std::path::Path, reason: &'static str) -> Self {
        Self::PathTraversalAttempt { message: path.display().to_string().into(), context: Some(reason.into()) }
    }
}
