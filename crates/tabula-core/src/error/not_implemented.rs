use super::{Error, ErrorKind};

/// A deliberately unhandled variant in a partial visitor.
#[derive(Debug)]
pub(super) struct NotImplementedError {
    pub(super) code: &'static str,
    message: Box<str>,
}

impl std::error::Error for NotImplementedError {}

impl core::fmt::Display for NotImplementedError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl Error {
    /// Creates a not-implemented error with a stable `code`.
    pub fn not_implemented(code: &'static str, message: impl Into<String>) -> Error {
        Error::from(ErrorKind::NotImplemented(NotImplementedError {
            code,
            message: message.into().into(),
        }))
    }

    /// Returns `true` if the root cause is a not-implemented error.
    pub fn is_not_implemented(&self) -> bool {
        matches!(self.root_kind(), ErrorKind::NotImplemented(_))
    }
}
