use super::{Error, ErrorKind};

/// A referenced field or table id does not resolve within the given context.
#[derive(Debug)]
pub(super) struct NotFoundError {
    pub(super) code: &'static str,
    message: Box<str>,
}

impl std::error::Error for NotFoundError {}

impl core::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl Error {
    /// Creates a not-found error with a stable `code`.
    pub fn not_found(code: &'static str, message: impl Into<String>) -> Error {
        Error::from(ErrorKind::NotFound(NotFoundError {
            code,
            message: message.into().into(),
        }))
    }

    /// Returns `true` if the root cause is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self.root_kind(), ErrorKind::NotFound(_))
    }
}
