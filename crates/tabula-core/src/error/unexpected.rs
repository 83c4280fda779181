use super::{Error, ErrorKind};

/// A caller contract was violated, e.g. the foreign table handed to a link
/// field is not the one it is configured against.
#[derive(Debug)]
pub(super) struct UnexpectedError {
    pub(super) code: &'static str,
    message: Box<str>,
}

impl std::error::Error for UnexpectedError {}

impl core::fmt::Display for UnexpectedError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl Error {
    /// Creates a unexpected error with a stable `code`.
    pub fn unexpected(code: &'static str, message: impl Into<String>) -> Error {
        Error::from(ErrorKind::Unexpected(UnexpectedError {
            code,
            message: message.into().into(),
        }))
    }

    /// Returns `true` if the root cause is a unexpected error.
    pub fn is_unexpected(&self) -> bool {
        matches!(self.root_kind(), ErrorKind::Unexpected(_))
    }
}
