use super::{Error, ErrorKind};

/// A business rule forbids the mutation, e.g. making a computed field unique.
#[derive(Debug)]
pub(super) struct ConflictError {
    pub(super) code: &'static str,
    message: Box<str>,
}

impl std::error::Error for ConflictError {}

impl core::fmt::Display for ConflictError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl Error {
    /// Creates a conflict error with a stable `code`.
    pub fn conflict(code: &'static str, message: impl Into<String>) -> Error {
        Error::from(ErrorKind::Conflict(ConflictError {
            code,
            message: message.into().into(),
        }))
    }

    /// Returns `true` if the root cause is a conflict error.
    pub fn is_conflict(&self) -> bool {
        matches!(self.root_kind(), ErrorKind::Conflict(_))
    }
}
