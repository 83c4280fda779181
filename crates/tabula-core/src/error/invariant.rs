use super::{Error, ErrorKind};

/// An internal consistency rule would be broken, e.g. re-setting a set-once
/// storage binding to a different value.
#[derive(Debug)]
pub(super) struct InvariantError {
    pub(super) code: &'static str,
    message: Box<str>,
}

impl std::error::Error for InvariantError {}

impl core::fmt::Display for InvariantError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl Error {
    /// Creates a invariant error with a stable `code`.
    pub fn invariant(code: &'static str, message: impl Into<String>) -> Error {
        Error::from(ErrorKind::Invariant(InvariantError {
            code,
            message: message.into().into(),
        }))
    }

    /// Returns `true` if the root cause is a invariant error.
    pub fn is_invariant(&self) -> bool {
        matches!(self.root_kind(), ErrorKind::Invariant(_))
    }
}
