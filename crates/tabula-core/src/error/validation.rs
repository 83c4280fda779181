use super::{Error, ErrorKind};

/// Input was malformed or semantically illegal, e.g. an aggregate that does
/// not apply to the values it would aggregate, or duplicate option names.
#[derive(Debug)]
pub(super) struct ValidationError {
    pub(super) code: &'static str,
    message: Box<str>,
}

impl std::error::Error for ValidationError {}

impl core::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl Error {
    /// Creates a validation error with a stable `code`.
    pub fn validation(code: &'static str, message: impl Into<String>) -> Error {
        Error::from(ErrorKind::Validation(ValidationError {
            code,
            message: message.into().into(),
        }))
    }

    /// Returns `true` if the root cause is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self.root_kind(), ErrorKind::Validation(_))
    }
}
