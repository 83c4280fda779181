mod adhoc;
mod conflict;
mod invariant;
mod not_found;
mod not_implemented;
mod unexpected;
mod validation;

use adhoc::AdhocError;
use conflict::ConflictError;
use invariant::InvariantError;
use not_found::NotFoundError;
use not_implemented::NotImplementedError;
use std::sync::Arc;
use unexpected::UnexpectedError;
use validation::ValidationError;

/// An error returned by a fallible domain operation.
///
/// Errors fall into a closed set of categories. Validation and conflict
/// errors describe user input that was rejected and are safe to surface
/// verbatim. Invariant and unexpected errors indicate that a caller broke a
/// contract and should be treated as bugs.
///
/// Context added with [`Error::context`] never hides the category: the
/// `is_*` predicates and [`Error::code`] always inspect the root cause.
#[derive(Clone)]
pub struct Error {
    inner: Option<Arc<ErrorInner>>,
}

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

impl Error {
    /// Adds context to this error.
    ///
    /// Context is displayed in reverse order: the most recently added context is shown first,
    /// followed by earlier context, ending with the root cause.
    #[inline(always)]
    pub fn context(self, consequent: impl IntoError) -> Error {
        self.context_impl(consequent.into_error())
    }

    #[inline(never)]
    #[cold]
    fn context_impl(self, consequent: Error) -> Error {
        let mut err = consequent;
        if err.inner.is_none() {
            err = Error::from(ErrorKind::Unknown);
        }
        let inner = err.inner.as_mut().unwrap();
        assert!(
            inner.cause.is_none(),
            "consequent error must not already have a cause"
        );
        Arc::get_mut(inner).unwrap().cause = Some(self);
        err
    }

    /// The stable, dotted code of the root cause, e.g.
    /// `field.lookup_cannot_duplicate`.
    ///
    /// Ad-hoc errors have no code.
    pub fn code(&self) -> Option<&str> {
        self.root().kind().code()
    }

    fn root(&self) -> &Error {
        self.chain().last().unwrap_or(self)
    }

    fn chain(&self) -> impl Iterator<Item = &Error> {
        let mut err = self;
        core::iter::once(err).chain(core::iter::from_fn(move || {
            err = err.inner.as_ref().and_then(|inner| inner.cause.as_ref())?;
            Some(err)
        }))
    }

    fn kind(&self) -> &ErrorKind {
        self.inner
            .as_ref()
            .map(|inner| &inner.kind)
            .unwrap_or(&ErrorKind::Unknown)
    }

    fn root_kind(&self) -> &ErrorKind {
        self.root().kind()
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind() {
            ErrorKind::Infrastructure(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut it = self.chain().peekable();
        while let Some(err) = it.next() {
            core::fmt::Display::fmt(err.kind(), f)?;
            if it.peek().is_some() {
                f.write_str(": ")?;
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if !f.alternate() {
            core::fmt::Display::fmt(self, f)
        } else {
            let Some(ref inner) = self.inner else {
                return f.debug_struct("Error").field("kind", &"None").finish();
            };
            f.debug_struct("Error")
                .field("kind", &inner.kind)
                .field("cause", &inner.cause)
                .finish()
        }
    }
}

#[derive(Debug)]
enum ErrorKind {
    Adhoc(AdhocError),
    Validation(ValidationError),
    Invariant(InvariantError),
    Conflict(ConflictError),
    NotFound(NotFoundError),
    Unexpected(UnexpectedError),
    Infrastructure(anyhow::Error),
    NotImplemented(NotImplementedError),
    Unknown,
}

impl ErrorKind {
    fn code(&self) -> Option<&str> {
        use self::ErrorKind::*;

        match self {
            Validation(err) => Some(err.code),
            Invariant(err) => Some(err.code),
            Conflict(err) => Some(err.code),
            NotFound(err) => Some(err.code),
            Unexpected(err) => Some(err.code),
            NotImplemented(err) => Some(err.code),
            Infrastructure(_) => Some("infrastructure"),
            Adhoc(_) | Unknown => None,
        }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::ErrorKind::*;

        match self {
            Adhoc(err) => core::fmt::Display::fmt(err, f),
            Validation(err) => core::fmt::Display::fmt(err, f),
            Invariant(err) => core::fmt::Display::fmt(err, f),
            Conflict(err) => core::fmt::Display::fmt(err, f),
            NotFound(err) => core::fmt::Display::fmt(err, f),
            Unexpected(err) => core::fmt::Display::fmt(err, f),
            Infrastructure(err) => core::fmt::Display::fmt(err, f),
            NotImplemented(err) => core::fmt::Display::fmt(err, f),
            Unknown => f.write_str("unknown tabula error"),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            inner: Some(Arc::new(ErrorInner { kind, cause: None })),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Error {
        Error::from(ErrorKind::Infrastructure(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::validation("dto.malformed", err.to_string())
    }
}

impl From<jiff::Error> for Error {
    fn from(err: jiff::Error) -> Error {
        Error::validation("datetime.invalid", err.to_string())
    }
}

impl Error {
    /// Returns `true` if the root cause is a caller-infrastructure failure.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self.root_kind(), ErrorKind::Infrastructure(_))
    }
}

/// Trait for types that can be converted into an Error.
pub trait IntoError {
    /// Converts this type into an Error.
    fn into_error(self) -> Error;
}

impl IntoError for Error {
    #[inline(always)]
    fn into_error(self) -> Error {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_size() {
        // Ensure Error stays at one word (size of pointer/Arc)
        let expected_size = core::mem::size_of::<usize>();
        assert_eq!(expected_size, core::mem::size_of::<Error>());
    }

    #[test]
    fn error_from_args() {
        let err = Error::from_args(format_args!("test error: {}", 42));
        assert_eq!(err.to_string(), "test error: 42");
        assert_eq!(err.code(), None);
    }

    #[test]
    fn error_chain_display() {
        let root = Error::validation("rating.out_of_range", "rating 7 is outside 1..=5");
        let top = err!("setting field `Score`");

        let chained = root.context(top);
        assert_eq!(
            chained.to_string(),
            "setting field `Score`: rating.out_of_range: rating 7 is outside 1..=5"
        );
    }

    #[test]
    fn context_keeps_root_category() {
        let err = Error::invariant("field.db_field_name_already_set", "already set")
            .context(err!("resolving table"));

        assert!(err.is_invariant());
        assert!(!err.is_validation());
        assert_eq!(err.code(), Some("field.db_field_name_already_set"));
    }

    #[test]
    fn anyhow_bridge() {
        let anyhow_err = anyhow::anyhow!("connection reset");
        let our_err: Error = anyhow_err.into();
        assert!(our_err.is_infrastructure());
        assert_eq!(our_err.to_string(), "connection reset");
    }

    #[test]
    fn each_category_is_distinct() {
        assert!(Error::validation("a", "x").is_validation());
        assert!(Error::invariant("a", "x").is_invariant());
        assert!(Error::conflict("a", "x").is_conflict());
        assert!(Error::not_found("a", "x").is_not_found());
        assert!(Error::unexpected("a", "x").is_unexpected());
        assert!(Error::not_implemented("a", "x").is_not_implemented());
        assert!(!Error::conflict("a", "x").is_validation());
    }
}
