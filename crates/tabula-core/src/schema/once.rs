use crate::{Error, Result};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A value that starts out unset and may be set exactly once.
///
/// Setting it again to an equal value is a no-op. Setting it to a different
/// value is an invariant violation and leaves the current value untouched.
#[derive(Clone, PartialEq, Eq)]
pub enum SetOnce<T> {
    Unset,
    Set(T),
}

impl<T> SetOnce<T> {
    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Unset => None,
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Unset => None,
        }
    }
}

impl<T: PartialEq + fmt::Debug> SetOnce<T> {
    /// Transitions to `Set(value)`.
    ///
    /// `code` names the binding in the invariant error returned when a
    /// different value is already present.
    pub fn set(&mut self, value: T, code: &'static str) -> Result<()> {
        match self {
            Self::Unset => {
                *self = Self::Set(value);
                Ok(())
            }
            Self::Set(current) if *current == value => Ok(()),
            Self::Set(current) => Err(Error::invariant(
                code,
                format!("already set to {current:?}; refusing to overwrite with {value:?}"),
            )),
        }
    }
}

impl<T> Default for SetOnce<T> {
    fn default() -> Self {
        Self::Unset
    }
}

impl<T> From<Option<T>> for SetOnce<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Set(value),
            None => Self::Unset,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SetOnce<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => fmt.write_str("Unset"),
            Self::Set(value) => value.fmt(fmt),
        }
    }
}

impl<T: Serialize> Serialize for SetOnce<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.get().serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for SetOnce<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(Option::<T>::deserialize(deserializer)?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_same_value_twice_is_noop() {
        let mut cell = SetOnce::default();
        cell.set(5, "test.already_set").unwrap();
        cell.set(5, "test.already_set").unwrap();
        assert_eq!(cell.get(), Some(&5));
    }

    #[test]
    fn set_different_value_is_invariant_error() {
        let mut cell = SetOnce::default();
        cell.set("a", "test.already_set").unwrap();

        let err = cell.set("b", "test.already_set").unwrap_err();
        assert!(err.is_invariant());
        assert_eq!(err.code(), Some("test.already_set"));
        assert_eq!(cell.get(), Some(&"a"));
    }
}
