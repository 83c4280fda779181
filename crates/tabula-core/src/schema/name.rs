use crate::{Error, Result};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a user-facing field name.
const MAX_FIELD_NAME_LEN: usize = 255;

/// Maximum length of a storage identifier. Matches the PostgreSQL limit.
const MAX_DB_NAME_LEN: usize = 63;

/// The user-facing name of a field. Trimmed and never empty.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldName(String);

/// The storage column a field is bound to.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DbFieldName(String);

impl FieldName {
    pub fn new(src: impl AsRef<str>) -> Result<Self> {
        let name = src.as_ref().trim();

        if name.is_empty() {
            return Err(Error::validation(
                "field_name.empty",
                "field name must not be empty",
            ));
        }

        if name.chars().count() > MAX_FIELD_NAME_LEN {
            return Err(Error::validation(
                "field_name.too_long",
                format!("field name exceeds {MAX_FIELD_NAME_LEN} characters"),
            ));
        }

        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl DbFieldName {
    pub fn new(src: impl AsRef<str>) -> Result<Self> {
        let name = src.as_ref();
        let mut chars = name.chars();

        let valid = match chars.next() {
            Some(first) => {
                (first.is_ascii_alphabetic() || first == '_')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            None => false,
        };

        if !valid || name.len() > MAX_DB_NAME_LEN {
            return Err(Error::validation(
                "db_field_name.invalid",
                format!("`{name}` is not a valid storage identifier"),
            ));
        }

        Ok(Self(name.to_string()))
    }

    /// Derives a storage identifier from a user-facing name.
    ///
    /// Characters outside `[A-Za-z0-9_]` are replaced with `_`, a leading
    /// digit is prefixed and the result is truncated to the storage limit.
    pub fn from_field_name(name: &FieldName) -> Self {
        let mut out: String = name
            .as_str()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();

        if out.starts_with(|c: char| c.is_ascii_digit()) || out.is_empty() {
            out.insert(0, 'f');
            out.insert(1, '_');
        }

        out.truncate(MAX_DB_NAME_LEN);
        Self(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! impl_string_newtype {
    ($name:ident) => {
        impl TryFrom<String> for $name {
            type Error = Error;

            fn try_from(value: String) -> Result<Self> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = Error;

            fn try_from(value: &str) -> Result<Self> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt.write_str(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(fmt, "{}({:?})", stringify!($name), self.0)
            }
        }
    };
}

impl_string_newtype!(FieldName);
impl_string_newtype!(DbFieldName);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_name_is_trimmed() {
        assert_eq!(FieldName::new("  Title ").unwrap().as_str(), "Title");
        assert!(FieldName::new("   ").unwrap_err().is_validation());
    }

    #[test]
    fn db_field_name_from_field_name() {
        let name = FieldName::new("Unit price (€)").unwrap();
        assert_eq!(DbFieldName::from_field_name(&name).as_str(), "Unit_price____");

        let name = FieldName::new("2024 total").unwrap();
        assert_eq!(DbFieldName::from_field_name(&name).as_str(), "f_2024_total");
    }

    #[test]
    fn db_field_name_rejects_bad_identifiers() {
        assert!(DbFieldName::new("1abc").is_err());
        assert!(DbFieldName::new("a-b").is_err());
        assert!(DbFieldName::new("__fk_fldA").is_ok());
    }
}
