use crate::{Error, Result};

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Number of random characters appended to a generated identifier.
const SUFFIX_LEN: usize = 16;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal, $code:literal) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Prefix every identifier of this kind starts with.
            pub const PREFIX: &'static str = $prefix;

            /// Generates a fresh random identifier.
            pub fn generate() -> Self {
                Self(format!("{}{}", $prefix, random_suffix()))
            }

            /// Parses and validates an identifier: the prefix followed by
            /// exactly 16 ASCII alphanumerics.
            pub fn parse(src: impl Into<String>) -> Result<Self> {
                let src = src.into();

                match src.strip_prefix($prefix) {
                    Some(suffix)
                        if suffix.len() == SUFFIX_LEN
                            && suffix.chars().all(|c| c.is_ascii_alphanumeric()) =>
                    {
                        Ok(Self(src))
                    }
                    _ => Err(Error::validation(
                        $code,
                        format!("`{}` is not a valid {} identifier", src, $prefix),
                    )),
                }
            }

            /// Returns `true` if `src` looks like an identifier of this kind.
            pub fn is_valid(src: &str) -> bool {
                Self::parse(src).is_ok()
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = Error;

            fn try_from(value: String) -> Result<Self> {
                Self::parse(value)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse(s)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl From<&$name> for $name {
            fn from(value: &$name) -> Self {
                value.clone()
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
                write!(fmt, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

define_id!(
    /// Uniquely identifies a field across all tables.
    FieldId,
    "fld",
    "field_id.invalid"
);

define_id!(
    /// Uniquely identifies a table.
    TableId,
    "tbl",
    "table_id.invalid"
);

define_id!(
    /// Identifies the base (workspace database) a table belongs to.
    BaseId,
    "bse",
    "base_id.invalid"
);

define_id!(
    /// Uniquely identifies a record within a table.
    RecordId,
    "rec",
    "record_id.invalid"
);

define_id!(
    /// Identifies a select choice.
    ChoiceId,
    "cho",
    "choice_id.invalid"
);

fn random_suffix() -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    uuid[..SUFFIX_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_parse() {
        let id = FieldId::generate();
        assert!(id.as_str().starts_with("fld"));
        assert_eq!(id.as_str().len(), 3 + SUFFIX_LEN);
        assert_eq!(FieldId::parse(id.as_str()).unwrap(), id);
    }

    #[test]
    fn rejects_wrong_prefix() {
        let err = FieldId::parse("tblAbc").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.code(), Some("field_id.invalid"));
    }

    #[test]
    fn suffix_is_sixteen_alphanumerics() {
        assert!(!RecordId::is_valid("rec"));
        assert!(!RecordId::is_valid("rec-123"));
        assert!(!RecordId::is_valid("recipes"));
        assert!(!RecordId::is_valid("recABC123"));
        assert!(!RecordId::is_valid("recABC123ABC123ABC12"));
        assert!(!RecordId::is_valid("recABC123ABC123ABC-"));
        assert!(RecordId::is_valid("recABC123ABC123ABC1"));
    }

    #[test]
    fn serde_round_trip_validates() {
        let id: TableId = serde_json::from_str("\"tblOrders0000000000\"").unwrap();
        assert_eq!(id.as_str(), "tblOrders0000000000");
        assert!(serde_json::from_str::<TableId>("\"orders\"").is_err());
    }
}
