use serde::{Deserialize, Serialize};
use std::fmt;

/// The logical type of a single cell value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellValueType {
    String,
    Number,
    Boolean,
    DateTime,
}

/// The storage representation a field is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DbFieldType {
    Text,
    Integer,
    Real,
    Boolean,
    DateTime,
    Json,
}

/// The value shape of a field: its cell-value type and whether a cell holds
/// a list of such values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValueType {
    pub cell_value_type: CellValueType,

    #[serde(rename = "isMultipleCellValue")]
    pub is_multiple: bool,
}

/// The type tag of a field. One per variant of [`FieldTy`](super::FieldTy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    SingleLineText,
    LongText,
    Number,
    Rating,
    Checkbox,
    Date,
    Attachment,
    User,
    SingleSelect,
    MultipleSelect,
    Formula,
    Button,
    CreatedTime,
    LastModifiedTime,
    CreatedBy,
    LastModifiedBy,
    AutoNumber,
    Link,
    Lookup,
    Rollup,
    ConditionalLookup,
    ConditionalRollup,
}

impl FieldKind {
    pub const ALL: [FieldKind; 22] = [
        Self::SingleLineText,
        Self::LongText,
        Self::Number,
        Self::Rating,
        Self::Checkbox,
        Self::Date,
        Self::Attachment,
        Self::User,
        Self::SingleSelect,
        Self::MultipleSelect,
        Self::Formula,
        Self::Button,
        Self::CreatedTime,
        Self::LastModifiedTime,
        Self::CreatedBy,
        Self::LastModifiedBy,
        Self::AutoNumber,
        Self::Link,
        Self::Lookup,
        Self::Rollup,
        Self::ConditionalLookup,
        Self::ConditionalRollup,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SingleLineText => "singleLineText",
            Self::LongText => "longText",
            Self::Number => "number",
            Self::Rating => "rating",
            Self::Checkbox => "checkbox",
            Self::Date => "date",
            Self::Attachment => "attachment",
            Self::User => "user",
            Self::SingleSelect => "singleSelect",
            Self::MultipleSelect => "multipleSelect",
            Self::Formula => "formula",
            Self::Button => "button",
            Self::CreatedTime => "createdTime",
            Self::LastModifiedTime => "lastModifiedTime",
            Self::CreatedBy => "createdBy",
            Self::LastModifiedBy => "lastModifiedBy",
            Self::AutoNumber => "autoNumber",
            Self::Link => "link",
            Self::Lookup => "lookup",
            Self::Rollup => "rollup",
            Self::ConditionalLookup => "conditionalLookup",
            Self::ConditionalRollup => "conditionalRollup",
        }
    }

    /// Fields whose values are maintained by the system itself.
    pub fn is_system(self) -> bool {
        matches!(
            self,
            Self::CreatedTime
                | Self::LastModifiedTime
                | Self::CreatedBy
                | Self::LastModifiedBy
                | Self::AutoNumber
        )
    }

    /// Fields whose values are derived rather than written.
    pub fn is_computed(self) -> bool {
        self.is_system()
            || matches!(
                self,
                Self::Formula
                    | Self::Lookup
                    | Self::Rollup
                    | Self::ConditionalLookup
                    | Self::ConditionalRollup
            )
    }

    /// Fields that reference other tables and go through foreign-table
    /// resolution.
    pub fn is_foreign_related(self) -> bool {
        matches!(
            self,
            Self::Link
                | Self::Lookup
                | Self::Rollup
                | Self::ConditionalLookup
                | Self::ConditionalRollup
        )
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(self.as_str())
    }
}

impl FieldValueType {
    pub const fn single(cell_value_type: CellValueType) -> Self {
        Self {
            cell_value_type,
            is_multiple: false,
        }
    }

    pub const fn multiple(cell_value_type: CellValueType) -> Self {
        Self {
            cell_value_type,
            is_multiple: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tags_match_serde_names() {
        for kind in FieldKind::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::Value::String(kind.as_str().into()));
        }
    }

    #[test]
    fn system_kinds_are_computed() {
        for kind in FieldKind::ALL.into_iter().filter(|kind| kind.is_system()) {
            assert!(kind.is_computed(), "{kind}");
        }
        assert!(!FieldKind::Link.is_computed());
        assert!(!FieldKind::Button.is_computed());
    }
}
