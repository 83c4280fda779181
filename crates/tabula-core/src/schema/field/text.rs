use super::Field;
use crate::schema::{FieldId, FieldName, TextShowAs};
use crate::Result;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_as: Option<TextShowAs>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LongTextOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

/// A single line of free text.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleLineText {
    pub options: TextOptions,
}

/// Multi-line free text.
#[derive(Debug, Clone, PartialEq)]
pub struct LongText {
    pub options: LongTextOptions,
}

impl SingleLineText {
    pub fn create(id: FieldId, name: FieldName, options: TextOptions) -> Result<Field> {
        Ok(Field::new(id, name, SingleLineText { options }))
    }
}

impl LongText {
    pub fn create(id: FieldId, name: FieldName, options: LongTextOptions) -> Result<Field> {
        Ok(Field::new(id, name, LongText { options }))
    }
}
