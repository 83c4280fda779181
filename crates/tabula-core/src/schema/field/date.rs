use super::Field;
use crate::schema::{DatetimeFormatting, FieldId, FieldName};
use crate::Result;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateDefault {
    Now,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateOptions {
    #[serde(default)]
    pub formatting: DatetimeFormatting,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<DateDefault>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Date {
    pub options: DateOptions,
}

impl Date {
    pub fn create(id: FieldId, name: FieldName, options: DateOptions) -> Result<Field> {
        options.formatting.validate()?;
        Ok(Field::new(id, name, Date { options }))
    }

    pub fn time_zone(&self) -> &str {
        &self.options.formatting.time_zone
    }
}
