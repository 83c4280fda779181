//! Fields whose values are maintained by the system rather than written by
//! users.

use super::Field;
use crate::schema::{DatetimeFormatting, FieldId, FieldName};
use crate::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedTime {
    pub formatting: DatetimeFormatting,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LastModifiedTime {
    pub formatting: DatetimeFormatting,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedBy;

#[derive(Debug, Clone, PartialEq)]
pub struct LastModifiedBy;

/// Monotonic per-table record counter.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoNumber;

impl CreatedTime {
    pub fn create(id: FieldId, name: FieldName, formatting: DatetimeFormatting) -> Result<Field> {
        formatting.validate()?;
        Ok(Field::new(id, name, CreatedTime { formatting }))
    }
}

impl LastModifiedTime {
    pub fn create(id: FieldId, name: FieldName, formatting: DatetimeFormatting) -> Result<Field> {
        formatting.validate()?;
        Ok(Field::new(id, name, LastModifiedTime { formatting }))
    }
}

impl CreatedBy {
    pub fn create(id: FieldId, name: FieldName) -> Field {
        Field::new(id, name, CreatedBy)
    }
}

impl LastModifiedBy {
    pub fn create(id: FieldId, name: FieldName) -> Field {
        Field::new(id, name, LastModifiedBy)
    }
}

impl AutoNumber {
    pub fn create(id: FieldId, name: FieldName) -> Field {
        Field::new(id, name, AutoNumber)
    }
}
