use super::Field;
use crate::schema::{FieldId, FieldName};
use crate::Result;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckboxOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Checkbox {
    pub options: CheckboxOptions,
}

impl Checkbox {
    pub fn create(id: FieldId, name: FieldName, options: CheckboxOptions) -> Result<Field> {
        Ok(Field::new(id, name, Checkbox { options }))
    }
}
