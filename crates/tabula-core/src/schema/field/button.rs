use super::Field;
use crate::schema::{Color, FieldId, FieldName};
use crate::{Error, Result};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonOptions {
    pub label: String,
    pub color: Color,

    /// How many times a record's button may be clicked. Unlimited if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_count: Option<u32>,

    #[serde(default)]
    pub reset_count: bool,
}

/// A clickable action. Its cell stores the click count.
#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    pub options: ButtonOptions,
}

impl Button {
    pub fn create(id: FieldId, name: FieldName, options: ButtonOptions) -> Result<Field> {
        if options.label.trim().is_empty() {
            return Err(Error::validation(
                "button.label_empty",
                "button label cannot be empty",
            ));
        }

        if options.max_count == Some(0) {
            return Err(Error::validation(
                "button.max_count_zero",
                "button max count must be positive",
            ));
        }

        Ok(Field::new(id, name, Button { options }))
    }
}

impl Default for ButtonOptions {
    fn default() -> Self {
        Self {
            label: "Button".to_string(),
            color: Color::Teal,
            max_count: None,
            reset_count: false,
        }
    }
}
