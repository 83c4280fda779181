use super::Field;
use crate::schema::{FieldId, FieldName};
use crate::Result;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOptions {
    #[serde(default)]
    pub is_multiple: bool,

    #[serde(default)]
    pub should_notify: bool,
}

/// A reference to a collaborator stored in a user cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserItem {
    pub id: String,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub options: UserOptions,
}

impl User {
    pub fn create(id: FieldId, name: FieldName, options: UserOptions) -> Result<Field> {
        Ok(Field::new(id, name, User { options }))
    }

    pub fn is_multiple(&self) -> bool {
        self.options.is_multiple
    }
}
