use super::Field;
use crate::schema::{FieldId, FieldName};
use crate::Result;

use serde::{Deserialize, Serialize};

/// One uploaded file stored in an attachment cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentItem {
    pub id: String,
    pub name: String,
    pub path: String,
    pub token: String,
    pub size: u64,
    pub mimetype: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attachment;

impl Attachment {
    pub fn create(id: FieldId, name: FieldName) -> Result<Field> {
        Ok(Field::new(id, name, Attachment))
    }
}
