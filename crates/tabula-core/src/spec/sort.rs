use super::Record;
use crate::schema::FieldId;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// One sort key. Empty cells sort first in ascending order and last in
/// descending order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    pub field_id: FieldId,

    #[serde(default)]
    pub order: SortOrder,
}

impl SortSpec {
    pub fn asc(field_id: FieldId) -> SortSpec {
        SortSpec {
            field_id,
            order: SortOrder::Asc,
        }
    }

    pub fn desc(field_id: FieldId) -> SortSpec {
        SortSpec {
            field_id,
            order: SortOrder::Desc,
        }
    }

    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let ordering = sort_cmp(a.get(&self.field_id), b.get(&self.field_id));

        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    /// Stable sort by several keys, the first key being the most
    /// significant.
    pub fn sort(specs: &[SortSpec], records: &mut [&Record]) {
        records.sort_by(|a, b| {
            specs
                .iter()
                .map(|spec| spec.compare(a, b))
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        });
    }
}

/// Total order over cell values: null, booleans, numbers, strings, then
/// lists and objects. Lists compare by their first element.
fn sort_cmp(a: &Value, b: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => {
            let a = a.as_f64().unwrap_or(f64::NAN);
            let b = b.as_f64().unwrap_or(f64::NAN);
            a.total_cmp(&b)
        }
        (Value::String(a), Value::String(b)) => a.as_bytes().cmp(b.as_bytes()),
        (Value::Array(a), Value::Array(b)) => match (a.first(), b.first()) {
            (Some(a), Some(b)) => sort_cmp(a, b),
            (a, b) => a.is_some().cmp(&b.is_some()),
        },
        _ => rank(a).cmp(&rank(b)),
    }
}
