use super::{ConvertOptions, SetFieldValue};
use crate::schema::Table;
use crate::{Error, Result};

use serde_json::{Map, Value};

/// Converts a raw record into typed cell writes for one table.
///
/// Keys may be field ids or field names. In strict mode each value is first
/// checked against the field's cell schema. Naming one field twice is an
/// error. Writes are returned in table
/// field order.
#[derive(Debug)]
pub struct FieldToSpec<'a> {
    table: &'a Table,
    options: ConvertOptions,
}

impl<'a> FieldToSpec<'a> {
    pub fn new(table: &'a Table, options: ConvertOptions) -> FieldToSpec<'a> {
        FieldToSpec { table, options }
    }

    pub fn convert(&self, record: &Map<String, Value>) -> Result<Vec<SetFieldValue>> {
        let mut inputs = Vec::with_capacity(record.len());
        let mut seen = Vec::with_capacity(record.len());

        for (key, value) in record {
            let Some(field) = self.table.field_by_key(key) else {
                return Err(Error::not_found(
                    "record.unknown_field",
                    format!("table `{}` has no field `{key}`", self.table.name()),
                ));
            };

            // an id and a name may both resolve to the same field
            if seen.contains(&field.id()) {
                return Err(Error::validation(
                    "record.duplicate_field",
                    format!("field `{}` is given more than once", field.name()),
                ));
            }
            seen.push(field.id());

            // clearing a computed field is not a write
            if value.is_null() && field.is_computed() {
                continue;
            }

            inputs.push((field, value));
        }

        inputs.sort_by_key(|(field, _)| self.table.field_index(field.id()));

        let mut writes = Vec::with_capacity(inputs.len());

        for (field, value) in inputs {
            let converted = if self.options.typecast || field.is_computed() {
                field.set_value(value, &self.options)
            } else {
                field
                    .cell_schema()
                    .and_then(|schema| schema.validate(value))
                    .and_then(|_| field.set_value(value, &self.options))
            };

            writes.push(converted.map_err(|err| err.context(err!("field `{}`", field.name())))?);
        }

        tracing::trace!(table = %self.table.id(), writes = writes.len(), "converted record");
        Ok(writes)
    }
}
