use super::Visit;
use crate::schema::field::{
    Attachment, AutoNumber, Button, Checkbox, ConditionalLookup, ConditionalRollup, CreatedBy,
    CreatedTime, Date, Formula, LastModifiedBy, LastModifiedTime, Link, LongText, Lookup,
    MultipleSelect, Number, Rating, Rollup, SingleLineText, SingleSelect, User,
};
use crate::schema::{CellValueType, DbFieldType, Field, FieldKind, FieldValueType};
use crate::{Error, Result};

/// Computes the value shape of a field: its cell-value type and whether a
/// cell holds several values.
///
/// Lookups take the cell-value type of the field they mirror but keep their
/// own multiplicity.
#[derive(Debug, Default)]
pub struct ValueTypeVisitor;

impl Visit for ValueTypeVisitor {
    type Output = FieldValueType;

    fn visit_single_line_text(&mut self, _: &Field, _: &SingleLineText) -> Result<FieldValueType> {
        Ok(FieldValueType::single(CellValueType::String))
    }

    fn visit_long_text(&mut self, _: &Field, _: &LongText) -> Result<FieldValueType> {
        Ok(FieldValueType::single(CellValueType::String))
    }

    fn visit_number(&mut self, _: &Field, _: &Number) -> Result<FieldValueType> {
        Ok(FieldValueType::single(CellValueType::Number))
    }

    fn visit_rating(&mut self, _: &Field, _: &Rating) -> Result<FieldValueType> {
        Ok(FieldValueType::single(CellValueType::Number))
    }

    fn visit_checkbox(&mut self, _: &Field, _: &Checkbox) -> Result<FieldValueType> {
        Ok(FieldValueType::single(CellValueType::Boolean))
    }

    fn visit_date(&mut self, _: &Field, _: &Date) -> Result<FieldValueType> {
        Ok(FieldValueType::single(CellValueType::DateTime))
    }

    fn visit_attachment(&mut self, _: &Field, _: &Attachment) -> Result<FieldValueType> {
        Ok(FieldValueType::multiple(CellValueType::String))
    }

    fn visit_user(&mut self, _: &Field, ty: &User) -> Result<FieldValueType> {
        Ok(FieldValueType {
            cell_value_type: CellValueType::String,
            is_multiple: ty.is_multiple(),
        })
    }

    fn visit_single_select(&mut self, _: &Field, _: &SingleSelect) -> Result<FieldValueType> {
        Ok(FieldValueType::single(CellValueType::String))
    }

    fn visit_multiple_select(&mut self, _: &Field, _: &MultipleSelect) -> Result<FieldValueType> {
        Ok(FieldValueType::multiple(CellValueType::String))
    }

    fn visit_formula(&mut self, _: &Field, ty: &Formula) -> Result<FieldValueType> {
        Ok(ty.result_type)
    }

    fn visit_button(&mut self, _: &Field, _: &Button) -> Result<FieldValueType> {
        Ok(FieldValueType::single(CellValueType::Number))
    }

    fn visit_created_time(&mut self, _: &Field, _: &CreatedTime) -> Result<FieldValueType> {
        Ok(FieldValueType::single(CellValueType::DateTime))
    }

    fn visit_last_modified_time(
        &mut self,
        _: &Field,
        _: &LastModifiedTime,
    ) -> Result<FieldValueType> {
        Ok(FieldValueType::single(CellValueType::DateTime))
    }

    fn visit_created_by(&mut self, _: &Field, _: &CreatedBy) -> Result<FieldValueType> {
        Ok(FieldValueType::single(CellValueType::String))
    }

    fn visit_last_modified_by(&mut self, _: &Field, _: &LastModifiedBy) -> Result<FieldValueType> {
        Ok(FieldValueType::single(CellValueType::String))
    }

    fn visit_auto_number(&mut self, _: &Field, _: &AutoNumber) -> Result<FieldValueType> {
        Ok(FieldValueType::single(CellValueType::Number))
    }

    fn visit_link(&mut self, _: &Field, ty: &Link) -> Result<FieldValueType> {
        Ok(FieldValueType {
            cell_value_type: CellValueType::String,
            is_multiple: ty.is_multiple(),
        })
    }

    fn visit_lookup(&mut self, field: &Field, lookup: &Lookup) -> Result<FieldValueType> {
        let inner = super::visit_lookup(self, field, lookup)?;

        Ok(FieldValueType {
            cell_value_type: inner.cell_value_type,
            is_multiple: lookup.is_multiple(),
        })
    }

    fn visit_rollup(&mut self, field: &Field, ty: &Rollup) -> Result<FieldValueType> {
        ty.aggregate()
            .result_type()
            .ok_or_else(|| pending(field))
    }

    fn visit_conditional_lookup(
        &mut self,
        field: &Field,
        lookup: &ConditionalLookup,
    ) -> Result<FieldValueType> {
        let inner = super::visit_conditional_lookup(self, field, lookup)?;

        Ok(FieldValueType {
            cell_value_type: inner.cell_value_type,
            is_multiple: lookup.is_multiple(),
        })
    }

    fn visit_conditional_rollup(
        &mut self,
        field: &Field,
        ty: &ConditionalRollup,
    ) -> Result<FieldValueType> {
        ty.aggregate()
            .result_type()
            .ok_or_else(|| pending(field))
    }
}

fn pending(field: &Field) -> Error {
    Error::invariant(
        "field.pending",
        format!(
            "the value type of {} `{}` is unknown until it is resolved",
            field.kind(),
            field.id()
        ),
    )
}

impl Field {
    pub fn value_type(&self) -> Result<FieldValueType> {
        self.accept(&mut ValueTypeVisitor)
    }

    pub fn cell_value_type(&self) -> Result<CellValueType> {
        Ok(self.value_type()?.cell_value_type)
    }

    pub fn is_multiple_cell_value(&self) -> Result<bool> {
        Ok(self.value_type()?.is_multiple)
    }

    /// The storage type a resolved field binds to when none was recorded.
    ///
    /// Links, lookups and every multi-valued field store JSON regardless of
    /// their cell-value type.
    pub fn default_db_field_type(&self) -> Result<DbFieldType> {
        let value_type = self.value_type()?;

        if value_type.is_multiple
            || matches!(
                self.kind(),
                FieldKind::Link | FieldKind::Lookup | FieldKind::ConditionalLookup
            )
        {
            return Ok(DbFieldType::Json);
        }

        Ok(match (self.kind(), value_type.cell_value_type) {
            (FieldKind::AutoNumber | FieldKind::Rating | FieldKind::Button, _) => {
                DbFieldType::Integer
            }
            (FieldKind::Attachment | FieldKind::User | FieldKind::CreatedBy, _)
            | (FieldKind::LastModifiedBy, _) => DbFieldType::Json,
            (_, CellValueType::String) => DbFieldType::Text,
            (_, CellValueType::Number) => DbFieldType::Real,
            (_, CellValueType::Boolean) => DbFieldType::Boolean,
            (_, CellValueType::DateTime) => DbFieldType::DateTime,
        })
    }
}
