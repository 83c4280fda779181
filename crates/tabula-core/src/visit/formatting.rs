use super::Visit;
use crate::schema::field::{
    Attachment, AutoNumber, Button, Checkbox, ConditionalRollup, CreatedBy, CreatedTime, Date,
    Formula, LastModifiedBy, LastModifiedTime, Link, LongText, MultipleSelect, Number, Rating,
    Rollup, SingleLineText, SingleSelect, User,
};
use crate::schema::{Field, Formatting};
use crate::Result;

/// Finds the display formatting of a field.
///
/// Lookups display values the way the field they mirror does, so they use
/// the default delegation.
#[derive(Debug, Default)]
pub struct FormattingVisitor;

impl Visit for FormattingVisitor {
    type Output = Option<Formatting>;

    fn visit_single_line_text(&mut self, _: &Field, _: &SingleLineText) -> Result<Self::Output> {
        Ok(None)
    }

    fn visit_long_text(&mut self, _: &Field, _: &LongText) -> Result<Self::Output> {
        Ok(None)
    }

    fn visit_number(&mut self, _: &Field, ty: &Number) -> Result<Self::Output> {
        Ok(Some(Formatting::Number(ty.options.formatting.clone())))
    }

    fn visit_rating(&mut self, _: &Field, _: &Rating) -> Result<Self::Output> {
        Ok(None)
    }

    fn visit_checkbox(&mut self, _: &Field, _: &Checkbox) -> Result<Self::Output> {
        Ok(None)
    }

    fn visit_date(&mut self, _: &Field, ty: &Date) -> Result<Self::Output> {
        Ok(Some(Formatting::Datetime(ty.options.formatting.clone())))
    }

    fn visit_attachment(&mut self, _: &Field, _: &Attachment) -> Result<Self::Output> {
        Ok(None)
    }

    fn visit_user(&mut self, _: &Field, _: &User) -> Result<Self::Output> {
        Ok(None)
    }

    fn visit_single_select(&mut self, _: &Field, _: &SingleSelect) -> Result<Self::Output> {
        Ok(None)
    }

    fn visit_multiple_select(&mut self, _: &Field, _: &MultipleSelect) -> Result<Self::Output> {
        Ok(None)
    }

    fn visit_formula(&mut self, _: &Field, ty: &Formula) -> Result<Self::Output> {
        Ok(ty.formatting.clone())
    }

    fn visit_button(&mut self, _: &Field, _: &Button) -> Result<Self::Output> {
        Ok(None)
    }

    fn visit_created_time(&mut self, _: &Field, ty: &CreatedTime) -> Result<Self::Output> {
        Ok(Some(Formatting::Datetime(ty.formatting.clone())))
    }

    fn visit_last_modified_time(
        &mut self,
        _: &Field,
        ty: &LastModifiedTime,
    ) -> Result<Self::Output> {
        Ok(Some(Formatting::Datetime(ty.formatting.clone())))
    }

    fn visit_created_by(&mut self, _: &Field, _: &CreatedBy) -> Result<Self::Output> {
        Ok(None)
    }

    fn visit_last_modified_by(&mut self, _: &Field, _: &LastModifiedBy) -> Result<Self::Output> {
        Ok(None)
    }

    fn visit_auto_number(&mut self, _: &Field, _: &AutoNumber) -> Result<Self::Output> {
        Ok(None)
    }

    fn visit_link(&mut self, _: &Field, _: &Link) -> Result<Self::Output> {
        Ok(None)
    }

    fn visit_rollup(&mut self, _: &Field, ty: &Rollup) -> Result<Self::Output> {
        Ok(ty.aggregate().formatting().cloned())
    }

    fn visit_conditional_rollup(
        &mut self,
        _: &Field,
        ty: &ConditionalRollup,
    ) -> Result<Self::Output> {
        Ok(ty.aggregate().formatting().cloned())
    }
}

impl Field {
    /// Display formatting, if the field's values have any.
    pub fn formatting(&self) -> Result<Option<Formatting>> {
        self.accept(&mut FormattingVisitor)
    }
}
