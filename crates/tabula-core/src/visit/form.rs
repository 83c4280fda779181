use super::Visit;
use crate::schema::field::{
    Attachment, AutoNumber, Button, Checkbox, ConditionalLookup, ConditionalRollup, CreatedBy,
    CreatedTime, Date, Formula, LastModifiedBy, LastModifiedTime, Link, LongText, Lookup,
    MultipleSelect, Number, Rating, Rollup, SingleLineText, SingleSelect, User,
};
use crate::schema::Field;
use crate::Result;

/// Decides whether a field can appear as an input on a form.
///
/// Only fields a user can write are shown.
#[derive(Debug, Default)]
pub struct FormVisibilityVisitor;

impl Visit for FormVisibilityVisitor {
    type Output = bool;

    fn visit_single_line_text(&mut self, _: &Field, _: &SingleLineText) -> Result<bool> {
        Ok(true)
    }

    fn visit_long_text(&mut self, _: &Field, _: &LongText) -> Result<bool> {
        Ok(true)
    }

    fn visit_number(&mut self, _: &Field, _: &Number) -> Result<bool> {
        Ok(true)
    }

    fn visit_rating(&mut self, _: &Field, _: &Rating) -> Result<bool> {
        Ok(true)
    }

    fn visit_checkbox(&mut self, _: &Field, _: &Checkbox) -> Result<bool> {
        Ok(true)
    }

    fn visit_date(&mut self, _: &Field, _: &Date) -> Result<bool> {
        Ok(true)
    }

    fn visit_attachment(&mut self, _: &Field, _: &Attachment) -> Result<bool> {
        Ok(true)
    }

    fn visit_user(&mut self, _: &Field, _: &User) -> Result<bool> {
        Ok(true)
    }

    fn visit_single_select(&mut self, _: &Field, _: &SingleSelect) -> Result<bool> {
        Ok(true)
    }

    fn visit_multiple_select(&mut self, _: &Field, _: &MultipleSelect) -> Result<bool> {
        Ok(true)
    }

    fn visit_formula(&mut self, _: &Field, _: &Formula) -> Result<bool> {
        Ok(false)
    }

    fn visit_button(&mut self, _: &Field, _: &Button) -> Result<bool> {
        Ok(false)
    }

    fn visit_created_time(&mut self, _: &Field, _: &CreatedTime) -> Result<bool> {
        Ok(false)
    }

    fn visit_last_modified_time(&mut self, _: &Field, _: &LastModifiedTime) -> Result<bool> {
        Ok(false)
    }

    fn visit_created_by(&mut self, _: &Field, _: &CreatedBy) -> Result<bool> {
        Ok(false)
    }

    fn visit_last_modified_by(&mut self, _: &Field, _: &LastModifiedBy) -> Result<bool> {
        Ok(false)
    }

    fn visit_auto_number(&mut self, _: &Field, _: &AutoNumber) -> Result<bool> {
        Ok(false)
    }

    fn visit_link(&mut self, _: &Field, _: &Link) -> Result<bool> {
        Ok(true)
    }

    // lookups are read-only whatever they mirror
    fn visit_lookup(&mut self, _: &Field, _: &Lookup) -> Result<bool> {
        Ok(false)
    }

    fn visit_rollup(&mut self, _: &Field, _: &Rollup) -> Result<bool> {
        Ok(false)
    }

    fn visit_conditional_lookup(&mut self, _: &Field, _: &ConditionalLookup) -> Result<bool> {
        Ok(false)
    }

    fn visit_conditional_rollup(&mut self, _: &Field, _: &ConditionalRollup) -> Result<bool> {
        Ok(false)
    }
}

impl Field {
    pub fn is_form_visible(&self) -> bool {
        matches!(self.accept(&mut FormVisibilityVisitor), Ok(true))
    }
}
