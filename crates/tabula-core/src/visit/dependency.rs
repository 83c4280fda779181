use super::Visit;
use crate::schema::field::{
    Attachment, AutoNumber, Button, Checkbox, ConditionalLookup, ConditionalRollup, CreatedBy,
    CreatedTime, Date, Formula, LastModifiedBy, LastModifiedTime, Link, LongText, Lookup,
    MultipleSelect, Number, Rating, Rollup, SingleLineText, SingleSelect, User,
};
use crate::schema::{Field, FieldId, ForeignTableRelatedField};
use crate::Result;

/// Collects the ids a field derives its value from, straight from its
/// configuration. Unlike [`Field::dependencies`] it needs no resolution
/// pass.
#[derive(Debug, Default)]
pub struct DependencyVisitor;

macro_rules! independent {
    ( $( $method:ident($ty:ty); )* ) => {
        $(
            fn $method(&mut self, _: &Field, _: &$ty) -> Result<Vec<FieldId>> {
                Ok(vec![])
            }
        )*
    };
}

impl Visit for DependencyVisitor {
    type Output = Vec<FieldId>;

    independent! {
        visit_single_line_text(SingleLineText);
        visit_long_text(LongText);
        visit_number(Number);
        visit_rating(Rating);
        visit_checkbox(Checkbox);
        visit_date(Date);
        visit_attachment(Attachment);
        visit_user(User);
        visit_single_select(SingleSelect);
        visit_multiple_select(MultipleSelect);
        visit_button(Button);
        visit_created_time(CreatedTime);
        visit_last_modified_time(LastModifiedTime);
        visit_created_by(CreatedBy);
        visit_last_modified_by(LastModifiedBy);
        visit_auto_number(AutoNumber);
    }

    fn visit_formula(&mut self, _: &Field, ty: &Formula) -> Result<Vec<FieldId>> {
        Ok(ty.references())
    }

    fn visit_link(&mut self, _: &Field, ty: &Link) -> Result<Vec<FieldId>> {
        Ok(ty.dependency_ids())
    }

    fn visit_lookup(&mut self, _: &Field, ty: &Lookup) -> Result<Vec<FieldId>> {
        Ok(ty.dependency_ids())
    }

    fn visit_rollup(&mut self, _: &Field, ty: &Rollup) -> Result<Vec<FieldId>> {
        Ok(ty.dependency_ids())
    }

    fn visit_conditional_lookup(
        &mut self,
        _: &Field,
        ty: &ConditionalLookup,
    ) -> Result<Vec<FieldId>> {
        Ok(ty.dependency_ids())
    }

    fn visit_conditional_rollup(
        &mut self,
        _: &Field,
        ty: &ConditionalRollup,
    ) -> Result<Vec<FieldId>> {
        Ok(ty.dependency_ids())
    }
}

impl Field {
    /// The ids this field derives from, read from its configuration.
    pub fn collect_dependencies(&self) -> Result<Vec<FieldId>> {
        self.accept(&mut DependencyVisitor)
    }
}
