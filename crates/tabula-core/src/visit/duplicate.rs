use super::Visit;
use crate::schema::field::{
    Attachment, AutoNumber, Button, Checkbox, ConditionalLookup, ConditionalRollup, CreatedBy,
    CreatedTime, Date, Formula, LastModifiedBy, LastModifiedTime, Link, LongText, Lookup,
    MultipleSelect, Number, Rating, Rollup, SingleLineText, SingleSelect, User,
};
use crate::schema::{Field, FieldId, FieldName, FieldTy};
use crate::{Error, Result};

/// Identity of the copy produced by [`DuplicateVisitor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateParams {
    pub id: FieldId,
    pub name: FieldName,
}

/// Copies a field under a new identity.
///
/// The copy carries the configuration and constraints of the original but no
/// storage binding or dependency graph; those are bound again when the copy
/// joins a table. Duplicated links are detached from their symmetric field.
/// Lookups cannot be duplicated: duplicate the link they read through.
pub struct DuplicateVisitor {
    params: DuplicateParams,
}

impl DuplicateVisitor {
    pub fn new(params: DuplicateParams) -> DuplicateVisitor {
        DuplicateVisitor { params }
    }

    fn copy(&self, field: &Field, ty: impl Into<FieldTy>) -> Result<Field> {
        Ok(field.with_identity(self.params.id.clone(), self.params.name.clone(), ty.into()))
    }
}

macro_rules! clone_ty {
    ( $( $method:ident($ty:ty); )* ) => {
        $(
            fn $method(&mut self, field: &Field, ty: &$ty) -> Result<Field> {
                self.copy(field, ty.clone())
            }
        )*
    };
}

impl Visit for DuplicateVisitor {
    type Output = Field;

    clone_ty! {
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
        visit_rollup(Rollup);
        visit_conditional_lookup(ConditionalLookup);
        visit_conditional_rollup(ConditionalRollup);
    }

    fn visit_formula(&mut self, field: &Field, ty: &Formula) -> Result<Field> {
        let mut copy = self.copy(field, ty.clone())?;
        let dependencies = copy.collect_dependencies()?;
        copy.set_dependencies(dependencies)?;
        Ok(copy)
    }

    fn visit_link(&mut self, field: &Field, ty: &Link) -> Result<Field> {
        self.copy(field, ty.detached())
    }

    fn visit_lookup(&mut self, field: &Field, _: &Lookup) -> Result<Field> {
        Err(Error::validation(
            "field.lookup_cannot_duplicate",
            format!(
                "lookup `{}` cannot be duplicated; duplicate its link field instead",
                field.name()
            ),
        ))
    }
}

impl Field {
    pub fn duplicate(&self, params: DuplicateParams) -> Result<Field> {
        self.accept(&mut DuplicateVisitor::new(params))
    }
}
