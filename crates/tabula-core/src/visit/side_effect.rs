use super::Visit;
use crate::schema::field::{
    Attachment, AutoNumber, Button, Checkbox, ConditionalLookup, ConditionalRollup, CreatedBy,
    CreatedTime, Date, Formula, LastModifiedBy, LastModifiedTime, Link, LongText, Lookup,
    MultipleSelect, Number, Rating, Rollup, SingleLineText, SingleSelect, User,
};
use crate::schema::{Field, ResolveCx, TableId, TableMutation};
use crate::{Error, Result};

/// A mutation that must be applied to another table in the same unit of
/// work as the field change that caused it.
#[derive(Debug, Clone, PartialEq)]
pub struct SideEffect {
    pub foreign_table_id: TableId,
    pub mutation: TableMutation,
}

/// Plans the foreign-table changes required when fields are created.
///
/// Only two-way links have any: their symmetric field must be added to the
/// foreign table unless it is already there. Links must have been resolved
/// so that their symmetric id and storage are known.
pub struct CreationSideEffectVisitor<'a> {
    cx: ResolveCx<'a>,
}

/// Plans the foreign-table changes required when fields are deleted.
///
/// Deleting a two-way link removes its symmetric field from the foreign
/// table.
pub struct DeletionSideEffectVisitor<'a> {
    cx: ResolveCx<'a>,
}

impl<'a> CreationSideEffectVisitor<'a> {
    pub fn new(cx: ResolveCx<'a>) -> CreationSideEffectVisitor<'a> {
        CreationSideEffectVisitor { cx }
    }

    pub fn collect<'f>(
        fields: impl IntoIterator<Item = &'f Field>,
        cx: ResolveCx<'a>,
    ) -> Result<Vec<SideEffect>> {
        collect(&mut CreationSideEffectVisitor::new(cx), fields)
    }
}

impl<'a> DeletionSideEffectVisitor<'a> {
    pub fn new(cx: ResolveCx<'a>) -> DeletionSideEffectVisitor<'a> {
        DeletionSideEffectVisitor { cx }
    }

    pub fn collect<'f>(
        fields: impl IntoIterator<Item = &'f Field>,
        cx: ResolveCx<'a>,
    ) -> Result<Vec<SideEffect>> {
        collect(&mut DeletionSideEffectVisitor::new(cx), fields)
    }
}

fn collect<'f, V>(
    visitor: &mut V,
    fields: impl IntoIterator<Item = &'f Field>,
) -> Result<Vec<SideEffect>>
where
    V: Visit<Output = Option<SideEffect>>,
{
    let mut effects = vec![];

    for field in fields {
        if let Some(effect) = field.accept(visitor)? {
            tracing::debug!(
                field = %field.id(),
                foreign_table = %effect.foreign_table_id,
                mutation = ?effect.mutation,
                "planned side effect"
            );
            effects.push(effect);
        }
    }

    Ok(effects)
}

macro_rules! no_side_effect {
    ( $( $method:ident($ty:ty); )* ) => {
        $(
            fn $method(&mut self, _: &Field, _: &$ty) -> Result<Option<SideEffect>> {
                Ok(None)
            }
        )*
    };
}

impl Visit for CreationSideEffectVisitor<'_> {
    type Output = Option<SideEffect>;

    no_side_effect! {
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
        visit_formula(Formula);
        visit_button(Button);
        visit_created_time(CreatedTime);
        visit_last_modified_time(LastModifiedTime);
        visit_created_by(CreatedBy);
        visit_last_modified_by(LastModifiedBy);
        visit_auto_number(AutoNumber);
        visit_lookup(Lookup);
        visit_rollup(Rollup);
        visit_conditional_lookup(ConditionalLookup);
        visit_conditional_rollup(ConditionalRollup);
    }

    fn visit_link(&mut self, field: &Field, link: &Link) -> Result<Option<SideEffect>> {
        if link.is_one_way() {
            return Ok(None);
        }

        let Some(symmetric_id) = link.symmetric_field_id() else {
            return Err(Error::invariant(
                "link.symmetric_missing",
                format!("two-way link `{}` has not been resolved", field.id()),
            ));
        };

        let foreign = self.cx.foreign_table(link.config().foreign_table_id())?;

        if foreign.field_by_id(symmetric_id).is_some() {
            return Ok(None);
        }

        let symmetric = link.build_symmetric_field(field.id(), self.cx.host_table(), foreign)?;

        Ok(Some(SideEffect {
            foreign_table_id: foreign.id().clone(),
            mutation: TableMutation::AddField(symmetric),
        }))
    }
}

impl Visit for DeletionSideEffectVisitor<'_> {
    type Output = Option<SideEffect>;

    no_side_effect! {
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
        visit_formula(Formula);
        visit_button(Button);
        visit_created_time(CreatedTime);
        visit_last_modified_time(LastModifiedTime);
        visit_created_by(CreatedBy);
        visit_last_modified_by(LastModifiedBy);
        visit_auto_number(AutoNumber);
        visit_lookup(Lookup);
        visit_rollup(Rollup);
        visit_conditional_lookup(ConditionalLookup);
        visit_conditional_rollup(ConditionalRollup);
    }

    fn visit_link(&mut self, _: &Field, link: &Link) -> Result<Option<SideEffect>> {
        let Some(symmetric_id) = link.symmetric_field_id() else {
            return Ok(None);
        };

        let foreign = self.cx.foreign_table(link.config().foreign_table_id())?;

        if foreign.field_by_id(symmetric_id).is_none() {
            return Ok(None);
        }

        Ok(Some(SideEffect {
            foreign_table_id: foreign.id().clone(),
            mutation: TableMutation::RemoveField(symmetric_id.clone()),
        }))
    }
}
