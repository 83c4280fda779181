//! Double dispatch over the field catalogue.
//!
//! Every visitor handles each variant explicitly, except lookups: by default
//! a lookup is visited as the field it mirrors, recursively, so visitors only
//! override the lookup methods when a lookup must behave differently from
//! its inner field.

mod cell_schema;
pub use cell_schema::{parse_datetime, CellSchema, CellSchemaVisitor, ObjectShape};

mod dependency;
pub use dependency::DependencyVisitor;

mod duplicate;
pub use duplicate::{DuplicateParams, DuplicateVisitor};

mod form;
pub use form::FormVisibilityVisitor;

mod formatting;
pub use formatting::FormattingVisitor;

mod set_value;
pub use set_value::{CellWrite, ConvertOptions, LinkRef, SetFieldValue, SetValueVisitor};

mod side_effect;
pub use side_effect::{CreationSideEffectVisitor, DeletionSideEffectVisitor, SideEffect};

mod to_spec;
pub use to_spec::FieldToSpec;

mod value_type;
pub use value_type::ValueTypeVisitor;

use crate::schema::field::{
    Attachment, AutoNumber, Button, Checkbox, ConditionalLookup, ConditionalRollup, CreatedBy,
    CreatedTime, Date, Formula, LastModifiedBy, LastModifiedTime, Link, LongText, Lookup,
    MultipleSelect, Number, Rating, Rollup, SingleLineText, SingleSelect, User,
};
use crate::schema::{Field, FieldTy};
use crate::Result;

pub trait Visit {
    type Output;

    fn visit_single_line_text(
        &mut self,
        field: &Field,
        ty: &SingleLineText,
    ) -> Result<Self::Output>;

    fn visit_long_text(&mut self, field: &Field, ty: &LongText) -> Result<Self::Output>;

    fn visit_number(&mut self, field: &Field, ty: &Number) -> Result<Self::Output>;

    fn visit_rating(&mut self, field: &Field, ty: &Rating) -> Result<Self::Output>;

    fn visit_checkbox(&mut self, field: &Field, ty: &Checkbox) -> Result<Self::Output>;

    fn visit_date(&mut self, field: &Field, ty: &Date) -> Result<Self::Output>;

    fn visit_attachment(&mut self, field: &Field, ty: &Attachment) -> Result<Self::Output>;

    fn visit_user(&mut self, field: &Field, ty: &User) -> Result<Self::Output>;

    fn visit_single_select(&mut self, field: &Field, ty: &SingleSelect) -> Result<Self::Output>;

    fn visit_multiple_select(&mut self, field: &Field, ty: &MultipleSelect) -> Result<Self::Output>;

    fn visit_formula(&mut self, field: &Field, ty: &Formula) -> Result<Self::Output>;

    fn visit_button(&mut self, field: &Field, ty: &Button) -> Result<Self::Output>;

    fn visit_created_time(&mut self, field: &Field, ty: &CreatedTime) -> Result<Self::Output>;

    fn visit_last_modified_time(
        &mut self,
        field: &Field,
        ty: &LastModifiedTime,
    ) -> Result<Self::Output>;

    fn visit_created_by(&mut self, field: &Field, ty: &CreatedBy) -> Result<Self::Output>;

    fn visit_last_modified_by(
        &mut self,
        field: &Field,
        ty: &LastModifiedBy,
    ) -> Result<Self::Output>;

    fn visit_auto_number(&mut self, field: &Field, ty: &AutoNumber) -> Result<Self::Output>;

    fn visit_link(&mut self, field: &Field, ty: &Link) -> Result<Self::Output>;

    fn visit_lookup(&mut self, field: &Field, lookup: &Lookup) -> Result<Self::Output> {
        visit_lookup(self, field, lookup)
    }

    fn visit_rollup(&mut self, field: &Field, ty: &Rollup) -> Result<Self::Output>;

    fn visit_conditional_lookup(
        &mut self,
        field: &Field,
        lookup: &ConditionalLookup,
    ) -> Result<Self::Output> {
        visit_conditional_lookup(self, field, lookup)
    }

    fn visit_conditional_rollup(
        &mut self,
        field: &Field,
        ty: &ConditionalRollup,
    ) -> Result<Self::Output>;
}

/// Visits the field a lookup mirrors. Reading a pending lookup is an
/// invariant error.
pub fn visit_lookup<V>(v: &mut V, field: &Field, lookup: &Lookup) -> Result<V::Output>
where
    V: Visit + ?Sized,
{
    lookup.state().resolved(field.id())?.accept(v)
}

pub fn visit_conditional_lookup<V>(
    v: &mut V,
    field: &Field,
    lookup: &ConditionalLookup,
) -> Result<V::Output>
where
    V: Visit + ?Sized,
{
    lookup.state().resolved(field.id())?.accept(v)
}

impl Field {
    pub fn accept<V: Visit + ?Sized>(&self, v: &mut V) -> Result<V::Output> {
        match self.ty() {
            FieldTy::SingleLineText(ty) => v.visit_single_line_text(self, ty),
            FieldTy::LongText(ty) => v.visit_long_text(self, ty),
            FieldTy::Number(ty) => v.visit_number(self, ty),
            FieldTy::Rating(ty) => v.visit_rating(self, ty),
            FieldTy::Checkbox(ty) => v.visit_checkbox(self, ty),
            FieldTy::Date(ty) => v.visit_date(self, ty),
            FieldTy::Attachment(ty) => v.visit_attachment(self, ty),
            FieldTy::User(ty) => v.visit_user(self, ty),
            FieldTy::SingleSelect(ty) => v.visit_single_select(self, ty),
            FieldTy::MultipleSelect(ty) => v.visit_multiple_select(self, ty),
            FieldTy::Formula(ty) => v.visit_formula(self, ty),
            FieldTy::Button(ty) => v.visit_button(self, ty),
            FieldTy::CreatedTime(ty) => v.visit_created_time(self, ty),
            FieldTy::LastModifiedTime(ty) => v.visit_last_modified_time(self, ty),
            FieldTy::CreatedBy(ty) => v.visit_created_by(self, ty),
            FieldTy::LastModifiedBy(ty) => v.visit_last_modified_by(self, ty),
            FieldTy::AutoNumber(ty) => v.visit_auto_number(self, ty),
            FieldTy::Link(ty) => v.visit_link(self, ty),
            FieldTy::Lookup(ty) => v.visit_lookup(self, ty),
            FieldTy::Rollup(ty) => v.visit_rollup(self, ty),
            FieldTy::ConditionalLookup(ty) => v.visit_conditional_lookup(self, ty),
            FieldTy::ConditionalRollup(ty) => v.visit_conditional_rollup(self, ty),
        }
    }
}
