mod attachment;
pub use attachment::{Attachment, AttachmentItem};

mod button;
pub use button::{Button, ButtonOptions};

mod checkbox;
pub use checkbox::{Checkbox, CheckboxOptions};

mod conditional;
pub use conditional::{
    ConditionalLookup, ConditionalLookupOptions, ConditionalRollup, ConditionalRollupConfig,
};

mod date;
pub use date::{Date, DateDefault, DateOptions};

mod formula;
pub use formula::Formula;

mod link;
pub use link::{Link, LinkConfig, LinkStorage, Relationship};

mod lookup;
pub use lookup::{Lookup, LookupOptions, LookupState};

mod number;
pub use number::{Number, NumberOptions, Rating, RatingIcon, RatingOptions};

mod rollup;
pub use rollup::{Aggregate, Rollup, RollupConfig, RollupFunction};

mod select;
pub use select::{Choice, MultipleSelect, SelectOptions, SingleSelect};

mod system;
pub use system::{AutoNumber, CreatedBy, CreatedTime, LastModifiedBy, LastModifiedTime};

mod text;
pub use text::{LongText, LongTextOptions, SingleLineText, TextOptions};

mod user;
pub use user::{User, UserItem, UserOptions};

use super::{DbFieldName, DbFieldType, FieldId, FieldKind, FieldName, SetOnce, TableId};
use crate::{Error, Result};

/// A typed column definition belonging to a table.
///
/// The variant-specific configuration lives in [`FieldTy`]. Everything else
/// (identity, naming, constraints, storage binding and the dependency graph)
/// is shared by all variants.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    id: FieldId,

    name: FieldName,

    description: Option<String>,

    ty: FieldTy,

    not_null: bool,

    unique: bool,

    /// Column the field is stored in. Bound at most once.
    db_field_name: SetOnce<DbFieldName>,

    /// Storage representation of the column. Bound at most once.
    db_field_type: SetOnce<DbFieldType>,

    /// Fields this field's value is derived from. Possibly in other tables.
    dependencies: SetOnce<Vec<FieldId>>,

    /// Fields in the same table that derive their value from this one.
    dependents: SetOnce<Vec<FieldId>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldTy {
    SingleLineText(SingleLineText),
    LongText(LongText),
    Number(Number),
    Rating(Rating),
    Checkbox(Checkbox),
    Date(Date),
    Attachment(Attachment),
    User(User),
    SingleSelect(SingleSelect),
    MultipleSelect(MultipleSelect),
    Formula(Formula),
    Button(Button),
    CreatedTime(CreatedTime),
    LastModifiedTime(LastModifiedTime),
    CreatedBy(CreatedBy),
    LastModifiedBy(LastModifiedBy),
    AutoNumber(AutoNumber),
    Link(Link),
    Lookup(Lookup),
    Rollup(Rollup),
    ConditionalLookup(ConditionalLookup),
    ConditionalRollup(ConditionalRollup),
}

impl Field {
    pub(crate) fn new(id: FieldId, name: FieldName, ty: impl Into<FieldTy>) -> Field {
        Field {
            id,
            name,
            description: None,
            ty: ty.into(),
            not_null: false,
            unique: false,
            db_field_name: SetOnce::Unset,
            db_field_type: SetOnce::Unset,
            dependencies: SetOnce::Unset,
            dependents: SetOnce::Unset,
        }
    }

    pub fn id(&self) -> &FieldId {
        &self.id
    }

    pub fn name(&self) -> &FieldName {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn ty(&self) -> &FieldTy {
        &self.ty
    }

    pub(crate) fn ty_mut(&mut self) -> &mut FieldTy {
        &mut self.ty
    }

    pub fn kind(&self) -> FieldKind {
        self.ty.kind()
    }

    /// True for system and derived fields. Such fields never accept writes.
    pub fn is_computed(&self) -> bool {
        self.kind().is_computed()
    }

    pub fn is_system(&self) -> bool {
        self.kind().is_system()
    }

    /// True while a cross-table field still waits for its foreign tables to
    /// be resolved.
    pub fn is_pending(&self) -> bool {
        self.ty.is_pending()
    }

    /// Computed fields always read as nullable.
    pub fn not_null(&self) -> bool {
        self.not_null && !self.is_computed()
    }

    /// Computed fields never read as unique.
    pub fn unique(&self) -> bool {
        self.unique && !self.is_computed()
    }

    pub fn db_field_name(&self) -> Option<&DbFieldName> {
        self.db_field_name.get()
    }

    pub fn db_field_type(&self) -> Option<DbFieldType> {
        self.db_field_type.get().copied()
    }

    pub fn dependencies(&self) -> &[FieldId] {
        self.dependencies.get().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn dependents(&self) -> &[FieldId] {
        self.dependents.get().map(Vec::as_slice).unwrap_or(&[])
    }

    /// The table a cross-table field reads from, if any.
    pub fn foreign_table_id(&self) -> Option<&TableId> {
        self.as_foreign_related()
            .map(|related| related.foreign_table_id())
    }

    pub fn set_name(&mut self, name: FieldName) {
        self.name = name;
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn set_not_null(&mut self, not_null: bool) -> Result<()> {
        if not_null && self.is_computed() {
            return Err(Error::conflict(
                "field.computed_not_null",
                format!("computed field `{}` cannot be made not-null", self.name),
            ));
        }

        self.not_null = not_null;
        Ok(())
    }

    pub fn set_unique(&mut self, unique: bool) -> Result<()> {
        if unique && self.is_computed() {
            return Err(Error::conflict(
                "field.computed_unique",
                format!("computed field `{}` cannot be made unique", self.name),
            ));
        }

        self.unique = unique;
        Ok(())
    }

    pub fn set_db_field_name(&mut self, name: DbFieldName) -> Result<()> {
        self.db_field_name.set(name, "field.db_field_name_already_set")
    }

    pub fn set_db_field_type(&mut self, ty: DbFieldType) -> Result<()> {
        self.db_field_type.set(ty, "field.db_field_type_already_set")
    }

    /// Sets the ids this field derives from. Order is kept and duplicates
    /// are dropped.
    pub fn set_dependencies(&mut self, dependencies: Vec<FieldId>) -> Result<()> {
        self.dependencies
            .set(dedup(dependencies), "field.dependencies_already_set")
    }

    pub fn set_dependents(&mut self, dependents: Vec<FieldId>) -> Result<()> {
        self.dependents
            .set(dedup(dependents), "field.dependents_already_set")
    }

    pub(crate) fn clear_dependents(&mut self) {
        self.dependents = SetOnce::Unset;
    }

    /// Returns a copy carrying a new identity and none of the storage
    /// binding or dependency graph of the original.
    pub(crate) fn with_identity(&self, id: FieldId, name: FieldName, ty: FieldTy) -> Field {
        let mut field = Field::new(id, name, ty);
        field.description = self.description.clone();
        field.not_null = self.not_null;
        field.unique = self.unique;
        field
    }

    pub(crate) fn restore_flags(&mut self, not_null: bool, unique: bool) {
        self.not_null = not_null;
        self.unique = unique;
    }
}

fn dedup(ids: Vec<FieldId>) -> Vec<FieldId> {
    let mut out: Vec<FieldId> = Vec::with_capacity(ids.len());

    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }

    out
}

macro_rules! field_ty {
    ( $( $variant:ident => $as:ident, $expect:ident; )* ) => {
        impl FieldTy {
            pub fn kind(&self) -> FieldKind {
                match self {
                    $( Self::$variant(_) => FieldKind::$variant, )*
                }
            }

            $(
                pub fn $as(&self) -> Option<&$variant> {
                    match self {
                        Self::$variant(ty) => Some(ty),
                        _ => None,
                    }
                }

                #[track_caller]
                pub fn $expect(&self) -> &$variant {
                    match self {
                        Self::$variant(ty) => ty,
                        _ => panic!(
                            "expected field to be `{}`, but was {:?}",
                            stringify!($variant),
                            self.kind()
                        ),
                    }
                }
            )*
        }

        $(
            impl From<$variant> for FieldTy {
                fn from(value: $variant) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

field_ty! {
    SingleLineText => as_single_line_text, expect_single_line_text;
    LongText => as_long_text, expect_long_text;
    Number => as_number, expect_number;
    Rating => as_rating, expect_rating;
    Checkbox => as_checkbox, expect_checkbox;
    Date => as_date, expect_date;
    Attachment => as_attachment, expect_attachment;
    User => as_user, expect_user;
    SingleSelect => as_single_select, expect_single_select;
    MultipleSelect => as_multiple_select, expect_multiple_select;
    Formula => as_formula, expect_formula;
    Button => as_button, expect_button;
    CreatedTime => as_created_time, expect_created_time;
    LastModifiedTime => as_last_modified_time, expect_last_modified_time;
    CreatedBy => as_created_by, expect_created_by;
    LastModifiedBy => as_last_modified_by, expect_last_modified_by;
    AutoNumber => as_auto_number, expect_auto_number;
    Link => as_link, expect_link;
    Lookup => as_lookup, expect_lookup;
    Rollup => as_rollup, expect_rollup;
    ConditionalLookup => as_conditional_lookup, expect_conditional_lookup;
    ConditionalRollup => as_conditional_rollup, expect_conditional_rollup;
}

impl FieldTy {
    pub fn is_pending(&self) -> bool {
        match self {
            Self::Lookup(lookup) => lookup.is_pending(),
            Self::Rollup(rollup) => rollup.is_pending(),
            Self::ConditionalLookup(lookup) => lookup.is_pending(),
            Self::ConditionalRollup(rollup) => rollup.is_pending(),
            _ => false,
        }
    }

    pub fn is_link(&self) -> bool {
        matches!(self, Self::Link(..))
    }

    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::Lookup(..) | Self::ConditionalLookup(..))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(name: &str) -> Field {
        SingleLineText::create(
            FieldId::generate(),
            FieldName::new(name).unwrap(),
            TextOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn db_field_name_is_set_once() {
        let mut field = text("Title");
        let name = DbFieldName::new("title").unwrap();

        field.set_db_field_name(name.clone()).unwrap();
        field.set_db_field_name(name.clone()).unwrap();
        assert_eq!(field.db_field_name(), Some(&name));

        let err = field
            .set_db_field_name(DbFieldName::new("title_2").unwrap())
            .unwrap_err();
        assert!(err.is_invariant());
        assert_eq!(field.db_field_name(), Some(&name));
    }

    #[test]
    fn dependencies_are_deduplicated() {
        let mut field = text("Title");
        let a = FieldId::parse("fldA000000000000000").unwrap();
        let b = FieldId::parse("fldB000000000000000").unwrap();

        field
            .set_dependencies(vec![a.clone(), b.clone(), a.clone()])
            .unwrap();
        assert_eq!(field.dependencies(), &[a, b]);
    }

    #[test]
    fn computed_fields_reject_unique_and_not_null() {
        let mut field = AutoNumber::create(FieldId::generate(), FieldName::new("No").unwrap());

        assert!(field.set_unique(true).unwrap_err().is_conflict());
        assert!(field.set_not_null(true).unwrap_err().is_conflict());
        assert!(field.set_unique(false).is_ok());
        assert!(!field.unique());
    }
}
