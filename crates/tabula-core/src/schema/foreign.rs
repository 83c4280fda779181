use super::{Field, FieldId, FieldName, FieldTy, Table, TableId};
use crate::{Error, Result};

use indexmap::IndexMap;
use std::fmt;

/// Read-only view of a table that another table's fields refer to.
#[derive(Clone, Copy)]
pub struct ForeignTable<'a> {
    table: &'a Table,
}

/// The set of foreign tables loaded for one resolution pass, keyed by id.
#[derive(Debug, Default, Clone)]
pub struct ForeignTables<'a> {
    tables: IndexMap<TableId, ForeignTable<'a>>,
}

/// Everything a cross-table field needs to resolve itself: the table that
/// hosts it and the foreign tables loaded alongside.
#[derive(Debug, Clone, Copy)]
pub struct ResolveCx<'a> {
    host_table: &'a Table,
    foreign_tables: &'a ForeignTables<'a>,
}

/// Implemented by field variants that read from another table.
pub trait ForeignTableRelatedField {
    fn foreign_table_id(&self) -> &TableId;

    /// Checks references into the foreign table and completes any state that
    /// depends on it.
    fn validate_foreign_tables(&mut self, field_id: &FieldId, cx: &ResolveCx<'_>) -> Result<()>;

    /// The ids this field derives its value from.
    fn dependency_ids(&self) -> Vec<FieldId>;
}

impl<'a> ForeignTable<'a> {
    pub fn new(table: &'a Table) -> ForeignTable<'a> {
        ForeignTable { table }
    }

    pub fn id(&self) -> &'a TableId {
        self.table.id()
    }

    pub fn name(&self) -> &'a str {
        self.table.name()
    }

    pub fn db_table_name(&self) -> &'a str {
        self.table.db_table_name()
    }

    pub fn field_by_id(&self, id: &FieldId) -> Option<&'a Field> {
        self.table.field(id)
    }

    pub fn primary_field_id(&self) -> &'a FieldId {
        self.table.primary_field_id()
    }

    pub fn generate_field_name(&self, base: &str) -> Result<FieldName> {
        self.table.generate_field_name(base)
    }
}

impl fmt::Debug for ForeignTable<'_> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("ForeignTable")
            .field("id", self.id())
            .field("name", &self.name())
            .finish()
    }
}

impl<'a> ForeignTables<'a> {
    pub fn new() -> ForeignTables<'a> {
        ForeignTables::default()
    }

    pub fn insert(&mut self, table: &'a Table) {
        self.tables.insert(table.id().clone(), ForeignTable::new(table));
    }

    pub fn get(&self, id: &TableId) -> Option<ForeignTable<'a>> {
        self.tables.get(id).copied()
    }

    pub fn contains(&self, id: &TableId) -> bool {
        self.tables.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ForeignTable<'a>> + '_ {
        self.tables.values().copied()
    }
}

impl<'a> FromIterator<&'a Table> for ForeignTables<'a> {
    fn from_iter<I: IntoIterator<Item = &'a Table>>(iter: I) -> Self {
        let mut tables = ForeignTables::new();
        for table in iter {
            tables.insert(table);
        }
        tables
    }
}

impl<'a> ResolveCx<'a> {
    pub fn new(host_table: &'a Table, foreign_tables: &'a ForeignTables<'a>) -> ResolveCx<'a> {
        ResolveCx {
            host_table,
            foreign_tables,
        }
    }

    pub fn host_table(&self) -> &'a Table {
        self.host_table
    }

    pub fn foreign_tables(&self) -> &'a ForeignTables<'a> {
        self.foreign_tables
    }

    /// Looks up a foreign table.
    ///
    /// A self-referencing field names its own host table, which resolves to
    /// the host even when it was not loaded explicitly.
    pub fn foreign_table(&self, id: &TableId) -> Result<ForeignTable<'a>> {
        if let Some(table) = self.foreign_tables.get(id) {
            return Ok(table);
        }

        if self.host_table.id() == id {
            return Ok(ForeignTable::new(self.host_table));
        }

        Err(Error::invariant(
            "foreign_table.not_loaded",
            format!(
                "table `{id}` is referenced by `{}` but was not loaded",
                self.host_table.id()
            ),
        ))
    }
}

impl Field {
    pub fn is_foreign_related(&self) -> bool {
        self.as_foreign_related().is_some()
    }

    pub fn as_foreign_related(&self) -> Option<&dyn ForeignTableRelatedField> {
        match self.ty() {
            FieldTy::Link(link) => Some(link),
            FieldTy::Lookup(lookup) => Some(lookup),
            FieldTy::Rollup(rollup) => Some(rollup),
            FieldTy::ConditionalLookup(lookup) => Some(lookup),
            FieldTy::ConditionalRollup(rollup) => Some(rollup),
            _ => None,
        }
    }

    fn as_foreign_related_mut(&mut self) -> Option<&mut dyn ForeignTableRelatedField> {
        match self.ty_mut() {
            FieldTy::Link(link) => Some(link),
            FieldTy::Lookup(lookup) => Some(lookup),
            FieldTy::Rollup(rollup) => Some(rollup),
            FieldTy::ConditionalLookup(lookup) => Some(lookup),
            FieldTy::ConditionalRollup(rollup) => Some(rollup),
            _ => None,
        }
    }

    /// Resolves a cross-table field against its foreign tables and records
    /// its dependencies. Fields that do not read from another table are left
    /// untouched.
    pub fn validate_foreign_tables(&mut self, cx: &ResolveCx<'_>) -> Result<()> {
        let id = self.id().clone();

        let Some(related) = self.as_foreign_related_mut() else {
            return Ok(());
        };

        related
            .validate_foreign_tables(&id, cx)
            .map_err(|err| err.context(err!("resolving field `{id}`")))?;

        let foreign_table_id = related.foreign_table_id().clone();
        let dependencies = self.collect_dependencies()?;

        tracing::debug!(
            field = %id,
            foreign_table = %foreign_table_id,
            dependencies = dependencies.len(),
            "resolved cross-table field"
        );

        self.set_dependencies(dependencies)
    }
}
