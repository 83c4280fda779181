use super::{BaseId, DbFieldName, Field, FieldId, FieldName, ForeignTables, ResolveCx, TableId};
use crate::{Error, Result};

use indexmap::IndexMap;

const DB_NAME_STEM_LEN: usize = 48;

/// A table: an ordered collection of fields with one primary field.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    id: TableId,
    base_id: BaseId,
    name: String,

    /// Physical table name, `{base}.{name}`.
    db_table_name: String,

    fields: IndexMap<FieldId, Field>,

    primary_field_id: FieldId,
}

pub struct TableBuilder {
    id: Option<TableId>,
    base_id: BaseId,
    name: String,
    db_table_name: Option<String>,
    fields: Vec<Field>,
    primary_field_id: Option<FieldId>,
}

/// A change to a table's field set, typically planned as a side effect of
/// creating or deleting a field in another table.
#[derive(Debug, Clone, PartialEq)]
pub enum TableMutation {
    AddField(Field),
    RemoveField(FieldId),
}

impl Table {
    pub fn builder(base_id: BaseId, name: impl Into<String>) -> TableBuilder {
        TableBuilder {
            id: None,
            base_id,
            name: name.into(),
            db_table_name: None,
            fields: vec![],
            primary_field_id: None,
        }
    }

    pub fn id(&self) -> &TableId {
        &self.id
    }

    pub fn base_id(&self) -> &BaseId {
        &self.base_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn db_table_name(&self) -> &str {
        &self.db_table_name
    }

    pub fn primary_field_id(&self) -> &FieldId {
        &self.primary_field_id
    }

    pub fn primary_field(&self) -> &Field {
        &self.fields[&self.primary_field_id]
    }

    pub fn fields(&self) -> impl ExactSizeIterator<Item = &Field> + '_ {
        self.fields.values()
    }

    pub fn fields_where(&self, mut predicate: impl FnMut(&Field) -> bool) -> Vec<&Field> {
        self.fields
            .values()
            .filter(|field| predicate(field))
            .collect()
    }

    pub fn field(&self, id: &FieldId) -> Option<&Field> {
        self.fields.get(id)
    }

    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields
            .values()
            .find(|field| field.name().as_str() == name)
    }

    pub(crate) fn field_index(&self, id: &FieldId) -> Option<usize> {
        self.fields.get_index_of(id)
    }

    /// Finds a field by id first, then by name.
    pub fn field_by_key(&self, key: &str) -> Option<&Field> {
        FieldId::parse(key)
            .ok()
            .and_then(|id| self.fields.get(&id))
            .or_else(|| self.field_by_name(key))
    }

    /// Returns `base` if no field carries that name yet, otherwise the first
    /// free `base N` with `N >= 2`.
    pub fn generate_field_name(&self, base: &str) -> Result<FieldName> {
        let base = FieldName::new(base)?;

        if self.field_by_name(base.as_str()).is_none() {
            return Ok(base);
        }

        let mut n = 2;
        loop {
            let candidate = format!("{base} {n}");
            if self.field_by_name(&candidate).is_none() {
                return FieldName::new(candidate);
            }
            n += 1;
        }
    }

    /// Fields that still wait for their foreign tables.
    pub fn pending_fields(&self) -> Vec<&Field> {
        self.fields_where(Field::is_pending)
    }

    pub fn add_field(&mut self, mut field: Field) -> Result<()> {
        if self.fields.contains_key(field.id()) {
            return Err(Error::conflict(
                "table.duplicate_field_id",
                format!("table `{}` already has field `{}`", self.name, field.id()),
            ));
        }

        if self.field_by_name(field.name().as_str()).is_some() {
            return Err(Error::conflict(
                "table.duplicate_field_name",
                format!(
                    "table `{}` already has a field named `{}`",
                    self.name,
                    field.name()
                ),
            ));
        }

        if field.db_field_name().is_none() {
            let db_name = self.generate_db_field_name(field.name());
            field.set_db_field_name(db_name)?;
        }

        if field.db_field_type().is_none() && !field.is_pending() {
            field.set_db_field_type(field.default_db_field_type()?)?;
        }

        tracing::trace!(
            table = %self.id,
            field = %field.id(),
            kind = %field.kind(),
            "adding field"
        );

        self.fields.insert(field.id().clone(), field);
        Ok(())
    }

    pub fn remove_field(&mut self, id: &FieldId) -> Result<Field> {
        if *id == self.primary_field_id {
            return Err(Error::conflict(
                "table.remove_primary_field",
                format!("the primary field of `{}` cannot be removed", self.name),
            ));
        }

        self.fields.shift_remove(id).ok_or_else(|| {
            Error::not_found(
                "table.field_not_found",
                format!("table `{}` has no field `{id}`", self.name),
            )
        })
    }

    /// Resolves every cross-table field against `foreign_tables`, then
    /// rederives the dependents of each field.
    ///
    /// Links are resolved before the fields that read through them. A
    /// failure leaves the failing field as it was.
    pub fn validate_foreign_tables(&mut self, foreign_tables: &ForeignTables<'_>) -> Result<()> {
        let mut ids: Vec<FieldId> = self
            .fields
            .values()
            .filter(|field| field.is_foreign_related())
            .map(|field| field.id().clone())
            .collect();
        ids.sort_by_key(|id| !self.fields[id].ty().is_link());

        for id in ids {
            let mut field = self.fields[&id].clone();

            let cx = ResolveCx::new(self, foreign_tables);
            field
                .validate_foreign_tables(&cx)
                .map_err(|err| err.context(err!("validating table `{}`", self.name)))?;

            if field.db_field_type().is_none() {
                field.set_db_field_type(field.default_db_field_type()?)?;
            }

            self.fields.insert(id, field);
        }

        self.derive_dependents()
    }

    fn derive_dependents(&mut self) -> Result<()> {
        let mut dependents: IndexMap<FieldId, Vec<FieldId>> = IndexMap::new();

        for field in self.fields.values() {
            for dependency in field.dependencies() {
                if self.fields.contains_key(dependency) {
                    dependents
                        .entry(dependency.clone())
                        .or_default()
                        .push(field.id().clone());
                }
            }
        }

        for field in self.fields.values_mut() {
            field.clear_dependents();

            if let Some(ids) = dependents.shift_remove(field.id()) {
                field.set_dependents(ids)?;
            }
        }

        Ok(())
    }

    fn generate_db_field_name(&self, name: &FieldName) -> DbFieldName {
        let base = DbFieldName::from_field_name(name);
        let taken = |candidate: &str| {
            self.fields
                .values()
                .any(|field| field.db_field_name().is_some_and(|n| n.as_str() == candidate))
        };

        if !taken(base.as_str()) {
            return base;
        }

        // leave room for the numeric suffix
        let stem: String = base.as_str().chars().take(DB_NAME_STEM_LEN).collect();
        let mut n = 2;
        loop {
            let candidate = format!("{stem}_{n}");
            if !taken(&candidate) {
                return DbFieldName::new(candidate).unwrap_or(base);
            }
            n += 1;
        }
    }
}

impl TableBuilder {
    pub fn id(mut self, id: TableId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn db_table_name(mut self, name: impl Into<String>) -> Self {
        self.db_table_name = Some(name.into());
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Sets the primary field. Defaults to the first field added.
    pub fn primary_field(mut self, id: FieldId) -> Self {
        self.primary_field_id = Some(id);
        self
    }

    pub fn build(self) -> Result<Table> {
        let name = self.name.trim().to_string();

        if name.is_empty() {
            return Err(Error::validation("table.name_empty", "table name is empty"));
        }

        let Some(first) = self.fields.first() else {
            return Err(Error::validation(
                "table.no_fields",
                format!("table `{name}` needs at least one field"),
            ));
        };

        let primary_field_id = self.primary_field_id.unwrap_or_else(|| first.id().clone());

        let db_table_name = self.db_table_name.unwrap_or_else(|| {
            let ident = FieldName::new(&name)
                .map(|name| DbFieldName::from_field_name(&name).to_string())
                .unwrap_or_else(|_| "t".to_string());
            format!("{}.{ident}", self.base_id)
        });

        let mut table = Table {
            id: self.id.unwrap_or_else(TableId::generate),
            base_id: self.base_id,
            name,
            db_table_name,
            fields: IndexMap::new(),
            primary_field_id,
        };

        for field in self.fields {
            table.add_field(field)?;
        }

        if !table.fields.contains_key(&table.primary_field_id) {
            return Err(Error::validation(
                "table.primary_field_not_found",
                format!(
                    "primary field `{}` is not a field of `{}`",
                    table.primary_field_id, table.name
                ),
            ));
        }

        Ok(table)
    }
}

impl TableMutation {
    pub fn apply_to(&self, table: &mut Table) -> Result<()> {
        match self {
            Self::AddField(field) => table.add_field(field.clone()),
            Self::RemoveField(id) => table.remove_field(id).map(|_| ()),
        }
    }
}
