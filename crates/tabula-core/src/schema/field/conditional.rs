//! Lookups and rollups that select foreign records with a filter instead of
//! following a link.

use super::{Aggregate, Field, LookupState, RollupFunction};
use crate::schema::{
    FieldId, FieldName, FieldValueType, ForeignTableRelatedField, ResolveCx, TableId,
};
use crate::spec::LookupCondition;
use crate::{Error, Result};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalLookupOptions {
    pub foreign_table_id: TableId,

    pub lookup_field_id: FieldId,

    #[serde(default)]
    pub condition: LookupCondition,
}

pub type ConditionalRollupConfig = ConditionalLookupOptions;

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalLookup {
    options: ConditionalLookupOptions,
    state: LookupState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalRollup {
    config: ConditionalRollupConfig,
    aggregate: Aggregate,
}

impl ConditionalLookupOptions {
    pub fn new(
        foreign_table_id: TableId,
        lookup_field_id: FieldId,
        condition: LookupCondition,
    ) -> ConditionalLookupOptions {
        ConditionalLookupOptions {
            foreign_table_id,
            lookup_field_id,
            condition,
        }
    }

    /// Resolves the target field and checks that every field the condition
    /// mentions exists in the foreign table.
    fn target<'a>(&self, cx: &ResolveCx<'a>) -> Result<&'a Field> {
        let foreign = cx.foreign_table(&self.foreign_table_id)?;

        for id in self.condition.field_ids() {
            if foreign.field_by_id(&id).is_none() {
                return Err(Error::not_found(
                    "conditional.filter_field_not_found",
                    format!(
                        "condition refers to `{id}`, which does not exist in table `{}`",
                        foreign.id()
                    ),
                ));
            }
        }

        foreign.field_by_id(&self.lookup_field_id).ok_or_else(|| {
            Error::not_found(
                "lookup.field_not_found",
                format!(
                    "field `{}` does not exist in table `{}`",
                    self.lookup_field_id,
                    foreign.id()
                ),
            )
        })
    }

    fn dependency_ids(&self) -> Vec<FieldId> {
        let mut ids = vec![self.lookup_field_id.clone()];

        if let Some(filter) = &self.condition.filter {
            ids.extend(filter.field_ids());
        }

        ids
    }
}

impl ConditionalLookup {
    pub fn create_pending(
        id: FieldId,
        name: FieldName,
        options: ConditionalLookupOptions,
    ) -> Result<Field> {
        Ok(Field::new(
            id,
            name,
            ConditionalLookup {
                options,
                state: LookupState::Pending,
            },
        ))
    }

    pub fn options(&self) -> &ConditionalLookupOptions {
        &self.options
    }

    pub fn state(&self) -> &LookupState {
        &self.state
    }

    pub fn inner(&self) -> Option<&Field> {
        self.state.inner()
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, LookupState::Pending)
    }

    /// A limit of one yields at most a single value.
    pub fn is_multiple(&self) -> bool {
        self.options.condition.limit != Some(1)
    }
}

impl ConditionalRollup {
    pub fn create(
        id: FieldId,
        name: FieldName,
        config: ConditionalRollupConfig,
        aggregate: Aggregate,
        values_type: FieldValueType,
    ) -> Result<Field> {
        let mut rollup = ConditionalRollup { config, aggregate };
        rollup.aggregate.resolve_result_type(values_type)?;
        Ok(Field::new(id, name, rollup))
    }

    pub fn create_pending(
        id: FieldId,
        name: FieldName,
        config: ConditionalRollupConfig,
        aggregate: Aggregate,
    ) -> Result<Field> {
        Ok(Field::new(id, name, ConditionalRollup { config, aggregate }))
    }

    pub fn config(&self) -> &ConditionalRollupConfig {
        &self.config
    }

    pub fn aggregate(&self) -> &Aggregate {
        &self.aggregate
    }

    pub fn is_pending(&self) -> bool {
        self.aggregate.is_pending()
    }

    pub fn set_function(&mut self, function: RollupFunction) -> Result<()> {
        self.aggregate.set_function(function)
    }
}

impl ForeignTableRelatedField for ConditionalLookup {
    fn foreign_table_id(&self) -> &TableId {
        &self.options.foreign_table_id
    }

    fn validate_foreign_tables(&mut self, _field_id: &FieldId, cx: &ResolveCx<'_>) -> Result<()> {
        let target = self.options.target(cx)?;
        self.state.resolve(target)
    }

    fn dependency_ids(&self) -> Vec<FieldId> {
        self.options.dependency_ids()
    }
}

impl ForeignTableRelatedField for ConditionalRollup {
    fn foreign_table_id(&self) -> &TableId {
        &self.config.foreign_table_id
    }

    fn validate_foreign_tables(&mut self, _field_id: &FieldId, cx: &ResolveCx<'_>) -> Result<()> {
        let target = self.config.target(cx)?;
        self.aggregate.resolve_result_type(target.value_type()?)
    }

    fn dependency_ids(&self) -> Vec<FieldId> {
        self.config.dependency_ids()
    }
}
