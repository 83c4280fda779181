use super::{Field, LookupOptions};
use crate::schema::{
    validate_result_options, CellValueType, FieldId, FieldName, FieldValueType, Formatting,
    ForeignTableRelatedField, ResolveCx, SetOnce, ShowAs, TableId,
};
use crate::{Error, Result};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rollups address their values field the same way lookups do.
pub type RollupConfig = LookupOptions;

/// The aggregation a rollup applies to the looked-up values.
///
/// Serialized as its expression, e.g. `sum({values})`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RollupFunction {
    CountAll,
    CountA,
    Count,
    Sum,
    Average,
    Max,
    Min,
    And,
    Or,
    Xor,
    ArrayJoin,
    ArrayUnique,
    ArrayCompact,
    Concatenate,
}

/// The aggregate part shared by rollups and conditional rollups.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    function: RollupFunction,

    result_type: SetOnce<FieldValueType>,

    /// Value type of the aggregated field as of the last resolution.
    values_type: Option<FieldValueType>,

    formatting: Option<Formatting>,

    show_as: Option<ShowAs>,
}

/// Aggregates the values of a field in linked records.
#[derive(Debug, Clone, PartialEq)]
pub struct Rollup {
    config: RollupConfig,
    aggregate: Aggregate,
}

impl RollupFunction {
    pub const ALL: [RollupFunction; 14] = [
        Self::CountAll,
        Self::CountA,
        Self::Count,
        Self::Sum,
        Self::Average,
        Self::Max,
        Self::Min,
        Self::And,
        Self::Or,
        Self::Xor,
        Self::ArrayJoin,
        Self::ArrayUnique,
        Self::ArrayCompact,
        Self::Concatenate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::CountAll => "countall",
            Self::CountA => "counta",
            Self::Count => "count",
            Self::Sum => "sum",
            Self::Average => "average",
            Self::Max => "max",
            Self::Min => "min",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::ArrayJoin => "array_join",
            Self::ArrayUnique => "array_unique",
            Self::ArrayCompact => "array_compact",
            Self::Concatenate => "concatenate",
        }
    }

    pub fn expression(self) -> String {
        format!("{}({{values}})", self.name())
    }

    /// Parses an expression of the form `name({values})`. Whitespace and
    /// case around the function name are ignored.
    pub fn parse(expression: &str) -> Result<RollupFunction> {
        let invalid = || {
            Error::validation(
                "rollup.expression_invalid",
                format!("`{expression}` is not a rollup expression"),
            )
        };

        let name = expression
            .trim()
            .strip_suffix("({values})")
            .ok_or_else(invalid)?
            .trim()
            .to_ascii_lowercase();

        Self::ALL
            .into_iter()
            .find(|function| function.name() == name)
            .ok_or_else(invalid)
    }

    /// The value type produced by aggregating values of `values` type.
    ///
    /// Counting and joining accept any input. Arithmetic needs numbers.
    /// `max`/`min` also accept dates and keep the input type. Logical
    /// functions coerce their input to booleans.
    pub fn result_type(self, values: FieldValueType) -> Result<FieldValueType> {
        use CellValueType::*;

        let cell = values.cell_value_type;

        let result = match self {
            Self::CountAll | Self::CountA | Self::Count => FieldValueType::single(Number),
            Self::Sum | Self::Average if cell == Number => FieldValueType::single(Number),
            Self::Max | Self::Min if matches!(cell, Number | DateTime) => {
                FieldValueType::single(cell)
            }
            Self::And | Self::Or | Self::Xor => FieldValueType::single(Boolean),
            Self::ArrayJoin | Self::Concatenate => FieldValueType::single(String),
            Self::ArrayUnique | Self::ArrayCompact => FieldValueType::multiple(cell),
            Self::Sum | Self::Average | Self::Max | Self::Min => {
                return Err(Error::validation(
                    "rollup.unsupported_expression",
                    format!("`{}` cannot aggregate {cell:?} values", self.expression()),
                ))
            }
        };

        Ok(result)
    }
}

impl fmt::Display for RollupFunction {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(self.name())?;
        fmt.write_str("({values})")
    }
}

impl TryFrom<String> for RollupFunction {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<RollupFunction> for String {
    fn from(value: RollupFunction) -> Self {
        value.expression()
    }
}

impl Aggregate {
    pub fn new(
        function: RollupFunction,
        formatting: Option<Formatting>,
        show_as: Option<ShowAs>,
    ) -> Aggregate {
        Aggregate {
            function,
            result_type: SetOnce::Unset,
            values_type: None,
            formatting,
            show_as,
        }
    }

    /// Restores a persisted aggregate with its previously computed result
    /// type.
    pub fn rehydrate(
        function: RollupFunction,
        result_type: Option<FieldValueType>,
        formatting: Option<Formatting>,
        show_as: Option<ShowAs>,
    ) -> Aggregate {
        Aggregate {
            result_type: result_type.into(),
            ..Aggregate::new(function, formatting, show_as)
        }
    }

    pub fn function(&self) -> RollupFunction {
        self.function
    }

    pub fn result_type(&self) -> Option<FieldValueType> {
        self.result_type.get().copied()
    }

    pub fn values_type(&self) -> Option<FieldValueType> {
        self.values_type
    }

    pub fn formatting(&self) -> Option<&Formatting> {
        self.formatting.as_ref()
    }

    pub fn show_as(&self) -> Option<&ShowAs> {
        self.show_as.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        !self.result_type.is_set()
    }

    /// Computes and applies the result type for aggregating `values_type`.
    pub fn resolve_result_type(&mut self, values_type: FieldValueType) -> Result<()> {
        let result_type = self.function.result_type(values_type)?;
        self.apply_result_type(result_type)?;
        self.values_type = Some(values_type);
        Ok(())
    }

    /// Binds the result type and fills in default formatting for it.
    ///
    /// A different result type than the one already bound is an invariant
    /// error.
    fn apply_result_type(&mut self, result_type: FieldValueType) -> Result<()> {
        validate_result_options(result_type, self.formatting.as_ref(), self.show_as.as_ref())?;
        self.result_type
            .set(result_type, "rollup.result_type_already_set")?;

        if self.formatting.is_none() {
            self.formatting = Formatting::default_for(result_type.cell_value_type);
        }

        Ok(())
    }

    /// Switches to another aggregation function.
    ///
    /// Formatting and display options that do not fit the new result type
    /// are dropped. On failure the aggregate is left exactly as it was.
    pub fn set_function(&mut self, function: RollupFunction) -> Result<()> {
        let Some(values_type) = self.values_type else {
            return Err(Error::invariant(
                "rollup.values_type_unknown",
                "the expression of an unresolved rollup cannot be changed",
            ));
        };

        let previous = self.clone();

        let result = function.result_type(values_type).and_then(|result_type| {
            self.function = function;
            self.result_type = SetOnce::Unset;

            if validate_result_options(result_type, self.formatting.as_ref(), None).is_err() {
                self.formatting = None;
            }
            if validate_result_options(result_type, None, self.show_as.as_ref()).is_err() {
                self.show_as = None;
            }

            self.resolve_result_type(values_type)
        });

        if let Err(err) = result {
            tracing::debug!(
                from = %previous.function,
                to = %function,
                error = %err,
                "rolled back rollup expression change"
            );
            *self = previous;
            return Err(err);
        }

        Ok(())
    }
}

impl Rollup {
    /// Creates a rollup against a values field of known type.
    pub fn create(
        id: FieldId,
        name: FieldName,
        config: RollupConfig,
        aggregate: Aggregate,
        values_type: FieldValueType,
    ) -> Result<Field> {
        let mut rollup = Rollup { config, aggregate };
        rollup.aggregate.resolve_result_type(values_type)?;
        Ok(Field::new(id, name, rollup))
    }

    /// Creates a rollup whose values field is resolved later.
    pub fn create_pending(
        id: FieldId,
        name: FieldName,
        config: RollupConfig,
        aggregate: Aggregate,
    ) -> Result<Field> {
        Ok(Field::new(id, name, Rollup { config, aggregate }))
    }

    pub fn config(&self) -> &RollupConfig {
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

impl ForeignTableRelatedField for Rollup {
    fn foreign_table_id(&self) -> &TableId {
        &self.config.foreign_table_id
    }

    fn validate_foreign_tables(&mut self, _field_id: &FieldId, cx: &ResolveCx<'_>) -> Result<()> {
        self.config.check_link(cx)?;
        let target = self.config.target(cx)?;
        self.aggregate.resolve_result_type(target.value_type()?)
    }

    fn dependency_ids(&self) -> Vec<FieldId> {
        self.config.dependency_ids()
    }
}

impl Field {
    /// Changes the aggregation function of a rollup or conditional rollup.
    pub fn set_rollup_function(&mut self, function: RollupFunction) -> Result<()> {
        let id = self.id().clone();
        let kind = self.kind();

        match self.ty_mut() {
            super::FieldTy::Rollup(rollup) => rollup.set_function(function),
            super::FieldTy::ConditionalRollup(rollup) => rollup.set_function(function),
            _ => Err(Error::unexpected(
                "rollup.not_a_rollup",
                format!("field `{id}` is a {kind}, not a rollup"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CellValueType::*;

    #[test]
    fn parse_expression() {
        assert_eq!(
            RollupFunction::parse(" SUM({values}) ").unwrap(),
            RollupFunction::Sum
        );
        assert_eq!(
            RollupFunction::parse("array_join({values})").unwrap(),
            RollupFunction::ArrayJoin
        );
        assert!(RollupFunction::parse("median({values})").is_err());
        assert!(RollupFunction::parse("sum(values)").is_err());
    }

    #[test]
    fn serde_uses_expression() {
        let json = serde_json::to_string(&RollupFunction::CountAll).unwrap();
        assert_eq!(json, "\"countall({values})\"");
        let back: RollupFunction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, RollupFunction::CountAll);
    }

    #[test]
    fn result_types() {
        let text = FieldValueType::single(String);
        let numbers = FieldValueType::multiple(Number);
        let dates = FieldValueType::multiple(DateTime);

        assert_eq!(
            RollupFunction::Sum.result_type(numbers).unwrap(),
            FieldValueType::single(Number)
        );
        assert_eq!(
            RollupFunction::Sum.result_type(text).unwrap_err().code(),
            Some("rollup.unsupported_expression")
        );
        assert_eq!(
            RollupFunction::Max.result_type(dates).unwrap(),
            FieldValueType::single(DateTime)
        );
        assert_eq!(
            RollupFunction::CountAll.result_type(text).unwrap(),
            FieldValueType::single(Number)
        );
        assert_eq!(
            RollupFunction::ArrayUnique.result_type(text).unwrap(),
            FieldValueType::multiple(String)
        );
        assert_eq!(
            RollupFunction::Or.result_type(text).unwrap(),
            FieldValueType::single(Boolean)
        );
    }

    #[test]
    fn failed_function_change_rolls_back() {
        let mut aggregate = Aggregate::new(RollupFunction::CountAll, None, None);
        aggregate
            .resolve_result_type(FieldValueType::multiple(String))
            .unwrap();
        let before = aggregate.clone();

        let err = aggregate.set_function(RollupFunction::Sum).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(aggregate, before);

        aggregate.set_function(RollupFunction::ArrayJoin).unwrap();
        assert_eq!(aggregate.result_type(), Some(FieldValueType::single(String)));
        assert_eq!(aggregate.formatting(), None);
    }
}
