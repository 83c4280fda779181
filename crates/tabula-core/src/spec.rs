//! Storage-agnostic filter and sort predicates over records.
//!
//! A [`Spec`] tree is interpreted in two places: in memory by
//! [`Spec::is_satisfied_by`], and by a persistence adapter translating it
//! into a native query through [`SpecVisitor`]. Both interpretations are
//! two-valued: a missing or null cell never makes a predicate unknown.

mod condition;
pub use condition::LookupCondition;

mod eval;
pub use eval::{compare_values, is_empty_value, values_eq, Record};

mod sort;
pub use sort::{SortOrder, SortSpec};

mod visit;
pub use visit::SpecVisitor;

use crate::schema::FieldId;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Spec {
    And(Vec<Spec>),
    Or(Vec<Spec>),
    Not(Box<Spec>),
    Condition(FieldCondition),
}

/// A leaf predicate: `field <operator> value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldCondition {
    pub field_id: FieldId,
    pub operator: Operator,

    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Is,
    IsNot,
    Contains,
    DoesNotContain,
    IsGreater,
    IsGreaterEqual,
    IsLess,
    IsLessEqual,
    IsEmpty,
    IsNotEmpty,
    IsAnyOf,
    IsNoneOf,
    HasAnyOf,
    HasAllOf,
}

impl Spec {
    pub fn and(specs: impl IntoIterator<Item = Spec>) -> Spec {
        Spec::And(specs.into_iter().collect())
    }

    pub fn or(specs: impl IntoIterator<Item = Spec>) -> Spec {
        Spec::Or(specs.into_iter().collect())
    }

    pub fn not(spec: Spec) -> Spec {
        Spec::Not(Box::new(spec))
    }

    pub fn condition(field_id: FieldId, operator: Operator, value: impl Into<Value>) -> Spec {
        Spec::Condition(FieldCondition {
            field_id,
            operator,
            value: value.into(),
        })
    }

    pub fn accept<V: SpecVisitor + ?Sized>(&self, v: &mut V) -> V::Output {
        match self {
            Spec::And(specs) => v.visit_and(specs),
            Spec::Or(specs) => v.visit_or(specs),
            Spec::Not(spec) => v.visit_not(spec),
            Spec::Condition(condition) => v.visit_condition(condition),
        }
    }

    /// Every field id the tree refers to, in order of first appearance.
    pub fn field_ids(&self) -> Vec<FieldId> {
        struct Collect(Vec<FieldId>);

        impl SpecVisitor for Collect {
            type Output = ();

            fn visit_and(&mut self, specs: &[Spec]) {
                specs.iter().for_each(|spec| spec.accept(self));
            }

            fn visit_or(&mut self, specs: &[Spec]) {
                specs.iter().for_each(|spec| spec.accept(self));
            }

            fn visit_not(&mut self, spec: &Spec) {
                spec.accept(self);
            }

            fn visit_condition(&mut self, condition: &FieldCondition) {
                if !self.0.contains(&condition.field_id) {
                    self.0.push(condition.field_id.clone());
                }
            }
        }

        let mut collect = Collect(vec![]);
        self.accept(&mut collect);
        collect.0
    }
}

impl Operator {
    pub const ALL: [Operator; 14] = [
        Self::Is,
        Self::IsNot,
        Self::Contains,
        Self::DoesNotContain,
        Self::IsGreater,
        Self::IsGreaterEqual,
        Self::IsLess,
        Self::IsLessEqual,
        Self::IsEmpty,
        Self::IsNotEmpty,
        Self::IsAnyOf,
        Self::IsNoneOf,
        Self::HasAnyOf,
        Self::HasAllOf,
    ];

    /// Whether the operand is a list of values.
    pub fn takes_list(self) -> bool {
        matches!(
            self,
            Self::IsAnyOf | Self::IsNoneOf | Self::HasAnyOf | Self::HasAllOf
        )
    }

    /// Whether the operator ignores its operand.
    pub fn is_unary(self) -> bool {
        matches!(self, Self::IsEmpty | Self::IsNotEmpty)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Is => "is",
            Self::IsNot => "isNot",
            Self::Contains => "contains",
            Self::DoesNotContain => "doesNotContain",
            Self::IsGreater => "isGreater",
            Self::IsGreaterEqual => "isGreaterEqual",
            Self::IsLess => "isLess",
            Self::IsLessEqual => "isLessEqual",
            Self::IsEmpty => "isEmpty",
            Self::IsNotEmpty => "isNotEmpty",
            Self::IsAnyOf => "isAnyOf",
            Self::IsNoneOf => "isNoneOf",
            Self::HasAnyOf => "hasAnyOf",
            Self::HasAllOf => "hasAllOf",
        };
        fmt.write_str(name)
    }
}

impl FieldCondition {
    /// The operand as a list. A scalar operand is a list of one, `null` is
    /// an empty list.
    pub fn operands(&self) -> Vec<&Value> {
        match &self.value {
            Value::Null => vec![],
            Value::Array(values) => values.iter().filter(|v| !v.is_null()).collect(),
            value => vec![value],
        }
    }
}
