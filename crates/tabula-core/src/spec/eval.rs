use super::{FieldCondition, Operator, Spec, SpecVisitor};
use crate::schema::{FieldId, RecordId};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

static NULL: Value = Value::Null;

/// A record as seen by the in-memory evaluator: cell values keyed by field
/// id. Missing cells read as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: RecordId,

    #[serde(default)]
    pub fields: IndexMap<FieldId, Value>,
}

impl Record {
    pub fn new(id: RecordId) -> Record {
        Record {
            id,
            fields: IndexMap::new(),
        }
    }

    pub fn with(mut self, field_id: FieldId, value: impl Into<Value>) -> Self {
        self.fields.insert(field_id, value.into());
        self
    }

    pub fn get(&self, field_id: &FieldId) -> &Value {
        self.fields.get(field_id).unwrap_or(&NULL)
    }
}

impl Spec {
    pub fn is_satisfied_by(&self, record: &Record) -> bool {
        self.accept(&mut Evaluator { record })
    }
}

struct Evaluator<'a> {
    record: &'a Record,
}

impl SpecVisitor for Evaluator<'_> {
    type Output = bool;

    fn visit_and(&mut self, specs: &[Spec]) -> bool {
        specs.iter().all(|spec| spec.accept(self))
    }

    fn visit_or(&mut self, specs: &[Spec]) -> bool {
        specs.iter().any(|spec| spec.accept(self))
    }

    fn visit_not(&mut self, spec: &Spec) -> bool {
        !spec.accept(self)
    }

    fn visit_condition(&mut self, condition: &FieldCondition) -> bool {
        evaluate(condition, self.record.get(&condition.field_id))
    }
}

fn evaluate(condition: &FieldCondition, cell: &Value) -> bool {
    holds(condition.operator, condition, cell)
}

fn holds(operator: Operator, condition: &FieldCondition, cell: &Value) -> bool {
    let operand = &condition.value;

    match operator {
        Operator::Is if operand.is_null() => is_empty_value(cell),
        Operator::Is => values_eq(cell, operand),
        Operator::IsNot => !holds(Operator::Is, condition, cell),
        Operator::Contains => match (cell, operand) {
            (Value::String(haystack), Value::String(needle)) => haystack
                .to_ascii_lowercase()
                .contains(&needle.to_ascii_lowercase()),
            _ => false,
        },
        Operator::DoesNotContain => !holds(Operator::Contains, condition, cell),
        Operator::IsGreater => compare_values(cell, operand) == Some(Ordering::Greater),
        Operator::IsGreaterEqual => matches!(
            compare_values(cell, operand),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Operator::IsLess => compare_values(cell, operand) == Some(Ordering::Less),
        Operator::IsLessEqual => matches!(
            compare_values(cell, operand),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Operator::IsEmpty => is_empty_value(cell),
        Operator::IsNotEmpty => !is_empty_value(cell),
        Operator::IsAnyOf => condition
            .operands()
            .into_iter()
            .any(|operand| values_eq(cell, operand)),
        Operator::IsNoneOf => !holds(Operator::IsAnyOf, condition, cell),
        Operator::HasAnyOf => {
            let elements = elements(cell);
            condition
                .operands()
                .into_iter()
                .any(|operand| elements.iter().any(|e| values_eq(e, operand)))
        }
        Operator::HasAllOf => {
            let elements = elements(cell);
            condition
                .operands()
                .into_iter()
                .all(|operand| elements.iter().any(|e| values_eq(e, operand)))
        }
    }
}

/// Equality of two scalar cell values. Numbers compare numerically, values
/// of different kinds and `null` are never equal.
pub fn values_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        _ => false,
    }
}

/// Orders two scalar values of the same kind. Strings compare by bytes,
/// `false < true`.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// `null`, the empty string and the empty list are empty.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(values) => values.iter().all(Value::is_null),
        _ => false,
    }
}

/// A cell as a list of values.
fn elements(cell: &Value) -> Vec<&Value> {
    match cell {
        Value::Null => vec![],
        Value::Array(values) => values.iter().filter(|v| !v.is_null()).collect(),
        value => vec![value],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fld(s: &str) -> FieldId {
        FieldId::parse(s).unwrap()
    }

    fn record() -> Record {
        Record::new(RecordId::parse("rec1000000000000000").unwrap())
            .with(fld("fldName000000000000"), "Ada Lovelace")
            .with(fld("fldAge0000000000000"), 36)
            .with(fld("fldTags000000000000"), json!(["math", "poetry"]))
            .with(fld("fldEmpty00000000000"), Value::Null)
    }

    fn check(field: &str, operator: Operator, value: Value) -> bool {
        Spec::condition(fld(field), operator, value).is_satisfied_by(&record())
    }

    #[test]
    fn scalar_operators() {
        assert!(check("fldName000000000000", Operator::Contains, json!("LOVE")));
        assert!(check("fldName000000000000", Operator::DoesNotContain, json!("babbage")));
        assert!(check("fldAge0000000000000", Operator::Is, json!(36.0)));
        assert!(check("fldAge0000000000000", Operator::IsGreaterEqual, json!(36)));
        assert!(!check("fldAge0000000000000", Operator::IsLess, json!(36)));
        assert!(check("fldAge0000000000000", Operator::IsAnyOf, json!([1, 36])));
        assert!(check("fldAge0000000000000", Operator::IsNoneOf, json!([1, 2])));
    }

    #[test]
    fn nulls_are_two_valued() {
        assert!(check("fldEmpty00000000000", Operator::IsEmpty, Value::Null));
        assert!(check("fldMissing000000000", Operator::IsEmpty, Value::Null));
        assert!(!check("fldEmpty00000000000", Operator::Is, json!("x")));
        assert!(check("fldEmpty00000000000", Operator::IsNot, json!("x")));
        assert!(!check("fldEmpty00000000000", Operator::IsGreater, json!(0)));
        assert!(check("fldEmpty00000000000", Operator::Is, Value::Null));
    }

    #[test]
    fn list_operators() {
        assert!(check("fldTags000000000000", Operator::HasAnyOf, json!(["poetry", "x"])));
        assert!(check("fldTags000000000000", Operator::HasAllOf, json!(["poetry", "math"])));
        assert!(!check("fldTags000000000000", Operator::HasAllOf, json!(["poetry", "x"])));
        assert!(check("fldName000000000000", Operator::HasAnyOf, json!(["Ada Lovelace"])));
    }

    #[test]
    fn combinators() {
        let spec = Spec::and([
            Spec::condition(fld("fldAge0000000000000"), Operator::IsGreater, 30),
            Spec::not(Spec::or([
                Spec::condition(fld("fldName000000000000"), Operator::IsEmpty, Value::Null),
                Spec::condition(fld("fldTags000000000000"), Operator::HasAnyOf, json!(["chess"])),
            ])),
        ]);
        assert!(spec.is_satisfied_by(&record()));

        assert!(Spec::and([]).is_satisfied_by(&record()));
        assert!(!Spec::or([]).is_satisfied_by(&record()));
    }
}
