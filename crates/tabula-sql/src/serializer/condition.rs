use super::{Column, Comma, Delimited, Formatter, Ident, Param, Params, Placeholder, ToSql};
use crate::Type;

use tabula_core::spec::{FieldCondition, Operator, SpecVisitor};
use tabula_core::{Error, Result, Spec};

use serde_json::Value;

impl<P: Params> SpecVisitor for Formatter<'_, P> {
    type Output = Result<()>;

    fn visit_and(&mut self, specs: &[Spec]) -> Result<()> {
        self.junction(specs, " AND ", "TRUE")
    }

    fn visit_or(&mut self, specs: &[Spec]) -> Result<()> {
        self.junction(specs, " OR ", "FALSE")
    }

    fn visit_not(&mut self, spec: &Spec) -> Result<()> {
        fmt!(self, "NOT (");
        spec.accept(self)?;
        fmt!(self, ")");
        Ok(())
    }

    fn visit_condition(&mut self, condition: &FieldCondition) -> Result<()> {
        let field = self.serializer.field(&condition.field_id)?;
        let column = self.serializer.column(field)?;
        self.leaf(condition.operator, column, condition)
    }
}

impl<P: Params> Formatter<'_, P> {
    fn junction(&mut self, specs: &[Spec], op: &str, empty: &str) -> Result<()> {
        if specs.is_empty() {
            fmt!(self, empty);
            return Ok(());
        }

        fmt!(self, "(");
        for (i, spec) in specs.iter().enumerate() {
            if i > 0 {
                fmt!(self, op);
            }
            spec.accept(self)?;
        }
        fmt!(self, ")");

        Ok(())
    }

    /// Writes one condition. The output is always `TRUE` or `FALSE` for
    /// every row, including rows where the column is `NULL`.
    fn leaf(
        &mut self,
        operator: Operator,
        column: Column<'_>,
        condition: &FieldCondition,
    ) -> Result<()> {
        let operand = &condition.value;

        match operator {
            Operator::IsNot => self.negate(Operator::Is, column, condition),
            Operator::DoesNotContain => self.negate(Operator::Contains, column, condition),
            Operator::IsNotEmpty => self.negate(Operator::IsEmpty, column, condition),
            Operator::IsNoneOf => self.negate(Operator::IsAnyOf, column, condition),
            Operator::IsEmpty => self.is_empty(column),
            Operator::Is if operand.is_null() => self.is_empty(column),
            _ if column.ty.is_json() => self.json_leaf(operator, column, condition),
            Operator::Is => self.compare(column, "=", operand),
            Operator::IsGreater => self.compare(column, ">", operand),
            Operator::IsGreaterEqual => self.compare(column, ">=", operand),
            Operator::IsLess => self.compare(column, "<", operand),
            Operator::IsLessEqual => self.compare(column, "<=", operand),
            Operator::Contains => self.contains(column, operand),
            Operator::IsAnyOf | Operator::HasAnyOf => self.any_of(column, condition.operands()),
            Operator::HasAllOf => self.all_of(column, condition.operands()),
        }
    }

    fn negate(
        &mut self,
        positive: Operator,
        column: Column<'_>,
        condition: &FieldCondition,
    ) -> Result<()> {
        fmt!(self, "NOT ");
        self.leaf(positive, column, condition)
    }

    fn is_empty(&mut self, column: Column<'_>) -> Result<()> {
        let name = Ident(column.name);

        match column.ty {
            Type::Text => fmt!(self, "(", name, " IS NULL OR ", name, " = '')"),
            Type::Json => {
                fmt!(self, "(NOT EXISTS (SELECT 1 FROM ");
                self.json_elements(column);
                fmt!(self, " WHERE ", self.json_not_null(), "))");
            }
            _ => fmt!(self, "(", name, " IS NULL)"),
        }

        Ok(())
    }

    fn compare(&mut self, column: Column<'_>, op: &str, operand: &Value) -> Result<()> {
        let Some(param) = scalar_param(column.ty, operand) else {
            fmt!(self, "FALSE");
            return Ok(());
        };

        let placeholder = self.params.push(param);
        fmt!(self, "COALESCE(", Ident(column.name), " ", op, " ", placeholder, ", FALSE)");
        Ok(())
    }

    fn contains(&mut self, column: Column<'_>, operand: &Value) -> Result<()> {
        let (Type::Text | Type::DateTime, Value::String(needle)) = (column.ty, operand) else {
            fmt!(self, "FALSE");
            return Ok(());
        };

        let placeholder = self
            .params
            .push(Param::Text(format!("%{}%", escape_like(needle))));

        fmt!(self, "COALESCE(");
        if self.serializer.is_sqlite() {
            fmt!(self, Ident(column.name), " LIKE ");
        } else if column.ty == Type::DateTime {
            fmt!(self, "CAST(", Ident(column.name), " AS TEXT) ILIKE ");
        } else {
            fmt!(self, Ident(column.name), " ILIKE ");
        }
        fmt!(self, placeholder, " ESCAPE '\\', FALSE)");

        Ok(())
    }

    fn any_of(&mut self, column: Column<'_>, operands: Vec<&Value>) -> Result<()> {
        let placeholders = operands
            .into_iter()
            .filter_map(|operand| scalar_param(column.ty, operand))
            .map(|param| self.params.push(param))
            .collect::<Vec<_>>();

        if placeholders.is_empty() {
            fmt!(self, "FALSE");
        } else {
            fmt!(self, "COALESCE(", Ident(column.name), " IN (", Comma(placeholders), "), FALSE)");
        }

        Ok(())
    }

    fn all_of(&mut self, column: Column<'_>, operands: Vec<&Value>) -> Result<()> {
        if operands.is_empty() {
            fmt!(self, "TRUE");
            return Ok(());
        }

        let Some(params) = operands
            .into_iter()
            .map(|operand| scalar_param(column.ty, operand))
            .collect::<Option<Vec<_>>>()
        else {
            fmt!(self, "FALSE");
            return Ok(());
        };

        let equalities = params
            .into_iter()
            .map(|param| Equals(column.name, self.params.push(param)))
            .collect::<Vec<_>>();

        fmt!(self, "COALESCE(", Delimited(equalities, " AND "), ", FALSE)");
        Ok(())
    }

    fn json_leaf(
        &mut self,
        operator: Operator,
        column: Column<'_>,
        condition: &FieldCondition,
    ) -> Result<()> {
        match operator {
            Operator::HasAnyOf => {
                let matchable = condition
                    .operands()
                    .into_iter()
                    .filter(|operand| is_element(operand))
                    .collect::<Vec<_>>();

                if matchable.is_empty() {
                    fmt!(self, "FALSE");
                    return Ok(());
                }

                fmt!(self, "EXISTS (SELECT 1 FROM ");
                self.json_elements(column);
                fmt!(self, " WHERE ");
                for (i, operand) in matchable.into_iter().enumerate() {
                    if i > 0 {
                        fmt!(self, " OR ");
                    }
                    self.json_element_eq(operand);
                }
                fmt!(self, ")");
            }
            Operator::HasAllOf => {
                let operands = condition.operands();

                if operands.is_empty() {
                    fmt!(self, "TRUE");
                    return Ok(());
                }

                if !operands.iter().all(|operand| is_element(operand)) {
                    fmt!(self, "FALSE");
                    return Ok(());
                }

                fmt!(self, "(");
                for (i, operand) in operands.into_iter().enumerate() {
                    if i > 0 {
                        fmt!(self, " AND ");
                    }
                    fmt!(self, "EXISTS (SELECT 1 FROM ");
                    self.json_elements(column);
                    fmt!(self, " WHERE ");
                    self.json_element_eq(operand);
                    fmt!(self, ")");
                }
                fmt!(self, ")");
            }
            _ => {
                return Err(Error::not_implemented(
                    "sql.json_scalar_operator",
                    format!("`{operator}` is not supported on list column `{}`", column.name),
                ))
            }
        }

        Ok(())
    }

    /// Table-valued expansion of a JSON array column, aliased `e`.
    fn json_elements(&mut self, column: Column<'_>) {
        if self.serializer.is_sqlite() {
            fmt!(self, "json_each(", Ident(column.name), ") AS e");
        } else {
            fmt!(self, "jsonb_array_elements(", Ident(column.name), ") AS e(value)");
        }
    }

    fn json_not_null(&self) -> &'static str {
        if self.serializer.is_sqlite() {
            "e.type <> 'null'"
        } else {
            "e.value <> 'null'::jsonb"
        }
    }

    fn json_element_eq(&mut self, operand: &Value) {
        if !self.serializer.is_sqlite() {
            let placeholder = self.params.push(Param::Text(operand.to_string()));
            fmt!(self, "e.value = CAST(", placeholder, " AS JSONB)");
            return;
        }

        match operand {
            Value::String(s) => {
                let placeholder = self.params.push(Param::Text(s.clone()));
                fmt!(self, "(e.type = 'text' AND e.value = ", placeholder, ")");
            }
            Value::Number(n) => {
                let placeholder = self.params.push(Param::Number(n.as_f64().unwrap_or_default()));
                fmt!(self, "(e.type IN ('integer', 'real') AND e.value = ", placeholder, ")");
            }
            Value::Bool(true) => fmt!(self, "e.type = 'true'"),
            Value::Bool(false) => fmt!(self, "e.type = 'false'"),
            Value::Null | Value::Array(_) | Value::Object(_) => fmt!(self, "FALSE"),
        }
    }
}

/// `"column" = ?n`
struct Equals<'a>(&'a str, Placeholder);

impl ToSql for Equals<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, Ident(self.0), " = ", self.1);
    }
}

/// Binds `operand` when it can equal a value stored in a column of type
/// `ty`.
fn scalar_param(ty: Type, operand: &Value) -> Option<Param> {
    match (ty, operand) {
        (Type::Text | Type::DateTime, Value::String(s)) => Some(Param::Text(s.clone())),
        (Type::Integer | Type::Real, Value::Number(n)) => n.as_f64().map(Param::Number),
        (Type::Boolean, Value::Bool(b)) => Some(Param::Boolean(*b)),
        _ => None,
    }
}

/// Whether `operand` can equal an element of a JSON list.
fn is_element(operand: &Value) -> bool {
    matches!(operand, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());

    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn params_follow_column_type() {
        assert_eq!(
            scalar_param(Type::Text, &Value::from("a")),
            Some(Param::Text("a".to_string()))
        );
        assert_eq!(scalar_param(Type::Text, &Value::from(1)), None);
        assert_eq!(
            scalar_param(Type::Integer, &Value::from(3)),
            Some(Param::Number(3.0))
        );
        assert_eq!(scalar_param(Type::Boolean, &Value::from("true")), None);
    }
}
