use super::Field;
use crate::schema::{
    validate_result_options, FieldId, FieldName, FieldValueType, Formatting, ShowAs,
};
use crate::{Error, Result};

/// A field whose value is computed from an expression over other fields of
/// the same record.
///
/// Expressions refer to fields as `{fldXXXX}`. Evaluating the expression is
/// out of scope here; only its references and declared result type are
/// tracked.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    pub expression: String,
    pub result_type: FieldValueType,
    pub formatting: Option<Formatting>,
    pub show_as: Option<ShowAs>,
}

impl Formula {
    pub fn create(
        id: FieldId,
        name: FieldName,
        expression: impl Into<String>,
        result_type: FieldValueType,
        formatting: Option<Formatting>,
        show_as: Option<ShowAs>,
    ) -> Result<Field> {
        let expression = expression.into();

        if expression.trim().is_empty() {
            return Err(Error::validation(
                "formula.expression_empty",
                "formula expression cannot be empty",
            ));
        }

        validate_result_options(result_type, formatting.as_ref(), show_as.as_ref())?;

        let formula = Formula {
            formatting: formatting.or_else(|| Formatting::default_for(result_type.cell_value_type)),
            expression,
            result_type,
            show_as,
        };
        let mut field = Field::new(id, name, formula);
        let dependencies = field.collect_dependencies()?;
        field.set_dependencies(dependencies)?;
        Ok(field)
    }

    /// Field ids referenced by the expression, in order of appearance.
    pub fn references(&self) -> Vec<FieldId> {
        let mut refs = vec![];
        let mut rest = self.expression.as_str();

        while let Some(start) = rest.find('{') {
            rest = &rest[start + 1..];

            let Some(end) = rest.find('}') else {
                break;
            };

            if let Ok(id) = FieldId::parse(&rest[..end]) {
                if !refs.contains(&id) {
                    refs.push(id);
                }
            }

            rest = &rest[end + 1..];
        }

        refs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CellValueType;

    #[test]
    fn references_are_collected_in_order() {
        let field = Formula::create(
            FieldId::generate(),
            FieldName::new("Total").unwrap(),
            "{fldPrice00000000000} * {fldQty0000000000000} + {fldPrice00000000000} + {fldShort}",
            FieldValueType::single(CellValueType::Number),
            None,
            None,
        )
        .unwrap();

        let ids: Vec<_> = field.dependencies().iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, ["fldPrice00000000000", "fldQty0000000000000"]);
        assert!(field.ty().expect_formula().formatting.is_some());
    }
}
