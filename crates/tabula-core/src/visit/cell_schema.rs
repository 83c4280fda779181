use super::Visit;
use crate::schema::field::{
    Attachment, AutoNumber, Button, Checkbox, ConditionalLookup, ConditionalRollup, CreatedBy,
    CreatedTime, Date, Formula, LastModifiedBy, LastModifiedTime, Link, LongText, Lookup,
    MultipleSelect, Number, Rating, Rollup, SelectOptions, SingleLineText, SingleSelect, User,
};
use crate::schema::{Field, RecordId};
use crate::{Error, Result};

use jiff::{civil, tz::TimeZone, Timestamp};
use serde_json::Value;

/// Structural schema a raw cell input must satisfy before it is converted.
///
/// `null` is always structurally valid except where noted; whether a field
/// may be cleared is decided during conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum CellSchema {
    /// Accepts nothing but `null`. Used for computed fields.
    ReadOnly,

    /// Accepts any input. Used for buttons, whose writes are ignored.
    Any,

    String,

    Number {
        min: Option<f64>,
        max: Option<f64>,
        integer: bool,
    },

    Boolean,

    /// A date string, interpreted in `time_zone` when it carries no offset,
    /// or the `"now"` sentinel.
    DateTime { time_zone: String },

    /// One of the listed choices, given by id or by name.
    Choice { choices: Vec<(String, String)> },

    Array(Box<CellSchema>),

    Object(ObjectShape),

    /// A record id string or a `{id, title?}` object.
    LinkItem,
}

/// Required keys of an object input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectShape {
    pub name: &'static str,
    pub required: &'static [&'static str],
}

const ATTACHMENT: ObjectShape = ObjectShape {
    name: "attachment",
    required: &["id", "name", "path", "token", "size", "mimetype"],
};

const USER: ObjectShape = ObjectShape {
    name: "user",
    required: &["id", "title"],
};

impl CellSchema {
    pub fn validate(&self, value: &Value) -> Result<()> {
        if value.is_null() {
            return Ok(());
        }

        match (self, value) {
            (Self::Any, _) => Ok(()),
            (Self::ReadOnly, _) => Err(mismatch("computed fields only accept null", value)),
            (Self::String, Value::String(_)) => Ok(()),
            (Self::Number { min, max, integer }, Value::Number(n)) => {
                let n = n.as_f64().unwrap_or(f64::NAN);

                if *integer && n.fract() != 0.0 {
                    return Err(mismatch("expected a whole number", value));
                }

                if min.is_some_and(|min| n < min) || max.is_some_and(|max| n > max) {
                    return Err(Error::validation(
                        "cell.out_of_range",
                        format!(
                            "{n} is outside {}..={}",
                            min.map_or("".into(), |v| v.to_string()),
                            max.map_or("".into(), |v| v.to_string())
                        ),
                    ));
                }

                Ok(())
            }
            (Self::Boolean, Value::Bool(_)) => Ok(()),
            (Self::DateTime { time_zone }, Value::String(s)) => {
                parse_datetime(s, time_zone).map(|_| ())
            }
            (Self::Choice { choices }, Value::String(s)) => {
                if choices.iter().any(|(id, name)| id == s || name == s) {
                    Ok(())
                } else {
                    Err(Error::validation(
                        "select.unknown_choice",
                        format!("`{s}` is not one of the choices"),
                    ))
                }
            }
            (Self::Array(item), Value::Array(values)) => {
                values.iter().try_for_each(|value| match value {
                    Value::Null => Err(mismatch("arrays cannot contain null", value)),
                    value => item.validate(value),
                })
            }
            (Self::Object(shape), Value::Object(map)) => {
                match shape.required.iter().find(|key| !map.contains_key(**key)) {
                    Some(key) => Err(Error::validation(
                        "cell.invalid_shape",
                        format!("{} is missing `{key}`", shape.name),
                    )),
                    None => Ok(()),
                }
            }
            (Self::LinkItem, Value::String(s)) => RecordId::parse(s.as_str()).map(|_| ()),
            (Self::LinkItem, Value::Object(map)) => match map.get("id") {
                Some(Value::String(id)) => RecordId::parse(id.as_str()).map(|_| ()),
                _ => Err(mismatch("link items need a string `id`", value)),
            },
            _ => Err(mismatch(self.expected(), value)),
        }
    }

    fn expected(&self) -> &'static str {
        match self {
            Self::ReadOnly => "null",
            Self::Any => "anything",
            Self::String => "expected a string",
            Self::Number { .. } => "expected a number",
            Self::Boolean => "expected a boolean",
            Self::DateTime { .. } => "expected a date string",
            Self::Choice { .. } => "expected a choice name or id",
            Self::Array(_) => "expected an array",
            Self::Object(_) => "expected an object",
            Self::LinkItem => "expected a record id or link object",
        }
    }

    fn array(item: CellSchema) -> CellSchema {
        CellSchema::Array(Box::new(item))
    }

    fn choices(options: &SelectOptions) -> CellSchema {
        CellSchema::Choice {
            choices: options
                .choices
                .iter()
                .map(|choice| (choice.id.to_string(), choice.name.clone()))
                .collect(),
        }
    }
}

fn mismatch(expected: &str, value: &Value) -> Error {
    Error::validation("cell.type_mismatch", format!("{expected}, got `{value}`"))
}

/// Parses a date input.
///
/// Accepts `"now"`, RFC 3339 timestamps, and civil date-times or dates. The
/// civil forms are interpreted in `time_zone`.
pub fn parse_datetime(input: &str, time_zone: &str) -> Result<Timestamp> {
    let input = input.trim();

    if input.eq_ignore_ascii_case("now") {
        return Ok(Timestamp::now());
    }

    if let Ok(ts) = input.parse::<Timestamp>() {
        return Ok(ts);
    }

    let tz = TimeZone::get(time_zone)?;

    if let Ok(dt) = input.parse::<civil::DateTime>() {
        return Ok(dt.to_zoned(tz)?.timestamp());
    }

    match input.parse::<civil::Date>() {
        Ok(date) => Ok(date.to_zoned(tz)?.timestamp()),
        Err(_) => Err(Error::validation(
            "datetime.invalid",
            format!("`{input}` is not a recognized date"),
        )),
    }
}

/// Builds the [`CellSchema`] raw input for a field must satisfy.
#[derive(Debug, Default)]
pub struct CellSchemaVisitor;

impl Visit for CellSchemaVisitor {
    type Output = CellSchema;

    fn visit_single_line_text(&mut self, _: &Field, _: &SingleLineText) -> Result<CellSchema> {
        Ok(CellSchema::String)
    }

    fn visit_long_text(&mut self, _: &Field, _: &LongText) -> Result<CellSchema> {
        Ok(CellSchema::String)
    }

    fn visit_number(&mut self, _: &Field, _: &Number) -> Result<CellSchema> {
        Ok(CellSchema::Number {
            min: None,
            max: None,
            integer: false,
        })
    }

    fn visit_rating(&mut self, _: &Field, ty: &Rating) -> Result<CellSchema> {
        Ok(CellSchema::Number {
            min: Some(1.0),
            max: Some(f64::from(ty.max())),
            integer: true,
        })
    }

    fn visit_checkbox(&mut self, _: &Field, _: &Checkbox) -> Result<CellSchema> {
        Ok(CellSchema::Boolean)
    }

    fn visit_date(&mut self, _: &Field, ty: &Date) -> Result<CellSchema> {
        Ok(CellSchema::DateTime {
            time_zone: ty.time_zone().to_string(),
        })
    }

    fn visit_attachment(&mut self, _: &Field, _: &Attachment) -> Result<CellSchema> {
        Ok(CellSchema::array(CellSchema::Object(ATTACHMENT)))
    }

    fn visit_user(&mut self, _: &Field, ty: &User) -> Result<CellSchema> {
        let item = CellSchema::Object(USER);
        Ok(if ty.is_multiple() {
            CellSchema::array(item)
        } else {
            item
        })
    }

    fn visit_single_select(&mut self, _: &Field, ty: &SingleSelect) -> Result<CellSchema> {
        Ok(CellSchema::choices(&ty.options))
    }

    fn visit_multiple_select(&mut self, _: &Field, ty: &MultipleSelect) -> Result<CellSchema> {
        Ok(CellSchema::array(CellSchema::choices(&ty.options)))
    }

    fn visit_formula(&mut self, _: &Field, _: &Formula) -> Result<CellSchema> {
        Ok(CellSchema::ReadOnly)
    }

    fn visit_button(&mut self, _: &Field, _: &Button) -> Result<CellSchema> {
        Ok(CellSchema::Any)
    }

    fn visit_created_time(&mut self, _: &Field, _: &CreatedTime) -> Result<CellSchema> {
        Ok(CellSchema::ReadOnly)
    }

    fn visit_last_modified_time(&mut self, _: &Field, _: &LastModifiedTime) -> Result<CellSchema> {
        Ok(CellSchema::ReadOnly)
    }

    fn visit_created_by(&mut self, _: &Field, _: &CreatedBy) -> Result<CellSchema> {
        Ok(CellSchema::ReadOnly)
    }

    fn visit_last_modified_by(&mut self, _: &Field, _: &LastModifiedBy) -> Result<CellSchema> {
        Ok(CellSchema::ReadOnly)
    }

    fn visit_auto_number(&mut self, _: &Field, _: &AutoNumber) -> Result<CellSchema> {
        Ok(CellSchema::ReadOnly)
    }

    fn visit_link(&mut self, _: &Field, ty: &Link) -> Result<CellSchema> {
        Ok(if ty.is_multiple() {
            CellSchema::array(CellSchema::LinkItem)
        } else {
            CellSchema::LinkItem
        })
    }

    fn visit_lookup(&mut self, _: &Field, _: &Lookup) -> Result<CellSchema> {
        Ok(CellSchema::ReadOnly)
    }

    fn visit_rollup(&mut self, _: &Field, _: &Rollup) -> Result<CellSchema> {
        Ok(CellSchema::ReadOnly)
    }

    fn visit_conditional_lookup(&mut self, _: &Field, _: &ConditionalLookup) -> Result<CellSchema> {
        Ok(CellSchema::ReadOnly)
    }

    fn visit_conditional_rollup(&mut self, _: &Field, _: &ConditionalRollup) -> Result<CellSchema> {
        Ok(CellSchema::ReadOnly)
    }
}

impl Field {
    pub fn cell_schema(&self) -> Result<CellSchema> {
        self.accept(&mut CellSchemaVisitor)
    }
}
