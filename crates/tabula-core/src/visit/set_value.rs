use super::{parse_datetime, Visit};
use crate::schema::field::{
    Attachment, AttachmentItem, AutoNumber, Button, Checkbox, ConditionalLookup,
    ConditionalRollup, CreatedBy, CreatedTime, Date, Formula, LastModifiedBy, LastModifiedTime,
    Link, LongText, Lookup, MultipleSelect, Number, Rating, Rollup, SelectOptions,
    SingleLineText, SingleSelect, User, UserItem,
};
use crate::schema::{Field, FieldId, RecordId};
use crate::{Error, Result};

use jiff::Timestamp;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Controls how raw cell input is converted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Coerce loosely typed input instead of rejecting it.
    pub typecast: bool,

    /// Zone civil date input is interpreted in. Falls back to the field's
    /// own formatting zone.
    pub time_zone: Option<String>,
}

/// A typed write to one cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellWrite {
    Clear,
    Text(String),
    Number(f64),
    Boolean(bool),
    DateTime(Timestamp),

    /// Choice names.
    Choice(String),
    Choices(Vec<String>),

    Attachments(Vec<AttachmentItem>),
    Users(Vec<UserItem>),
    Links(Vec<LinkRef>),

    /// The write is accepted and ignored.
    Noop,
}

/// A linked record given by id, or by title to be resolved by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkRef {
    Id { id: RecordId, title: Option<String> },
    Title(String),
}

/// The command produced for one field of an incoming record.
#[derive(Debug, Clone, PartialEq)]
pub struct SetFieldValue {
    pub field_id: FieldId,
    pub write: CellWrite,

    /// Select choices the write introduces. The caller adds them to the
    /// field before applying the write.
    pub new_choices: Vec<String>,
}

impl ConvertOptions {
    pub fn strict() -> ConvertOptions {
        ConvertOptions::default()
    }

    pub fn typecast() -> ConvertOptions {
        ConvertOptions {
            typecast: true,
            time_zone: None,
        }
    }

    pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = Some(time_zone.into());
        self
    }
}

impl SetFieldValue {
    fn new(field: &Field, write: CellWrite) -> SetFieldValue {
        SetFieldValue {
            field_id: field.id().clone(),
            write,
            new_choices: vec![],
        }
    }
}

/// Converts one raw cell input into a [`SetFieldValue`].
///
/// In strict mode input must already have the field's shape. With
/// `typecast`, strings are parsed into numbers, dates and booleans, ratings
/// are clamped onto their scale, unknown select choices are created, and
/// link titles are passed on for lookup by title.
pub struct SetValueVisitor<'a> {
    value: &'a Value,
    options: &'a ConvertOptions,
}

impl<'a> SetValueVisitor<'a> {
    pub fn new(value: &'a Value, options: &'a ConvertOptions) -> SetValueVisitor<'a> {
        SetValueVisitor { value, options }
    }

    fn typecast(&self) -> bool {
        self.options.typecast
    }

    fn clear(&self, field: &Field) -> Result<SetFieldValue> {
        if field.not_null() {
            return Err(Error::validation(
                "field.not_null",
                format!("field `{}` cannot be empty", field.name()),
            ));
        }
        Ok(SetFieldValue::new(field, CellWrite::Clear))
    }

    fn mismatch(&self, field: &Field, expected: &str) -> Error {
        Error::validation(
            "cell.type_mismatch",
            format!(
                "field `{}` expects {expected}, got `{}`",
                field.name(),
                self.value
            ),
        )
    }

    fn text(&self, field: &Field, multiline: bool) -> Result<SetFieldValue> {
        let text = match self.value {
            Value::String(s) => s.clone(),
            value if self.typecast() => stringify(value),
            _ => return Err(self.mismatch(field, "a string")),
        };

        let text = if multiline {
            text
        } else {
            text.replace(['\r', '\n'], " ")
        };

        if text.is_empty() {
            return self.clear(field);
        }

        Ok(SetFieldValue::new(field, CellWrite::Text(text)))
    }

    fn number(&self, field: &Field) -> Result<Option<f64>> {
        match self.value {
            Value::Null => Ok(None),
            Value::Number(n) => Ok(n.as_f64()),
            Value::String(s) if self.typecast() => {
                let s = s.trim();
                if s.is_empty() {
                    return Ok(None);
                }
                match s.parse::<f64>() {
                    Ok(n) if n.is_finite() => Ok(Some(n)),
                    _ => Err(self.mismatch(field, "a finite number")),
                }
            }
            Value::Bool(b) if self.typecast() => Ok(Some(if *b { 1.0 } else { 0.0 })),
            Value::Array(values) if self.typecast() => match values.first() {
                Some(first) => SetValueVisitor::new(first, self.options).number(field),
                None => Ok(None),
            },
            _ => Err(self.mismatch(field, "a number")),
        }
    }

    fn strings(&self, field: &Field) -> Result<Vec<String>> {
        match self.value {
            Value::Array(values) => values
                .iter()
                .filter(|value| !value.is_null())
                .map(|value| match value {
                    Value::String(s) => Ok(s.clone()),
                    value if self.typecast() => Ok(stringify(value)),
                    _ => Err(self.mismatch(field, "a list of strings")),
                })
                .collect(),
            Value::String(s) if self.typecast() => Ok(s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()),
            Value::String(s) => Ok(vec![s.clone()]),
            value if self.typecast() => Ok(vec![stringify(value)]),
            _ => Err(self.mismatch(field, "a list of strings")),
        }
    }

    /// Maps choice ids and names to names. Unknown names become new choices
    /// when allowed.
    fn choices(
        &self,
        field: &Field,
        options: &SelectOptions,
        inputs: Vec<String>,
    ) -> Result<(Vec<String>, Vec<String>)> {
        let mut names = vec![];
        let mut new_choices = vec![];

        for input in inputs {
            let known = options
                .choices
                .iter()
                .find(|choice| choice.id.as_str() == input || choice.name == input);

            let name = match known {
                Some(choice) => choice.name.clone(),
                None if self.typecast() && !options.prevent_auto_new_options => {
                    if !new_choices.contains(&input) {
                        new_choices.push(input.clone());
                    }
                    input
                }
                None => {
                    return Err(Error::validation(
                        "select.unknown_choice",
                        format!("`{input}` is not a choice of `{}`", field.name()),
                    ))
                }
            };

            if !names.contains(&name) {
                names.push(name);
            }
        }

        Ok((names, new_choices))
    }

    fn single<T>(&self, field: &Field, mut items: Vec<T>, is_multiple: bool) -> Result<Vec<T>> {
        if !is_multiple && items.len() > 1 {
            if self.typecast() {
                items.truncate(1);
            } else {
                return Err(Error::validation(
                    "cell.not_multiple",
                    format!("field `{}` holds a single value", field.name()),
                ));
            }
        }
        Ok(items)
    }

    fn link_ref(&self, field: &Field, value: &Value) -> Result<LinkRef> {
        match value {
            Value::String(s) if RecordId::is_valid(s) => Ok(LinkRef::Id {
                id: RecordId::parse(s.as_str())?,
                title: None,
            }),
            Value::String(s) if self.typecast() => Ok(LinkRef::Title(s.clone())),
            Value::Object(map) => match map.get("id") {
                Some(Value::String(id)) => Ok(LinkRef::Id {
                    id: RecordId::parse(id.as_str())?,
                    title: map.get("title").and_then(Value::as_str).map(str::to_string),
                }),
                _ => Err(self.mismatch(field, "a link object with an `id`")),
            },
            _ => Err(self.mismatch(field, "a record id or link object")),
        }
    }

    fn user_item(&self, field: &Field, value: &Value) -> Result<UserItem> {
        match value {
            Value::Object(_) => from_json(value),
            Value::String(id) if self.typecast() => Ok(UserItem {
                id: id.clone(),
                title: id.clone(),
                email: None,
            }),
            _ => Err(self.mismatch(field, "a user object")),
        }
    }

    fn computed(&self, field: &Field) -> Result<SetFieldValue> {
        let (code, what) = if field.is_system() {
            ("field.system_readonly", "system")
        } else {
            ("field.computed_readonly", "computed")
        };

        Err(Error::validation(
            code,
            format!("{what} field `{}` cannot be written", field.name()),
        ))
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(values) => values
            .iter()
            .filter(|value| !value.is_null())
            .map(stringify)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => map
            .get("title")
            .or_else(|| map.get("name"))
            .map(stringify)
            .unwrap_or_else(|| value.to_string()),
        value => value.to_string(),
    }
}

fn from_json<T: DeserializeOwned>(value: &Value) -> Result<T> {
    T::deserialize(value).map_err(|err| Error::validation("cell.invalid_shape", err.to_string()))
}

fn as_list(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(values) => values.iter().filter(|v| !v.is_null()).collect(),
        value => vec![value],
    }
}

impl Visit for SetValueVisitor<'_> {
    type Output = SetFieldValue;

    fn visit_single_line_text(
        &mut self,
        field: &Field,
        _: &SingleLineText,
    ) -> Result<SetFieldValue> {
        if self.value.is_null() {
            return self.clear(field);
        }
        self.text(field, false)
    }

    fn visit_long_text(&mut self, field: &Field, _: &LongText) -> Result<SetFieldValue> {
        if self.value.is_null() {
            return self.clear(field);
        }
        self.text(field, true)
    }

    fn visit_number(&mut self, field: &Field, _: &Number) -> Result<SetFieldValue> {
        match self.number(field)? {
            Some(n) => Ok(SetFieldValue::new(field, CellWrite::Number(n))),
            None => self.clear(field),
        }
    }

    fn visit_rating(&mut self, field: &Field, ty: &Rating) -> Result<SetFieldValue> {
        let Some(n) = self.number(field)? else {
            return self.clear(field);
        };

        let rating = if self.typecast() {
            // zero stars is no rating
            if n.round() == 0.0 {
                return self.clear(field);
            }
            ty.clamp(n)
        } else {
            ty.check(n)?
        };

        Ok(SetFieldValue::new(field, CellWrite::Number(f64::from(rating))))
    }

    fn visit_checkbox(&mut self, field: &Field, _: &Checkbox) -> Result<SetFieldValue> {
        let checked = match self.value {
            Value::Null => return self.clear(field),
            Value::Bool(b) => *b,
            Value::Number(n) if self.typecast() => n.as_f64().is_some_and(|n| n != 0.0),
            Value::String(s) if self.typecast() => matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "true" | "1" | "yes" | "y" | "checked"
            ),
            Value::Array(values) if self.typecast() => !values.is_empty(),
            _ => return Err(self.mismatch(field, "a boolean")),
        };

        Ok(SetFieldValue::new(field, CellWrite::Boolean(checked)))
    }

    fn visit_date(&mut self, field: &Field, ty: &Date) -> Result<SetFieldValue> {
        let time_zone = self.options.time_zone.as_deref().unwrap_or(ty.time_zone());

        let timestamp = match self.value {
            Value::Null => return self.clear(field),
            Value::String(s) if s.trim().is_empty() => return self.clear(field),
            Value::String(s) => parse_datetime(s, time_zone)?,
            Value::Number(n) if self.typecast() => {
                let millis = n.as_i64().ok_or_else(|| self.mismatch(field, "a date"))?;
                Timestamp::from_millisecond(millis)?
            }
            _ => return Err(self.mismatch(field, "a date string")),
        };

        Ok(SetFieldValue::new(field, CellWrite::DateTime(timestamp)))
    }

    fn visit_attachment(&mut self, field: &Field, _: &Attachment) -> Result<SetFieldValue> {
        let items = match self.value {
            Value::Null => return self.clear(field),
            Value::Array(_) => from_json::<Vec<AttachmentItem>>(self.value)?,
            Value::Object(_) if self.typecast() => vec![from_json(self.value)?],
            _ => return Err(self.mismatch(field, "a list of attachments")),
        };

        if items.is_empty() {
            return self.clear(field);
        }

        Ok(SetFieldValue::new(field, CellWrite::Attachments(items)))
    }

    fn visit_user(&mut self, field: &Field, ty: &User) -> Result<SetFieldValue> {
        let items = match self.value {
            Value::Null => return self.clear(field),
            Value::Array(_) if !ty.is_multiple() && !self.typecast() => {
                return Err(self.mismatch(field, "a single user"))
            }
            Value::Object(_) if ty.is_multiple() && !self.typecast() => {
                return Err(self.mismatch(field, "a list of users"))
            }
            value => as_list(value)
                .into_iter()
                .map(|value| self.user_item(field, value))
                .collect::<Result<Vec<_>>>()?,
        };

        let items = self.single(field, items, ty.is_multiple())?;

        if items.is_empty() {
            return self.clear(field);
        }

        Ok(SetFieldValue::new(field, CellWrite::Users(items)))
    }

    fn visit_single_select(&mut self, field: &Field, ty: &SingleSelect) -> Result<SetFieldValue> {
        let inputs = match self.value {
            Value::Null => return self.clear(field),
            Value::String(s) => vec![s.clone()],
            _ if self.typecast() => self.strings(field)?,
            _ => return Err(self.mismatch(field, "a choice")),
        };

        let inputs = self.single(field, inputs, false)?;
        let (mut names, new_choices) = self.choices(field, &ty.options, inputs)?;

        let Some(name) = names.pop() else {
            return self.clear(field);
        };

        Ok(SetFieldValue {
            new_choices,
            ..SetFieldValue::new(field, CellWrite::Choice(name))
        })
    }

    fn visit_multiple_select(
        &mut self,
        field: &Field,
        ty: &MultipleSelect,
    ) -> Result<SetFieldValue> {
        let inputs = match self.value {
            Value::Null => return self.clear(field),
            Value::Array(_) => self.strings(field)?,
            _ if self.typecast() => self.strings(field)?,
            _ => return Err(self.mismatch(field, "a list of choices")),
        };

        let (names, new_choices) = self.choices(field, &ty.options, inputs)?;

        if names.is_empty() {
            return self.clear(field);
        }

        Ok(SetFieldValue {
            new_choices,
            ..SetFieldValue::new(field, CellWrite::Choices(names))
        })
    }

    fn visit_formula(&mut self, field: &Field, _: &Formula) -> Result<SetFieldValue> {
        self.computed(field)
    }

    fn visit_button(&mut self, field: &Field, _: &Button) -> Result<SetFieldValue> {
        Ok(SetFieldValue::new(field, CellWrite::Noop))
    }

    fn visit_created_time(&mut self, field: &Field, _: &CreatedTime) -> Result<SetFieldValue> {
        self.computed(field)
    }

    fn visit_last_modified_time(
        &mut self,
        field: &Field,
        _: &LastModifiedTime,
    ) -> Result<SetFieldValue> {
        self.computed(field)
    }

    fn visit_created_by(&mut self, field: &Field, _: &CreatedBy) -> Result<SetFieldValue> {
        self.computed(field)
    }

    fn visit_last_modified_by(
        &mut self,
        field: &Field,
        _: &LastModifiedBy,
    ) -> Result<SetFieldValue> {
        self.computed(field)
    }

    fn visit_auto_number(&mut self, field: &Field, _: &AutoNumber) -> Result<SetFieldValue> {
        self.computed(field)
    }

    fn visit_link(&mut self, field: &Field, ty: &Link) -> Result<SetFieldValue> {
        let refs = match self.value {
            Value::Null => return self.clear(field),
            Value::Array(_) if !ty.is_multiple() && !self.typecast() => {
                return Err(self.mismatch(field, "a single linked record"))
            }
            Value::String(s) if self.typecast() && ty.is_multiple() => s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| self.link_ref(field, &Value::String(s.to_string())))
                .collect::<Result<Vec<_>>>()?,
            value => as_list(value)
                .into_iter()
                .map(|value| self.link_ref(field, value))
                .collect::<Result<Vec<_>>>()?,
        };

        let refs = self.single(field, refs, ty.is_multiple())?;

        if refs.is_empty() {
            return self.clear(field);
        }

        Ok(SetFieldValue::new(field, CellWrite::Links(refs)))
    }

    fn visit_lookup(&mut self, field: &Field, _: &Lookup) -> Result<SetFieldValue> {
        self.computed(field)
    }

    fn visit_rollup(&mut self, field: &Field, _: &Rollup) -> Result<SetFieldValue> {
        self.computed(field)
    }

    fn visit_conditional_lookup(
        &mut self,
        field: &Field,
        _: &ConditionalLookup,
    ) -> Result<SetFieldValue> {
        self.computed(field)
    }

    fn visit_conditional_rollup(
        &mut self,
        field: &Field,
        _: &ConditionalRollup,
    ) -> Result<SetFieldValue> {
        self.computed(field)
    }
}

impl Field {
    /// Converts raw input for this field into a typed write.
    pub fn set_value(&self, value: &Value, options: &ConvertOptions) -> Result<SetFieldValue> {
        self.accept(&mut SetValueVisitor::new(value, options))
    }
}
