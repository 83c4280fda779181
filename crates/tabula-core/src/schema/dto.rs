use super::field::{
    Aggregate, Attachment, AutoNumber, Button, Checkbox, ConditionalLookup, ConditionalRollup,
    CreatedBy, CreatedTime, Date, Formula, LastModifiedBy, LastModifiedTime, Link, LongText,
    Lookup, MultipleSelect, Number, Rating, Rollup, RollupFunction, SingleLineText,
    SingleSelect, User,
};
use super::{
    CellValueType, DatetimeFormatting, DbFieldName, DbFieldType, Field, FieldId, FieldKind,
    FieldName, FieldTy, FieldValueType, Formatting, ShowAs,
};
use crate::{Error, Result};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

/// Persistence-neutral record of a field.
///
/// `options` holds the variant configuration. Lookups and rollups keep the
/// address of the foreign field in `lookupOptions`. The value shape is
/// stored for derived fields so they can be read before resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDto {
    pub id: FieldId,

    pub name: FieldName,

    #[serde(rename = "type")]
    pub kind: FieldKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub options: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup_options: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_value_type: Option<CellValueType>,

    #[serde(
        default,
        rename = "isMultipleCellValue",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_multiple: Option<bool>,

    #[serde(default)]
    pub not_null: bool,

    #[serde(default)]
    pub unique: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_field_name: Option<DbFieldName>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_field_type: Option<DbFieldType>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<FieldId>,

    /// Read-only. Ignored when restoring.
    #[serde(default)]
    pub is_computed: bool,

    /// Read-only. Ignored when restoring.
    #[serde(default)]
    pub is_pending: bool,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FormulaOptions {
    expression: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    formatting: Option<Formatting>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    show_as: Option<ShowAs>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AggregateOptions {
    expression: RollupFunction,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    formatting: Option<Formatting>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    show_as: Option<ShowAs>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimeOptions {
    #[serde(default)]
    formatting: DatetimeFormatting,
}

impl AggregateOptions {
    fn from_aggregate(aggregate: &Aggregate) -> AggregateOptions {
        AggregateOptions {
            expression: aggregate.function(),
            formatting: aggregate.formatting().cloned(),
            show_as: aggregate.show_as().cloned(),
        }
    }

    fn into_aggregate(self, result_type: Option<FieldValueType>) -> Aggregate {
        Aggregate::rehydrate(self.expression, result_type, self.formatting, self.show_as)
    }
}

impl Field {
    pub fn to_dto(&self) -> Result<FieldDto> {
        let mut lookup_options = None;

        let options = match self.ty() {
            FieldTy::SingleLineText(ty) => to_value(&ty.options)?,
            FieldTy::LongText(ty) => to_value(&ty.options)?,
            FieldTy::Number(ty) => to_value(&ty.options)?,
            FieldTy::Rating(ty) => to_value(ty.options())?,
            FieldTy::Checkbox(ty) => to_value(&ty.options)?,
            FieldTy::Date(ty) => to_value(&ty.options)?,
            FieldTy::User(ty) => to_value(&ty.options)?,
            FieldTy::SingleSelect(ty) => to_value(&ty.options)?,
            FieldTy::MultipleSelect(ty) => to_value(&ty.options)?,
            FieldTy::Button(ty) => to_value(&ty.options)?,
            FieldTy::Formula(ty) => to_value(&FormulaOptions {
                expression: ty.expression.clone(),
                formatting: ty.formatting.clone(),
                show_as: ty.show_as.clone(),
            })?,
            FieldTy::CreatedTime(ty) => to_value(&TimeOptions {
                formatting: ty.formatting.clone(),
            })?,
            FieldTy::LastModifiedTime(ty) => to_value(&TimeOptions {
                formatting: ty.formatting.clone(),
            })?,
            FieldTy::Attachment(_)
            | FieldTy::CreatedBy(_)
            | FieldTy::LastModifiedBy(_)
            | FieldTy::AutoNumber(_) => Value::Object(Map::new()),
            FieldTy::Link(ty) => to_value(ty.config())?,
            FieldTy::Lookup(ty) => {
                lookup_options = Some(to_value(ty.options())?);
                Value::Null
            }
            FieldTy::Rollup(ty) => {
                lookup_options = Some(to_value(ty.config())?);
                to_value(&AggregateOptions::from_aggregate(ty.aggregate()))?
            }
            FieldTy::ConditionalLookup(ty) => to_value(ty.options())?,
            FieldTy::ConditionalRollup(ty) => {
                lookup_options = Some(to_value(ty.config())?);
                to_value(&AggregateOptions::from_aggregate(ty.aggregate()))?
            }
        };

        let value_type = self.value_type().ok();

        let is_multiple = match self.ty() {
            FieldTy::Lookup(lookup) => lookup.is_multiple_override(),
            _ => value_type.map(|value_type| value_type.is_multiple),
        };

        Ok(FieldDto {
            id: self.id().clone(),
            name: self.name().clone(),
            kind: self.kind(),
            description: self.description().map(str::to_string),
            options,
            lookup_options,
            cell_value_type: value_type.map(|value_type| value_type.cell_value_type),
            is_multiple,
            not_null: self.not_null(),
            unique: self.unique(),
            db_field_name: self.db_field_name().cloned(),
            db_field_type: self.db_field_type(),
            dependencies: self.dependencies().to_vec(),
            is_computed: self.is_computed(),
            is_pending: self.is_pending(),
        })
    }

    /// Restores a field from its persisted record.
    ///
    /// Cross-table fields come back pending, except rollups whose result
    /// type was persisted.
    pub fn from_dto(dto: FieldDto) -> Result<Field> {
        let id = dto.id.clone();

        Self::from_dto_inner(dto).map_err(|err| err.context(err!("restoring field `{id}`")))
    }

    fn from_dto_inner(dto: FieldDto) -> Result<Field> {
        let id = dto.id.clone();
        let name = dto.name.clone();

        let mut field = match dto.kind {
            FieldKind::SingleLineText => SingleLineText::create(id, name, dto.options()?)?,
            FieldKind::LongText => LongText::create(id, name, dto.options()?)?,
            FieldKind::Number => Number::create(id, name, dto.options()?)?,
            FieldKind::Rating => Rating::create(id, name, dto.options()?)?,
            FieldKind::Checkbox => Checkbox::create(id, name, dto.options()?)?,
            FieldKind::Date => Date::create(id, name, dto.options()?)?,
            FieldKind::Attachment => Attachment::create(id, name)?,
            FieldKind::User => User::create(id, name, dto.options()?)?,
            FieldKind::SingleSelect => SingleSelect::create(id, name, dto.options()?)?,
            FieldKind::MultipleSelect => MultipleSelect::create(id, name, dto.options()?)?,
            FieldKind::Button => Button::create(id, name, dto.options()?)?,
            FieldKind::Formula => {
                let options: FormulaOptions = dto.options()?;
                Formula::create(
                    id,
                    name,
                    options.expression,
                    dto.result_type()?.ok_or_else(|| missing("cellValueType"))?,
                    options.formatting,
                    options.show_as,
                )?
            }
            FieldKind::CreatedTime => {
                let options: TimeOptions = dto.options()?;
                CreatedTime::create(id, name, options.formatting)?
            }
            FieldKind::LastModifiedTime => {
                let options: TimeOptions = dto.options()?;
                LastModifiedTime::create(id, name, options.formatting)?
            }
            FieldKind::CreatedBy => CreatedBy::create(id, name),
            FieldKind::LastModifiedBy => LastModifiedBy::create(id, name),
            FieldKind::AutoNumber => AutoNumber::create(id, name),
            FieldKind::Link => Link::create(id, name, dto.options()?)?,
            FieldKind::Lookup => {
                Lookup::rehydrate(id, name, dto.lookup_options()?, dto.is_multiple)?
            }
            FieldKind::Rollup => {
                let options: AggregateOptions = dto.options()?;
                let aggregate = options.into_aggregate(dto.result_type()?);
                Rollup::create_pending(id, name, dto.lookup_options()?, aggregate)?
            }
            FieldKind::ConditionalLookup => {
                ConditionalLookup::create_pending(id, name, dto.options()?)?
            }
            FieldKind::ConditionalRollup => {
                let options: AggregateOptions = dto.options()?;
                let aggregate = options.into_aggregate(dto.result_type()?);
                ConditionalRollup::create_pending(id, name, dto.lookup_options()?, aggregate)?
            }
        };

        field.set_description(dto.description);
        field.restore_flags(dto.not_null, dto.unique);

        if let Some(db_field_name) = dto.db_field_name {
            field.set_db_field_name(db_field_name)?;
        }

        if let Some(db_field_type) = dto.db_field_type {
            field.set_db_field_type(db_field_type)?;
        }

        if !dto.dependencies.is_empty() {
            field.set_dependencies(dto.dependencies)?;
        }

        Ok(field)
    }
}

impl FieldDto {
    fn options<T: DeserializeOwned>(&self) -> Result<T> {
        match &self.options {
            Value::Null => Ok(T::deserialize(Value::Object(Map::new()))?),
            options => Ok(T::deserialize(options)?),
        }
    }

    fn lookup_options<T: DeserializeOwned>(&self) -> Result<T> {
        let options = self
            .lookup_options
            .as_ref()
            .ok_or_else(|| missing("lookupOptions"))?;
        Ok(T::deserialize(options)?)
    }

    fn result_type(&self) -> Result<Option<FieldValueType>> {
        match (self.cell_value_type, self.is_multiple) {
            (Some(cell_value_type), Some(is_multiple)) => Ok(Some(FieldValueType {
                cell_value_type,
                is_multiple,
            })),
            (Some(cell_value_type), None) => Ok(Some(FieldValueType::single(cell_value_type))),
            (None, _) => Ok(None),
        }
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn missing(key: &str) -> Error {
    Error::validation("dto.malformed", format!("missing `{key}`"))
}
