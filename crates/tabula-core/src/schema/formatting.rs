use super::{CellValueType, FieldValueType};
use crate::{Error, Result};

use serde::{Deserialize, Serialize};

/// Maximum number of fraction digits a number can be formatted with.
const MAX_PRECISION: u8 = 5;

/// The closed palette used by select choices, rating icons and charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Color {
    Blue,
    Cyan,
    Gray,
    Green,
    Orange,
    Pink,
    Purple,
    Red,
    Teal,
    Yellow,
}

impl Color {
    pub const PALETTE: [Color; 10] = [
        Self::Blue,
        Self::Cyan,
        Self::Gray,
        Self::Green,
        Self::Orange,
        Self::Pink,
        Self::Purple,
        Self::Red,
        Self::Teal,
        Self::Yellow,
    ];

    /// Picks colours round-robin from the palette.
    pub fn nth(index: usize) -> Color {
        Self::PALETTE[index % Self::PALETTE.len()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NumberFormatting {
    Decimal { precision: u8 },
    Percent { precision: u8 },
    Currency { symbol: String, precision: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateFormat {
    #[serde(rename = "M/D/YYYY")]
    Us,
    #[serde(rename = "D/M/YYYY")]
    European,
    #[serde(rename = "YYYY/MM/DD")]
    Asian,
    #[serde(rename = "YYYY-MM-DD")]
    Iso,
    #[serde(rename = "YYYY-MM")]
    YearMonth,
    #[serde(rename = "MM-DD")]
    MonthDay,
    #[serde(rename = "YYYY")]
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeFormat {
    #[serde(rename = "HH:mm")]
    Hour24,
    #[serde(rename = "hh:mm A")]
    Hour12,
    #[serde(rename = "None")]
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatetimeFormatting {
    pub date: DateFormat,
    pub time: TimeFormat,
    pub time_zone: String,
}

/// Display formatting attached to number or date-valued fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Formatting {
    Number(NumberFormatting),
    Datetime(DatetimeFormatting),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextDisplay {
    Url,
    Email,
    Phone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SingleNumberDisplay {
    Bar,
    Ring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MultiNumberDisplay {
    Bar,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextShowAs {
    #[serde(rename = "type")]
    pub display: TextDisplay,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleNumberShowAs {
    #[serde(rename = "type")]
    pub display: SingleNumberDisplay,
    pub color: Color,
    pub show_value: bool,
    pub max_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiNumberShowAs {
    #[serde(rename = "type")]
    pub display: MultiNumberDisplay,
    pub color: Color,
}

/// How a cell is rendered. Each family only applies to fields with a
/// matching value shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShowAs {
    Text(TextShowAs),
    SingleNumber(SingleNumberShowAs),
    MultiNumber(MultiNumberShowAs),
}

impl NumberFormatting {
    pub const DEFAULT: NumberFormatting = NumberFormatting::Decimal { precision: 2 };

    pub fn precision(&self) -> u8 {
        match self {
            Self::Decimal { precision }
            | Self::Percent { precision }
            | Self::Currency { precision, .. } => *precision,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.precision() > MAX_PRECISION {
            return Err(Error::validation(
                "formatting.precision_out_of_range",
                format!(
                    "precision {} exceeds the maximum of {MAX_PRECISION}",
                    self.precision()
                ),
            ));
        }

        if let Self::Currency { symbol, .. } = self {
            if symbol.trim().is_empty() {
                return Err(Error::validation(
                    "formatting.currency_symbol_empty",
                    "currency formatting requires a symbol",
                ));
            }
        }

        Ok(())
    }
}

impl Default for NumberFormatting {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl DatetimeFormatting {
    pub fn validate(&self) -> Result<()> {
        jiff::tz::TimeZone::get(&self.time_zone).map_err(|err| {
            Error::validation(
                "formatting.time_zone_invalid",
                format!("unknown time zone `{}`: {err}", self.time_zone),
            )
        })?;
        Ok(())
    }
}

impl Default for DatetimeFormatting {
    fn default() -> Self {
        Self {
            date: DateFormat::Iso,
            time: TimeFormat::None,
            time_zone: "UTC".to_string(),
        }
    }
}

impl Formatting {
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Number(formatting) => formatting.validate(),
            Self::Datetime(formatting) => formatting.validate(),
        }
    }

    /// The formatting a field of the given cell-value type gets when none
    /// was supplied.
    pub fn default_for(cell_value_type: CellValueType) -> Option<Formatting> {
        match cell_value_type {
            CellValueType::Number => Some(Formatting::Number(NumberFormatting::default())),
            CellValueType::DateTime => Some(Formatting::Datetime(DatetimeFormatting::default())),
            CellValueType::String | CellValueType::Boolean => None,
        }
    }
}

/// Checks that `formatting` and `show_as` belong to families that apply to
/// values of `value_type`.
pub fn validate_result_options(
    value_type: FieldValueType,
    formatting: Option<&Formatting>,
    show_as: Option<&ShowAs>,
) -> Result<()> {
    if let Some(formatting) = formatting {
        let matches = matches!(
            (value_type.cell_value_type, formatting),
            (CellValueType::Number, Formatting::Number(_))
                | (CellValueType::DateTime, Formatting::Datetime(_))
        );

        if !matches {
            return Err(Error::validation(
                "formatting.mismatch",
                format!(
                    "formatting {formatting:?} does not apply to {:?} values",
                    value_type.cell_value_type
                ),
            ));
        }

        formatting.validate()?;
    }

    if let Some(show_as) = show_as {
        let matches = match (value_type.cell_value_type, show_as) {
            (CellValueType::String, ShowAs::Text(_)) => true,
            (CellValueType::Number, ShowAs::SingleNumber(_)) => !value_type.is_multiple,
            (CellValueType::Number, ShowAs::MultiNumber(_)) => value_type.is_multiple,
            _ => false,
        };

        if !matches {
            return Err(Error::validation(
                "show_as.mismatch",
                format!(
                    "show-as {show_as:?} does not apply to {:?} values (multiple: {})",
                    value_type.cell_value_type, value_type.is_multiple
                ),
            ));
        }
    }

    Ok(())
}
