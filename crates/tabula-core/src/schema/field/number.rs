use super::Field;
use crate::schema::{Color, FieldId, FieldName, NumberFormatting, SingleNumberShowAs};
use crate::{Error, Result};

use serde::{Deserialize, Serialize};

/// Bounds of the configurable rating scale.
const RATING_MAX: std::ops::RangeInclusive<u8> = 1..=10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberOptions {
    #[serde(default)]
    pub formatting: NumberFormatting,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_as: Option<SingleNumberShowAs>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RatingIcon {
    Star,
    Moon,
    Sun,
    Zap,
    Flame,
    Heart,
    Apple,
    ThumbUp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingOptions {
    pub icon: RatingIcon,
    pub color: Color,
    pub max: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Number {
    pub options: NumberOptions,
}

/// A whole number between 1 and a configured maximum.
#[derive(Debug, Clone, PartialEq)]
pub struct Rating {
    options: RatingOptions,
}

impl Number {
    pub fn create(id: FieldId, name: FieldName, options: NumberOptions) -> Result<Field> {
        options.formatting.validate()?;
        Ok(Field::new(id, name, Number { options }))
    }
}

impl RatingOptions {
    pub fn validate(&self) -> Result<()> {
        if !RATING_MAX.contains(&self.max) {
            return Err(Error::validation(
                "rating.max_out_of_range",
                format!(
                    "rating max {} is outside {}..={}",
                    self.max,
                    RATING_MAX.start(),
                    RATING_MAX.end()
                ),
            ));
        }
        Ok(())
    }
}

impl Default for RatingOptions {
    fn default() -> Self {
        Self {
            icon: RatingIcon::Star,
            color: Color::Yellow,
            max: 5,
        }
    }
}

impl Rating {
    pub fn create(id: FieldId, name: FieldName, options: RatingOptions) -> Result<Field> {
        options.validate()?;
        Ok(Field::new(id, name, Rating { options }))
    }

    pub fn options(&self) -> &RatingOptions {
        &self.options
    }

    pub fn max(&self) -> u8 {
        self.options.max
    }

    /// Checks a cell value against the configured scale.
    pub fn check(&self, value: f64) -> Result<u8> {
        if value.fract() != 0.0 || value < 1.0 || value > f64::from(self.max()) {
            return Err(Error::validation(
                "rating.out_of_range",
                format!("rating {value} is outside 1..={}", self.max()),
            ));
        }
        Ok(value as u8)
    }

    /// Rounds and clamps a loosely typed value onto the scale.
    pub fn clamp(&self, value: f64) -> u8 {
        value.round().clamp(1.0, f64::from(self.max())) as u8
    }
}
