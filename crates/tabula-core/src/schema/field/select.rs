use super::Field;
use crate::schema::{ChoiceId, Color, FieldId, FieldName};
use crate::{Error, Result};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub id: ChoiceId,
    pub name: String,
    pub color: Color,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectOptions {
    pub choices: Vec<Choice>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Vec<String>>,

    /// When set, writes naming unknown choices are rejected instead of
    /// growing the choice list.
    #[serde(default)]
    pub prevent_auto_new_options: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SingleSelect {
    pub options: SelectOptions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultipleSelect {
    pub options: SelectOptions,
}

impl Choice {
    pub fn new(name: impl Into<String>, color: Color) -> Choice {
        Choice {
            id: ChoiceId::generate(),
            name: name.into(),
            color,
        }
    }
}

impl SelectOptions {
    /// Builds options from bare names, assigning ids and cycling through the
    /// colour palette.
    pub fn from_names<I, S>(names: I) -> Result<SelectOptions>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options = SelectOptions {
            choices: names
                .into_iter()
                .enumerate()
                .map(|(i, name)| Choice::new(name, Color::nth(i)))
                .collect(),
            ..SelectOptions::default()
        };
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        for (i, choice) in self.choices.iter().enumerate() {
            if choice.name.trim().is_empty() {
                return Err(Error::validation(
                    "select.choice_name_empty",
                    "choice names cannot be empty",
                ));
            }

            if self.choices[..i].iter().any(|prev| prev.name == choice.name) {
                return Err(Error::validation(
                    "select.duplicate_choice_name",
                    format!("choice `{}` appears more than once", choice.name),
                ));
            }
        }

        if let Some(defaults) = &self.default_value {
            for name in defaults {
                if self.choice_by_name(name).is_none() {
                    return Err(Error::validation(
                        "select.default_not_a_choice",
                        format!("default `{name}` is not one of the choices"),
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn choice_by_name(&self, name: &str) -> Option<&Choice> {
        self.choices.iter().find(|choice| choice.name == name)
    }

    /// Appends choices for the given names, skipping names already present.
    /// Returns the names that were added.
    pub fn add_missing(&mut self, names: &[String]) -> Vec<String> {
        let mut added = vec![];

        for name in names {
            if self.choice_by_name(name).is_none() {
                let color = Color::nth(self.choices.len());
                self.choices.push(Choice::new(name.clone(), color));
                added.push(name.clone());
            }
        }

        added
    }
}

impl SingleSelect {
    pub fn create(id: FieldId, name: FieldName, options: SelectOptions) -> Result<Field> {
        options.validate()?;

        if options.default_value.as_ref().is_some_and(|d| d.len() > 1) {
            return Err(Error::validation(
                "select.single_default_multiple",
                "a single select takes at most one default choice",
            ));
        }

        Ok(Field::new(id, name, SingleSelect { options }))
    }
}

impl MultipleSelect {
    pub fn create(id: FieldId, name: FieldName, options: SelectOptions) -> Result<Field> {
        options.validate()?;
        Ok(Field::new(id, name, MultipleSelect { options }))
    }
}
