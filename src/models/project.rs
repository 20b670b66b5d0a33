use serde::{Deserialize, Serialize};

use crate::error::CloError;
use crate::models::task::{list_as_string, FieldValue};

pub const PROJECT_FIELDS: [&str; 2] = ["Description", "Notes"];

pub const DEFAULT_PROJECT_STATE: &str = "None";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectField {
    Description,
    Notes,
    State,
}

impl ProjectField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Description => "description",
            Self::Notes => "notes",
            Self::State => "state",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub description: String,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default = "default_state")]
    pub state: String,
}

fn default_state() -> String {
    DEFAULT_PROJECT_STATE.to_string()
}

impl Project {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            notes: Vec::new(),
            state: default_state(),
        }
    }

    /// Notes accumulate; description and state are replaced.
    pub fn set(&mut self, field: ProjectField, value: FieldValue) -> Result<(), CloError> {
        match (field, value) {
            (ProjectField::Notes, FieldValue::One(note)) => self.notes.push(note),
            (ProjectField::Notes, FieldValue::Many(notes)) => self.notes.extend(notes),
            (ProjectField::Description, FieldValue::One(text)) => {
                if text.trim().is_empty() {
                    return Err(CloError::invalid_value("Project description cannot be empty"));
                }
                self.description = text;
            }
            (ProjectField::State, FieldValue::One(text)) => self.state = text,
            (field, FieldValue::Many(_)) => {
                return Err(CloError::invalid_value(format!(
                    "{} takes a single value",
                    field.as_str()
                )));
            }
        }
        Ok(())
    }

    /// Display values in [`PROJECT_FIELDS`] order.
    pub fn row(&self) -> Vec<String> {
        vec![self.description.clone(), list_as_string(&self.notes)]
    }
}
