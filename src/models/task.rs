use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::CloError;

/// Column headers for a task row, in the order produced by [`Task::row`].
pub const TASK_FIELDS: [&str; 9] = [
    "Description",
    "Priority",
    "Created",
    "Due",
    "Blocked",
    "Time estimate",
    "Time Spent",
    "Projects",
    "Contexts",
];

pub const DEFAULT_PRIORITY: i32 = 3;

const DATE_DISPLAY: &str = "%a %d %b %Y";
const DATE_INPUTS: [&str; 4] = ["%d %b %y", "%d %b %Y", "%Y-%m-%d", "%d/%m/%Y"];
const NONE: &str = "None";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    #[default]
    Open,
    Closed,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// The settable attributes of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Priority,
    Created,
    Due,
    BlockedUntil,
    TimeEstimate,
    TimeSpent,
    Projects,
    Contexts,
    State,
    Subtasks,
}

impl TaskField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Priority => "priority",
            Self::Created => "created",
            Self::Due => "due",
            Self::BlockedUntil => "blocked_until",
            Self::TimeEstimate => "time_estimate",
            Self::TimeSpent => "time_spent",
            Self::Projects => "projects",
            Self::Contexts => "contexts",
            Self::State => "state",
            Self::Subtasks => "subtasks",
        }
    }
}

/// A value handed to an attribute setter.
///
/// List attributes append a `One` and extend by a `Many`; they are never
/// replaced wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::One(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::One(s)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(v: Vec<String>) -> Self {
        Self::Many(v)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    id: String,
    description: String,
    #[serde(default = "default_priority")]
    priority: i32,
    #[serde(default)]
    created: Option<NaiveDateTime>,
    #[serde(default)]
    due: Option<NaiveDateTime>,
    #[serde(default)]
    blocked_until: Vec<String>,
    #[serde(default)]
    time_estimate: Option<String>,
    #[serde(default)]
    time_spent: Option<String>,
    #[serde(default)]
    projects: Vec<String>,
    #[serde(default)]
    contexts: Vec<String>,
    #[serde(default)]
    state: TaskState,
    #[serde(default)]
    subtasks: Vec<String>,
}

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

impl Task {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            description: description.into(),
            priority: DEFAULT_PRIORITY,
            created: Some(Local::now().naive_local()),
            due: None,
            blocked_until: Vec::new(),
            time_estimate: None,
            time_spent: None,
            projects: Vec::new(),
            contexts: Vec::new(),
            state: TaskState::Open,
            subtasks: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn created(&self) -> Option<NaiveDateTime> {
        self.created
    }

    pub fn due(&self) -> Option<NaiveDateTime> {
        self.due
    }

    pub fn blocked_until(&self) -> &[String] {
        &self.blocked_until
    }

    pub fn time_estimate(&self) -> Option<&str> {
        self.time_estimate.as_deref()
    }

    pub fn time_spent(&self) -> Option<&str> {
        self.time_spent.as_deref()
    }

    pub fn projects(&self) -> &[String] {
        &self.projects
    }

    pub fn contexts(&self) -> &[String] {
        &self.contexts
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == TaskState::Open
    }

    pub fn subtasks(&self) -> &[String] {
        &self.subtasks
    }

    /// Assign `value` to `field`.
    ///
    /// A rejected value leaves the task untouched. An unparseable date is
    /// not an error: the date is cleared and a notice is returned for the
    /// user. A state outside `open`/`closed` is ignored.
    pub fn set(&mut self, field: TaskField, value: FieldValue) -> Result<Option<String>, CloError> {
        match field {
            TaskField::Priority => {
                let raw = single(field, value)?;
                self.priority = raw.trim().parse().map_err(|_| {
                    CloError::invalid_value(format!("Priority must be a whole number, got '{raw}'"))
                })?;
            }
            TaskField::Created => return Ok(assign_date(&mut self.created, &single(field, value)?)),
            TaskField::Due => return Ok(assign_date(&mut self.due, &single(field, value)?)),
            TaskField::TimeEstimate => self.time_estimate = optional_text(single(field, value)?),
            TaskField::TimeSpent => self.time_spent = optional_text(single(field, value)?),
            TaskField::BlockedUntil => extend(&mut self.blocked_until, value),
            TaskField::Projects => extend(&mut self.projects, value),
            TaskField::Contexts => extend(&mut self.contexts, value),
            TaskField::Subtasks => extend(&mut self.subtasks, value),
            TaskField::State => {
                if let FieldValue::One(raw) = value {
                    if let Some(state) = TaskState::from_str(raw.trim()) {
                        self.state = state;
                    }
                }
            }
        }
        Ok(None)
    }

    pub fn remove_blocked_until(&mut self, value: &str) -> bool {
        remove_first(&mut self.blocked_until, value)
    }

    pub fn remove_project(&mut self, value: &str) -> bool {
        remove_first(&mut self.projects, value)
    }

    pub fn remove_context(&mut self, value: &str) -> bool {
        remove_first(&mut self.contexts, value)
    }

    pub fn remove_subtask(&mut self, id: &str) -> bool {
        remove_first(&mut self.subtasks, id)
    }

    /// Drop every reference to `id` from the subtask list.
    pub(crate) fn forget_subtask(&mut self, id: &str) {
        self.subtasks.retain(|s| s != id);
    }

    /// Display values in [`TASK_FIELDS`] order.
    pub fn row(&self) -> Vec<String> {
        vec![
            self.description.clone(),
            self.priority.to_string(),
            date_as_string(self.created),
            date_as_string(self.due),
            list_as_string(&self.blocked_until),
            self.time_estimate.clone().unwrap_or_else(|| NONE.to_string()),
            self.time_spent.clone().unwrap_or_else(|| NONE.to_string()),
            list_as_string(&self.projects),
            list_as_string(&self.contexts),
        ]
    }
}

fn single(field: TaskField, value: FieldValue) -> Result<String, CloError> {
    match value {
        FieldValue::One(s) => Ok(s),
        FieldValue::Many(_) => Err(CloError::invalid_value(format!(
            "{} takes a single value",
            field.as_str()
        ))),
    }
}

fn extend(list: &mut Vec<String>, value: FieldValue) {
    match value {
        FieldValue::One(s) => list.push(s),
        FieldValue::Many(v) => list.extend(v),
    }
}

fn remove_first(list: &mut Vec<String>, value: &str) -> bool {
    match list.iter().position(|s| s == value) {
        Some(pos) => {
            list.remove(pos);
            true
        }
        None => false,
    }
}

fn optional_text(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn assign_date(slot: &mut Option<NaiveDateTime>, raw: &str) -> Option<String> {
    *slot = parse_date(raw);
    if slot.is_none() {
        Some(format!("Value could not be parsed: '{}'", raw.trim()))
    } else {
        None
    }
}

/// Parse a user supplied date such as `05 Mar 24` or `2024-03-05`.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATE_INPUTS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn date_as_string(date: Option<NaiveDateTime>) -> String {
    match date {
        Some(d) => d.format(DATE_DISPLAY).to_string(),
        None => NONE.to_string(),
    }
}

pub fn list_as_string(list: &[String]) -> String {
    if list.is_empty() {
        NONE.to_string()
    } else {
        list.join(",")
    }
}
