use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::util::ids::fresh_id;

/// Property-bag key holding a task's tag list.
pub const TAGS_PROPERTY: &str = "tags";
/// Property-bag key holding a task's due date (`YYYY-MM-DD` text).
pub const DUE_DATE_PROPERTY: &str = "dueDate";

/// A single value in a task's property bag.
///
/// Values are untyped at this level: the schema in [`TaskProperty`] describes
/// expected shapes but is never enforced on writes. Untagged so persisted JSON
/// strings, string arrays, numbers, and booleans all round-trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    List(Vec<String>),
    Number(f64),
    Flag(bool),
}

impl PropertyValue {
    /// Category-filter match: list values match by membership, everything
    /// else by equality.
    pub fn matches(&self, expected: &PropertyValue) -> bool {
        match (self, expected) {
            (PropertyValue::List(items), PropertyValue::Text(want)) => {
                items.iter().any(|item| item == want)
            }
            (a, b) => a == b,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Kind tag for a property schema entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    Select,
    Multiselect,
    Date,
    Text,
    Number,
}

/// Schema descriptor for one property kind (status, priority, tags, ...).
/// Describes what values are expected; task bags are never validated
/// against it on write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskProperty {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

/// A task in the flat document sequence.
///
/// Position in the sequence is document order; `parent_id` layers a
/// hierarchy on top of it. A `parent_id` that references no existing task
/// degrades to root display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub properties: IndexMap<String, PropertyValue>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a new root task with a fresh id and timestamps.
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Task {
            id: fresh_id(),
            title: title.into(),
            description: None,
            parent_id: None,
            properties: IndexMap::new(),
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// The task's tag list, if the bag holds one.
    pub fn tags(&self) -> Option<&Vec<String>> {
        match self.properties.get(TAGS_PROPERTY) {
            Some(PropertyValue::List(tags)) => Some(tags),
            _ => None,
        }
    }

    /// The task's due date text, if set.
    pub fn due_date(&self) -> Option<&str> {
        self.properties.get(DUE_DATE_PROPERTY).and_then(|v| v.as_text())
    }
}
