use serde::{Deserialize, Serialize};

use super::task::{PropertyValue, Task};

/// Built-in category that shows every task.
pub const CATEGORY_ALL: &str = "all";
/// Conventionally reserved category id for urgent-priority tasks.
pub const CATEGORY_URGENT: &str = "urgent";
/// Conventionally reserved category id for completed tasks.
pub const CATEGORY_COMPLETED: &str = "completed";

/// Membership test for a category: the task's bag value at `property_id`
/// must equal (or, for list values, contain) `value`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<PropertyValue>,
}

/// A sidebar category grouping tasks by a property filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub filter: CategoryFilter,
}

impl Category {
    /// Whether `task` belongs to this category. A category without a
    /// property filter matches everything.
    pub fn matches(&self, task: &Task) -> bool {
        let Some(property_id) = &self.filter.property_id else {
            return true;
        };
        let Some(expected) = &self.filter.value else {
            return true;
        };
        task.properties
            .get(property_id)
            .is_some_and(|value| value.matches(expected))
    }
}
