use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::category::{Category, CategoryFilter, CATEGORY_ALL, CATEGORY_COMPLETED, CATEGORY_URGENT};
use super::task::{PropertyKind, PropertyValue, Task, TaskProperty};

/// Format tag stamped on every saved snapshot.
pub const SNAPSHOT_VERSION: &str = "1.0.0";

/// Owner of the task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
}

impl Default for UserProfile {
    fn default() -> Self {
        UserProfile {
            name: "User".into(),
            email: "user@example.com".into(),
        }
    }
}

/// Which main view the client is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    List,
    Calendar,
    Settings,
    Help,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViewMode::List => "list",
            ViewMode::Calendar => "calendar",
            ViewMode::Settings => "settings",
            ViewMode::Help => "help",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list" => Ok(ViewMode::List),
            "calendar" => Ok(ViewMode::Calendar),
            "settings" => Ok(ViewMode::Settings),
            "help" => Ok(ViewMode::Help),
            other => Err(format!(
                "unknown view '{}' (expected list, calendar, settings, or help)",
                other
            )),
        }
    }
}

/// The full persisted application state. Unit of save, load, backup,
/// export, and import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub user: UserProfile,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub properties: Vec<TaskProperty>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub current_view: ViewMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_category: Option<String>,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Snapshot {
            user: UserProfile::default(),
            tasks: Vec::new(),
            properties: default_properties(),
            categories: default_categories(),
            current_view: ViewMode::List,
            current_category: Some(CATEGORY_ALL.to_string()),
            version: SNAPSHOT_VERSION.to_string(),
            last_modified: None,
        }
    }
}

impl Snapshot {
    /// The snapshot a fresh install starts from: example tasks, the default
    /// property schema, and the built-in categories.
    pub fn seeded() -> Self {
        Snapshot {
            user: UserProfile {
                name: "Lia".into(),
                email: "lia@example.com".into(),
            },
            tasks: seeded_tasks(),
            last_modified: Some(Utc::now()),
            ..Snapshot::default()
        }
    }
}

/// Partial update to a snapshot; unset fields keep their current value.
/// `current_category` carries a double Option so "set to none" is
/// expressible.
#[derive(Debug, Clone, Default)]
pub struct SnapshotPatch {
    pub user: Option<UserProfile>,
    pub tasks: Option<Vec<Task>>,
    pub properties: Option<Vec<TaskProperty>>,
    pub categories: Option<Vec<Category>>,
    pub current_view: Option<ViewMode>,
    pub current_category: Option<Option<String>>,
}

impl SnapshotPatch {
    /// Patch replacing every field, used by import.
    pub fn replace(snapshot: Snapshot) -> Self {
        SnapshotPatch {
            user: Some(snapshot.user),
            tasks: Some(snapshot.tasks),
            properties: Some(snapshot.properties),
            categories: Some(snapshot.categories),
            current_view: Some(snapshot.current_view),
            current_category: Some(snapshot.current_category),
        }
    }

    pub fn tasks(tasks: Vec<Task>) -> Self {
        SnapshotPatch {
            tasks: Some(tasks),
            ..SnapshotPatch::default()
        }
    }

    /// Fold a later patch into this one; the later patch wins per field.
    pub fn merge(&mut self, later: SnapshotPatch) {
        if later.user.is_some() {
            self.user = later.user;
        }
        if later.tasks.is_some() {
            self.tasks = later.tasks;
        }
        if later.properties.is_some() {
            self.properties = later.properties;
        }
        if later.categories.is_some() {
            self.categories = later.categories;
        }
        if later.current_view.is_some() {
            self.current_view = later.current_view;
        }
        if later.current_category.is_some() {
            self.current_category = later.current_category;
        }
    }

    /// Apply this patch onto a snapshot in place.
    pub fn apply(self, snapshot: &mut Snapshot) {
        if let Some(user) = self.user {
            snapshot.user = user;
        }
        if let Some(tasks) = self.tasks {
            snapshot.tasks = tasks;
        }
        if let Some(properties) = self.properties {
            snapshot.properties = properties;
        }
        if let Some(categories) = self.categories {
            snapshot.categories = categories;
        }
        if let Some(view) = self.current_view {
            snapshot.current_view = view;
        }
        if let Some(category) = self.current_category {
            snapshot.current_category = category;
        }
    }
}

/// Default property schema: status, priority, due date, tags.
pub fn default_properties() -> Vec<TaskProperty> {
    vec![
        TaskProperty {
            id: "status".into(),
            name: "Status".into(),
            kind: PropertyKind::Select,
            options: Some(vec![
                "Not Started".into(),
                "Completed".into(),
                "On Hold".into(),
            ]),
        },
        TaskProperty {
            id: "priority".into(),
            name: "Priority".into(),
            kind: PropertyKind::Select,
            options: Some(vec![
                "Low".into(),
                "Medium".into(),
                "High".into(),
                "Urgent".into(),
            ]),
        },
        TaskProperty {
            id: "dueDate".into(),
            name: "Due Date".into(),
            kind: PropertyKind::Date,
            options: None,
        },
        TaskProperty {
            id: "tags".into(),
            name: "Tags".into(),
            kind: PropertyKind::Multiselect,
            options: Some(vec![
                "Work".into(),
                "Personal".into(),
                "Project".into(),
                "Meeting".into(),
                "Research".into(),
            ]),
        },
    ]
}

/// Default categories: the implicit "all" plus the reserved urgent and
/// completed views.
pub fn default_categories() -> Vec<Category> {
    vec![
        Category {
            id: CATEGORY_ALL.into(),
            name: "All Tasks".into(),
            icon: None,
            filter: CategoryFilter::default(),
        },
        Category {
            id: CATEGORY_URGENT.into(),
            name: "Urgent".into(),
            icon: None,
            filter: CategoryFilter {
                property_id: Some("priority".into()),
                value: Some(PropertyValue::Text("Urgent".into())),
            },
        },
        Category {
            id: CATEGORY_COMPLETED.into(),
            name: "Completed".into(),
            icon: None,
            filter: CategoryFilter {
                property_id: Some("status".into()),
                value: Some(PropertyValue::Text("Completed".into())),
            },
        },
    ]
}

fn seed_date(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn seed_task(
    id: &str,
    title: &str,
    description: Option<&str>,
    parent_id: Option<&str>,
    properties: IndexMap<String, PropertyValue>,
    completed: bool,
    created: &str,
    updated: &str,
) -> Task {
    Task {
        id: id.into(),
        title: title.into(),
        description: description.map(String::from),
        parent_id: parent_id.map(String::from),
        properties,
        completed,
        created_at: seed_date(created),
        updated_at: seed_date(updated),
    }
}

fn seeded_tasks() -> Vec<Task> {
    let text = |s: &str| PropertyValue::Text(s.into());
    let list = |items: &[&str]| PropertyValue::List(items.iter().map(|s| s.to_string()).collect());

    vec![
        seed_task(
            "1",
            "Project Planning",
            Some("Plan the new project structure and timeline"),
            None,
            IndexMap::from([
                ("status".to_string(), text("Not Started")),
                ("priority".to_string(), text("High")),
                ("tags".to_string(), list(&["Work", "Project"])),
            ]),
            false,
            "2024-01-15T00:00:00Z",
            "2024-01-15T00:00:00Z",
        ),
        seed_task(
            "2",
            "Research competitors",
            Some("Analyze competitor features and pricing"),
            Some("1"),
            IndexMap::from([
                ("status".to_string(), text("Completed")),
                ("priority".to_string(), text("Medium")),
                ("tags".to_string(), list(&["Research"])),
            ]),
            true,
            "2024-01-16T00:00:00Z",
            "2024-01-18T00:00:00Z",
        ),
        seed_task(
            "3",
            "Create wireframes",
            None,
            Some("1"),
            IndexMap::from([
                ("status".to_string(), text("Not Started")),
                ("priority".to_string(), text("High")),
                ("dueDate".to_string(), text("2024-02-01")),
            ]),
            false,
            "2024-01-16T00:00:00Z",
            "2024-01-16T00:00:00Z",
        ),
        seed_task(
            "4",
            "Team Meeting",
            Some("Weekly sync with the development team"),
            None,
            IndexMap::from([
                ("status".to_string(), text("Not Started")),
                ("priority".to_string(), text("Medium")),
                ("tags".to_string(), list(&["Meeting", "Work"])),
                ("dueDate".to_string(), text("2024-01-25")),
            ]),
            false,
            "2024-01-20T00:00:00Z",
            "2024-01-20T00:00:00Z",
        ),
        seed_task(
            "5",
            "Personal workout plan",
            Some("Create a new fitness routine for the month"),
            None,
            IndexMap::from([
                ("status".to_string(), text("Not Started")),
                ("priority".to_string(), text("Low")),
                ("tags".to_string(), list(&["Personal"])),
            ]),
            false,
            "2024-01-22T00:00:00Z",
            "2024-01-22T00:00:00Z",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn seeded_snapshot_has_example_data() {
        let snapshot = Snapshot::seeded();
        assert_eq!(snapshot.tasks.len(), 5);
        assert_eq!(snapshot.properties.len(), 4);
        assert_eq!(snapshot.categories.len(), 3);
        assert_eq!(snapshot.current_category.as_deref(), Some(CATEGORY_ALL));
        // Subtasks reference the first example task
        assert_eq!(snapshot.tasks[1].parent_id.as_deref(), Some("1"));
        assert_eq!(snapshot.tasks[2].parent_id.as_deref(), Some("1"));
    }

    #[test]
    fn snapshot_serde_round_trip() {
        let snapshot = Snapshot::seeded();
        let json = serde_json::to_string_pretty(&snapshot).unwrap();
        assert!(json.contains("\"currentView\""));
        assert!(json.contains("\"lastModified\""));
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, back);
    }

    #[test]
    fn patch_merge_last_call_wins_per_field() {
        let mut patch = SnapshotPatch {
            tasks: Some(vec![Task::new("first")]),
            current_view: Some(ViewMode::Calendar),
            ..SnapshotPatch::default()
        };
        patch.merge(SnapshotPatch::tasks(vec![Task::new("second")]));

        let mut snapshot = Snapshot::default();
        patch.apply(&mut snapshot);
        assert_eq!(snapshot.tasks.len(), 1);
        assert_eq!(snapshot.tasks[0].title, "second");
        // Untouched by the later patch
        assert_eq!(snapshot.current_view, ViewMode::Calendar);
    }

    #[test]
    fn patch_can_clear_current_category() {
        let mut snapshot = Snapshot::default();
        assert!(snapshot.current_category.is_some());
        let patch = SnapshotPatch {
            current_category: Some(None),
            ..SnapshotPatch::default()
        };
        patch.apply(&mut snapshot);
        assert!(snapshot.current_category.is_none());
    }

    #[test]
    fn view_mode_parse_and_display() {
        assert_eq!("calendar".parse::<ViewMode>().unwrap(), ViewMode::Calendar);
        assert_eq!(ViewMode::Help.to_string(), "help");
        assert!("dashboard".parse::<ViewMode>().is_err());
    }
}
