use serde::Serialize;

use crate::model::category::Category;
use crate::model::task::{Task, TaskProperty};
use crate::ops::task_ops::IntegrityReport;
use crate::ops::tree::TaskNode;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: String,
    pub title: String,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct ListJson {
    pub category: String,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct CategoryJson {
    pub id: String,
    pub name: String,
    pub selected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Serialize)]
pub struct PropertyJson {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

#[derive(Serialize)]
pub struct StatsJson {
    pub tasks: usize,
    pub completed: usize,
    pub categories: usize,
    pub size_bytes: usize,
    pub backups: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

#[derive(Serialize)]
pub struct CheckJson {
    pub clean: bool,
    pub dangling: Vec<String>,
    pub cycles: Vec<String>,
}

#[derive(Serialize)]
pub struct AgendaEntryJson {
    pub due: String,
    pub tasks: Vec<TaskJson>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &Task) -> TaskJson {
    TaskJson {
        id: task.id.clone(),
        title: task.title.clone(),
        completed: task.completed,
        description: task.description.clone(),
        tags: task.tags().cloned().unwrap_or_default(),
        due: task.due_date().map(String::from),
        subtasks: Vec::new(),
    }
}

pub fn node_to_json(node: &TaskNode) -> TaskJson {
    let mut json = task_to_json(&node.task);
    json.subtasks = node.children.iter().map(node_to_json).collect();
    json
}

pub fn category_to_json(category: &Category, selected: Option<&str>) -> CategoryJson {
    CategoryJson {
        id: category.id.clone(),
        name: category.name.clone(),
        selected: selected == Some(category.id.as_str()),
        property: category.filter.property_id.clone(),
        value: category
            .filter
            .value
            .as_ref()
            .and_then(|v| v.as_text())
            .map(String::from),
    }
}

pub fn property_to_json(property: &TaskProperty) -> PropertyJson {
    PropertyJson {
        id: property.id.clone(),
        name: property.name.clone(),
        kind: format!("{:?}", property.kind).to_lowercase(),
        options: property.options.clone().unwrap_or_default(),
    }
}

pub fn check_to_json(report: &IntegrityReport) -> CheckJson {
    CheckJson {
        clean: report.is_clean(),
        dangling: report.dangling.clone(),
        cycles: report.cycles.clone(),
    }
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

/// One outline line: checkbox, title, then tags and due date when present.
pub fn format_task_line(task: &Task, level: usize) -> String {
    let mut line = format!(
        "{}[{}] {} ({})",
        "  ".repeat(level),
        if task.completed { "x" } else { " " },
        task.title,
        task.id,
    );
    if let Some(tags) = task.tags() {
        for tag in tags {
            line.push_str(&format!(" #{}", tag));
        }
    }
    if let Some(due) = task.due_date() {
        line.push_str(&format!(" due:{}", due));
    }
    line
}

pub fn print_forest(nodes: &[TaskNode], level: usize) {
    for node in nodes {
        println!("{}", format_task_line(&node.task, level));
        print_forest(&node.children, level + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::PropertyValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn task_line_includes_tags_and_due() {
        let mut task = Task::new("Ship it");
        task.id = "9".into();
        task.completed = true;
        task.properties.insert(
            "tags".into(),
            PropertyValue::List(vec!["Work".into(), "Project".into()]),
        );
        task.properties
            .insert("dueDate".into(), PropertyValue::Text("2024-02-01".into()));

        assert_eq!(
            format_task_line(&task, 1),
            "  [x] Ship it (9) #Work #Project due:2024-02-01"
        );
    }

    #[test]
    fn json_tree_nests_subtasks() {
        let parent = Task::new("parent");
        let child = Task::new("child");
        let node = TaskNode {
            task: parent,
            children: vec![TaskNode {
                task: child,
                children: Vec::new(),
            }],
        };
        let json = node_to_json(&node);
        assert_eq!(json.subtasks.len(), 1);
        assert_eq!(json.subtasks[0].title, "child");
    }
}
