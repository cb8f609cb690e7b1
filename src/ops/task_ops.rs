use std::collections::HashSet;

use chrono::Utc;
use indexmap::IndexMap;

use crate::model::task::{PropertyKind, PropertyValue, Task, TaskProperty, TAGS_PROPERTY};
use crate::ops::tree;
use crate::util::ids::fresh_id;

/// Fields for a new task; id and timestamps are assigned on insert.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub parent_id: Option<String>,
    pub properties: IndexMap<String, PropertyValue>,
    pub completed: bool,
}

impl TaskDraft {
    pub fn titled(title: impl Into<String>) -> Self {
        TaskDraft {
            title: title.into(),
            ..TaskDraft::default()
        }
    }
}

/// Field-wise update for [`update_task`]. `description` and `parent_id`
/// carry a double Option so "clear this field" is expressible.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub parent_id: Option<Option<String>>,
    pub completed: Option<bool>,
    pub properties: Option<IndexMap<String, PropertyValue>>,
}

fn materialize(draft: TaskDraft) -> Task {
    let now = Utc::now();
    Task {
        id: fresh_id(),
        title: draft.title,
        description: draft.description,
        parent_id: draft.parent_id,
        properties: draft.properties,
        completed: draft.completed,
        created_at: now,
        updated_at: now,
    }
}

/// Append a new task to the end of the sequence. Returns the created task.
pub fn add_task(tasks: &mut Vec<Task>, draft: TaskDraft) -> Task {
    let task = materialize(draft);
    tasks.push(task.clone());
    task
}

/// Splice a new task immediately after `after_id` and all of its transitive
/// descendants, so the anchor's subtree stays contiguous. Appends at the end
/// when the anchor is missing.
pub fn add_task_after(tasks: &mut Vec<Task>, draft: TaskDraft, after_id: &str) -> Task {
    let task = materialize(draft);
    let Some(anchor) = tasks.iter().position(|t| t.id == after_id) else {
        tasks.push(task.clone());
        return task;
    };

    let mut insert = anchor + 1;
    while insert < tasks.len() && is_descendant_of(tasks, &tasks[insert].id, after_id) {
        insert += 1;
    }
    tasks.insert(insert, task.clone());
    task
}

/// Whether `id`'s parent chain reaches `ancestor_id`.
///
/// The walk is capped at the sequence length so a corrupt parent cycle
/// terminates instead of spinning; a capped walk counts as "not a
/// descendant".
pub fn is_descendant_of(tasks: &[Task], id: &str, ancestor_id: &str) -> bool {
    let mut current = tasks.iter().find(|t| t.id == id);
    for _ in 0..tasks.len() {
        let Some(task) = current else {
            return false;
        };
        match task.parent_id.as_deref() {
            None => return false,
            Some(p) if p == ancestor_id => return true,
            Some(p) => current = tasks.iter().find(|t| t.id == p),
        }
    }
    false
}

/// Merge `patch` into the task matching `id` and refresh its
/// updated-timestamp. Returns false when no task matched.
pub fn update_task(tasks: &mut [Task], id: &str, patch: TaskPatch) -> bool {
    let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
        return false;
    };
    if let Some(title) = patch.title {
        task.title = title;
    }
    if let Some(description) = patch.description {
        task.description = description;
    }
    if let Some(parent_id) = patch.parent_id {
        task.parent_id = parent_id;
    }
    if let Some(completed) = patch.completed {
        task.completed = completed;
    }
    if let Some(properties) = patch.properties {
        task.properties = properties;
    }
    task.updated_at = Utc::now();
    true
}

/// Remove `id` and the closure of tasks whose parent chain reaches it.
///
/// The closure is a fixed point over a worklist rather than a top-down
/// recursion, because children may appear before or after their parent in
/// the flat sequence. Returns the number of tasks removed; removing an
/// absent id is a no-op.
pub fn delete_task(tasks: &mut Vec<Task>, id: &str) -> usize {
    let mut doomed: HashSet<String> = HashSet::new();
    doomed.insert(id.to_string());

    let mut grew = true;
    while grew {
        grew = false;
        for task in tasks.iter() {
            if let Some(parent) = &task.parent_id {
                if doomed.contains(parent) && !doomed.contains(&task.id) {
                    doomed.insert(task.id.clone());
                    grew = true;
                }
            }
        }
    }

    let before = tasks.len();
    tasks.retain(|t| !doomed.contains(&t.id));
    before - tasks.len()
}

/// Outline indent: reparent `id` to the nearest preceding task in document
/// order whose nesting level is at or above the task's own level. No-op on
/// the first row, on a missing id, or when the computed parent is already
/// the current one.
pub fn indent(tasks: &mut Vec<Task>, id: &str) -> bool {
    let rows = tree::flatten(&tree::build_tree(tasks, &|_| true));
    let Some(pos) = rows.iter().position(|r| r.task.id == id) else {
        return false;
    };
    if pos == 0 {
        return false;
    }
    let level = rows[pos].level;
    let Some(new_parent) = rows[..pos].iter().rev().find(|r| r.level <= level) else {
        return false;
    };
    if rows[pos].task.parent_id.as_deref() == Some(new_parent.task.id.as_str()) {
        return false;
    }
    let parent_id = new_parent.task.id.clone();
    update_task(
        tasks,
        id,
        TaskPatch {
            parent_id: Some(Some(parent_id)),
            ..TaskPatch::default()
        },
    )
}

/// Promote `id` one level: its parent becomes the grandparent, or root when
/// the parent has none. No-op for root tasks.
pub fn unindent(tasks: &mut Vec<Task>, id: &str) -> bool {
    let Some(parent_id) = tasks
        .iter()
        .find(|t| t.id == id)
        .and_then(|t| t.parent_id.clone())
    else {
        return false;
    };
    let grandparent = tasks
        .iter()
        .find(|t| t.id == parent_id)
        .and_then(|t| t.parent_id.clone());
    update_task(
        tasks,
        id,
        TaskPatch {
            parent_id: Some(grandparent),
            ..TaskPatch::default()
        },
    )
}

// ---------------------------------------------------------------------------
// Tag operations
// ---------------------------------------------------------------------------

/// Add a tag to a task's tag list (creating the list if needed).
pub fn add_tag(tasks: &mut [Task], id: &str, tag: &str) -> bool {
    let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
        return false;
    };
    let entry = task
        .properties
        .entry(TAGS_PROPERTY.to_string())
        .or_insert_with(|| PropertyValue::List(Vec::new()));
    // A scalar under "tags" is replaced by a proper list
    if !matches!(entry, PropertyValue::List(_)) {
        *entry = PropertyValue::List(Vec::new());
    }
    if let PropertyValue::List(tags) = entry {
        if tags.iter().any(|t| t == tag) {
            return false;
        }
        tags.push(tag.to_string());
    }
    task.updated_at = Utc::now();
    true
}

/// Remove a tag from a task's tag list.
pub fn remove_tag(tasks: &mut [Task], id: &str, tag: &str) -> bool {
    let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
        return false;
    };
    let Some(PropertyValue::List(tags)) = task.properties.get_mut(TAGS_PROPERTY) else {
        return false;
    };
    let before = tags.len();
    tags.retain(|t| t != tag);
    if tags.len() == before {
        return false;
    }
    task.updated_at = Utc::now();
    true
}

/// Distinct tags across all tasks, in first-seen document order.
pub fn all_tags(tasks: &[Task]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for task in tasks {
        if let Some(tags) = task.tags() {
            for tag in tags {
                if seen.insert(tag.clone()) {
                    out.push(tag.clone());
                }
            }
        }
    }
    out
}

/// Retire a tag option: remove it from the tags property schema and strip it
/// from every task's tag list, refreshing updated-timestamps on the tasks it
/// touched. Returns how many tasks changed.
pub fn delete_tag_option(tasks: &mut [Task], properties: &mut [TaskProperty], tag: &str) -> usize {
    if let Some(options) = properties
        .iter_mut()
        .find(|p| p.id == TAGS_PROPERTY)
        .and_then(|p| p.options.as_mut())
    {
        options.retain(|t| t != tag);
    }

    let mut touched = 0;
    for task in tasks.iter_mut() {
        if let Some(PropertyValue::List(tags)) = task.properties.get_mut(TAGS_PROPERTY) {
            let before = tags.len();
            tags.retain(|t| t != tag);
            if tags.len() != before {
                task.updated_at = Utc::now();
                touched += 1;
            }
        }
    }
    touched
}

/// Field-wise edit of a property schema entry; `None` fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct PropertyPatch {
    pub name: Option<String>,
    pub kind: Option<PropertyKind>,
    pub options: Option<Vec<String>>,
}

/// Merge `patch` into the schema entry with the given id. Returns false when
/// no entry matches.
pub fn update_property(properties: &mut [TaskProperty], id: &str, patch: PropertyPatch) -> bool {
    let Some(property) = properties.iter_mut().find(|p| p.id == id) else {
        return false;
    };
    if let Some(name) = patch.name {
        property.name = name;
    }
    if let Some(kind) = patch.kind {
        property.kind = kind;
    }
    if let Some(options) = patch.options {
        property.options = Some(options);
    }
    true
}

/// Append one option to a schema entry's allowed list, creating the list if
/// the entry has none. Returns false when the entry is missing or already
/// carries the option.
pub fn add_property_option(properties: &mut [TaskProperty], id: &str, option: &str) -> bool {
    let Some(property) = properties.iter_mut().find(|p| p.id == id) else {
        return false;
    };
    let options = property.options.get_or_insert_with(Vec::new);
    if options.iter().any(|o| o == option) {
        return false;
    }
    options.push(option.to_string());
    true
}

// ---------------------------------------------------------------------------
// Integrity check
// ---------------------------------------------------------------------------

/// Findings from a parent-link integrity pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegrityReport {
    /// Tasks whose parent id references no existing task.
    pub dangling: Vec<String>,
    /// Tasks whose parent chain never reaches a root within the task count.
    pub cycles: Vec<String>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.dangling.is_empty() && self.cycles.is_empty()
    }
}

/// Detect dangling parents and parent cycles. Nothing here repairs anything:
/// dangling parents already render as roots, and cycle members are reported
/// as corruption for the user to fix.
pub fn check_integrity(tasks: &[Task]) -> IntegrityReport {
    let ids: HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    let mut report = IntegrityReport::default();

    for task in tasks {
        let Some(parent) = task.parent_id.as_deref() else {
            continue;
        };
        if !ids.contains(parent) {
            report.dangling.push(task.id.clone());
            continue;
        }
        // Walk upward, bounded by the task count; running out of budget
        // without reaching a root or a dangling link means a cycle.
        let mut current = Some(task);
        let mut reached_end = false;
        for _ in 0..tasks.len() {
            match current.and_then(|t| t.parent_id.as_deref()) {
                None => {
                    reached_end = true;
                    break;
                }
                Some(p) => {
                    current = tasks.iter().find(|t| t.id == p);
                    if current.is_none() {
                        reached_end = true;
                        break;
                    }
                }
            }
        }
        if !reached_end {
            report.cycles.push(task.id.clone());
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    fn push(tasks: &mut Vec<Task>, id: &str, parent: Option<&str>) {
        let mut t = Task::new(format!("task {}", id));
        t.id = id.into();
        t.parent_id = parent.map(String::from);
        tasks.push(t);
    }

    // --- add ---

    #[test]
    fn add_task_appends_with_fresh_identity() {
        let mut tasks = Vec::new();
        let a = add_task(&mut tasks, TaskDraft::titled("A"));
        let b = add_task(&mut tasks, TaskDraft::titled("B"));
        assert_eq!(tasks.len(), 2);
        assert_ne!(a.id, b.id);
        assert_eq!(tasks[1].title, "B");
    }

    #[test]
    fn add_after_without_children_lands_immediately_after_anchor() {
        // addTask(A); addTaskAfter(B, A); addTaskAfter(C, A) => [A, C, B]
        let mut tasks = Vec::new();
        let a = add_task(&mut tasks, TaskDraft::titled("A"));
        add_task_after(&mut tasks, TaskDraft::titled("B"), &a.id);
        add_task_after(&mut tasks, TaskDraft::titled("C"), &a.id);
        let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "C", "B"]);
    }

    #[test]
    fn add_after_skips_entire_subtree() {
        let mut tasks = Vec::new();
        push(&mut tasks, "A", None);
        push(&mut tasks, "A1", Some("A"));
        push(&mut tasks, "A1a", Some("A1"));
        push(&mut tasks, "B", None);

        let new = add_task_after(&mut tasks, TaskDraft::titled("N"), "A");
        assert_eq!(ids(&tasks), vec!["A", "A1", "A1a", new.id.as_str(), "B"]);
    }

    #[test]
    fn add_after_missing_anchor_appends() {
        let mut tasks = Vec::new();
        push(&mut tasks, "A", None);
        let new = add_task_after(&mut tasks, TaskDraft::titled("N"), "ghost");
        assert_eq!(ids(&tasks), vec!["A", new.id.as_str()]);
    }

    #[test]
    fn add_after_tolerates_parent_cycle_among_followers() {
        let mut tasks = Vec::new();
        push(&mut tasks, "A", None);
        push(&mut tasks, "X", Some("Y"));
        push(&mut tasks, "Y", Some("X"));
        // Cycle members are not descendants of A; insertion lands right after A
        let new = add_task_after(&mut tasks, TaskDraft::titled("N"), "A");
        assert_eq!(ids(&tasks), vec!["A", new.id.as_str(), "X", "Y"]);
    }

    // --- descendant walk ---

    #[test]
    fn descendant_walk_handles_depth() {
        let mut tasks = Vec::new();
        push(&mut tasks, "A", None);
        push(&mut tasks, "B", Some("A"));
        push(&mut tasks, "C", Some("B"));
        push(&mut tasks, "D", Some("C"));
        assert!(is_descendant_of(&tasks, "D", "A"));
        assert!(is_descendant_of(&tasks, "C", "A"));
        assert!(!is_descendant_of(&tasks, "A", "D"));
    }

    #[test]
    fn descendant_walk_terminates_on_cycle() {
        let mut tasks = Vec::new();
        push(&mut tasks, "X", Some("Y"));
        push(&mut tasks, "Y", Some("X"));
        push(&mut tasks, "Z", None);
        assert!(!is_descendant_of(&tasks, "X", "Z"));
    }

    // --- update ---

    #[test]
    fn update_merges_fields_and_refreshes_timestamp() {
        let mut tasks = Vec::new();
        push(&mut tasks, "A", None);
        let before = tasks[0].updated_at;
        let changed = update_task(
            &mut tasks,
            "A",
            TaskPatch {
                title: Some("renamed".into()),
                completed: Some(true),
                ..TaskPatch::default()
            },
        );
        assert!(changed);
        assert_eq!(tasks[0].title, "renamed");
        assert!(tasks[0].completed);
        assert!(tasks[0].updated_at >= before);
    }

    #[test]
    fn update_missing_id_is_noop() {
        let mut tasks = Vec::new();
        push(&mut tasks, "A", None);
        let snapshot = tasks.clone();
        assert!(!update_task(&mut tasks, "ghost", TaskPatch::default()));
        assert_eq!(tasks, snapshot);
    }

    #[test]
    fn update_can_clear_description() {
        let mut tasks = Vec::new();
        push(&mut tasks, "A", None);
        tasks[0].description = Some("old".into());
        update_task(
            &mut tasks,
            "A",
            TaskPatch {
                description: Some(None),
                ..TaskPatch::default()
            },
        );
        assert!(tasks[0].description.is_none());
    }

    // --- delete ---

    #[test]
    fn delete_removes_exact_descendant_closure() {
        let mut tasks = Vec::new();
        // C1 appears before its parent C in the flat sequence
        push(&mut tasks, "C1", Some("C"));
        push(&mut tasks, "A", None);
        push(&mut tasks, "B", Some("A"));
        push(&mut tasks, "C", Some("A"));
        push(&mut tasks, "D", None);

        let removed = delete_task(&mut tasks, "A");
        assert_eq!(removed, 4);
        assert_eq!(ids(&tasks), vec!["D"]);
    }

    #[test]
    fn delete_is_idempotent() {
        let mut tasks = Vec::new();
        push(&mut tasks, "A", None);
        assert_eq!(delete_task(&mut tasks, "A"), 1);
        assert_eq!(delete_task(&mut tasks, "A"), 0);
        assert!(tasks.is_empty());
    }

    #[test]
    fn delete_leaf_keeps_siblings() {
        let mut tasks = Vec::new();
        push(&mut tasks, "A", None);
        push(&mut tasks, "B", Some("A"));
        push(&mut tasks, "C", Some("A"));
        assert_eq!(delete_task(&mut tasks, "B"), 1);
        assert_eq!(ids(&tasks), vec!["A", "C"]);
    }

    // --- indent / unindent ---

    #[test]
    fn indent_reparents_to_preceding_sibling() {
        let mut tasks = Vec::new();
        push(&mut tasks, "A", None);
        push(&mut tasks, "B", None);
        assert!(indent(&mut tasks, "B"));
        assert_eq!(tasks[1].parent_id.as_deref(), Some("A"));
    }

    #[test]
    fn indent_on_first_row_is_noop() {
        let mut tasks = Vec::new();
        push(&mut tasks, "A", None);
        push(&mut tasks, "B", None);
        assert!(!indent(&mut tasks, "A"));
        assert!(tasks[0].parent_id.is_none());
    }

    #[test]
    fn indent_skips_over_deeper_rows() {
        // Outline: A, A1 (child), B. Indenting B goes under A (level <= 0),
        // not under the deeper A1.
        let mut tasks = Vec::new();
        push(&mut tasks, "A", None);
        push(&mut tasks, "A1", Some("A"));
        push(&mut tasks, "B", None);
        assert!(indent(&mut tasks, "B"));
        assert_eq!(tasks[2].parent_id.as_deref(), Some("A"));
    }

    #[test]
    fn unindent_promotes_to_grandparent() {
        let mut tasks = Vec::new();
        push(&mut tasks, "A", None);
        push(&mut tasks, "B", Some("A"));
        push(&mut tasks, "C", Some("B"));
        assert!(unindent(&mut tasks, "C"));
        assert_eq!(tasks[2].parent_id.as_deref(), Some("A"));
        assert!(unindent(&mut tasks, "C"));
        assert!(tasks[2].parent_id.is_none());
    }

    #[test]
    fn unindent_root_is_noop() {
        let mut tasks = Vec::new();
        push(&mut tasks, "A", None);
        assert!(!unindent(&mut tasks, "A"));
    }

    #[test]
    fn indent_then_unindent_restores_parent() {
        let mut tasks = Vec::new();
        push(&mut tasks, "P", None);
        push(&mut tasks, "S", Some("P"));
        push(&mut tasks, "T", Some("P"));

        assert!(indent(&mut tasks, "T"));
        assert_eq!(tasks[2].parent_id.as_deref(), Some("S"));
        assert!(unindent(&mut tasks, "T"));
        assert_eq!(tasks[2].parent_id.as_deref(), Some("P"));
    }

    // --- tags ---

    #[test]
    fn add_and_remove_tag() {
        let mut tasks = Vec::new();
        push(&mut tasks, "A", None);
        assert!(add_tag(&mut tasks, "A", "Work"));
        assert!(!add_tag(&mut tasks, "A", "Work")); // already present
        assert_eq!(tasks[0].tags().unwrap(), &vec!["Work".to_string()]);

        assert!(remove_tag(&mut tasks, "A", "Work"));
        assert!(!remove_tag(&mut tasks, "A", "Work"));
        assert!(tasks[0].tags().unwrap().is_empty());
    }

    #[test]
    fn all_tags_deduplicates_in_document_order() {
        let mut tasks = Vec::new();
        push(&mut tasks, "A", None);
        push(&mut tasks, "B", None);
        add_tag(&mut tasks, "A", "Work");
        add_tag(&mut tasks, "A", "Project");
        add_tag(&mut tasks, "B", "Work");
        assert_eq!(all_tags(&tasks), vec!["Work", "Project"]);
    }

    #[test]
    fn delete_tag_option_strips_schema_and_tasks() {
        let mut tasks = Vec::new();
        push(&mut tasks, "A", None);
        push(&mut tasks, "B", None);
        add_tag(&mut tasks, "A", "Stale");
        add_tag(&mut tasks, "B", "Keep");

        let mut properties = crate::model::snapshot::default_properties();
        if let Some(p) = properties.iter_mut().find(|p| p.id == TAGS_PROPERTY) {
            p.options.get_or_insert_with(Vec::new).push("Stale".into());
        }

        let touched = delete_tag_option(&mut tasks, &mut properties, "Stale");
        assert_eq!(touched, 1);
        assert!(tasks[0].tags().unwrap().is_empty());
        assert_eq!(tasks[1].tags().unwrap(), &vec!["Keep".to_string()]);
        let options = properties
            .iter()
            .find(|p| p.id == TAGS_PROPERTY)
            .and_then(|p| p.options.as_ref())
            .unwrap();
        assert!(!options.iter().any(|o| o == "Stale"));
    }

    #[test]
    fn update_property_merges_only_given_fields() {
        let mut properties = crate::model::snapshot::default_properties();

        let changed = update_property(
            &mut properties,
            TAGS_PROPERTY,
            PropertyPatch {
                name: Some("Labels".to_string()),
                ..PropertyPatch::default()
            },
        );
        assert!(changed);

        let tags = properties.iter().find(|p| p.id == TAGS_PROPERTY).unwrap();
        assert_eq!(tags.name, "Labels");
        // untouched fields survive
        assert_eq!(tags.kind, PropertyKind::Multiselect);
        assert!(tags.options.as_ref().unwrap().iter().any(|o| o == "Work"));

        assert!(!update_property(
            &mut properties,
            "ghost",
            PropertyPatch::default()
        ));
    }

    #[test]
    fn add_property_option_appends_without_duplicating() {
        let mut properties = crate::model::snapshot::default_properties();

        assert!(add_property_option(&mut properties, TAGS_PROPERTY, "Errand"));
        assert!(!add_property_option(&mut properties, TAGS_PROPERTY, "Errand"));
        assert!(!add_property_option(&mut properties, "ghost", "Errand"));

        let options = properties
            .iter()
            .find(|p| p.id == TAGS_PROPERTY)
            .and_then(|p| p.options.as_ref())
            .unwrap();
        assert_eq!(options.iter().filter(|o| *o == "Errand").count(), 1);

        // restoring the option undoes a retirement
        let mut tasks = Vec::new();
        delete_tag_option(&mut tasks, &mut properties, "Errand");
        assert!(add_property_option(&mut properties, TAGS_PROPERTY, "Errand"));
    }

    #[test]
    fn add_property_option_creates_missing_option_list() {
        let mut properties = vec![TaskProperty {
            id: "status".to_string(),
            name: "Status".to_string(),
            kind: PropertyKind::Select,
            options: None,
        }];
        assert!(add_property_option(&mut properties, "status", "Blocked"));
        assert_eq!(
            properties[0].options.as_ref().unwrap(),
            &vec!["Blocked".to_string()]
        );
    }

    // --- integrity ---

    #[test]
    fn check_integrity_reports_dangling_and_cycles() {
        let mut tasks = Vec::new();
        push(&mut tasks, "A", None);
        push(&mut tasks, "B", Some("ghost"));
        push(&mut tasks, "X", Some("Y"));
        push(&mut tasks, "Y", Some("X"));

        let report = check_integrity(&tasks);
        assert_eq!(report.dangling, vec!["B"]);
        assert_eq!(report.cycles, vec!["X", "Y"]);
        assert!(!report.is_clean());
    }

    #[test]
    fn check_integrity_clean_tree() {
        let mut tasks = Vec::new();
        push(&mut tasks, "A", None);
        push(&mut tasks, "B", Some("A"));
        assert!(check_integrity(&tasks).is_clean());
    }
}
