use std::collections::HashMap;

use crate::model::category::{Category, CATEGORY_ALL};
use crate::model::task::Task;

/// A task with its children resolved, for tree-shaped display.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskNode {
    pub task: Task,
    pub children: Vec<TaskNode>,
}

/// One row of the rendered outline: a task and its nesting level.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRow {
    pub task: Task,
    pub level: usize,
}

/// Build a forest from the flat sequence, keeping only tasks that pass
/// `keep`.
///
/// Two passes over the filtered sequence: the first indexes ids, the second
/// assigns each task to its parent's child list, or to the root list when it
/// has no parent or the parent was filtered out. Sibling and root order both
/// preserve flat-sequence order. Tasks on a parent cycle are unreachable
/// from any root and simply drop out of the forest.
pub fn build_tree(tasks: &[Task], keep: &dyn Fn(&Task) -> bool) -> Vec<TaskNode> {
    let kept: Vec<&Task> = tasks.iter().filter(|t| keep(t)).collect();
    let index: HashMap<&str, usize> = kept
        .iter()
        .enumerate()
        .map(|(i, t)| (t.id.as_str(), i))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); kept.len()];
    let mut roots: Vec<usize> = Vec::new();
    for (i, task) in kept.iter().enumerate() {
        match task.parent_id.as_deref().and_then(|p| index.get(p)) {
            // A task naming itself as parent is corrupt; show it as a root
            Some(&parent) if parent != i => children[parent].push(i),
            _ => roots.push(i),
        }
    }

    roots
        .iter()
        .map(|&root| materialize(root, &kept, &children))
        .collect()
}

fn materialize(i: usize, kept: &[&Task], children: &[Vec<usize>]) -> TaskNode {
    TaskNode {
        task: kept[i].clone(),
        children: children[i]
            .iter()
            .map(|&child| materialize(child, kept, children))
            .collect(),
    }
}

/// Depth-first flattening of a forest into outline rows. This is document
/// order: the order tasks render in, and the order indent reasons about.
pub fn flatten(nodes: &[TaskNode]) -> Vec<FlatRow> {
    let mut rows = Vec::new();
    push_rows(nodes, 0, &mut rows);
    rows
}

fn push_rows(nodes: &[TaskNode], level: usize, rows: &mut Vec<FlatRow>) {
    for node in nodes {
        rows.push(FlatRow {
            task: node.task.clone(),
            level,
        });
        push_rows(&node.children, level + 1, rows);
    }
}

/// Build the forest visible under a category selection. `None`, `"all"`,
/// an unknown id, or a category without a property filter all show
/// everything.
pub fn tree_for_category(
    tasks: &[Task],
    categories: &[Category],
    category_id: Option<&str>,
) -> Vec<TaskNode> {
    match category_id {
        None | Some(CATEGORY_ALL) => build_tree(tasks, &|_| true),
        Some(id) => match categories.iter().find(|c| c.id == id) {
            Some(category) if category.filter.property_id.is_some() => {
                build_tree(tasks, &|t| category.matches(t))
            }
            _ => build_tree(tasks, &|_| true),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::category::CategoryFilter;
    use crate::model::task::PropertyValue;
    use pretty_assertions::assert_eq;

    fn task(id: &str, parent: Option<&str>) -> Task {
        let mut t = Task::new(format!("task {}", id));
        t.id = id.into();
        t.parent_id = parent.map(String::from);
        t
    }

    fn titles(nodes: &[TaskNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.task.id.as_str()).collect()
    }

    #[test]
    fn chain_nests_one_child_per_level() {
        // Sequence [A, B(parent=A), C(parent=B)] yields A -> [B -> [C]]
        let tasks = vec![task("A", None), task("B", Some("A")), task("C", Some("B"))];
        let tree = build_tree(&tasks, &|_| true);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].task.id, "A");
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].task.id, "B");
        assert_eq!(tree[0].children[0].children.len(), 1);
        assert_eq!(tree[0].children[0].children[0].task.id, "C");
        assert!(tree[0].children[0].children[0].children.is_empty());
    }

    #[test]
    fn sibling_order_follows_sequence_order() {
        let tasks = vec![
            task("A", None),
            task("C", Some("A")),
            task("B", Some("A")),
            task("D", None),
        ];
        let tree = build_tree(&tasks, &|_| true);
        assert_eq!(titles(&tree), vec!["A", "D"]);
        assert_eq!(titles(&tree[0].children), vec!["C", "B"]);
    }

    #[test]
    fn child_before_parent_in_sequence_still_attaches() {
        let tasks = vec![task("B", Some("A")), task("A", None)];
        let tree = build_tree(&tasks, &|_| true);
        assert_eq!(titles(&tree), vec!["A"]);
        assert_eq!(titles(&tree[0].children), vec!["B"]);
    }

    #[test]
    fn dangling_parent_degrades_to_root() {
        let tasks = vec![task("A", Some("missing"))];
        let tree = build_tree(&tasks, &|_| true);
        assert_eq!(titles(&tree), vec!["A"]);
    }

    #[test]
    fn filtered_out_parent_promotes_child_to_root() {
        let tasks = vec![task("A", None), task("B", Some("A"))];
        let tree = build_tree(&tasks, &|t| t.id == "B");
        assert_eq!(titles(&tree), vec!["B"]);
    }

    #[test]
    fn self_parent_shows_as_root() {
        let tasks = vec![task("A", Some("A"))];
        let tree = build_tree(&tasks, &|_| true);
        assert_eq!(titles(&tree), vec!["A"]);
    }

    #[test]
    fn cycle_members_drop_out_without_hanging() {
        let tasks = vec![task("A", Some("B")), task("B", Some("A")), task("C", None)];
        let tree = build_tree(&tasks, &|_| true);
        assert_eq!(titles(&tree), vec!["C"]);
    }

    #[test]
    fn flatten_yields_document_order_with_levels() {
        let tasks = vec![
            task("A", None),
            task("B", Some("A")),
            task("C", Some("B")),
            task("D", None),
        ];
        let rows = flatten(&build_tree(&tasks, &|_| true));
        let got: Vec<(&str, usize)> = rows.iter().map(|r| (r.task.id.as_str(), r.level)).collect();
        assert_eq!(got, vec![("A", 0), ("B", 1), ("C", 2), ("D", 0)]);
    }

    #[test]
    fn tree_for_category_filters_by_property() {
        let mut urgent = task("A", None);
        urgent
            .properties
            .insert("priority".into(), PropertyValue::Text("Urgent".into()));
        let tasks = vec![urgent, task("B", None)];
        let categories = vec![Category {
            id: "urgent".into(),
            name: "Urgent".into(),
            icon: None,
            filter: CategoryFilter {
                property_id: Some("priority".into()),
                value: Some(PropertyValue::Text("Urgent".into())),
            },
        }];

        let tree = tree_for_category(&tasks, &categories, Some("urgent"));
        assert_eq!(titles(&tree), vec!["A"]);

        // "all", unknown ids, and no selection show everything
        assert_eq!(tree_for_category(&tasks, &categories, Some(CATEGORY_ALL)).len(), 2);
        assert_eq!(tree_for_category(&tasks, &categories, Some("nope")).len(), 2);
        assert_eq!(tree_for_category(&tasks, &categories, None).len(), 2);
    }
}
