use regex::RegexBuilder;

use crate::model::task::Task;

/// Case-insensitive regex search over task titles and descriptions,
/// returning hits in document order.
pub fn search_tasks<'a>(tasks: &'a [Task], pattern: &str) -> Result<Vec<&'a Task>, regex::Error> {
    let re = RegexBuilder::new(pattern).case_insensitive(true).build()?;
    Ok(tasks
        .iter()
        .filter(|task| {
            re.is_match(&task.title)
                || task.description.as_deref().is_some_and(|d| re.is_match(d))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn task(title: &str, description: Option<&str>) -> Task {
        let mut t = Task::new(title);
        t.description = description.map(String::from);
        t
    }

    #[test]
    fn matches_title_case_insensitively() {
        let tasks = vec![task("Write REPORT", None), task("Lunch", None)];
        let hits = search_tasks(&tasks, "report").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Write REPORT");
    }

    #[test]
    fn matches_description() {
        let tasks = vec![task("A", Some("ping the design team")), task("B", None)];
        let hits = search_tasks(&tasks, "design").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "A");
    }

    #[test]
    fn supports_regex_syntax() {
        let tasks = vec![task("fix bug #142", None), task("fix bug #9", None)];
        let hits = search_tasks(&tasks, r"#\d{3}").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "fix bug #142");
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        assert!(search_tasks(&[], "[unclosed").is_err());
    }
}
