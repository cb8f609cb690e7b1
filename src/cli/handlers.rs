use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::autosave::AutoSaver;
use crate::io::config_io;
use crate::io::storage::{Storage, StorageConfig};
use crate::io::sync::SyncClient;
use crate::model::category::{Category, CategoryFilter, CATEGORY_ALL};
use crate::model::config::AppConfig;
use crate::model::snapshot::{Snapshot, SnapshotPatch, ViewMode};
use crate::model::task::{PropertyKind, PropertyValue, Task, TaskProperty, DUE_DATE_PROPERTY, TAGS_PROPERTY};
use crate::ops::{search, task_ops, tree};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let start = match cli.data_dir {
        Some(ref dir) => fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?,
        None => std::env::current_dir()?,
    };

    match cli.command {
        // Init runs before data-dir discovery
        Commands::Init(args) => cmd_init(&start, args),
        cmd => {
            let mut session = Session::open(start)?;
            match cmd {
                Commands::Init(_) => unreachable!("handled above"),
                Commands::Add(args) => cmd_add(&mut session, args, json)?,
                Commands::List(args) => cmd_list(&session, args, json)?,
                Commands::Done(args) => cmd_set_completed(&mut session, &args.id, true)?,
                Commands::Reopen(args) => cmd_set_completed(&mut session, &args.id, false)?,
                Commands::Title(args) => cmd_title(&mut session, args)?,
                Commands::Delete(args) => cmd_delete(&mut session, args)?,
                Commands::Indent(args) => cmd_indent(&mut session, &args.id, true)?,
                Commands::Outdent(args) => cmd_indent(&mut session, &args.id, false)?,
                Commands::Tag(args) => cmd_tag(&mut session, args)?,
                Commands::Tags(args) => cmd_tags(&mut session, args, json)?,
                Commands::Category(args) => cmd_category(&mut session, args.command, json)?,
                Commands::Property(args) => cmd_property(&mut session, args.command, json)?,
                Commands::View(args) => cmd_view(&mut session, args)?,
                Commands::Agenda => cmd_agenda(&session, json)?,
                Commands::Search(args) => cmd_search(&session, args, json)?,
                Commands::Pull => cmd_pull(&mut session)?,
                Commands::Export(args) => cmd_export(&session, args)?,
                Commands::Import(args) => cmd_import(&mut session, args)?,
                Commands::Clear(args) => cmd_clear(&session, args)?,
                Commands::Stats => cmd_stats(&session, json)?,
                Commands::Check => cmd_check(&session, json)?,
            }
            session.commit()
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Everything a command needs: the loaded snapshot, the debounced writer
/// behind it, and the optional remote mirror.
struct Session {
    storage: Arc<Storage>,
    autosaver: AutoSaver,
    sync: Option<SyncClient>,
    snapshot: Snapshot,
}

impl Session {
    fn open(start: PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let data_dir = config_io::discover_dir(&start)?;
        let config: AppConfig = config_io::load_config(&data_dir)?;
        let storage = Arc::new(Storage::new(
            &data_dir,
            StorageConfig {
                key: config.storage.key.clone(),
                backup_count: config.storage.backup_count,
            },
        ));
        let autosaver = AutoSaver::new(
            Arc::clone(&storage),
            Duration::from_millis(config.storage.autosave_delay_ms),
        );
        let sync = config.remote.url.as_deref().map(SyncClient::new);
        let snapshot = storage.load();
        Ok(Session {
            storage,
            autosaver,
            sync,
            snapshot,
        })
    }

    /// Queue the current task list for a debounced save.
    fn queue_tasks(&self) {
        self.autosaver
            .schedule(SnapshotPatch::tasks(self.snapshot.tasks.clone()));
    }

    fn queue(&self, patch: SnapshotPatch) {
        self.autosaver.schedule(patch);
    }

    /// Mirror one task to the remote, if one is configured.
    fn mirror_task(&self, id: &str) {
        if let (Some(sync), Some(task)) = (
            self.sync.as_ref(),
            self.snapshot.tasks.iter().find(|t| t.id == id),
        ) {
            sync.push_task(task);
        }
    }

    fn find_task(&self, id: &str) -> Result<&Task, Box<dyn std::error::Error>> {
        self.snapshot
            .tasks
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| format!("task not found: {}", id).into())
    }

    /// Write anything still pending. Called at the end of every command so
    /// a write failure surfaces as an error instead of a warning.
    fn commit(self) -> Result<(), Box<dyn std::error::Error>> {
        self.autosaver.flush()?;
        Ok(())
    }
}

fn cmd_init(start: &std::path::Path, args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = config_io::init_dir(start, args.force)?;
    println!("initialized {}", data_dir.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Task commands
// ---------------------------------------------------------------------------

fn cmd_add(
    session: &mut Session,
    args: AddArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = &args.parent {
        session.find_task(parent)?;
    }

    let mut properties = IndexMap::new();
    if !args.tag.is_empty() {
        properties.insert(TAGS_PROPERTY.to_string(), PropertyValue::List(args.tag));
    }
    if let Some(due) = args.due {
        properties.insert(DUE_DATE_PROPERTY.to_string(), PropertyValue::Text(due));
    }
    if let Some(priority) = args.priority {
        properties.insert("priority".to_string(), PropertyValue::Text(priority));
    }

    let draft = task_ops::TaskDraft {
        title: args.title,
        description: args.desc,
        parent_id: args.parent,
        properties,
        completed: false,
    };
    let task = match args.after {
        Some(after) => task_ops::add_task_after(&mut session.snapshot.tasks, draft, &after),
        None => task_ops::add_task(&mut session.snapshot.tasks, draft),
    };

    session.queue_tasks();
    session.mirror_task(&task.id);
    if json {
        println!("{}", serde_json::to_string_pretty(&task_to_json(&task))?);
    } else {
        println!("added {} ({})", task.title, task.id);
    }
    Ok(())
}

fn cmd_list(
    session: &Session,
    args: ListArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = &session.snapshot;
    let category_id = args
        .category
        .or_else(|| snapshot.current_category.clone())
        .unwrap_or_else(|| CATEGORY_ALL.to_string());

    let forest = if args.open {
        let open_tasks: Vec<Task> = snapshot
            .tasks
            .iter()
            .filter(|t| !t.completed)
            .cloned()
            .collect();
        tree::tree_for_category(&open_tasks, &snapshot.categories, Some(&category_id))
    } else {
        tree::tree_for_category(&snapshot.tasks, &snapshot.categories, Some(&category_id))
    };

    if json {
        let out = ListJson {
            category: category_id,
            tasks: forest.iter().map(node_to_json).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if forest.is_empty() {
        println!("no tasks");
    } else {
        print_forest(&forest, 0);
    }
    Ok(())
}

fn cmd_set_completed(
    session: &mut Session,
    id: &str,
    completed: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Keep the status property in step with the flag so the built-in
    // completed category stays accurate
    let mut properties = session.find_task(id)?.properties.clone();
    properties.insert(
        "status".to_string(),
        PropertyValue::Text(if completed { "Completed" } else { "Not Started" }.to_string()),
    );
    task_ops::update_task(
        &mut session.snapshot.tasks,
        id,
        task_ops::TaskPatch {
            completed: Some(completed),
            properties: Some(properties),
            ..task_ops::TaskPatch::default()
        },
    );

    session.queue_tasks();
    session.mirror_task(id);
    println!("{} {}", id, if completed { "done" } else { "reopened" });
    Ok(())
}

fn cmd_title(session: &mut Session, args: TitleArgs) -> Result<(), Box<dyn std::error::Error>> {
    session.find_task(&args.id)?;
    task_ops::update_task(
        &mut session.snapshot.tasks,
        &args.id,
        task_ops::TaskPatch {
            title: Some(args.title),
            ..task_ops::TaskPatch::default()
        },
    );
    session.queue_tasks();
    session.mirror_task(&args.id);
    println!("{} title updated", args.id);
    Ok(())
}

fn cmd_delete(session: &mut Session, args: IdArg) -> Result<(), Box<dyn std::error::Error>> {
    session.find_task(&args.id)?;
    let removed = task_ops::delete_task(&mut session.snapshot.tasks, &args.id);
    session.queue_tasks();
    if let Some(sync) = &session.sync {
        sync.remove_task(&args.id);
    }
    println!("deleted {} task(s)", removed);
    Ok(())
}

fn cmd_indent(
    session: &mut Session,
    id: &str,
    deeper: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    session.find_task(id)?;
    let changed = if deeper {
        task_ops::indent(&mut session.snapshot.tasks, id)
    } else {
        task_ops::unindent(&mut session.snapshot.tasks, id)
    };
    if !changed {
        println!("{} unchanged", id);
        return Ok(());
    }
    session.queue_tasks();
    session.mirror_task(id);
    println!("{} {}", id, if deeper { "indented" } else { "outdented" });
    Ok(())
}

fn cmd_tag(session: &mut Session, args: TagArgs) -> Result<(), Box<dyn std::error::Error>> {
    session.find_task(&args.id)?;
    let changed = if args.rm {
        task_ops::remove_tag(&mut session.snapshot.tasks, &args.id, &args.tag)
    } else {
        task_ops::add_tag(&mut session.snapshot.tasks, &args.id, &args.tag)
    };
    if !changed {
        println!("{} unchanged", args.id);
        return Ok(());
    }
    session.queue_tasks();
    session.mirror_task(&args.id);
    println!(
        "{} {} #{}",
        args.id,
        if args.rm { "untagged" } else { "tagged" },
        args.tag
    );
    Ok(())
}

fn cmd_tags(
    session: &mut Session,
    args: TagsArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(tag) = args.delete {
        let touched = task_ops::delete_tag_option(
            &mut session.snapshot.tasks,
            &mut session.snapshot.properties,
            &tag,
        );
        session.queue(SnapshotPatch {
            tasks: Some(session.snapshot.tasks.clone()),
            properties: Some(session.snapshot.properties.clone()),
            ..SnapshotPatch::default()
        });
        println!("removed #{} from {} task(s)", tag, touched);
        return Ok(());
    }

    let tags = task_ops::all_tags(&session.snapshot.tasks);
    if json {
        println!("{}", serde_json::to_string_pretty(&tags)?);
    } else if tags.is_empty() {
        println!("no tags");
    } else {
        for tag in tags {
            println!("#{}", tag);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Category and property commands
// ---------------------------------------------------------------------------

fn cmd_category(
    session: &mut Session,
    cmd: CategoryCommands,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        CategoryCommands::Add(args) => {
            let id = slugify(&args.name);
            if session.snapshot.categories.iter().any(|c| c.id == id) {
                return Err(format!("category already exists: {}", id).into());
            }
            let category = Category {
                id: id.clone(),
                name: args.name,
                icon: args.icon,
                filter: CategoryFilter {
                    property_id: args.property,
                    value: args.value.map(PropertyValue::Text),
                },
            };
            session.snapshot.categories.push(category.clone());
            session.queue(SnapshotPatch {
                categories: Some(session.snapshot.categories.clone()),
                ..SnapshotPatch::default()
            });
            if let Some(sync) = &session.sync {
                sync.push_category(&category);
            }
            println!("added category {} ({})", category.name, id);
        }
        CategoryCommands::List => {
            let selected = session.snapshot.current_category.as_deref();
            if json {
                let out: Vec<CategoryJson> = session
                    .snapshot
                    .categories
                    .iter()
                    .map(|c| category_to_json(c, selected))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                for category in &session.snapshot.categories {
                    let marker = if selected == Some(category.id.as_str()) {
                        "*"
                    } else {
                        " "
                    };
                    println!("{} {} ({})", marker, category.name, category.id);
                }
            }
        }
        CategoryCommands::Select(args) => {
            if !session.snapshot.categories.iter().any(|c| c.id == args.id) {
                return Err(format!("category not found: {}", args.id).into());
            }
            session.snapshot.current_category = Some(args.id.clone());
            session.queue(SnapshotPatch {
                current_category: Some(Some(args.id.clone())),
                ..SnapshotPatch::default()
            });
            println!("selected {}", args.id);
        }
        CategoryCommands::Delete(args) => {
            if args.id == CATEGORY_ALL {
                return Err("cannot delete the built-in all category".into());
            }
            let before = session.snapshot.categories.len();
            session.snapshot.categories.retain(|c| c.id != args.id);
            if session.snapshot.categories.len() == before {
                return Err(format!("category not found: {}", args.id).into());
            }
            // Point the selection back at "all" if it named the deleted one
            if session.snapshot.current_category.as_deref() == Some(args.id.as_str()) {
                session.snapshot.current_category = Some(CATEGORY_ALL.to_string());
            }
            session.queue(SnapshotPatch {
                categories: Some(session.snapshot.categories.clone()),
                current_category: Some(session.snapshot.current_category.clone()),
                ..SnapshotPatch::default()
            });
            if let Some(sync) = &session.sync {
                sync.remove_category(&args.id);
            }
            println!("deleted category {}", args.id);
        }
    }
    Ok(())
}

fn cmd_property(
    session: &mut Session,
    cmd: PropertyCommands,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        PropertyCommands::Add(args) => {
            if session.snapshot.properties.iter().any(|p| p.id == args.id) {
                return Err(format!("property already exists: {}", args.id).into());
            }
            let kind = parse_property_kind(&args.kind)?;
            let property = TaskProperty {
                name: args.name.unwrap_or_else(|| args.id.clone()),
                id: args.id,
                kind,
                options: if args.option.is_empty() {
                    None
                } else {
                    Some(args.option)
                },
            };
            session.snapshot.properties.push(property.clone());
            session.queue(SnapshotPatch {
                properties: Some(session.snapshot.properties.clone()),
                ..SnapshotPatch::default()
            });
            println!("added property {}", property.id);
        }
        PropertyCommands::Update(args) => {
            let kind = args.kind.as_deref().map(parse_property_kind).transpose()?;
            let patch = task_ops::PropertyPatch {
                name: args.name,
                kind,
                options: None,
            };
            if !task_ops::update_property(&mut session.snapshot.properties, &args.id, patch) {
                return Err(format!("property not found: {}", args.id).into());
            }
            for option in &args.option {
                task_ops::add_property_option(&mut session.snapshot.properties, &args.id, option);
            }
            session.queue(SnapshotPatch {
                properties: Some(session.snapshot.properties.clone()),
                ..SnapshotPatch::default()
            });
            println!("updated property {}", args.id);
        }
        PropertyCommands::List => {
            if json {
                let out: Vec<PropertyJson> = session
                    .snapshot
                    .properties
                    .iter()
                    .map(property_to_json)
                    .collect();
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                for property in &session.snapshot.properties {
                    let options = property
                        .options
                        .as_ref()
                        .map(|o| format!(" [{}]", o.join(", ")))
                        .unwrap_or_default();
                    println!("{} ({:?}){}", property.id, property.kind, options);
                }
            }
        }
    }
    Ok(())
}

fn parse_property_kind(s: &str) -> Result<PropertyKind, String> {
    match s {
        "select" => Ok(PropertyKind::Select),
        "multiselect" => Ok(PropertyKind::Multiselect),
        "date" => Ok(PropertyKind::Date),
        "text" => Ok(PropertyKind::Text),
        "number" => Ok(PropertyKind::Number),
        other => Err(format!(
            "unknown property type '{}' (expected select, multiselect, date, text, or number)",
            other
        )),
    }
}

fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

// ---------------------------------------------------------------------------
// View, agenda, search
// ---------------------------------------------------------------------------

fn cmd_view(session: &mut Session, args: ViewArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.mode {
        None => println!("{}", session.snapshot.current_view),
        Some(mode) => {
            let view: ViewMode = mode.parse()?;
            session.snapshot.current_view = view;
            session.queue(SnapshotPatch {
                current_view: Some(view),
                ..SnapshotPatch::default()
            });
            println!("view set to {}", view);
        }
    }
    Ok(())
}

fn cmd_agenda(session: &Session, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    // BTreeMap gives ascending date order for free
    let mut by_date: BTreeMap<String, Vec<&Task>> = BTreeMap::new();
    let mut undated: Vec<&Task> = Vec::new();
    for task in &session.snapshot.tasks {
        match task.due_date() {
            Some(due) => by_date.entry(due.to_string()).or_default().push(task),
            None => undated.push(task),
        }
    }

    if json {
        let mut out: Vec<AgendaEntryJson> = by_date
            .iter()
            .map(|(due, tasks)| AgendaEntryJson {
                due: due.clone(),
                tasks: tasks.iter().map(|t| task_to_json(t)).collect(),
            })
            .collect();
        if !undated.is_empty() {
            out.push(AgendaEntryJson {
                due: "unscheduled".to_string(),
                tasks: undated.iter().map(|t| task_to_json(t)).collect(),
            });
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for (due, tasks) in &by_date {
            println!("{}", due);
            for task in tasks {
                println!("{}", format_task_line(task, 1));
            }
        }
        if !undated.is_empty() {
            println!("unscheduled");
            for task in &undated {
                println!("{}", format_task_line(task, 1));
            }
        }
    }
    Ok(())
}

fn cmd_search(
    session: &Session,
    args: SearchArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let hits = search::search_tasks(&session.snapshot.tasks, &args.pattern)?;
    if json {
        let out: Vec<TaskJson> = hits.iter().map(|t| task_to_json(t)).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if hits.is_empty() {
        println!("no matches");
    } else {
        for task in hits {
            println!("{}", format_task_line(task, 0));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Storage commands
// ---------------------------------------------------------------------------

fn cmd_pull(session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
    let Some(sync) = &session.sync else {
        return Err("no remote url configured (set [remote] url in config.toml)".into());
    };
    let tasks = sync.fetch_tasks()?;
    let categories = sync.fetch_categories()?;
    println!(
        "pulled {} task(s), {} categorie(s)",
        tasks.len(),
        categories.len()
    );
    session.snapshot.tasks = tasks.clone();
    session.snapshot.categories = categories.clone();
    session.queue(SnapshotPatch {
        tasks: Some(tasks),
        categories: Some(categories),
        ..SnapshotPatch::default()
    });
    Ok(())
}

fn cmd_export(session: &Session, args: ExportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let path = args.path.unwrap_or_else(Storage::export_file_name);
    fs::write(&path, session.storage.export()?)?;
    println!("exported to {}", path);
    Ok(())
}

fn cmd_import(session: &mut Session, args: ImportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let text = fs::read_to_string(&args.path)?;
    let snapshot = session.storage.import(&text)?;
    println!("imported {} task(s)", snapshot.tasks.len());
    session.snapshot = snapshot;
    Ok(())
}

fn cmd_clear(session: &Session, args: ClearArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !args.force {
        return Err("refusing to delete all data without --force".into());
    }
    session.storage.clear()?;
    println!("cleared all data");
    Ok(())
}

fn cmd_stats(session: &Session, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let stats = session.storage.stats();
    let snapshot = &session.snapshot;
    let completed = snapshot.tasks.iter().filter(|t| t.completed).count();

    if json {
        let out = StatsJson {
            tasks: snapshot.tasks.len(),
            completed,
            categories: snapshot.categories.len(),
            size_bytes: stats.size_bytes,
            backups: stats.backup_count,
            last_modified: stats.last_modified.map(|d| d.to_rfc3339()),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("tasks:      {} ({} completed)", snapshot.tasks.len(), completed);
        println!("categories: {}", snapshot.categories.len());
        println!("size:       {} bytes", stats.size_bytes);
        println!("backups:    {}", stats.backup_count);
        if let Some(modified) = stats.last_modified {
            println!("modified:   {}", modified.to_rfc3339());
        }
    }
    Ok(())
}

fn cmd_check(session: &Session, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let report = task_ops::check_integrity(&session.snapshot.tasks);
    if json {
        println!("{}", serde_json::to_string_pretty(&check_to_json(&report))?);
    } else if report.is_clean() {
        println!("ok");
    } else {
        for id in &report.dangling {
            println!("{} has a dangling parent", id);
        }
        for id in &report.cycles {
            println!("{} is on a parent cycle", id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn slugify_collapses_punctuation_and_case() {
        assert_eq!(slugify("Deep Work!"), "deep-work");
        assert_eq!(slugify("  spaced   out  "), "spaced-out");
        assert_eq!(slugify("Already-Slug"), "already-slug");
    }

    #[test]
    fn property_kind_parsing() {
        assert_eq!(parse_property_kind("date").unwrap(), PropertyKind::Date);
        assert!(parse_property_kind("color").is_err());
    }
}
