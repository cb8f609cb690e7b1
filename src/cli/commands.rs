use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sprig", about = concat!("[*] sprig v", env!("CARGO_PKG_VERSION"), " - tasks as a nested outline"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different data directory
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a sprig data directory here
    Init(InitArgs),
    /// Add a task
    Add(AddArgs),
    /// List tasks as an outline
    List(ListArgs),
    /// Mark a task completed
    Done(IdArg),
    /// Mark a completed task open again
    Reopen(IdArg),
    /// Change a task's title
    Title(TitleArgs),
    /// Delete a task and all of its subtasks
    Delete(IdArg),
    /// Nest a task under the row above it
    Indent(IdArg),
    /// Promote a task one level
    Outdent(IdArg),
    /// Add or remove a tag on a task
    Tag(TagArgs),
    /// List all tags, or retire one everywhere
    Tags(TagsArgs),
    /// Manage categories
    Category(CategoryCmd),
    /// Manage the property schema
    Property(PropertyCmd),
    /// Get or set the current view
    View(ViewArgs),
    /// Show tasks grouped by due date
    Agenda,
    /// Search tasks by regex
    Search(SearchArgs),
    /// Replace local tasks and categories from the remote server
    Pull,
    /// Write the full data set to a JSON file
    Export(ExportArgs),
    /// Replace the full data set from a JSON file
    Import(ImportArgs),
    /// Delete all stored data, including backups
    Clear(ClearArgs),
    /// Show storage statistics
    Stats,
    /// Validate parent-link integrity
    Check,
}

#[derive(Args)]
pub struct InitArgs {
    /// Reinitialize even if sprig/ already exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Longer description
    #[arg(long)]
    pub desc: Option<String>,
    /// Nest under this task
    #[arg(long)]
    pub parent: Option<String>,
    /// Insert after this task's subtree instead of at the end
    #[arg(long)]
    pub after: Option<String>,
    /// Tag (repeatable)
    #[arg(long)]
    pub tag: Vec<String>,
    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,
    /// Priority (Low, Medium, High, Urgent)
    #[arg(long)]
    pub priority: Option<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Category to list (default: the currently selected one)
    pub category: Option<String>,
    /// Hide completed tasks
    #[arg(long)]
    pub open: bool,
}

#[derive(Args)]
pub struct IdArg {
    /// Task ID
    pub id: String,
}

#[derive(Args)]
pub struct TitleArgs {
    /// Task ID
    pub id: String,
    /// New title
    pub title: String,
}

#[derive(Args)]
pub struct TagArgs {
    /// Task ID
    pub id: String,
    /// Tag name
    pub tag: String,
    /// Remove instead of add
    #[arg(long)]
    pub rm: bool,
}

#[derive(Args)]
pub struct TagsArgs {
    /// Remove this tag from the schema and from every task
    #[arg(long)]
    pub delete: Option<String>,
}

#[derive(Args)]
pub struct CategoryCmd {
    #[command(subcommand)]
    pub command: CategoryCommands,
}

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Add a category filtering on a property value
    Add(CategoryAddArgs),
    /// List categories
    List,
    /// Select the category shown by default
    Select(IdArg),
    /// Delete a category
    Delete(IdArg),
}

#[derive(Args)]
pub struct CategoryAddArgs {
    /// Category name (the id is derived from it)
    pub name: String,
    /// Property to filter on
    #[arg(long)]
    pub property: Option<String>,
    /// Required property value
    #[arg(long)]
    pub value: Option<String>,
    /// Icon
    #[arg(long)]
    pub icon: Option<String>,
}

#[derive(Args)]
pub struct PropertyCmd {
    #[command(subcommand)]
    pub command: PropertyCommands,
}

#[derive(Subcommand)]
pub enum PropertyCommands {
    /// Add a property to the schema
    Add(PropertyAddArgs),
    /// Update a property's name, type, or options
    Update(PropertyUpdateArgs),
    /// List the property schema
    List,
}

#[derive(Args)]
pub struct PropertyAddArgs {
    /// Property id
    pub id: String,
    /// Display name (default: the id)
    #[arg(long)]
    pub name: Option<String>,
    /// Kind: select, multiselect, date, text, number
    #[arg(long = "type", default_value = "text")]
    pub kind: String,
    /// Allowed option (repeatable)
    #[arg(long)]
    pub option: Vec<String>,
}

#[derive(Args)]
pub struct PropertyUpdateArgs {
    /// Property id
    pub id: String,
    /// New display name
    #[arg(long)]
    pub name: Option<String>,
    /// New kind: select, multiselect, date, text, number
    #[arg(long = "type")]
    pub kind: Option<String>,
    /// Option to append (repeatable)
    #[arg(long)]
    pub option: Vec<String>,
}

#[derive(Args)]
pub struct ViewArgs {
    /// View to switch to: list, calendar, settings, help
    pub mode: Option<String>,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Regex matched against titles and descriptions
    pub pattern: String,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Output file (default: backup-<date>.json)
    pub path: Option<String>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// JSON file to import
    pub path: String,
}

#[derive(Args)]
pub struct ClearArgs {
    /// Actually do it
    #[arg(long)]
    pub force: bool,
}
