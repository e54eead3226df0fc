use crate::config::{Config, ConfigError};
use crate::models::{Task, TodoList};
use crate::storage::{Backend, Storage, StorageError};
use clap::{Parser, Subcommand};
use std::io::Write;
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(name = "simple-todo", version, about = "Keep several to-do lists on local disk")]
pub struct Cli {
    /// Directory holding data.json
    #[arg(long, global = true, env = "SIMPLE_TODO_DATA_DIR", value_name = "DIR")]
    pub data_dir: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show all lists with their pending task counts
    Lists,
    /// Create a list; without a name it is called "List N"
    Create { name: Option<String> },
    /// Rename a list
    Rename { list: String, name: String },
    /// Delete a list and all of its tasks
    Delete { list: String },
    /// Show the tasks of a list
    Show { list: String },
    /// Add a task to a list
    Add { list: String, title: String },
    /// Change the title of a task
    Edit {
        list: String,
        task: String,
        title: String,
    },
    /// Flip a task between pending and completed
    Toggle { list: String, task: String },
    /// Remove a task from a list
    Remove { list: String, task: String },
    /// Print the location of the data file
    Path,
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No list matches {0:?}")]
    ListNotFound(String),
    #[error("No task matches {0:?}")]
    TaskNotFound(String),
    #[error("{0}")]
    Rejected(String),
}

impl Cli {
    pub fn config(&self) -> Config {
        Config {
            data_dir: self.data_dir.clone(),
        }
    }
}

pub fn run(cli: &Cli, out: &mut impl Write) -> Result<(), CliError> {
    let config = cli.config();
    if let Commands::Path = cli.command {
        let path = config.data_dir()?.join(crate::storage::json::DATA_FILE_NAME);
        writeln!(out, "{}", path.display())?;
        return Ok(());
    }

    let mut storage = Storage::open(&config)?;
    execute(&mut storage, &cli.command, out)
}

/// Applies one command to `storage` and renders the outcome.
pub fn execute<B: Backend>(
    storage: &mut Storage<B>,
    command: &Commands,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        Commands::Lists => {
            let lists = storage.get_lists();
            if lists.is_empty() {
                writeln!(out, "No lists yet")?;
            }
            for list in &lists {
                writeln!(
                    out,
                    "{}  {} ({} pending)",
                    short_id(&list.id),
                    list.name,
                    list.get_pending_tasks().len()
                )?;
            }
        }
        Commands::Create { name } => {
            let list = storage.create_list(name.as_deref())?;
            writeln!(out, "Created list {} ({})", list.name, short_id(&list.id))?;
        }
        Commands::Rename { list, name } => {
            let target = resolve_list(storage, list)?;
            if !storage.rename_list(&target.id, name)? {
                return Err(CliError::Rejected("List name cannot be empty".to_string()));
            }
            let renamed = refetch(storage, &target.id)?;
            writeln!(out, "Renamed {} to {}", target.name, renamed.name)?;
        }
        Commands::Delete { list } => {
            let target = resolve_list(storage, list)?;
            if !storage.delete_list(&target.id)? {
                return Err(CliError::ListNotFound(list.clone()));
            }
            writeln!(
                out,
                "Deleted list {} and {} task(s)",
                target.name,
                target.len()
            )?;
        }
        Commands::Show { list } => {
            let target = resolve_list(storage, list)?;
            render_list(&target, out)?;
        }
        Commands::Add { list, title } => {
            let target = resolve_list(storage, list)?;
            let Some(task) = storage.add_task(&target.id, title)? else {
                return Err(CliError::Rejected("Task title cannot be empty".to_string()));
            };
            writeln!(out, "Added {} to {}", task.title, target.name)?;
        }
        Commands::Edit { list, task, title } => {
            let target = resolve_list(storage, list)?;
            let found = resolve_task(&target, task)?;
            if !storage.update_task(&target.id, &found.id, title)? {
                return Err(CliError::Rejected("Task title cannot be empty".to_string()));
            }
            let updated = refetch(storage, &target.id)?;
            if let Some(t) = updated.get_task(&found.id) {
                writeln!(out, "Updated {}", t.title)?;
            }
        }
        Commands::Toggle { list, task } => {
            let target = resolve_list(storage, list)?;
            let found = resolve_task(&target, task)?;
            if !storage.toggle_task(&target.id, &found.id)? {
                return Err(CliError::TaskNotFound(task.clone()));
            }
            let updated = refetch(storage, &target.id)?;
            if let Some(t) = updated.get_task(&found.id) {
                let state = if t.completed { "completed" } else { "pending" };
                writeln!(out, "Marked {} as {}", t.title, state)?;
            }
        }
        Commands::Remove { list, task } => {
            let target = resolve_list(storage, list)?;
            let found = resolve_task(&target, task)?;
            if !storage.delete_task(&target.id, &found.id)? {
                return Err(CliError::TaskNotFound(task.clone()));
            }
            writeln!(out, "Removed {}", found.title)?;
        }
        Commands::Path => {}
    }
    Ok(())
}

fn refetch<B: Backend>(storage: &Storage<B>, list_id: &str) -> Result<TodoList, CliError> {
    storage
        .get_list(list_id)
        .ok_or_else(|| CliError::ListNotFound(list_id.to_string()))
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Matches an exact id, then an exact name, then a unique id prefix.
fn resolve_list<B: Backend>(storage: &Storage<B>, reference: &str) -> Result<TodoList, CliError> {
    let reference = reference.trim();
    let lists = storage.get_lists();

    if let Some(list) = lists.iter().find(|l| l.id == reference) {
        return Ok(list.clone());
    }
    if let Some(list) = lists.iter().find(|l| l.name == reference) {
        return Ok(list.clone());
    }
    unique_prefix_match(&lists, reference, |l| &l.id)
        .cloned()
        .ok_or_else(|| CliError::ListNotFound(reference.to_string()))
}

/// Matches an exact id, then a 1-based position, then a unique id prefix.
fn resolve_task(list: &TodoList, reference: &str) -> Result<Task, CliError> {
    let reference = reference.trim();

    if let Some(task) = list.get_task(reference) {
        return Ok(task.clone());
    }
    if let Ok(position) = reference.parse::<usize>() {
        if let Some(task) = position.checked_sub(1).and_then(|i| list.tasks.get(i)) {
            return Ok(task.clone());
        }
    }
    unique_prefix_match(&list.tasks, reference, |t| &t.id)
        .cloned()
        .ok_or_else(|| CliError::TaskNotFound(reference.to_string()))
}

fn unique_prefix_match<'a, T>(
    items: &'a [T],
    prefix: &str,
    id: impl Fn(&T) -> &String,
) -> Option<&'a T> {
    if prefix.is_empty() {
        return None;
    }
    let mut matches = items.iter().filter(|item| id(*item).starts_with(prefix));
    match (matches.next(), matches.next()) {
        (Some(item), None) => Some(item),
        _ => None,
    }
}

fn render_list(list: &TodoList, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "{}", list.name)?;
    if list.is_empty() {
        writeln!(out, "  (no tasks)")?;
        return Ok(());
    }

    for task in list.get_pending_tasks() {
        writeln!(out, "  {}. [ ] {}", position_of(list, task), task.title)?;
    }

    let completed = list.get_completed_tasks();
    if !completed.is_empty() {
        writeln!(out, "Completed")?;
        for task in completed {
            writeln!(out, "  {}. [x] {}", position_of(list, task), task.title)?;
        }
    }
    Ok(())
}

fn position_of(list: &TodoList, task: &Task) -> usize {
    list.tasks
        .iter()
        .position(|t| t.id == task.id)
        .map_or(0, |i| i + 1)
}
