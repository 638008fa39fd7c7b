//! Command-line presentation layer over the task store.
//!
//! # Responsibility
//! - Map subcommands onto task store operations.
//! - Own the delete confirmation gate for terminal use.

use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tasklist_core::{open_task_store, AppConfig, SqliteTaskStore, Task, TaskFilter};

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(version)]
#[command(about = "Local task list")]
struct Cli {
    /// Database file (defaults to TASKLIST_DB_PATH or a temp-dir file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List tasks
    List {
        /// all | active | completed
        #[arg(short, long, default_value = "all")]
        filter: TaskFilter,
    },
    /// Add a task
    Add { text: String },
    /// Replace the text of a task
    Edit { id: String, text: String },
    /// Flip completion of a task
    Toggle { id: String },
    /// Delete a task
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Check core linkage
    Ping,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = AppConfig::from_env().map_err(|err| err.to_string())?;
    config.init_logging()?;

    if let Command::Ping = cli.command {
        println!("tasklist_core ping={}", tasklist_core::ping());
        println!("tasklist_core version={}", tasklist_core::core_version());
        return Ok(());
    }

    let db_path = cli.db.unwrap_or(config.db_path);
    let mut store = open_task_store(&db_path).map_err(|err| err.to_string())?;
    execute(&mut store, cli.command, &mut io::stdin().lock(), &mut io::stdout())
}

fn execute(
    store: &mut SqliteTaskStore,
    command: Command,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<(), String> {
    let io_err = |err: io::Error| err.to_string();
    match command {
        Command::List { filter } => {
            let tasks = store.filter(filter);
            if tasks.is_empty() {
                writeln!(out, "No tasks.").map_err(io_err)?;
            }
            for task in &tasks {
                writeln!(out, "{}", render_task(task)).map_err(io_err)?;
            }
        }
        Command::Add { text } => {
            let task = store.add(text).map_err(|err| err.to_string())?;
            writeln!(out, "{}", render_task(&task)).map_err(io_err)?;
        }
        Command::Edit { id, text } => {
            let Some(mut task) = store.get(&id).cloned() else {
                writeln!(out, "Task not found.").map_err(io_err)?;
                return Ok(());
            };
            task.text = text;
            store.update(task.clone()).map_err(|err| err.to_string())?;
            writeln!(out, "{}", render_task(&task)).map_err(io_err)?;
        }
        Command::Toggle { id } => match store.toggle_completion(&id) {
            Ok(Some(task)) => writeln!(out, "{}", render_task(&task)).map_err(io_err)?,
            Ok(None) => writeln!(out, "Task not found.").map_err(io_err)?,
            Err(err) => return Err(err.to_string()),
        },
        Command::Delete { id, yes } => {
            let Some(task) = store.get(&id).cloned() else {
                writeln!(out, "Task not found.").map_err(io_err)?;
                return Ok(());
            };
            if !yes {
                write!(out, "Delete task \"{}\"? [y/N] ", task.text).map_err(io_err)?;
                out.flush().map_err(io_err)?;
                let mut answer = String::new();
                input.read_line(&mut answer).map_err(io_err)?;
                if !is_confirmation(&answer) {
                    writeln!(out, "Cancelled.").map_err(io_err)?;
                    return Ok(());
                }
            }
            store.delete(&id).map_err(|err| err.to_string())?;
            writeln!(out, "Deleted {id}.").map_err(io_err)?;
        }
        Command::Ping => {}
    }
    Ok(())
}

fn render_task(task: &Task) -> String {
    let mark = if task.completed { "x" } else { " " };
    format!("[{mark}] {}  {}", task.id, task.text)
}

fn is_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::{execute, is_confirmation, Cli, Command};
    use clap::{CommandFactory, Parser};
    use tasklist_core::{KvTaskRepository, SqliteKvStore, SqliteTaskStore, TaskFilter, TaskStore};

    fn store() -> SqliteTaskStore {
        let kv = SqliteKvStore::open_in_memory().unwrap();
        TaskStore::open(KvTaskRepository::new(kv)).unwrap()
    }

    fn run_with(store: &mut SqliteTaskStore, command: Command, input: &str) -> String {
        let mut out = Vec::new();
        execute(store, command, &mut input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn list_filter_parses_from_argument() {
        let cli = Cli::try_parse_from(["tasklist", "list", "--filter", "completed"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::List {
                filter: TaskFilter::Completed
            }
        ));
        assert!(Cli::try_parse_from(["tasklist", "list", "--filter", "done"]).is_err());
    }

    #[test]
    fn list_on_empty_store_prints_placeholder() {
        let mut store = store();
        let list = Command::List {
            filter: TaskFilter::All,
        };
        let output = run_with(&mut store, list, "");
        assert_eq!(output, "No tasks.\n");
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut store = store();
        let task = store.add("Buy milk").unwrap();

        let decline = Command::Delete {
            id: task.id.clone(),
            yes: false,
        };
        let output = run_with(&mut store, decline, "n\n");
        assert!(output.ends_with("Cancelled.\n"));
        assert_eq!(store.len(), 1);

        let confirm = Command::Delete {
            id: task.id,
            yes: false,
        };
        run_with(&mut store, confirm, "yes\n");
        assert!(store.is_empty());
    }

    #[test]
    fn blank_add_surfaces_validation_message() {
        let mut store = store();
        let mut out = Vec::new();
        let blank = Command::Add {
            text: "  ".to_string(),
        };
        let err = execute(&mut store, blank, &mut "".as_bytes(), &mut out).unwrap_err();
        assert_eq!(err, "Task text cannot be empty");
    }

    #[test]
    fn confirmation_accepts_y_and_yes_only() {
        assert!(is_confirmation("Y\n"));
        assert!(is_confirmation(" yes "));
        assert!(!is_confirmation(""));
        assert!(!is_confirmation("no"));
    }
}
