use anyhow::{Context, Result};
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use crate::db::StoreOptions;

/// Record, list, and summarize expenses stored in a SQLite database.
///
/// Without a COMMAND an interactive prompt is started.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub(crate) struct Args {
    /// Database to open: a file path, `:memory:`, or a SQLite `file:` URI.
    #[arg(short, long, env = "EXPENSE_TRACKER_DB")]
    pub(crate) database: Option<String>,

    /// Read the database target from the first line of standard input.
    #[arg(long)]
    pub(crate) prompt_database: bool,

    /// Milliseconds a statement waits on a locked database before failing.
    #[arg(long, default_value_t = 5000)]
    pub(crate) busy_timeout_ms: u64,

    /// Run one command and exit, e.g. `add coffee 5` or `list`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub(crate) command: Vec<String>,
}

impl Args {
    pub(crate) fn store_options(&self) -> StoreOptions {
        StoreOptions {
            busy_timeout: Duration::from_millis(self.busy_timeout_ms),
        }
    }
}

/// Decide which database to open: a prompted line, then `--database`, then
/// the default data-directory file.
pub(crate) fn resolve_database<R: BufRead>(
    args: &Args,
    input: &mut R,
    out: &mut dyn Write,
) -> Result<String> {
    if args.prompt_database {
        write!(out, "Enter database connection string: ")?;
        out.flush()?;
        let mut line = String::new();
        input
            .read_line(&mut line)
            .context("Failed to read connection string")?;
        let target = line.trim();
        if target.is_empty() {
            anyhow::bail!("No connection string entered");
        }
        return Ok(target.to_string());
    }
    if let Some(target) = &args.database {
        return Ok(target.clone());
    }
    Ok(default_database_path()?.to_string_lossy().into_owned())
}

/// `expenses.db` in the platform data directory, created on demand.
pub(crate) fn default_database_path() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "expense-tracker", "ExpenseTracker")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.join("expenses.db"))
}
