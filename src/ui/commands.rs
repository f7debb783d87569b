use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;

use thiserror::Error;

use super::util::format_expense_table;
use crate::db::Store;
use crate::error::ExpenseError;
use crate::models::NewExpense;

/// Whether the command loop should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Exit,
}

/// Everything a command needs: the store and where to print results.
pub(crate) struct Session<'a> {
    pub(crate) store: &'a mut Store,
    pub(crate) out: &'a mut dyn Write,
}

/// Arguments that could not be turned into a command invocation.
#[derive(Error, Debug)]
pub(crate) enum InputError {
    #[error("Wrong arguments for \"{command}\". Usage: {usage}")]
    Usage {
        command: &'static str,
        usage: &'static str,
    },

    #[error("'{value}' is not a valid {what}")]
    NotANumber { what: &'static str, value: String },
}

pub(crate) struct Command {
    pub(crate) usage: &'static str,
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut Session) -> anyhow::Result<Flow>,
}

macro_rules! register_command {
    ($name:expr, $usage:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                usage: $usage,
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<BTreeMap<&str, Command>> = LazyLock::new(|| {
    let mut r: BTreeMap<&str, Command> = BTreeMap::new();

    register_command!(
        "add",
        "add <description> <amount>",
        "Add an expense",
        cmd_add,
        r
    );
    register_command!("list", "list", "Show all expenses", cmd_list, r);
    register_command!(
        "summary",
        "summary",
        "Show the total amount spent",
        cmd_summary,
        r
    );
    register_command!(
        "delete",
        "delete <id>",
        "Delete an expense (other ids stay the same)",
        cmd_delete,
        r
    );
    register_command!(
        "update",
        "update <id> <description> <amount>",
        "Replace the description and amount of an expense",
        cmd_update,
        r
    );
    register_command!(
        "reset",
        "reset",
        "Delete all expenses and restart ids from 1",
        cmd_reset,
        r
    );
    register_command!(
        "export",
        "export [path]",
        "Write all expenses to a CSV file (default: expenses.csv)",
        cmd_export,
        r
    );
    register_command!("help", "help", "Show available commands", cmd_help, r);
    register_command!("exit", "exit", "Quit", cmd_exit, r);
    register_command!("quit", "quit", "Quit", cmd_exit, r);

    r
});

/// Run one line of input. Blank lines and unknown commands are not errors.
pub(crate) fn handle_command(input: &str, session: &mut Session) -> anyhow::Result<Flow> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Flow::Continue);
    }
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        tracing::debug!(command = cmd_name, "dispatching");
        return (cmd.run)(args, session);
    }

    let suggestion = find_closest(cmd_name);
    writeln!(
        session.out,
        "No such command: {cmd_name}. Did you mean {suggestion}? Type \"help\" for a list."
    )?;
    Ok(Flow::Continue)
}

pub(crate) fn print_help(out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "Available commands:")?;
    for cmd in COMMANDS.values() {
        writeln!(out, "  {:<36} {}", cmd.usage, cmd.description)?;
    }
    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .min_by_key(|k| levenshtein(input, k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Argument parsing ─────────────────────────────────────────

fn usage(command: &'static str) -> InputError {
    let usage = COMMANDS.get(command).map_or(command, |c| c.usage);
    InputError::Usage { command, usage }
}

fn parse_number(what: &'static str, value: &str) -> Result<i64, InputError> {
    value.parse().map_err(|_| InputError::NotANumber {
        what,
        value: value.to_string(),
    })
}

/// Split `<description...> <amount>`: the last token is the amount, the
/// rest joined by single spaces is the description.
fn parse_description_amount(command: &'static str, tokens: &[&str]) -> anyhow::Result<NewExpense> {
    let Some((amount, description)) = tokens.split_last() else {
        return Err(usage(command).into());
    };
    if description.is_empty() {
        return Err(usage(command).into());
    }
    let amount = parse_number("amount", amount)?;
    Ok(NewExpense::new(description.join(" "), amount)?)
}

// ── Existence-checked mutations ──────────────────────────────

fn require_existing(
    store: &mut Store,
    id: i64,
    mutate: impl FnOnce(&mut Store) -> Result<usize, ExpenseError>,
) -> Result<(), ExpenseError> {
    if !store.exists(id)? {
        return Err(ExpenseError::NotFound(id));
    }
    // The row can disappear between the check and the statement.
    if mutate(store)? == 0 {
        return Err(ExpenseError::NotFound(id));
    }
    Ok(())
}

pub(crate) fn update_existing(
    store: &mut Store,
    id: i64,
    expense: &NewExpense,
) -> Result<(), ExpenseError> {
    require_existing(store, id, |s| s.update(id, expense))
}

pub(crate) fn delete_existing(store: &mut Store, id: i64) -> Result<(), ExpenseError> {
    require_existing(store, id, |s| s.delete(id))
}

// ── Command implementations ──────────────────────────────────

fn cmd_add(args: &str, session: &mut Session) -> anyhow::Result<Flow> {
    let tokens: Vec<&str> = args.split_whitespace().collect();
    let expense = parse_description_amount("add", &tokens)?;
    let id = session.store.create(&expense)?;
    tracing::info!(id, amount = expense.amount(), "expense added");
    writeln!(session.out, "Expense added successfully (id {id})")?;
    Ok(Flow::Continue)
}

fn cmd_list(args: &str, session: &mut Session) -> anyhow::Result<Flow> {
    if !args.is_empty() {
        return Err(usage("list").into());
    }
    let expenses = session.store.get_all()?;
    if expenses.is_empty() {
        writeln!(session.out, "No expenses recorded")?;
    } else {
        write!(session.out, "{}", format_expense_table(&expenses))?;
    }
    Ok(Flow::Continue)
}

fn cmd_summary(args: &str, session: &mut Session) -> anyhow::Result<Flow> {
    if !args.is_empty() {
        return Err(usage("summary").into());
    }
    let total = session.store.summary()?;
    writeln!(session.out, "{total}")?;
    Ok(Flow::Continue)
}

fn cmd_delete(args: &str, session: &mut Session) -> anyhow::Result<Flow> {
    let tokens: Vec<&str> = args.split_whitespace().collect();
    let [id] = tokens.as_slice() else {
        return Err(usage("delete").into());
    };
    let id = parse_number("id", id)?;
    delete_existing(session.store, id)?;
    tracing::info!(id, "expense deleted");
    writeln!(session.out, "Expense ID: {id} deleted successfully")?;
    Ok(Flow::Continue)
}

fn cmd_update(args: &str, session: &mut Session) -> anyhow::Result<Flow> {
    let tokens: Vec<&str> = args.split_whitespace().collect();
    let Some((id, rest)) = tokens.split_first() else {
        return Err(usage("update").into());
    };
    let id = parse_number("id", id)?;
    let expense = parse_description_amount("update", rest)?;
    update_existing(session.store, id, &expense)?;
    tracing::info!(id, amount = expense.amount(), "expense updated");
    writeln!(session.out, "Id {id} updated successfully!")?;
    Ok(Flow::Continue)
}

fn cmd_reset(args: &str, session: &mut Session) -> anyhow::Result<Flow> {
    if !args.is_empty() {
        return Err(usage("reset").into());
    }
    session.store.reset()?;
    tracing::info!("all expenses removed");
    writeln!(session.out, "All expenses removed")?;
    Ok(Flow::Continue)
}

fn cmd_export(args: &str, session: &mut Session) -> anyhow::Result<Flow> {
    let path = if args.is_empty() {
        "expenses.csv".to_string()
    } else {
        crate::run::shellexpand(args)
    };
    let expenses = session.store.get_all()?;
    let count = crate::export::export_to_csv(&expenses, Path::new(&path))?;
    writeln!(session.out, "Exported {count} expenses to {path}")?;
    Ok(Flow::Continue)
}

fn cmd_help(args: &str, session: &mut Session) -> anyhow::Result<Flow> {
    if !args.is_empty() {
        return Err(usage("help").into());
    }
    print_help(session.out)?;
    Ok(Flow::Continue)
}

fn cmd_exit(args: &str, _session: &mut Session) -> anyhow::Result<Flow> {
    if !args.is_empty() {
        return Err(usage("exit").into());
    }
    Ok(Flow::Exit)
}
