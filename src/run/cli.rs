use anyhow::Result;
use std::io::Write;

use crate::db::Store;
use crate::ui::commands::{self, Session, COMMANDS};

/// Run a single command given on the command line.
pub(crate) fn as_cli(command: &[String], store: &mut Store, out: &mut dyn Write) -> Result<()> {
    let line = command.join(" ");
    let name = command.first().map(String::as_str).unwrap_or("");
    if !COMMANDS.contains_key(name) {
        commands::print_help(out)?;
        anyhow::bail!("Unknown command: {name}");
    }

    let mut session = Session { store, out };
    commands::handle_command(&line, &mut session)?;
    Ok(())
}
