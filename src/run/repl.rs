use anyhow::{Context, Result};
use std::io::{BufRead, ErrorKind, Write};

use crate::db::Store;
use crate::error::ExpenseError;
use crate::ui::commands::{self, Flow, Session};

/// Read commands line by line until `exit` or end of input.
///
/// Command failures are printed and the loop carries on; only I/O errors on
/// the terminal itself end it early.
pub(crate) fn as_repl<R: BufRead>(
    input: &mut R,
    store: &mut Store,
    out: &mut dyn Write,
) -> Result<()> {
    commands::print_help(out)?;
    let mut session = Session { store, out };
    let mut line = String::new();

    loop {
        write!(session.out, "Enter command: ")?;
        session.out.flush()?;

        line.clear();
        match input.read_line(&mut line) {
            Ok(0) => {
                writeln!(session.out)?;
                break;
            }
            Ok(_) => {}
            Err(err) if err.kind() == ErrorKind::InvalidData => {
                writeln!(session.out, "Error: input is not valid UTF-8")?;
                continue;
            }
            Err(err) => return Err(err).context("Failed to read input"),
        }

        match commands::handle_command(&line, &mut session) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => break,
            Err(err) => {
                match err.downcast_ref::<ExpenseError>() {
                    Some(e) if e.is_validation() || e.is_not_found() => {
                        tracing::debug!(error = %e, "command rejected");
                    }
                    _ => tracing::info!(error = ?err, "command failed"),
                }
                writeln!(session.out, "Error: {err:#}")?;
            }
        }
    }

    Ok(())
}
