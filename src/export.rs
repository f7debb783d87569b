use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use crate::models::Expense;

/// Write expenses as CSV with an `id,date,description,amount` header.
/// Returns the number of data rows written.
pub(crate) fn write_csv<W: Write>(expenses: &[Expense], writer: W) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["id", "date", "description", "amount"])
        .context("Failed to write CSV header")?;
    for expense in expenses {
        wtr.write_record([
            expense.id.to_string(),
            expense.date.to_rfc3339(),
            expense.description.clone(),
            expense.amount.to_string(),
        ])
        .context("Failed to write CSV record")?;
    }
    wtr.flush().context("Failed to flush CSV output")?;
    Ok(expenses.len())
}

pub(crate) fn export_to_csv(expenses: &[Expense], path: &Path) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    write_csv(expenses, file)
}
