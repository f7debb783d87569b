use crate::models::{Expense, MAX_DESCRIPTION_CHARS};

/// Format a whole-dollar amount with thousand separators.
/// e.g. `1234567` → `"$1,234,567"`
pub(crate) fn format_amount(val: i64) -> String {
    let digits = val.unsigned_abs().to_string();
    let with_commas: String = digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(",");

    if val < 0 {
        format!("-${with_commas}")
    } else {
        format!("${with_commas}")
    }
}

/// Truncate a string to `max` visible characters, appending "…" if truncated.
/// The result is guaranteed to be at most `max` characters (counting "…" as one).
/// Safe for multi-byte UTF-8 characters.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let char_count = s.chars().count();
    if char_count <= max {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{truncated}…")
}

/// Render expenses as the `#, Date, Description, Amount` table.
pub(crate) fn format_expense_table(expenses: &[Expense]) -> String {
    let width = MAX_DESCRIPTION_CHARS;
    let mut out = format!(
        "{:<4} {:<10} {:<width$} Amount\n",
        "#", "Date", "Description"
    );
    out.push_str(&"─".repeat(4 + 1 + 10 + 1 + width + 1 + 6));
    out.push('\n');
    for expense in expenses {
        out.push_str(&format!(
            "{:<4} {:<10} {:<width$} {}\n",
            expense.id,
            expense.date.format("%Y-%m-%d").to_string(),
            truncate(&expense.description, width),
            format_amount(expense.amount),
        ));
    }
    out
}
