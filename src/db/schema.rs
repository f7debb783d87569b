/// Name of the expenses table, as recorded in `sqlite_sequence`.
pub(crate) const EXPENSES_TABLE: &str = "Expenses";

pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS Expenses (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    date        TEXT NOT NULL,
    description TEXT NOT NULL,
    amount      INTEGER NOT NULL
);
"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[
    // (1, "CREATE INDEX IF NOT EXISTS idx_expenses_date ON Expenses(date);"),
];
