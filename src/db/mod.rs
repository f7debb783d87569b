mod schema;

use std::time::Duration;

use rusqlite::{params, Connection, InterruptHandle, OptionalExtension};

use crate::error::{ExpenseError, PersistContext};
use crate::models::{Expense, NewExpense};

type Result<T> = std::result::Result<T, ExpenseError>;

/// Connection settings applied when a [`Store`] is opened.
#[derive(Debug, Clone)]
pub(crate) struct StoreOptions {
    /// How long a statement waits on a locked database before failing.
    pub(crate) busy_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// Owns the single database connection and every query against the
/// `Expenses` table.
///
/// Mutations never check whether the target row exists; callers that need a
/// "not found" signal use [`Store::exists`] or the returned row count.
pub(crate) struct Store {
    conn: Connection,
}

impl Store {
    /// Open a store at a filesystem path, `:memory:`, or a SQLite `file:` URI.
    pub(crate) fn open(target: &str, options: &StoreOptions) -> Result<Self> {
        let conn = Connection::open(target).persist("Failed to open database")?;
        conn.busy_timeout(options.busy_timeout)
            .persist("Failed to set busy timeout")?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .persist("Failed to set database pragmas")?;
        let mut store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().persist("Failed to open database")?;
        let mut store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self
            .conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
                [],
                |row| row.get(0),
            )
            .persist("Failed to inspect schema")?;

        if !has_version_table {
            let tx = self
                .conn
                .transaction()
                .persist("Failed to start migration")?;
            tx.execute_batch(schema::SCHEMA_V1)
                .persist("Failed to create schema")?;
            tx.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )
            .persist("Failed to record schema version")?;
            return tx.commit().persist("Failed to commit migration");
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()
            .persist("Failed to read schema version")?
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn
                    .execute_batch(sql)
                    .persist("Failed to apply migration")?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn
                .execute(
                    "UPDATE schema_version SET version = ?1",
                    params![schema::CURRENT_VERSION],
                )
                .persist("Failed to record schema version")?;
        }

        Ok(())
    }

    /// Insert a validated expense and return the id the database assigned.
    pub(crate) fn create(&self, expense: &NewExpense) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO Expenses (date, description, amount) VALUES (?1, ?2, ?3)",
                params![expense.date(), expense.description(), expense.amount()],
            )
            .persist("Error inserting expense")?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn exists(&self, id: i64) -> Result<bool> {
        self.conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM Expenses WHERE id = ?1)",
                params![id],
                |row| row.get(0),
            )
            .persist("Error checking expense")
    }

    /// Every stored expense, oldest id first.
    pub(crate) fn get_all(&self) -> Result<Vec<Expense>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, date, description, amount FROM Expenses ORDER BY id")
            .persist("Error querying expenses")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Expense {
                    id: row.get(0)?,
                    date: row.get(1)?,
                    description: row.get(2)?,
                    amount: row.get(3)?,
                })
            })
            .persist("Error querying expenses")?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .persist("Error reading expense row")
    }

    /// Replace the description and amount of expense `id`, keeping its
    /// original date. Returns the number of rows changed.
    pub(crate) fn update(&self, id: i64, expense: &NewExpense) -> Result<usize> {
        self.conn
            .execute(
                "UPDATE Expenses SET description = ?1, amount = ?2 WHERE id = ?3",
                params![expense.description(), expense.amount(), id],
            )
            .persist("Error updating expense")
    }

    /// Returns the number of rows removed.
    pub(crate) fn delete(&self, id: i64) -> Result<usize> {
        self.conn
            .execute("DELETE FROM Expenses WHERE id = ?1", params![id])
            .persist("Error deleting expense")
    }

    /// Total of all amounts; `0` when there are no expenses.
    pub(crate) fn summary(&self) -> Result<i64> {
        let result = self
            .conn
            .query_row("SELECT COALESCE(SUM(amount), 0) FROM Expenses", [], |row| {
                row.get(0)
            });
        match result {
            Err(rusqlite::Error::SqliteFailure(_, Some(msg)))
                if msg.contains("integer overflow") =>
            {
                Err(ExpenseError::SummaryOverflow)
            }
            other => other.persist("Error getting summary"),
        }
    }

    /// Remove every expense and restart id assignment from 1.
    pub(crate) fn reset(&mut self) -> Result<()> {
        let tx = self
            .conn
            .transaction()
            .persist("Failed to start reset")?;
        tx.execute("DELETE FROM Expenses", [])
            .persist("Error deleting expenses")?;
        tx.execute(
            "DELETE FROM sqlite_sequence WHERE name = ?1 COLLATE NOCASE",
            params![schema::EXPENSES_TABLE],
        )
        .persist("Error resetting id sequence")?;
        tx.commit().persist("Failed to commit reset")
    }

    /// A handle that aborts whatever statement this store is running, from
    /// any thread. The interrupted call fails with a `Persistence` error.
    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn interrupt_handle(&self) -> InterruptHandle {
        self.conn.get_interrupt_handle()
    }

    /// Release the connection, reporting any error SQLite raises on close.
    pub(crate) fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, source)| source)
            .persist("Failed to close database")
    }
}

#[cfg(test)]
mod tests;
