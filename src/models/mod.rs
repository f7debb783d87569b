mod expense;

pub use expense::{validate, Expense, NewExpense, MAX_DESCRIPTION_CHARS};
