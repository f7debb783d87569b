use chrono::{DateTime, Utc};

use crate::error::ExpenseError;

/// Longest description accepted, counted in Unicode scalar values.
pub const MAX_DESCRIPTION_CHARS: usize = 30;

/// Check a candidate expense against the amount and description rules.
///
/// A negative amount is reported before an over-long description.
pub fn validate(description: &str, amount: i64) -> Result<(), ExpenseError> {
    if amount < 0 {
        return Err(ExpenseError::InvalidAmount(amount));
    }
    let length = description.chars().count();
    if length > MAX_DESCRIPTION_CHARS {
        return Err(ExpenseError::DescriptionTooLong {
            length,
            max: MAX_DESCRIPTION_CHARS,
        });
    }
    Ok(())
}

/// A validated expense that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    date: DateTime<Utc>,
    description: String,
    amount: i64,
}

impl NewExpense {
    pub fn new(description: impl Into<String>, amount: i64) -> Result<Self, ExpenseError> {
        let description = description.into();
        validate(&description, amount)?;
        Ok(Self {
            date: Utc::now(),
            description,
            amount,
        })
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }
}

/// An expense as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expense {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub description: String,
    pub amount: i64,
}
