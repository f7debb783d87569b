//! Error types shared by the validator and the expense store.

use thiserror::Error;

/// Failures returned by expense validation and persistence.
///
/// Neither the validator nor the store print or log; callers decide how each
/// variant is shown to the user.
#[derive(Error, Debug)]
pub(crate) enum ExpenseError {
    /// The amount was negative.
    #[error("Invalid amount: {0} (amounts must not be negative)")]
    InvalidAmount(i64),

    /// The description exceeded the character limit.
    #[error("Description is too long: {length} characters (limit is {max})")]
    DescriptionTooLong { length: usize, max: usize },

    /// No expense exists with the given id.
    #[error("No expense with id {0}")]
    NotFound(i64),

    /// The total of all amounts does not fit in an `i64`.
    #[error("Total of all expenses is too large to compute")]
    SummaryOverflow,

    /// Any failure reported by the database layer.
    #[error("{context}")]
    Persistence {
        context: &'static str,
        #[source]
        source: rusqlite::Error,
    },
}

impl ExpenseError {
    pub(crate) fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub(crate) fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount(_) | Self::DescriptionTooLong { .. }
        )
    }
}

/// Attach a short description to a `rusqlite` failure, turning it into
/// [`ExpenseError::Persistence`].
pub(crate) trait PersistContext<T> {
    fn persist(self, context: &'static str) -> Result<T, ExpenseError>;
}

impl<T> PersistContext<T> for Result<T, rusqlite::Error> {
    fn persist(self, context: &'static str) -> Result<T, ExpenseError> {
        self.map_err(|source| ExpenseError::Persistence { context, source })
    }
}
