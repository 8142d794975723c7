//! The read/write seam between the reporting engine and the ledger data.
//!
//! The report facade and the default category seeding only talk to a [LedgerStore], which keeps
//! them independent of how the ledger is persisted.

mod sqlite;

pub use sqlite::SQLiteLedgerStore;

use crate::{
    Error,
    category::{Category, CategoryTemplate},
    transaction::{Transaction, TransactionQuery, TransactionType},
    user::UserID,
};

/// Retrieves a user's transactions and categories, and creates categories in bulk.
///
/// Every method is scoped to a single owner, so one user's data is never visible to another.
pub trait LedgerStore {
    /// Get the transactions owned by `user_id` that match `query`.
    fn find_transactions(
        &self,
        user_id: UserID,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>, Error>;

    /// Get the categories owned by `user_id` ordered by name, optionally only those of
    /// `transaction_type`.
    fn find_categories(
        &self,
        user_id: UserID,
        transaction_type: Option<TransactionType>,
    ) -> Result<Vec<Category>, Error>;

    /// Get the number of categories owned by `user_id`.
    fn count_categories(&self, user_id: UserID) -> Result<usize, Error>;

    /// Create a category for each template, atomically.
    ///
    /// Either all of the categories are created or none are.
    fn bulk_insert_categories(
        &self,
        user_id: UserID,
        templates: &[CategoryTemplate],
    ) -> Result<Vec<Category>, Error>;
}
