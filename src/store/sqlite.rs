//! Implements a SQLite backed ledger store.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::{
    Error,
    category::{self, Category, CategoryTemplate, create_categories, get_categories},
    store::LedgerStore,
    transaction::{Transaction, TransactionQuery, TransactionType, get_transactions},
    user::UserID,
};

/// Reads and writes ledger data in a SQLite database.
///
/// Cloning the store is cheap, clones share the same connection.
#[derive(Debug, Clone)]
pub struct SQLiteLedgerStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteLedgerStore {
    /// Create a new ledger store with a SQLite database.
    ///
    /// The database should already be initialized with [crate::initialize_db].
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)
    }
}

impl LedgerStore for SQLiteLedgerStore {
    fn find_transactions(
        &self,
        user_id: UserID,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>, Error> {
        let connection = self.lock()?;
        get_transactions(user_id, query, &connection)
    }

    fn find_categories(
        &self,
        user_id: UserID,
        transaction_type: Option<TransactionType>,
    ) -> Result<Vec<Category>, Error> {
        let connection = self.lock()?;
        get_categories(user_id, transaction_type, &connection)
    }

    fn count_categories(&self, user_id: UserID) -> Result<usize, Error> {
        let connection = self.lock()?;
        category::count_categories(user_id, &connection)
    }

    fn bulk_insert_categories(
        &self,
        user_id: UserID,
        templates: &[CategoryTemplate],
    ) -> Result<Vec<Category>, Error> {
        let connection = self.lock()?;
        create_categories(user_id, templates, &connection)
    }
}
