//! Transactions: the income and expense records of a ledger.
//!
//! This module contains:
//! - Core domain types ([Transaction], [TransactionBuilder], [Amount], [TransactionType])
//! - Database operations (create, read, update, delete, and filtered queries)
//! - JSON endpoints for the HTTP API

mod core;
mod endpoints;
mod query;

pub use core::{
    Amount, Transaction, TransactionBuilder, TransactionType, count_transactions,
    create_transaction, create_transaction_table, delete_transaction, get_transaction,
    map_transaction_row, update_transaction,
};
pub use endpoints::{
    create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
    list_transactions_endpoint, update_transaction_endpoint,
};
pub use query::{SortOrder, TransactionQuery, date_range, get_transactions};
