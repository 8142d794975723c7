//! Ledgerline is a personal finance ledger with a reporting engine.
//!
//! Owners record income and expense transactions, organise them into typed
//! categories, and pull summaries and per-category breakdowns over any date
//! range. The library exposes the ledger and the reports as a JSON API served
//! with axum, and the pure aggregation functions for in-process use.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::signal;

mod app_state;
mod category;
mod database_id;
mod db;
pub mod endpoints;
mod logging;
mod report;
mod routing;
mod store;
mod transaction;
mod user;

pub use app_state::AppState;
pub use category::{
    Category, CategoryName, CategoryTemplate, DEFAULT_CATEGORIES, NewCategory, SeedOutcome,
    create_category, get_categories, seed_default_categories,
};
pub use database_id::{CategoryId, DatabaseId, TransactionId};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use report::{
    CategoryStatistic, CategoryStatistics, Report, ReportQuery, Summary, build_report,
    compute_category_statistics, compute_summary, get_category_statistics, get_summary,
};
pub use routing::build_router;
pub use store::{LedgerStore, SQLiteLedgerStore};
pub use transaction::{
    Amount, SortOrder, Transaction, TransactionBuilder, TransactionQuery, TransactionType,
    count_transactions, create_transaction, date_range, get_transactions,
};
pub use user::{User, UserID, create_user, get_user_by_id};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// An empty string was used to register a user.
    #[error("User name cannot be empty")]
    EmptyUserName,

    /// A transaction amount was zero or negative.
    ///
    /// Transactions record how much money moved, the direction is given by
    /// the transaction type, so amounts must be strictly positive.
    #[error("{0} is not a valid amount, amounts must be greater than zero")]
    NonPositiveAmount(Decimal),

    /// A transaction amount was larger than [Amount::MAX].
    #[error("{0} is not a valid amount, amounts must be at most {max}", max = Amount::MAX)]
    AmountTooLarge(Decimal),

    /// A string could not be parsed as a decimal amount.
    #[error("could not parse \"{0}\" as an amount")]
    InvalidAmount(String),

    /// A string could not be parsed as `INCOME` or `EXPENSE`.
    #[error("\"{0}\" is not a valid transaction type, expected INCOME or EXPENSE")]
    InvalidTransactionType(String),

    /// A category report was requested without choosing income or expense categories.
    #[error("a transaction type is required, expected type=INCOME or type=EXPENSE")]
    MissingTransactionType,

    /// A date range was incomplete or its start came after its end.
    #[error("invalid date range, provide both a start and end date with start <= end")]
    InvalidDateRange,

    /// The owner already has a category with this name and type.
    #[error("a {1} category named \"{0}\" already exists")]
    DuplicateCategoryName(String, TransactionType),

    /// The category ID used for a transaction does not refer to one of the
    /// owner's categories.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory(Option<CategoryId>),

    /// A transaction was assigned to a category of the other type.
    #[error("a {transaction_type} transaction cannot use a {category_type} category")]
    CategoryTypeMismatch {
        /// The type of the transaction.
        transaction_type: TransactionType,
        /// The declared type of the category.
        category_type: TransactionType,
    },

    /// The category is referenced by at least one transaction, so it cannot
    /// be deleted or change its type.
    #[error("the category is being used in transactions")]
    CategoryInUse,

    /// The user ID does not refer to a registered user.
    #[error("the user {0} does not exist")]
    UnknownUser(UserID),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// A background task running a store query panicked or was aborted.
    #[error("a background task failed: {0}")]
    TaskFailed(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(value: tokio::task::JoinError) -> Self {
        tracing::error!("a blocking store task failed: {value}");
        Error::TaskFailed(value.to_string())
    }
}

/// The JSON body sent to the client when a request fails.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    /// A human readable description of what went wrong.
    pub error: String,
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::EmptyCategoryName
            | Error::EmptyUserName
            | Error::NonPositiveAmount(_)
            | Error::AmountTooLarge(_)
            | Error::InvalidAmount(_)
            | Error::InvalidTransactionType(_)
            | Error::MissingTransactionType
            | Error::InvalidDateRange
            | Error::InvalidCategory(_)
            | Error::CategoryTypeMismatch { .. } => StatusCode::BAD_REQUEST,
            Error::DuplicateCategoryName(_, _) | Error::CategoryInUse => StatusCode::CONFLICT,
            Error::UnknownUser(_)
            | Error::NotFound
            | Error::UpdateMissingCategory
            | Error::DeleteMissingCategory
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction => StatusCode::NOT_FOUND,
            Error::SqlError(_) | Error::DatabaseLockError | Error::TaskFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal errors are not intended to be shown to the client.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod error_response_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{Error, TransactionType};

    #[test]
    fn validation_errors_are_bad_requests() {
        let response = Error::CategoryTypeMismatch {
            transaction_type: TransactionType::Income,
            category_type: TransactionType::Expense,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn conflicts_use_conflict_status() {
        let response = Error::CategoryInUse.into_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn store_failures_are_internal_errors() {
        let response = Error::DatabaseLockError.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
