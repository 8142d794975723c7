//! JSON endpoints for managing a user's transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    database_id::{CategoryId, TransactionId},
    transaction::{
        TransactionBuilder, TransactionQuery, TransactionType, create_transaction,
        delete_transaction, get_transaction, get_transactions, query::date_range,
        update_transaction,
    },
    user::UserID,
};

/// The state needed for the transaction endpoints.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query string accepted when listing transactions.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TransactionListParams {
    /// Only list transactions of this type.
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    /// The first date to include, requires `end_date`.
    pub start_date: Option<Date>,
    /// The last date to include, requires `start_date`.
    pub end_date: Option<Date>,
    /// Only list transactions in this category.
    pub category_id: Option<CategoryId>,
    /// The maximum number of transactions to return.
    pub limit: Option<u32>,
}

impl TryFrom<TransactionListParams> for TransactionQuery {
    type Error = Error;

    fn try_from(params: TransactionListParams) -> Result<Self, Self::Error> {
        Ok(TransactionQuery {
            transaction_type: params.transaction_type,
            date_range: date_range(params.start_date, params.end_date)?,
            category_id: params.category_id,
            limit: params.limit,
            sort_date: None,
        })
    }
}

/// List a user's transactions, most recent first.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
    Path(user_id): Path<i64>,
    Query(params): Query<TransactionListParams>,
) -> Result<Response, Error> {
    let query = TransactionQuery::try_from(params)?;
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions(UserID::new(user_id), &query, &connection)?;

    Ok(Json(transactions).into_response())
}

/// Create a transaction for a user.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(user_id): Path<i64>,
    Json(builder): Json<TransactionBuilder>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = create_transaction(builder, UserID::new(user_id), &connection)?;
    tracing::debug!("Created transaction {} for user {user_id}", transaction.id);

    Ok((StatusCode::CREATED, Json(transaction)).into_response())
}

/// Get a single transaction.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    Path((user_id, transaction_id)): Path<(i64, TransactionId)>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = get_transaction(transaction_id, UserID::new(user_id), &connection)?;

    Ok(Json(transaction).into_response())
}

/// Replace the details of a transaction.
pub async fn update_transaction_endpoint(
    State(state): State<TransactionState>,
    Path((user_id, transaction_id)): Path<(i64, TransactionId)>,
    Json(builder): Json<TransactionBuilder>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction =
        update_transaction(transaction_id, builder, UserID::new(user_id), &connection)?;

    Ok(Json(transaction).into_response())
}

/// Delete a transaction, responds with 204 No Content.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Path((user_id, transaction_id)): Path<(i64, TransactionId)>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_transaction(transaction_id, UserID::new(user_id), &connection)?;
    tracing::debug!("Deleted transaction {transaction_id} for user {user_id}");

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[cfg(test)]
mod transaction_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Json,
        body::to_bytes,
        extract::{Path, Query, State},
        http::StatusCode,
        response::Response,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        db::initialize,
        transaction::{Transaction, TransactionType, count_transactions, create_transaction},
        user::{User, create_user},
    };

    use super::{
        TransactionListParams, TransactionState, create_transaction_endpoint,
        delete_transaction_endpoint, get_transaction_endpoint, list_transactions_endpoint,
    };

    fn get_test_state() -> (TransactionState, User) {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");
        let user = create_user("Test User", &connection).expect("Could not create test user");

        (
            TransactionState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user,
        )
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Could not read response body");

        serde_json::from_slice(&body).expect("Could not parse response body as JSON")
    }

    #[tokio::test]
    async fn create_responds_with_created_transaction() {
        let (state, user) = get_test_state();
        let builder = Transaction::build(
            "42.50".parse().unwrap(),
            date!(2024 - 01 - 10),
            TransactionType::Expense,
        )
        .description("Groceries");

        let response = create_transaction_endpoint(
            State(state.clone()),
            Path(user.id.as_i64()),
            Json(builder),
        )
        .await
        .expect("Could not create transaction");

        assert_eq!(response.status(), StatusCode::CREATED);
        let transaction: Transaction = parse_json(response).await;
        assert_eq!(transaction.amount, "42.50".parse().unwrap());
        assert_eq!(transaction.description.as_deref(), Some("Groceries"));
        let count = count_transactions(user.id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn list_rejects_half_open_date_range() {
        let (state, user) = get_test_state();

        let result = list_transactions_endpoint(
            State(state),
            Path(user.id.as_i64()),
            Query(TransactionListParams {
                start_date: Some(date!(2024 - 01 - 01)),
                ..Default::default()
            }),
        )
        .await;

        assert_eq!(result.err(), Some(Error::InvalidDateRange));
    }

    #[tokio::test]
    async fn list_applies_limit() {
        let (state, user) = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            for day in 1..=7 {
                create_transaction(
                    Transaction::build(
                        "1".parse().unwrap(),
                        date!(2024 - 01 - 01).replace_day(day).unwrap(),
                        TransactionType::Expense,
                    ),
                    user.id,
                    &connection,
                )
                .unwrap();
            }
        }

        let response = list_transactions_endpoint(
            State(state),
            Path(user.id.as_i64()),
            Query(TransactionListParams {
                limit: Some(5),
                ..Default::default()
            }),
        )
        .await
        .expect("Could not list transactions");

        let transactions: Vec<Transaction> = parse_json(response).await;
        assert_eq!(transactions.len(), 5);
        assert_eq!(transactions[0].date, date!(2024 - 01 - 07));
    }

    #[tokio::test]
    async fn get_missing_transaction_is_not_found() {
        let (state, user) = get_test_state();

        let result =
            get_transaction_endpoint(State(state), Path((user.id.as_i64(), 999))).await;

        assert_eq!(result.err(), Some(Error::NotFound));
    }

    #[tokio::test]
    async fn delete_responds_with_no_content() {
        let (state, user) = get_test_state();
        let transaction = create_transaction(
            Transaction::build(
                "3".parse().unwrap(),
                date!(2024 - 01 - 10),
                TransactionType::Income,
            ),
            user.id,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = delete_transaction_endpoint(
            State(state.clone()),
            Path((user.id.as_i64(), transaction.id)),
        )
        .await
        .expect("Could not delete transaction");

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let count = count_transactions(user.id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(count, 0);
    }
}
