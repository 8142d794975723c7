//! JSON endpoints for managing a user's categories.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    category::{
        NewCategory, create_category, delete_category, get_categories, get_category,
        seed_default_categories, update_category,
    },
    database_id::CategoryId,
    store::SQLiteLedgerStore,
    transaction::TransactionType,
    user::UserID,
};

/// The state needed for the category endpoints.
#[derive(Debug, Clone)]
pub struct CategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query string accepted when listing categories.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CategoryListParams {
    /// Only list categories of this type.
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
}

/// The response body for a request to seed the default categories.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SeedResponse {
    /// Whether the default categories were created by the request.
    pub created: bool,
    /// A short description of what happened.
    pub message: String,
}

/// List a user's categories ordered by name.
pub async fn list_categories_endpoint(
    State(state): State<CategoryState>,
    Path(user_id): Path<i64>,
    Query(params): Query<CategoryListParams>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(UserID::new(user_id), params.transaction_type, &connection)?;

    Ok(Json(categories).into_response())
}

/// Create a category for a user.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    Path(user_id): Path<i64>,
    Json(new_category): Json<NewCategory>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let category = create_category(new_category, UserID::new(user_id), &connection)?;
    tracing::debug!("Created category {} for user {user_id}", category.id);

    Ok((StatusCode::CREATED, Json(category)).into_response())
}

/// Get a single category.
pub async fn get_category_endpoint(
    State(state): State<CategoryState>,
    Path((user_id, category_id)): Path<(i64, CategoryId)>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let category = get_category(category_id, UserID::new(user_id), &connection)?;

    Ok(Json(category).into_response())
}

/// Replace the details of a category.
pub async fn update_category_endpoint(
    State(state): State<CategoryState>,
    Path((user_id, category_id)): Path<(i64, CategoryId)>,
    Json(new_category): Json<NewCategory>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let category = update_category(category_id, new_category, UserID::new(user_id), &connection)?;

    Ok(Json(category).into_response())
}

/// Delete a category that no transaction uses, responds with 204 No Content.
pub async fn delete_category_endpoint(
    State(state): State<CategoryState>,
    Path((user_id, category_id)): Path<(i64, CategoryId)>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_category(category_id, UserID::new(user_id), &connection)?;
    tracing::debug!("Deleted category {category_id} for user {user_id}");

    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Give a user the default categories if they have none.
///
/// Responds with 201 Created when the defaults were created and 200 OK otherwise.
pub async fn seed_default_categories_endpoint(
    State(store): State<SQLiteLedgerStore>,
    Path(user_id): Path<i64>,
) -> Result<Response, Error> {
    let user_id = UserID::new(user_id);
    let outcome =
        tokio::task::spawn_blocking(move || seed_default_categories(&store, user_id)).await??;

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(SeedResponse {
            created: outcome.created,
            message: outcome.message().to_owned(),
        }),
    )
        .into_response())
}
