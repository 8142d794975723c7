//! JSON endpoints for a user's reports.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    report::{ReportQuery, build_report, get_category_statistics, get_summary},
    store::SQLiteLedgerStore,
    transaction::{TransactionType, date_range},
    user::UserID,
};

/// The query string accepted by the report endpoints.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ReportParams {
    /// Which categories to break down, required by the full and category reports.
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    /// The first date to include, requires `end_date`.
    pub start_date: Option<Date>,
    /// The last date to include, requires `start_date`.
    pub end_date: Option<Date>,
}

impl TryFrom<ReportParams> for ReportQuery {
    type Error = Error;

    fn try_from(params: ReportParams) -> Result<Self, Self::Error> {
        let date_range = date_range(params.start_date, params.end_date)?;
        let transaction_type = params
            .transaction_type
            .ok_or(Error::MissingTransactionType)?;

        Ok(ReportQuery {
            transaction_type,
            date_range,
        })
    }
}

/// Get the summary and category statistics for a user.
pub async fn get_report_endpoint(
    State(store): State<SQLiteLedgerStore>,
    Path(user_id): Path<i64>,
    Query(params): Query<ReportParams>,
) -> Result<Response, Error> {
    let query = ReportQuery::try_from(params)?;
    let report = build_report(&store, UserID::new(user_id), &query).await?;

    Ok(Json(report).into_response())
}

/// Get the income and expense summary for a user.
///
/// The summary covers both types, so the `type` parameter is ignored.
pub async fn get_summary_endpoint(
    State(store): State<SQLiteLedgerStore>,
    Path(user_id): Path<i64>,
    Query(params): Query<ReportParams>,
) -> Result<Response, Error> {
    let date_range = date_range(params.start_date, params.end_date)?;
    let summary = get_summary(&store, UserID::new(user_id), date_range).await?;

    Ok(Json(summary).into_response())
}

/// Get the per-category statistics for a user.
pub async fn get_category_statistics_endpoint(
    State(store): State<SQLiteLedgerStore>,
    Path(user_id): Path<i64>,
    Query(params): Query<ReportParams>,
) -> Result<Response, Error> {
    let query = ReportQuery::try_from(params)?;
    let statistics = get_category_statistics(&store, UserID::new(user_id), &query).await?;

    Ok(Json(statistics).into_response())
}
