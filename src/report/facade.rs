//! Builds reports by reading from a [LedgerStore] and running the aggregation functions.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    report::{
        CategoryStatistics, Summary, compute_category_statistics, compute_summary,
        group_by_category,
    },
    store::LedgerStore,
    transaction::{TransactionQuery, TransactionType},
    user::UserID,
};

/// What a report should cover.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportQuery {
    /// Which categories to break down.
    ///
    /// Percentages are shares of one type's total, so income and expense categories are never
    /// mixed. The summary always covers both types.
    pub transaction_type: TransactionType,
    /// Only include transactions within this inclusive range. `None` includes all dates.
    pub date_range: Option<RangeInclusive<Date>>,
}

impl ReportQuery {
    /// A query for every transaction of `transaction_type`, regardless of date.
    pub fn new(transaction_type: TransactionType) -> Self {
        Self {
            transaction_type,
            date_range: None,
        }
    }
}

/// A summary and a per-category breakdown of a user's ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Income and expense totals over the date range.
    pub summary: Summary,
    /// Per-category totals over the date range.
    pub category_statistics: CategoryStatistics,
}

/// Build the summary and the category statistics for `user_id`.
///
/// The two halves are read and computed concurrently on the blocking thread pool. They are
/// separate reads, so a write that lands between them may be reflected in only one half.
///
/// If the returned future is dropped, queries that are already running finish in the background
/// and their results are discarded.
///
/// # Errors
/// Returns the first error from either half, a report is never partially built.
pub async fn build_report<S>(
    store: &S,
    user_id: UserID,
    query: &ReportQuery,
) -> Result<Report, Error>
where
    S: LedgerStore + Clone + Send + 'static,
{
    let (summary, category_statistics) = tokio::try_join!(
        get_summary(store, user_id, query.date_range.clone()),
        get_category_statistics(store, user_id, query),
    )?;

    Ok(Report {
        summary,
        category_statistics,
    })
}

/// Summarise all of `user_id`'s income and expenses in `date_range`, or of all time if `None`.
///
/// # Errors
/// Returns an error if the store fails or the background task panics.
pub async fn get_summary<S>(
    store: &S,
    user_id: UserID,
    date_range: Option<RangeInclusive<Date>>,
) -> Result<Summary, Error>
where
    S: LedgerStore + Clone + Send + 'static,
{
    let store = store.clone();
    let transaction_query = TransactionQuery {
        date_range,
        ..Default::default()
    };

    tokio::task::spawn_blocking(move || {
        let transactions = store.find_transactions(user_id, &transaction_query)?;
        tracing::debug!(
            "Summarising {} transactions for user {user_id}",
            transactions.len()
        );

        Ok(compute_summary(&transactions))
    })
    .await?
}

/// Break down `user_id`'s transactions of the query's type and date range by category.
///
/// Every category of the query's type is included, even those without transactions. Categories
/// and transactions of the other type are left out of the statistics and the overall total.
///
/// # Errors
/// Returns an error if the store fails or the background task panics.
pub async fn get_category_statistics<S>(
    store: &S,
    user_id: UserID,
    query: &ReportQuery,
) -> Result<CategoryStatistics, Error>
where
    S: LedgerStore + Clone + Send + 'static,
{
    let store = store.clone();
    let transaction_type = query.transaction_type;
    let transaction_query = TransactionQuery {
        transaction_type: Some(transaction_type),
        date_range: query.date_range.clone(),
        ..Default::default()
    };

    tokio::task::spawn_blocking(move || {
        let categories = store.find_categories(user_id, Some(transaction_type))?;
        let transactions = store.find_transactions(user_id, &transaction_query)?;

        Ok(compute_category_statistics(
            &categories,
            &group_by_category(transactions),
        ))
    })
    .await?
}
