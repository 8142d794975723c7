//! Filtered retrieval of a user's transactions.

use std::ops::RangeInclusive;

use rusqlite::{Connection, params_from_iter, types::Value};
use time::Date;

use crate::{
    Error,
    database_id::CategoryId,
    transaction::{Transaction, TransactionType, map_transaction_row},
    user::UserID,
};

/// Defines how transactions should be fetched from [get_transactions].
///
/// Every field narrows the result, the default query returns all of a user's transactions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionQuery {
    /// Only include transactions of this type.
    pub transaction_type: Option<TransactionType>,
    /// Include transactions within `date_range` (inclusive).
    pub date_range: Option<RangeInclusive<Date>>,
    /// Only include transactions filed under this category.
    pub category_id: Option<CategoryId>,
    /// Selects up to the first N (`limit`) transactions.
    pub limit: Option<u32>,
    /// Orders transactions by date in the order `sort_date`. None sorts the most recent first.
    pub sort_date: Option<SortOrder>,
}

/// The order to sort transactions in a [TransactionQuery].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Sort in order of increasing value.
    Ascending,
    /// Sort in order of decreasing value.
    Descending,
}

/// Build an inclusive date range from optional query bounds.
///
/// Returns `None` when neither bound is given.
///
/// # Errors
/// Returns [Error::InvalidDateRange] if only one bound is given, or if `start` is after `end`.
pub fn date_range(
    start: Option<Date>,
    end: Option<Date>,
) -> Result<Option<RangeInclusive<Date>>, Error> {
    match (start, end) {
        (None, None) => Ok(None),
        (Some(start), Some(end)) if start <= end => Ok(Some(start..=end)),
        _ => Err(Error::InvalidDateRange),
    }
}

/// Get the transactions owned by `user_id` that match `query`.
///
/// Transactions on the same date are ordered by ID so the order is stable.
///
/// # Errors
/// Returns [Error::SqlError] if:
/// - SQL query preparation or execution fails
/// - a stored row cannot be mapped to a [Transaction], e.g. it has an unknown type tag
pub fn get_transactions(
    user_id: UserID,
    query: &TransactionQuery,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut sql = String::from(
        "SELECT id, amount, description, date, type, category_id, user_id
         FROM \"transaction\" WHERE user_id = ?",
    );
    let mut params = vec![Value::Integer(user_id.as_i64())];

    if let Some(transaction_type) = query.transaction_type {
        sql.push_str(" AND type = ?");
        params.push(Value::Text(transaction_type.as_str().to_owned()));
    }

    if let Some(date_range) = &query.date_range {
        sql.push_str(" AND date BETWEEN ? AND ?");
        params.push(Value::Text(date_range.start().to_string()));
        params.push(Value::Text(date_range.end().to_string()));
    }

    if let Some(category_id) = query.category_id {
        sql.push_str(" AND category_id = ?");
        params.push(Value::Integer(category_id));
    }

    match query.sort_date {
        Some(SortOrder::Ascending) => sql.push_str(" ORDER BY date ASC, id ASC"),
        Some(SortOrder::Descending) | None => sql.push_str(" ORDER BY date DESC, id DESC"),
    }

    if let Some(limit) = query.limit {
        sql.push_str(" LIMIT ?");
        params.push(Value::Integer(i64::from(limit)));
    }

    connection
        .prepare(&sql)?
        .query_map(params_from_iter(params), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}


#[cfg(test)]
mod query_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        category::{CategoryName, NewCategory, create_category},
        db::initialize,
        transaction::{Transaction, TransactionType, create_transaction},
        user::{User, create_user},
    };

    use super::{SortOrder, TransactionQuery, get_transactions};

    fn get_test_connection() -> (Connection, User) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user = create_user("Test User", &conn).unwrap();
        (conn, user)
    }

    fn insert(
        conn: &Connection,
        user: &User,
        amount: &str,
        transaction_type: TransactionType,
        date: time::Date,
    ) -> Transaction {
        create_transaction(
            Transaction::build(amount.parse().unwrap(), date, transaction_type),
            user.id,
            conn,
        )
        .expect("Could not create transaction")
    }

    #[test]
    fn returns_only_the_users_transactions() {
        let (conn, user) = get_test_connection();
        let other_user = create_user("Other", &conn).unwrap();
        let want = insert(&conn, &user, "10", TransactionType::Income, date!(2024 - 01 - 05));
        insert(&conn, &other_user, "20", TransactionType::Income, date!(2024 - 01 - 05));

        let got = get_transactions(user.id, &TransactionQuery::default(), &conn).unwrap();

        assert_eq!(got, vec![want]);
    }

    #[test]
    fn filters_by_inclusive_date_range() {
        let (conn, user) = get_test_connection();
        let first = insert(&conn, &user, "1", TransactionType::Expense, date!(2024 - 01 - 01));
        let last = insert(&conn, &user, "2", TransactionType::Expense, date!(2024 - 01 - 31));
        insert(&conn, &user, "3", TransactionType::Expense, date!(2023 - 12 - 31));
        insert(&conn, &user, "4", TransactionType::Expense, date!(2024 - 02 - 01));

        let query = TransactionQuery {
            date_range: Some(date!(2024 - 01 - 01)..=date!(2024 - 01 - 31)),
            ..Default::default()
        };
        let got = get_transactions(user.id, &query, &conn).unwrap();

        assert_eq!(got, vec![last, first]);
    }

    #[test]
    fn filters_by_type() {
        let (conn, user) = get_test_connection();
        let income = insert(&conn, &user, "100", TransactionType::Income, date!(2024 - 01 - 05));
        insert(&conn, &user, "40", TransactionType::Expense, date!(2024 - 01 - 10));

        let query = TransactionQuery {
            transaction_type: Some(TransactionType::Income),
            ..Default::default()
        };
        let got = get_transactions(user.id, &query, &conn).unwrap();

        assert_eq!(got, vec![income]);
    }

    #[test]
    fn filters_by_category() {
        let (conn, user) = get_test_connection();
        let food = create_category(
            NewCategory::new(CategoryName::new_unchecked("Food"), TransactionType::Expense),
            user.id,
            &conn,
        )
        .unwrap();
        let want = create_transaction(
            Transaction::build("15".parse().unwrap(), date!(2024 - 01 - 10), TransactionType::Expense)
                .category_id(Some(food.id)),
            user.id,
            &conn,
        )
        .unwrap();
        insert(&conn, &user, "40", TransactionType::Expense, date!(2024 - 01 - 10));

        let query = TransactionQuery {
            category_id: Some(food.id),
            ..Default::default()
        };
        let got = get_transactions(user.id, &query, &conn).unwrap();

        assert_eq!(got, vec![want]);
    }

    #[test]
    fn default_order_is_most_recent_first() {
        let (conn, user) = get_test_connection();
        let older = insert(&conn, &user, "1", TransactionType::Expense, date!(2024 - 01 - 01));
        let newer = insert(&conn, &user, "2", TransactionType::Expense, date!(2024 - 03 - 01));
        let same_day_later_id =
            insert(&conn, &user, "3", TransactionType::Expense, date!(2024 - 03 - 01));

        let got = get_transactions(user.id, &TransactionQuery::default(), &conn).unwrap();

        assert_eq!(got, vec![same_day_later_id, newer, older]);
    }

    #[test]
    fn ascending_order_with_limit() {
        let (conn, user) = get_test_connection();
        let first = insert(&conn, &user, "1", TransactionType::Expense, date!(2024 - 01 - 01));
        let second = insert(&conn, &user, "2", TransactionType::Expense, date!(2024 - 02 - 01));
        insert(&conn, &user, "3", TransactionType::Expense, date!(2024 - 03 - 01));

        let query = TransactionQuery {
            limit: Some(2),
            sort_date: Some(SortOrder::Ascending),
            ..Default::default()
        };
        let got = get_transactions(user.id, &query, &conn).unwrap();

        assert_eq!(got, vec![first, second]);
    }

    #[test]
    fn fails_on_unknown_type_tag() {
        let (conn, user) = get_test_connection();
        insert(&conn, &user, "1", TransactionType::Expense, date!(2024 - 01 - 01));
        // Bypass the CHECK constraint to simulate a corrupted row.
        conn.execute_batch(
            "PRAGMA ignore_check_constraints = ON;
             UPDATE \"transaction\" SET type = 'REFUND';",
        )
        .unwrap();

        let result = get_transactions(user.id, &TransactionQuery::default(), &conn);

        assert!(result.is_err(), "want error for unknown type tag, got {result:?}");
    }
}
