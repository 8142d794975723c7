//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    category::get_category,
    database_id::{CategoryId, TransactionId},
    user::UserID,
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
///
/// Both transactions and categories carry a type, and a transaction may only
/// be filed under a category of the same type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Money earned, e.g. a salary payment.
    Income,
    /// Money spent, e.g. groceries.
    Expense,
}

impl TransactionType {
    /// The tag used for this type in the database and in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "INCOME",
            TransactionType::Expense => "EXPENSE",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INCOME" => Ok(TransactionType::Income),
            "EXPENSE" => Ok(TransactionType::Expense),
            other => Err(Error::InvalidTransactionType(other.to_owned())),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// A strictly positive amount of money, at most [Amount::MAX].
///
/// Amounts are exact decimals so that summing many transactions never drifts
/// away from the cent-level total. They are stored as text in the database.
///
/// The upper bound keeps report totals and percentages well inside the range of [Decimal],
/// even when summing millions of the largest possible amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// The largest amount a single transaction can have, one quadrillion.
    pub const MAX: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

    /// Create an amount.
    ///
    /// # Errors
    ///
    /// This function will return an:
    /// - [Error::NonPositiveAmount] if `value` is zero or negative,
    /// - [Error::AmountTooLarge] if `value` is greater than [Amount::MAX].
    pub fn new(value: Decimal) -> Result<Self, Error> {
        if value <= Decimal::ZERO {
            Err(Error::NonPositiveAmount(value))
        } else if value > Self::MAX {
            Err(Error::AmountTooLarge(value))
        } else {
            Ok(Self(value))
        }
    }

    /// Create an amount without validation.
    ///
    /// The caller should ensure that `value` is greater than zero and at most [Amount::MAX].
    pub fn new_unchecked(value: Decimal) -> Self {
        debug_assert!(
            value > Decimal::ZERO && value <= Self::MAX,
            "amount {value} must be positive and at most {}",
            Self::MAX
        );
        Self(value)
    }

    /// The amount as a decimal number.
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = Error;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl FromStr for Amount {
    type Err = Error;

    /// Parse a decimal string such as "12.50" into an amount.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .map_err(|_| Error::InvalidAmount(s.to_owned()))?;

        Amount::new(value)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let decimal = Decimal::from_str(value.as_str()?)
            .map_err(|error| FromSqlError::Other(Box::new(error)))?;

        Amount::new(decimal).map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The amount of money spent or earned in this transaction.
    pub amount: Amount,
    /// A text description of what the transaction was for.
    pub description: Option<String>,
    /// When the transaction happened.
    pub date: Date,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The ID of the category the transaction belongs to.
    pub category_id: Option<CategoryId>,
    /// The owner of the transaction.
    pub user_id: UserID,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(amount: Amount, date: Date, transaction_type: TransactionType) -> TransactionBuilder {
        TransactionBuilder {
            amount,
            date,
            transaction_type,
            description: None,
            category_id: None,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// # Examples
///
/// ```ignore
/// use time::macros::date;
///
/// let builder = Transaction::build(
///         "45.99".parse()?,
///         date!(2025 - 01 - 15),
///         TransactionType::Expense,
///     )
///     .description("Coffee")
///     .category_id(Some(3));
///
/// let transaction = create_transaction(builder, user_id, &connection)?;
/// ```
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct TransactionBuilder {
    /// How much money was spent or earned.
    ///
    /// Always positive, the direction is given by `transaction_type`.
    pub amount: Amount,

    /// The date when the transaction occurred.
    pub date: Date,

    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,

    /// An optional human-readable description of the transaction.
    #[serde(default)]
    pub description: Option<String>,

    /// The category of the transaction, e.g. "Salary", "Housing".
    ///
    /// Must refer to one of the owner's categories with the same type as the
    /// transaction.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    ///
    /// Blank descriptions are stored as no description.
    pub fn description(mut self, description: &str) -> Self {
        self.description = normalize_description(Some(description.to_owned()));
        self
    }

    /// Set the category id for the transaction.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const TRANSACTION_COLUMNS: &str = "id, amount, description, date, type, category_id, user_id";

/// Create a new transaction for `user_id` in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if the category ID does not refer to one of the user's categories,
/// - [Error::CategoryTypeMismatch] if the category has a different type to the transaction,
/// - [Error::UnknownUser] if `user_id` does not refer to a registered user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    check_category(&builder, user_id, connection)?;

    connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" (amount, description, date, type, category_id, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                builder.amount,
                normalize_description(builder.description),
                builder.date,
                builder.transaction_type,
                builder.category_id,
                user_id.as_i64(),
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::UnknownUser(user_id),
            error => error.into(),
        })
}

/// Retrieve one of `user_id`'s transactions from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((id, user_id.as_i64()), map_transaction_row)
        .map_err(|error| error.into())
}

/// Replace the details of one of `user_id`'s transactions.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a transaction owned by `user_id`,
/// - [Error::InvalidCategory] or [Error::CategoryTypeMismatch] if the new category is not valid
///   for the transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    builder: TransactionBuilder,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    check_category(&builder, user_id, connection)?;

    connection
        .prepare(&format!(
            "UPDATE \"transaction\"
             SET amount = ?1, description = ?2, date = ?3, type = ?4, category_id = ?5
             WHERE id = ?6 AND user_id = ?7
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                builder.amount,
                normalize_description(builder.description),
                builder.date,
                builder.transaction_type,
                builder.category_id,
                id,
                user_id.as_i64(),
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingTransaction,
            error => error.into(),
        })
}

/// Delete one of `user_id`'s transactions.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Get the number of transactions owned by `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(user_id: UserID, connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE user_id = ?1;",
            [user_id.as_i64()],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Make sure the builder's category belongs to `user_id` and has the same type as the builder.
fn check_category(
    builder: &TransactionBuilder,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let Some(category_id) = builder.category_id else {
        return Ok(());
    };

    let category = get_category(category_id, user_id, connection).map_err(|error| match error {
        Error::NotFound => Error::InvalidCategory(Some(category_id)),
        error => error,
    })?;

    if category.transaction_type != builder.transaction_type {
        return Err(Error::CategoryTypeMismatch {
            transaction_type: builder.transaction_type,
            category_type: category.transaction_type,
        });
    }

    Ok(())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount TEXT NOT NULL,
                description TEXT,
                date TEXT NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('INCOME', 'EXPENSE')),
                category_id INTEGER,
                user_id INTEGER NOT NULL,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE RESTRICT,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);
        CREATE INDEX IF NOT EXISTS idx_transaction_category ON \"transaction\"(category_id);",
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        amount: row.get(1)?,
        description: row.get(2)?,
        date: row.get(3)?,
        transaction_type: row.get(4)?,
        category_id: row.get(5)?,
        user_id: UserID::new(row.get(6)?),
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod model_tests {
    use rust_decimal::Decimal;

    use crate::{
        Error,
        transaction::{Amount, TransactionType},
    };

    #[test]
    fn amount_rejects_zero() {
        assert_eq!(
            Amount::new(Decimal::ZERO),
            Err(Error::NonPositiveAmount(Decimal::ZERO))
        );
    }

    #[test]
    fn amount_rejects_negative() {
        let value = Decimal::new(-1050, 2);

        assert_eq!(Amount::new(value), Err(Error::NonPositiveAmount(value)));
    }

    #[test]
    fn amount_max_is_one_quadrillion() {
        assert_eq!(Amount::MAX, Decimal::new(1_000_000_000_000_000, 0));
    }

    #[test]
    fn amount_accepts_max() {
        assert_eq!(Amount::new(Amount::MAX).map(|amount| amount.value()), Ok(Amount::MAX));
    }

    #[test]
    fn amount_rejects_more_than_max() {
        let value = Amount::MAX + Decimal::new(1, 2);

        assert_eq!(Amount::new(value), Err(Error::AmountTooLarge(value)));
    }

    #[test]
    fn amount_rejects_values_near_decimal_limit() {
        let text = "50000000000000000000000000000";

        assert_eq!(
            text.parse::<Amount>(),
            Err(Error::AmountTooLarge(text.parse().unwrap()))
        );
        assert!(serde_json::from_str::<Amount>(&format!("\"{text}\"")).is_err());
    }

    #[test]
    fn amount_parses_decimal_string() {
        let amount: Amount = "12.50".parse().unwrap();

        assert_eq!(amount.value(), Decimal::new(1250, 2));
    }

    #[test]
    fn amount_rejects_text_that_is_not_a_number() {
        assert_eq!(
            "twelve".parse::<Amount>(),
            Err(Error::InvalidAmount("twelve".to_owned()))
        );
    }

    #[test]
    fn amount_deserialization_rejects_negative() {
        let result = serde_json::from_str::<Amount>("\"-3.00\"");

        assert!(result.is_err());
    }

    #[test]
    fn transaction_type_parses_upper_case_tags() {
        assert_eq!("INCOME".parse(), Ok(TransactionType::Income));
        assert_eq!("EXPENSE".parse(), Ok(TransactionType::Expense));
    }

    #[test]
    fn transaction_type_rejects_unknown_tags() {
        assert_eq!(
            "income".parse::<TransactionType>(),
            Err(Error::InvalidTransactionType("income".to_owned()))
        );
    }

    #[test]
    fn transaction_type_serializes_as_tag() {
        let json = serde_json::to_string(&TransactionType::Expense).unwrap();

        assert_eq!(json, "\"EXPENSE\"");
    }
}
