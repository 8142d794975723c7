//! Database operations for categories.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    category::{Category, CategoryName, CategoryTemplate, NewCategory},
    database_id::CategoryId,
    transaction::TransactionType,
    user::UserID,
};

const CATEGORY_COLUMNS: &str = "id, name, type, color, icon, user_id";

/// Create a category for `user_id` and return it with its generated ID.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateCategoryName] if the user already has a category with the same name and
///   type,
/// - [Error::UnknownUser] if `user_id` does not refer to a registered user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_category(
    new_category: NewCategory,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(&format!(
            "INSERT INTO category (name, type, color, icon, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING {CATEGORY_COLUMNS}"
        ))?
        .query_row(
            (
                new_category.name.as_ref(),
                new_category.transaction_type,
                &new_category.color,
                &new_category.icon,
                user_id.as_i64(),
            ),
            map_category_row,
        )
        .map_err(|error| map_write_error(error, &new_category, user_id))
}

/// Retrieve one of `user_id`'s categories by ID.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `category_id` does not refer to a category owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category WHERE id = ?1 AND user_id = ?2;"
        ))?
        .query_row((category_id, user_id.as_i64()), map_category_row)
        .map_err(|error| error.into())
}

/// Retrieve `user_id`'s categories ordered by name.
///
/// Names are compared byte by byte, so upper case sorts before lower case.
/// If `transaction_type` is `None`, categories of both types are returned.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails or a row has an unknown type tag.
pub fn get_categories(
    user_id: UserID,
    transaction_type: Option<TransactionType>,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    match transaction_type {
        Some(transaction_type) => connection
            .prepare(&format!(
                "SELECT {CATEGORY_COLUMNS} FROM category
                 WHERE user_id = ?1 AND type = ?2
                 ORDER BY name ASC, id ASC;"
            ))?
            .query_map((user_id.as_i64(), transaction_type), map_category_row)?
            .map(|maybe_category| maybe_category.map_err(|error| error.into()))
            .collect(),
        None => connection
            .prepare(&format!(
                "SELECT {CATEGORY_COLUMNS} FROM category
                 WHERE user_id = ?1
                 ORDER BY name ASC, id ASC;"
            ))?
            .query_map((user_id.as_i64(),), map_category_row)?
            .map(|maybe_category| maybe_category.map_err(|error| error.into()))
            .collect(),
    }
}

/// Replace the details of one of `user_id`'s categories.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingCategory] if `category_id` does not refer to a category owned by
///   `user_id`,
/// - [Error::CategoryInUse] if the type would change while transactions use the category,
/// - [Error::DuplicateCategoryName] if another of the user's categories has the same name and
///   type,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_category(
    category_id: CategoryId,
    new_category: NewCategory,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    let existing =
        get_category(category_id, user_id, connection).map_err(|error| match error {
            Error::NotFound => Error::UpdateMissingCategory,
            error => error,
        })?;

    if existing.transaction_type != new_category.transaction_type
        && count_category_transactions(category_id, connection)? > 0
    {
        return Err(Error::CategoryInUse);
    }

    connection
        .prepare(&format!(
            "UPDATE category SET name = ?1, type = ?2, color = ?3, icon = ?4
             WHERE id = ?5 AND user_id = ?6
             RETURNING {CATEGORY_COLUMNS}"
        ))?
        .query_row(
            (
                new_category.name.as_ref(),
                new_category.transaction_type,
                &new_category.color,
                &new_category.icon,
                category_id,
                user_id.as_i64(),
            ),
            map_category_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingCategory,
            error => map_write_error(error, &new_category, user_id),
        })
}

/// Delete one of `user_id`'s categories.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingCategory] if `category_id` does not refer to a category owned by
///   `user_id`,
/// - [Error::CategoryInUse] if any transaction uses the category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    get_category(category_id, user_id, connection).map_err(|error| match error {
        Error::NotFound => Error::DeleteMissingCategory,
        error => error,
    })?;

    if count_category_transactions(category_id, connection)? > 0 {
        return Err(Error::CategoryInUse);
    }

    let rows_affected = connection
        .execute(
            "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
            (category_id, user_id.as_i64()),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::CategoryInUse,
            error => error.into(),
        })?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

/// Get the number of categories owned by `user_id`.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn count_categories(user_id: UserID, connection: &Connection) -> Result<usize, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM category WHERE user_id = ?1;",
            [user_id.as_i64()],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Create a category for each template in a single database transaction.
///
/// Either every category is created or none are.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateCategoryName] if any template clashes with an existing category,
/// - [Error::UnknownUser] if `user_id` does not refer to a registered user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_categories(
    user_id: UserID,
    templates: &[CategoryTemplate],
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    let transaction = connection.unchecked_transaction()?;

    let categories = templates
        .iter()
        .map(|template| create_category(NewCategory::from(template), user_id, &transaction))
        .collect::<Result<Vec<_>, _>>()?;

    transaction.commit()?;

    Ok(categories)
}

/// Initialize the category table and indexes.
///
/// # Errors
/// Returns an error if the table cannot be created.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('INCOME', 'EXPENSE')),
            color TEXT,
            icon TEXT,
            user_id INTEGER NOT NULL,
            UNIQUE(user_id, name, type),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_user_type ON category(user_id, type);",
    )?;

    Ok(())
}

fn count_category_transactions(
    category_id: CategoryId,
    connection: &Connection,
) -> Result<usize, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE category_id = ?1;",
            [category_id],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

fn map_write_error(error: rusqlite::Error, new_category: &NewCategory, user_id: UserID) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            },
            _,
        ) => Error::DuplicateCategoryName(
            new_category.name.to_string(),
            new_category.transaction_type,
        ),
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            },
            _,
        ) => Error::UnknownUser(user_id),
        error => error.into(),
    }
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let raw_name: String = row.get(1)?;

    Ok(Category {
        id: row.get(0)?,
        name: CategoryName::new_unchecked(&raw_name),
        transaction_type: row.get(2)?,
        color: row.get(3)?,
        icon: row.get(4)?,
        user_id: UserID::new(row.get(5)?),
    })
}
