//! Storage for the access tokens of linked bank connections.

use rusqlite::Connection;

use crate::{Error, UserID, plaid::provider::ExchangedToken};

/// Create the table that stores one access token per linked item.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_plaid_integration_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS plaid_integration (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                access_token TEXT NOT NULL,
                item_id TEXT NOT NULL,
                UNIQUE(user_id, item_id),
                FOREIGN KEY(user_id) REFERENCES user(user_id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Store the credentials for a newly linked item.
///
/// # Errors
///
/// Returns an:
/// - [Error::DuplicateLink] if `user_id` has already linked the item,
/// - [Error::NotFound] if `user_id` does not refer to a registered user,
/// - or [Error::SqlError] if some other SQL related error occurred.
pub fn insert_credential(
    user_id: UserID,
    token: &ExchangedToken,
    connection: &Connection,
) -> Result<(), Error> {
    connection
        .execute(
            "INSERT INTO plaid_integration (user_id, access_token, item_id) VALUES (?1, ?2, ?3)",
            (user_id.as_i64(), &token.access_token, &token.item_id),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateLink,
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::NotFound,
            error => error.into(),
        })?;

    Ok(())
}

/// Get the access token of the first item `user_id` linked.
///
/// # Errors
///
/// Returns an [Error::MissingAccessToken] if the user has not linked any items.
pub fn get_first_access_token(user_id: UserID, connection: &Connection) -> Result<String, Error> {
    connection
        .prepare(
            "SELECT access_token FROM plaid_integration WHERE user_id = :user_id ORDER BY id LIMIT 1",
        )?
        .query_row(&[(":user_id", &user_id.as_i64())], |row| row.get(0))
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::MissingAccessToken,
            error => error.into(),
        })
}

/// Count the items `user_id` has linked.
pub fn count_credentials(user_id: UserID, connection: &Connection) -> Result<usize, Error> {
    // SQLite integers are i64, rusqlite only reads them as usize with `fallible_uint`.
    let count: i64 = connection.query_row(
        "SELECT COUNT(id) FROM plaid_integration WHERE user_id = ?1",
        [user_id.as_i64()],
        |row| row.get(0),
    )?;

    usize::try_from(count)
        .map_err(|_| rusqlite::Error::IntegralValueOutOfRange(0, count).into())
}
