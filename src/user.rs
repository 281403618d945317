//! Code for creating the user table and fetching users from the database.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    database_id::{GENERATED_ID_SQL, UserId},
};

/// A member of the household.
///
/// List views only ever need a user's ID and email, so this is also the
/// shape used when a payment or transaction row is joined with its users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserId,
    /// The user's email address, unique across users.
    pub email: String,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS user (
                id TEXT PRIMARY KEY NOT NULL DEFAULT ({GENERATED_ID_SQL}),
                email TEXT NOT NULL UNIQUE
                )"
        ),
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// If `id` is `None` the database generates one.
///
/// # Errors
///
/// Returns a [Error::SqlError] if the email or ID is already taken, or for
/// any other SQL error.
pub fn create_user(id: Option<&str>, email: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(&format!(
            "INSERT INTO user (id, email) VALUES (COALESCE(?1, {GENERATED_ID_SQL}), ?2)
             RETURNING id, email"
        ))?
        .query_row((id, email), map_user_row)
        .map_err(Error::from)
}

/// Get every user ordered by email.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn get_all_users(connection: &Connection) -> Result<Vec<User>, Error> {
    connection
        .prepare("SELECT id, email FROM user ORDER BY email ASC")?
        .query_map([], map_user_row)?
        .map(|maybe_user| maybe_user.map_err(Error::from))
        .collect()
}

/// Map the columns `id, email` starting at `offset` to a [User].
pub(crate) fn map_user_columns(row: &Row, offset: usize) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get(offset)?,
        email: row.get(offset + 1)?,
    })
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    map_user_columns(row, 0)
}
