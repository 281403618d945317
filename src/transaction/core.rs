//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    category::{Category, map_category_columns},
    database_id::{CategoryId, GENERATED_ID_SQL, RowsAffected, TransactionId, UserId},
    db::query_sum,
    timezone::to_stored_utc,
    user::{User, map_user_columns},
};

// ============================================================================
// MODELS
// ============================================================================

/// Money a member of the household spent on something.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent.
    pub amount: f64,
    /// When the transaction happened, in UTC.
    pub date: OffsetDateTime,
    /// The user who spent the money.
    pub user_id: UserId,
    /// The category the transaction belongs to.
    pub category_id: CategoryId,
    /// Whether this was a shared (panini) expense.
    pub panini: bool,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        description: &str,
        amount: f64,
        date: OffsetDateTime,
        user_id: &str,
        category_id: &str,
    ) -> TransactionBuilder {
        TransactionBuilder {
            description: description.to_owned(),
            amount,
            date,
            user_id: user_id.to_owned(),
            category_id: category_id.to_owned(),
            panini: false,
            notes: None,
        }
    }
}

/// A builder for creating and updating [Transaction]s.
///
/// # Examples
///
/// ```ignore
/// use time::macros::datetime;
///
/// let transaction = Transaction::build(
///         "Groceries",
///         42.50,
///         datetime!(2024-01-05 0:00 UTC),
///         "u1",
///         "c1",
///     )
///     .panini(true)
///     .notes(Some("Split with flatmates".to_owned()));
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// A text description of what the transaction was for.
    pub description: String,

    /// The amount of money spent.
    pub amount: f64,

    /// When the transaction happened.
    ///
    /// Converted to UTC before it is written so that stored dates compare in
    /// chronological order.
    pub date: OffsetDateTime,

    /// The user who spent the money.
    pub user_id: UserId,

    /// The category of the transaction, e.g. "Groceries" or "Rent".
    pub category_id: CategoryId,

    /// Whether this was a shared (panini) expense.
    ///
    /// Panini transactions are left out of personal spending totals and
    /// are reported on their own.
    pub panini: bool,

    /// Free-form notes.
    pub notes: Option<String>,
}

impl TransactionBuilder {
    /// Set the panini flag.
    pub fn panini(mut self, panini: bool) -> Self {
        self.panini = panini;
        self
    }

    /// Set the notes for the transaction.
    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }
}

/// A transaction row for the transactions list, with its user and category attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionListItem {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent.
    pub amount: f64,
    /// When the transaction happened, in UTC.
    pub date: OffsetDateTime,
    /// Whether this was a shared (panini) expense.
    pub panini: bool,
    /// The user who spent the money.
    pub user: User,
    /// The category of the transaction.
    pub category: Category,
}

/// The amount spent in a single category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// The category the amount was spent in.
    pub category_id: CategoryId,
    /// The sum of the category's transactions.
    pub amount: f64,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id TEXT PRIMARY KEY NOT NULL DEFAULT ({GENERATED_ID_SQL}),
                description TEXT NOT NULL,
                amount REAL NOT NULL,
                date TEXT NOT NULL,
                user_id TEXT NOT NULL,
                category_id TEXT NOT NULL,
                panini INTEGER NOT NULL DEFAULT 0,
                notes TEXT,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE
                )"
        ),
        (),
    )?;

    // Used by the listing order and the dashboard's date range query.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(date);",
        (),
    )?;

    Ok(())
}

/// Create a new transaction in the database from a builder.
///
/// # Errors
/// This function will return a [Error::SqlError] if the user or category does
/// not exist or there is some other SQL error, or a [Error::DateOutOfRangeError]
/// if the date cannot be converted to UTC.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "INSERT INTO \"transaction\" (description, amount, date, user_id, category_id, panini, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, description, amount, date, user_id, category_id, panini, notes",
        )?
        .query_row(
            params![
                builder.description,
                builder.amount,
                to_stored_utc(builder.date)?,
                builder.user_id,
                builder.category_id,
                builder.panini,
                builder.notes,
            ],
            map_transaction_row,
        )
        .map_err(Error::from)
}

/// Retrieve a transaction from the database by its `id`.
///
/// Returns `Ok(None)` if there is no such transaction.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transaction(id: &str, connection: &Connection) -> Result<Option<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, description, amount, date, user_id, category_id, panini, notes
             FROM \"transaction\" WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_transaction_row)
        .optional()
        .map_err(Error::from)
}

/// Retrieve transactions, most recent first, with their user and category attached.
///
/// If `category_name` is given only transactions in a category with exactly
/// that name are returned.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn list_transactions(
    category_name: Option<&str>,
    connection: &Connection,
) -> Result<Vec<TransactionListItem>, Error> {
    connection
        .prepare(
            "SELECT t.id, t.description, t.amount, t.date, t.panini,
                    u.id, u.email,
                    c.id, c.name, c.icon, c.color
             FROM \"transaction\" t
             INNER JOIN user u ON u.id = t.user_id
             INNER JOIN category c ON c.id = t.category_id
             WHERE (:category_name IS NULL OR c.name = :category_name)
             ORDER BY t.date DESC, t.rowid DESC",
        )?
        .query_map(&[(":category_name", &category_name)], |row| {
            Ok(TransactionListItem {
                id: row.get(0)?,
                description: row.get(1)?,
                amount: row.get(2)?,
                date: row.get(3)?,
                panini: row.get(4)?,
                user: map_user_columns(row, 5)?,
                category: map_category_columns(row, 7)?,
            })
        })?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Overwrite every field of the transaction `id`.
///
/// Returns the number of rows changed, zero if there is no such transaction.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error, or a
/// [Error::DateOutOfRangeError] if the date cannot be converted to UTC.
pub fn update_transaction(
    id: &str,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "UPDATE \"transaction\"
             SET description = ?2, amount = ?3, date = ?4, user_id = ?5, category_id = ?6,
                 panini = ?7, notes = ?8
             WHERE id = ?1",
            params![
                id,
                builder.description,
                builder.amount,
                to_stored_utc(builder.date)?,
                builder.user_id,
                builder.category_id,
                builder.panini,
                builder.notes,
            ],
        )
        .map_err(Error::from)
}

/// Delete the transaction `id`, returning the number of rows deleted.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn delete_transaction(id: &str, connection: &Connection) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "DELETE FROM \"transaction\" WHERE id = :id",
            &[(":id", &id)],
        )
        .map_err(Error::from)
}

/// The total a user has spent, excluding panini transactions.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_user_total_spent(user_id: &str, connection: &Connection) -> Result<f64, Error> {
    query_sum(
        "SELECT SUM(amount) FROM \"transaction\" WHERE user_id = ?1 AND panini = 0",
        [user_id],
        connection,
    )
}

/// The total spent by everyone, excluding panini transactions.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_total_spent(connection: &Connection) -> Result<f64, Error> {
    query_sum(
        "SELECT SUM(amount) FROM \"transaction\" WHERE panini = 0",
        [],
        connection,
    )
}

/// The total a user has spent on panini transactions.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_user_spent_on_panini(user_id: &str, connection: &Connection) -> Result<f64, Error> {
    query_sum(
        "SELECT SUM(amount) FROM \"transaction\" WHERE user_id = ?1 AND panini = 1",
        [user_id],
        connection,
    )
}

/// The total spent by everyone on panini transactions.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_panini_total_spent(connection: &Connection) -> Result<f64, Error> {
    query_sum(
        "SELECT SUM(amount) FROM \"transaction\" WHERE panini = 1",
        [],
        connection,
    )
}

/// The panini totals per category for transactions dated from `start` to
/// `end`, both inclusive.
///
/// Categories without panini transactions in the range are left out. The
/// totals are ordered by category ID.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error, or a
/// [Error::DateOutOfRangeError] if a bound cannot be converted to UTC.
pub fn get_panini_total_spent_by_category(
    start: OffsetDateTime,
    end: OffsetDateTime,
    connection: &Connection,
) -> Result<Vec<CategoryTotal>, Error> {
    connection
        .prepare(
            "SELECT category_id, SUM(amount) FROM \"transaction\"
             WHERE panini = 1 AND date >= ?1 AND date <= ?2
             GROUP BY category_id
             ORDER BY category_id ASC",
        )?
        .query_map(
            params![
                to_stored_utc(start)?,
                to_stored_utc(end)?
            ],
            |row| {
                let amount: Option<f64> = row.get(1)?;

                Ok(CategoryTotal {
                    category_id: row.get(0)?,
                    amount: amount.unwrap_or(0.0),
                })
            },
        )?
        .map(|maybe_total| maybe_total.map_err(Error::from))
        .collect()
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let description = row.get(1)?;
    let amount = row.get(2)?;
    let date = row.get(3)?;
    let user_id = row.get(4)?;
    let category_id = row.get(5)?;
    let panini = row.get(6)?;
    let notes = row.get(7)?;

    Ok(Transaction {
        id,
        description,
        amount,
        date,
        user_id,
        category_id,
        panini,
        notes,
    })
}

// ============================================================================
// TESTS
// ============================================================================
