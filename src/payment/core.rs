//! Defines the payment model and the database queries for payments.

use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::{GENERATED_ID_SQL, PaymentId, RowsAffected, UserId},
    db::query_sum,
    user::{User, map_user_columns},
};

// ============================================================================
// MODELS
// ============================================================================

/// Money moved from one member of the household to another.
///
/// To create a new `Payment`, use [Payment::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// The ID of the payment.
    pub id: PaymentId,
    /// What the payment was for.
    pub description: String,
    /// The amount of money paid.
    pub amount: f64,
    /// The user that paid.
    pub sender_id: UserId,
    /// The user that was paid. Equal to `sender_id` for panini payments.
    pub receiver_id: UserId,
    /// When the payment was recorded, in UTC.
    pub created_at: OffsetDateTime,
    /// Whether the payment is a contribution to shared (panini) expenses.
    pub panini: bool,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl Payment {
    /// Create a new payment.
    ///
    /// Shortcut for [PaymentBuilder] for discoverability.
    pub fn build(
        description: &str,
        amount: f64,
        sender_id: &str,
        receiver_id: &str,
    ) -> PaymentBuilder {
        PaymentBuilder {
            description: description.to_owned(),
            amount,
            sender_id: sender_id.to_owned(),
            receiver_id: receiver_id.to_owned(),
            panini: false,
            notes: None,
        }
    }
}

/// The fields written when a payment is created or updated.
///
/// When `panini` is set the payment is stored with `sender_id` as its
/// receiver, whatever `receiver_id` says.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentBuilder {
    /// What the payment was for.
    pub description: String,
    /// The amount of money paid.
    pub amount: f64,
    /// The user that paid.
    pub sender_id: UserId,
    /// The user that was paid.
    pub receiver_id: UserId,
    /// Whether the payment is a contribution to shared (panini) expenses.
    pub panini: bool,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl PaymentBuilder {
    /// Set the panini flag.
    pub fn panini(mut self, panini: bool) -> Self {
        self.panini = panini;
        self
    }

    /// Set the notes for the payment.
    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    /// The receiver that will actually be stored.
    fn effective_receiver_id(&self) -> &str {
        if !self.panini {
            return &self.receiver_id;
        }

        if self.receiver_id != self.sender_id {
            tracing::warn!(
                "panini payment from {} named receiver {}, storing {} as the receiver instead",
                self.sender_id,
                self.receiver_id,
                self.sender_id
            );
        }

        &self.sender_id
    }
}

/// A payment row for the payments list, with both users attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentListItem {
    /// The ID of the payment.
    pub id: PaymentId,
    /// What the payment was for.
    pub description: String,
    /// The amount of money paid.
    pub amount: f64,
    /// When the payment was recorded, in UTC.
    pub created_at: OffsetDateTime,
    /// Whether the payment is a contribution to shared (panini) expenses.
    pub panini: bool,
    /// The user that paid.
    pub sender: User,
    /// The user that was paid.
    pub receiver: User,
}

/// How much a user has paid and been paid.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PaymentBalance {
    /// The sum of payments where the user is the sender.
    pub sent: f64,
    /// The sum of payments where the user is the receiver.
    pub received: f64,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the payment table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_payment_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS payment (
            id TEXT PRIMARY KEY NOT NULL DEFAULT ({GENERATED_ID_SQL}),
            description TEXT NOT NULL,
            amount REAL NOT NULL,
            sender_id TEXT NOT NULL,
            receiver_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            panini INTEGER NOT NULL DEFAULT 0,
            notes TEXT,
            FOREIGN KEY(sender_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(receiver_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_payment_created_at ON payment(created_at);"
    ))
}

/// Create a new payment in the database from a builder.
///
/// The payment is timestamped with the current UTC time.
///
/// # Errors
/// This function will return a [Error::SqlError] if either user does not
/// exist or there is some other SQL error.
pub fn create_payment(builder: PaymentBuilder, connection: &Connection) -> Result<Payment, Error> {
    let receiver_id = builder.effective_receiver_id().to_owned();

    connection
        .prepare(
            "INSERT INTO payment (description, amount, sender_id, receiver_id, created_at, panini, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, description, amount, sender_id, receiver_id, created_at, panini, notes",
        )?
        .query_row(
            params![
                builder.description,
                builder.amount,
                builder.sender_id,
                receiver_id,
                OffsetDateTime::now_utc(),
                builder.panini,
                builder.notes,
            ],
            map_payment_row,
        )
        .map_err(Error::from)
}

/// Retrieve a payment by its `id`.
///
/// Returns `Ok(None)` if there is no such payment.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_payment(id: &str, connection: &Connection) -> Result<Option<Payment>, Error> {
    connection
        .prepare(
            "SELECT id, description, amount, sender_id, receiver_id, created_at, panini, notes
             FROM payment WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_payment_row)
        .optional()
        .map_err(Error::from)
}

/// Retrieve every payment, newest first, with the sender and receiver attached.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn list_payments(connection: &Connection) -> Result<Vec<PaymentListItem>, Error> {
    connection
        .prepare(
            "SELECT p.id, p.description, p.amount, p.created_at, p.panini,
                    s.id, s.email, r.id, r.email
             FROM payment p
             INNER JOIN user s ON s.id = p.sender_id
             INNER JOIN user r ON r.id = p.receiver_id
             ORDER BY p.created_at DESC, p.rowid DESC",
        )?
        .query_map([], |row| {
            Ok(PaymentListItem {
                id: row.get(0)?,
                description: row.get(1)?,
                amount: row.get(2)?,
                created_at: row.get(3)?,
                panini: row.get(4)?,
                sender: map_user_columns(row, 5)?,
                receiver: map_user_columns(row, 7)?,
            })
        })?
        .map(|maybe_payment| maybe_payment.map_err(Error::from))
        .collect()
}

/// Overwrite every editable field of the payment `id`.
///
/// The creation time is kept. Returns the number of rows changed, zero if
/// there is no such payment.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn update_payment(
    id: &str,
    builder: PaymentBuilder,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    let receiver_id = builder.effective_receiver_id().to_owned();

    connection
        .execute(
            "UPDATE payment
             SET description = ?2, amount = ?3, sender_id = ?4, receiver_id = ?5, panini = ?6, notes = ?7
             WHERE id = ?1",
            params![
                id,
                builder.description,
                builder.amount,
                builder.sender_id,
                receiver_id,
                builder.panini,
                builder.notes,
            ],
        )
        .map_err(Error::from)
}

/// Delete the payment `id`, returning the number of rows deleted.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn delete_payment(id: &str, connection: &Connection) -> Result<RowsAffected, Error> {
    connection
        .execute("DELETE FROM payment WHERE id = :id", &[(":id", &id)])
        .map_err(Error::from)
}

/// The totals a user has sent and received.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_user_payment_balance(
    user_id: &str,
    connection: &Connection,
) -> Result<PaymentBalance, Error> {
    let sent = query_sum(
        "SELECT SUM(amount) FROM payment WHERE sender_id = ?1",
        [user_id],
        connection,
    )?;
    let received = query_sum(
        "SELECT SUM(amount) FROM payment WHERE receiver_id = ?1",
        [user_id],
        connection,
    )?;

    Ok(PaymentBalance { sent, received })
}

/// The total a user has put towards panini expenses.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_panini_total_payment_to_user(
    user_id: &str,
    connection: &Connection,
) -> Result<f64, Error> {
    query_sum(
        "SELECT SUM(amount) FROM payment WHERE sender_id = ?1 AND panini = 1",
        [user_id],
        connection,
    )
}

fn map_payment_row(row: &Row) -> Result<Payment, rusqlite::Error> {
    Ok(Payment {
        id: row.get(0)?,
        description: row.get(1)?,
        amount: row.get(2)?,
        sender_id: row.get(3)?,
        receiver_id: row.get(4)?,
        created_at: row.get(5)?,
        panini: row.get(6)?,
        notes: row.get(7)?,
    })
}

#[cfg(test)]
pub(crate) fn count_payments(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM payment;", [], |row| row.get(0))
        .map_err(Error::from)
}

// ============================================================================
// TESTS
// ============================================================================
