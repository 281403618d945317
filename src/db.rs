/*! Database schema setup and query helpers shared by the domain modules. */

use rusqlite::{Connection, Params};

use crate::{
    Error, category::create_category_table, payment::create_payment_table,
    transaction::create_transaction_table, user::create_user_table,
};

/// Create the tables for the domain models if they do not already exist.
///
/// Foreign key enforcement is a per-connection setting in SQLite, so this
/// function must be called for every new connection.
///
/// # Errors
/// Returns an error if a table could not be created.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction = connection.unchecked_transaction()?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_payment_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()
}

/// Run an aggregate query that selects a single `SUM(...)` column.
///
/// SQL sums over zero rows are `NULL`, which this function turns into `0.0`.
/// Every aggregate in the ledger goes through here so that callers never see
/// a missing total.
pub(crate) fn query_sum<P: Params>(
    sql: &str,
    params: P,
    connection: &Connection,
) -> Result<f64, Error> {
    let sum: Option<f64> = connection.query_row(sql, params, |row| row.get(0))?;

    Ok(sum.unwrap_or(0.0))
}
