//! Household Ledger is a web app for tracking shared household payments and
//! categorised spending.
//!
//! This library provides a web server that directly serves HTML pages. The
//! ledger itself (payments, transactions and their aggregates) is exposed as
//! plain functions over a [rusqlite::Connection] so that it can be used
//! without the web layer.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod category;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod payment;
mod routing;
mod timezone;
mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use category::{Category, NewCategory, create_category, get_all_categories};
pub use database_id::{CategoryId, PaymentId, RowsAffected, TransactionId, UserId};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use payment::{
    Payment, PaymentBalance, PaymentBuilder, PaymentListItem, create_payment, delete_payment,
    get_panini_total_payment_to_user, get_payment, get_user_payment_balance, list_payments,
    update_payment,
};
pub use routing::build_router;
pub use transaction::{
    CategoryTotal, Transaction, TransactionBuilder, TransactionListItem, create_transaction,
    delete_transaction, get_panini_total_spent, get_panini_total_spent_by_category,
    get_total_spent, get_transaction, get_user_spent_on_panini, get_user_total_spent,
    list_transactions, update_transaction,
};
pub use user::{User, create_user, get_all_users};

use crate::{alert::Alert, internal_server_error::InternalServerError};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
///
/// Validation problems with submitted forms are not errors: they are
/// reported back to the user next to the offending field. A lookup by ID
/// that finds nothing is not an error either, those functions return
/// `Ok(None)`.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An unhandled/unexpected SQL error.
    ///
    /// Errors from the database are passed through unchanged, the ledger does
    /// not retry or reinterpret them.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// A date that cannot be represented once converted to UTC.
    #[error("the date {0} is outside the supported range")]
    DateOutOfRangeError(time::OffsetDateTime),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", value);
        Error::SqlError(value)
    }
}

fn invalid_timezone_fix(timezone: &str) -> String {
    format!(
        "Could not get local timezone \"{timezone}\". Check your server settings and \
        ensure the timezone has been set to valid, canonical timezone string"
    )
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &invalid_timezone_fix(&timezone),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Render the error as an alert fragment for HTMX endpoints.
    fn into_alert_response(self) -> Response {
        match self {
            Error::InvalidTimezoneError(timezone) => Alert::error(
                "Invalid Timezone Settings",
                &invalid_timezone_fix(&timezone),
            )
            .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR),
            _ => Alert::error(
                "Something went wrong",
                "An unexpected error occurred, check the server logs for more details.",
            )
            .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}
