//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    timezone::get_timezone,
    transaction::{
        core::create_transaction,
        create_page::get_form_options,
        form::{TransactionForm, transaction_form},
    },
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for creating a new transaction, redirects to transactions view on success.
///
/// If any field is missing or malformed nothing is written and the form is
/// sent back with a message next to each invalid field.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let Some(timezone) = get_timezone(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    let validation_result = form.validate(timezone);

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let transaction = match validation_result {
        Ok(transaction) => transaction,
        Err(errors) => {
            tracing::debug!("rejected transaction form: {errors:?}");

            return match get_form_options(&connection) {
                Ok((users, categories)) => {
                    transaction_form(&form, &errors, &users, &categories).into_response()
                }
                Err(error) => error.into_alert_response(),
            };
        }
    };

    if let Err(error) = create_transaction(transaction, &connection) {
        tracing::error!("could not create transaction: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
