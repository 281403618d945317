//! Defines the endpoint for deleting a payment.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, database_id::PaymentId, payment::core::delete_payment};

/// The state needed to delete a payment.
#[derive(Debug, Clone)]
pub struct DeletePaymentState {
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeletePaymentState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a payment.
///
/// Responds with 200 OK and an empty body whether or not the payment existed.
pub async fn delete_payment_endpoint(
    State(state): State<DeletePaymentState>,
    Path(payment_id): Path<PaymentId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_payment(&payment_id, &connection) {
        Ok(0) => {
            tracing::debug!("payment {payment_id} was already deleted");
            StatusCode::OK.into_response()
        }
        Ok(_) => StatusCode::OK.into_response(),
        Err(error) => {
            tracing::error!("Could not delete payment {payment_id}: {error}");
            error.into_alert_response()
        }
    }
}
