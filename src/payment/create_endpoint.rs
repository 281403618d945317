//! Defines the endpoint for recording a new payment.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    payment::{
        core::create_payment,
        form::{PaymentForm, payment_form},
    },
    user::get_all_users,
};

/// The state needed to create a payment.
#[derive(Debug, Clone)]
pub struct CreatePaymentState {
    /// The database connection for managing payments.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreatePaymentState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for recording a payment, redirects to the payments view on success.
pub async fn create_payment_endpoint(
    State(state): State<CreatePaymentState>,
    Form(form): Form<PaymentForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let payment = match form.validate() {
        Ok(payment) => payment,
        Err(errors) => {
            tracing::debug!("rejected payment form: {errors:?}");

            return match get_all_users(&connection) {
                Ok(users) => payment_form(&form, &errors, &users).into_response(),
                Err(error) => {
                    tracing::error!("could not get users for payment form: {error}");
                    error.into_alert_response()
                }
            };
        }
    };

    if let Err(error) = create_payment(payment, &connection) {
        tracing::error!("could not create payment: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::PAYMENTS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
