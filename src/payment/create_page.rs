//! Defines the route handler for the page for recording a new payment.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    html::{FORM_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
    payment::form::{PaymentForm, PaymentFormErrors, payment_form},
    user::{User, get_all_users},
};

/// The state needed for the new payment page.
#[derive(Debug, Clone)]
pub struct CreatePaymentPageState {
    /// The database connection for accessing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreatePaymentPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn create_payment_view(users: &[User]) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_PAYMENT_VIEW).into_html();
    let form = payment_form(
        &PaymentForm::default(),
        &PaymentFormErrors::default(),
        users,
    );

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            (form)
        }
    };

    base("Create Payment", &[dollar_input_styles()], &content)
}

/// Renders the page for recording a payment between users.
pub async fn get_create_payment_page(
    State(state): State<CreatePaymentPageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let users = get_all_users(&connection)
        .inspect_err(|error| tracing::error!("could not get users for payment form: {error}"))?;

    Ok(create_payment_view(&users).into_response())
}
