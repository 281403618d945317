//! Defines the route handler for the page for creating a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{Category, get_all_categories},
    endpoints,
    html::{FORM_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
    timezone::{get_timezone, local_now},
    transaction::form::{TransactionForm, TransactionFormErrors, transaction_form},
    user::{User, get_all_users},
};

fn create_transaction_view(
    values: &TransactionForm,
    users: &[User],
    categories: &[Category],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();
    let form = transaction_form(
        values,
        &TransactionFormErrors::default(),
        users,
        categories,
    );

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            (form)
        }
    };

    base("Create Transaction", &[dollar_input_styles()], &content)
}

/// The state needed for create new transaction page.
#[derive(Debug, Clone)]
pub struct CreateTransactionPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for accessing users and categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Load the users and categories a transaction can be assigned to.
pub(super) fn get_form_options(
    connection: &Connection,
) -> Result<(Vec<User>, Vec<Category>), Error> {
    let users = get_all_users(connection)
        .inspect_err(|error| tracing::error!("could not get users for transaction form: {error}"))?;
    let categories = get_all_categories(connection).inspect_err(|error| {
        tracing::error!("could not get categories for transaction form: {error}")
    })?;

    Ok((users, categories))
}

/// Renders the page for creating a transaction.
///
/// The date field is prefilled with the current local time.
pub async fn get_create_transaction_page(
    State(state): State<CreateTransactionPageState>,
) -> Result<Response, Error> {
    let (users, categories) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_form_options(&connection)?
    };

    let timezone = get_timezone(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone)
    })?;

    let now = local_now(timezone);
    let values = TransactionForm {
        date: Some(format!(
            "{}T{:02}:{:02}",
            now.date(),
            now.hour(),
            now.minute()
        )),
        ..Default::default()
    };

    Ok(create_transaction_view(&values, &users, &categories).into_response())
}
