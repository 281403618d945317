//! Defines the route handler for the page that lists payments between users.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time_tz::Tz;

use crate::{
    AppState, Error,
    endpoints::{self, format_endpoint},
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, PANINI_BADGE_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, delete_row_button, format_currency,
    },
    navigation::NavBar,
    payment::core::{PaymentListItem, list_payments},
    timezone::{format_local_date_time, get_timezone},
};

/// The state needed for the payments page.
#[derive(Debug, Clone)]
pub struct PaymentsViewState {
    /// The database connection for managing payments.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for PaymentsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

fn payment_row(payment: &PaymentListItem, timezone: &Tz) -> Markup {
    let delete_url = format_endpoint(endpoints::DELETE_PAYMENT, &payment.id);
    let confirm_message = format!(
        "Are you sure you want to delete the payment '{}'? This cannot be undone.",
        payment.description
    );

    html! {
        tr class=(TABLE_ROW_STYLE) data-payment-id=(payment.id)
        {
            td class=(TABLE_CELL_STYLE)
            {
                time
                {
                    (format_local_date_time(payment.created_at, timezone))
                }
            }
            th scope="row" class="px-6 py-4 font-medium text-gray-900 dark:text-white"
            {
                (payment.description)
                @if payment.panini {
                    " "
                    span class=(PANINI_BADGE_STYLE) { "Panini" }
                }
            }
            td class=(TABLE_CELL_STYLE) { (payment.sender.email) }
            td class=(TABLE_CELL_STYLE) { (payment.receiver.email) }
            td class="px-6 py-4 text-right tabular-nums" { (format_currency(payment.amount)) }
            td class=(TABLE_CELL_STYLE) { (delete_row_button(&delete_url, &confirm_message)) }
        }
    }
}

fn payments_view(payments: &[PaymentListItem], timezone: &Tz) -> Markup {
    let nav_bar = NavBar::new(endpoints::PAYMENTS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Payments" }

                    a href=(endpoints::NEW_PAYMENT_VIEW) class=(LINK_STYLE) { "Add Payment" }
                }

                div class="w-full overflow-x-auto dark:bg-gray-800"
                {
                    table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "From" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "To" }
                                th scope="col" class="px-6 py-3 text-right" { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for payment in payments {
                                (payment_row(payment, timezone))
                            }

                            @if payments.is_empty() {
                                tr
                                {
                                    td
                                        colspan="6"
                                        class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                    {
                                        "No payments yet. Record a payment "
                                        a href=(endpoints::NEW_PAYMENT_VIEW) class=(LINK_STYLE) { "here" }
                                        "."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base("Payments", &[], &content)
}

/// Render the list of payments, newest first.
pub async fn get_payments_page(
    State(state): State<PaymentsViewState>,
) -> Result<Response, Error> {
    let timezone = get_timezone(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let payments = list_payments(&connection)
        .inspect_err(|error| tracing::error!("could not list payments: {error}"))?;

    Ok(payments_view(&payments, timezone).into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        Error,
        db::initialize,
        endpoints::{self, format_endpoint},
        payment::{Payment, core::create_payment},
        test_utils::{assert_status_ok, assert_valid_html, parse_html_document},
        user::create_user,
    };

    use super::{PaymentsViewState, get_payments_page};

    fn get_test_state() -> PaymentsViewState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        create_user(Some("u1"), "alice@example.com", &conn).unwrap();
        create_user(Some("u2"), "bob@example.com", &conn).unwrap();

        PaymentsViewState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn lists_payments_with_users() {
        let state = get_test_state();
        let payment = {
            let connection = state.db_connection.lock().unwrap();
            create_payment(Payment::build("Rent", 250.0, "u1", "u2"), &connection).unwrap()
        };

        let response = get_payments_page(State(state)).await.unwrap();

        assert_status_ok(&response);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let row = document
            .select(&Selector::parse("tbody tr").unwrap())
            .next()
            .expect("No payment row found");
        let cells = row
            .select(&Selector::parse("td").unwrap())
            .map(|cell| cell.text().collect::<String>().trim().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(cells[1], "alice@example.com");
        assert_eq!(cells[2], "bob@example.com");
        let delete_url = row
            .select(&Selector::parse("button[hx-delete]").unwrap())
            .next()
            .and_then(|button| button.value().attr("hx-delete"));
        assert_eq!(
            delete_url,
            Some(format_endpoint(endpoints::DELETE_PAYMENT, &payment.id).as_str())
        );
    }

    #[tokio::test]
    async fn empty_list_links_to_new_payment_page() {
        let response = get_payments_page(State(get_test_state())).await.unwrap();

        let document = parse_html_document(response).await;
        let link_selector =
            Selector::parse(&format!("tbody a[href=\"{}\"]", endpoints::NEW_PAYMENT_VIEW)).unwrap();
        assert_eq!(document.select(&link_selector).count(), 1);
    }

    #[tokio::test]
    async fn invalid_timezone_is_an_error() {
        let state = PaymentsViewState {
            local_timezone: "Mars/Olympus_Mons".to_owned(),
            ..get_test_state()
        };

        let result = get_payments_page(State(state)).await;

        assert_eq!(
            result.err(),
            Some(Error::InvalidTimezoneError("Mars/Olympus_Mons".to_owned()))
        );
    }
}
