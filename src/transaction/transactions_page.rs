//! Defines the route handler for the page that displays transactions as a table.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time_tz::Tz;

use crate::{
    AppState, Error,
    category::{Category, get_all_categories},
    endpoints::{self, format_endpoint},
    html::{
        CATEGORY_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, PANINI_BADGE_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, delete_row_button,
        format_currency,
    },
    navigation::NavBar,
    timezone::{format_local_date_time, get_timezone},
    transaction::core::{TransactionListItem, list_transactions},
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query parameters for the transactions page.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionsQuery {
    /// Only show transactions in the category with this name.
    pub category: Option<String>,
}

/// The link to the transactions page filtered to `category_name`.
fn category_filter_url(category_name: &str) -> String {
    match serde_urlencoded::to_string([("category", category_name)]) {
        Ok(query) => format!("{}?{query}", endpoints::TRANSACTIONS_VIEW),
        Err(error) => {
            tracing::error!("could not encode category filter {category_name:?}: {error}");
            endpoints::TRANSACTIONS_VIEW.to_owned()
        }
    }
}

fn category_badge(category: &Category) -> Markup {
    html! {
        a
            href=(category_filter_url(&category.name))
            class=(CATEGORY_BADGE_STYLE)
            style={ "background-color: " (category.color) ";" }
        {
            (category.icon) " " (category.name)
        }
    }
}

fn transactions_view(
    transactions: &[TransactionListItem],
    categories: &[Category],
    category_filter: Option<&str>,
    timezone: &Tz,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let new_transaction_url = endpoints::NEW_TRANSACTION_VIEW;

    let table_row = |transaction: &TransactionListItem| {
        let delete_url = format_endpoint(endpoints::DELETE_TRANSACTION, &transaction.id);
        let confirm_message = format!(
            "Are you sure you want to delete the transaction '{}'? This cannot be undone.",
            transaction.description
        );

        html! {
            tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    time
                    {
                        (format_local_date_time(transaction.date, timezone))
                    }
                }
                th
                    scope="row"
                    class="px-6 py-4 font-medium text-gray-900 dark:text-white"
                {
                    (transaction.description)
                    @if transaction.panini {
                        " "
                        span class=(PANINI_BADGE_STYLE) { "Panini" }
                    }
                }
                td class=(TABLE_CELL_STYLE) { (category_badge(&transaction.category)) }
                td class=(TABLE_CELL_STYLE) { (transaction.user.email) }
                td class="px-6 py-4 text-right tabular-nums" { (format_currency(transaction.amount)) }
                td class=(TABLE_CELL_STYLE) { (delete_row_button(&delete_url, &confirm_message)) }
            }
        }
    };

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    a href=(new_transaction_url) class=(LINK_STYLE) { "Add Transaction" }
                }

                nav class="flex flex-wrap items-center gap-2" aria-label="Filter by category"
                {
                    @if let Some(category_name) = category_filter {
                        span { "Showing " strong { (category_name) } }
                        a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "Clear filter" }
                    } @else {
                        @for category in categories {
                            (category_badge(category))
                        }
                    }
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
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "User" }
                                th scope="col" class="px-6 py-3 text-right" { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for transaction in transactions {
                                (table_row(transaction))
                            }

                            @if transactions.is_empty() {
                                tr
                                {
                                    td
                                        colspan="6"
                                        class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                    {
                                        "No transactions found. Create a transaction "
                                        a href=(new_transaction_url) class=(LINK_STYLE) { "here" }
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

    base("Transactions", &[], &content)
}

/// Render the transactions page, optionally filtered to a single category.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Response, Error> {
    let timezone = get_timezone(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;

    let category_filter = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = list_transactions(category_filter, &connection)
        .inspect_err(|error| tracing::error!("could not list transactions: {error}"))?;
    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;

    Ok(
        transactions_view(&transactions, &categories, category_filter, timezone)
            .into_response(),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::macros::datetime;

    use crate::{
        category::{NewCategory, create_category},
        db::initialize,
        endpoints::{self, format_endpoint},
        test_utils::{assert_status_ok, assert_valid_html, parse_html_document},
        transaction::{Transaction, core::create_transaction},
        user::create_user,
    };

    use super::{
        TransactionsQuery, TransactionsViewState, category_filter_url, get_transactions_page,
    };

    fn get_test_state() -> TransactionsViewState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        create_user(Some("u1"), "alice@example.com", &conn).unwrap();
        for (id, name) in [("c1", "Groceries"), ("c2", "Eating Out")] {
            create_category(
                NewCategory {
                    id: Some(id.to_owned()),
                    name: name.to_owned(),
                    icon: "🏷".to_owned(),
                    color: "#16a34a".to_owned(),
                },
                &conn,
            )
            .unwrap();
        }
        create_transaction(
            Transaction::build("Milk", 3.0, datetime!(2024-01-01 9:00 UTC), "u1", "c1"),
            &conn,
        )
        .unwrap();
        create_transaction(
            Transaction::build("Pizza", 30.0, datetime!(2024-01-02 19:00 UTC), "u1", "c2")
                .panini(true),
            &conn,
        )
        .unwrap();

        TransactionsViewState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn row_descriptions(document: &Html) -> Vec<String> {
        document
            .select(&Selector::parse("tbody tr th").unwrap())
            .map(|cell| cell.text().next().unwrap_or_default().trim().to_owned())
            .collect()
    }

    #[tokio::test]
    async fn lists_all_transactions_newest_first() {
        let state = get_test_state();

        let response = get_transactions_page(State(state), Query(TransactionsQuery::default()))
            .await
            .unwrap();

        assert_status_ok(&response);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        assert_eq!(row_descriptions(&document), vec!["Pizza", "Milk"]);
    }

    #[tokio::test]
    async fn filters_by_category_name() {
        let state = get_test_state();

        let response = get_transactions_page(
            State(state),
            Query(TransactionsQuery {
                category: Some("Eating Out".to_owned()),
            }),
        )
        .await
        .unwrap();

        let document = parse_html_document(response).await;
        assert_eq!(row_descriptions(&document), vec!["Pizza"]);
        let clear_link = document
            .select(&Selector::parse("a[href=\"/transactions\"]").unwrap())
            .any(|link| link.text().collect::<String>() == "Clear filter");
        assert!(clear_link, "want a link to clear the filter");
    }

    #[tokio::test]
    async fn rows_link_to_delete_endpoint() {
        let state = get_test_state();
        let transaction_ids = {
            let connection = state.db_connection.lock().unwrap();
            crate::transaction::core::list_transactions(None, &connection)
                .unwrap()
                .into_iter()
                .map(|transaction| transaction.id)
                .collect::<Vec<_>>()
        };

        let response = get_transactions_page(State(state), Query(TransactionsQuery::default()))
            .await
            .unwrap();

        let document = parse_html_document(response).await;
        let delete_urls = document
            .select(&Selector::parse("button[hx-delete]").unwrap())
            .filter_map(|button| button.value().attr("hx-delete"))
            .map(str::to_owned)
            .collect::<Vec<_>>();
        let want_urls = transaction_ids
            .iter()
            .map(|id| format_endpoint(endpoints::DELETE_TRANSACTION, id))
            .collect::<Vec<_>>();
        assert_eq!(delete_urls, want_urls);
    }

    #[tokio::test]
    async fn empty_filter_result_shows_placeholder() {
        let state = get_test_state();

        let response = get_transactions_page(
            State(state),
            Query(TransactionsQuery {
                category: Some("Holidays".to_owned()),
            }),
        )
        .await
        .unwrap();

        let document = parse_html_document(response).await;
        let text = document.root_element().text().collect::<String>();
        assert!(text.contains("No transactions found."), "got {text:?}");
    }

    #[test]
    fn category_filter_url_is_encoded() {
        assert_eq!(
            category_filter_url("Eating Out & Bars"),
            "/transactions?category=Eating+Out+%26+Bars"
        );
    }
}
