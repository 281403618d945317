//! Dashboard HTTP handler and view rendering.
//!
//! The dashboard shows, for each member of the household, what they have
//! paid and been paid and how much they have spent, followed by household
//! totals and the panini spending per category over a date range.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, OffsetDateTime};
use time_tz::Tz;

use crate::{
    AppState, Error,
    category::{Category, get_all_categories},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CATEGORY_BADGE_STYLE, FORM_LABEL_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
        text_input_style,
    },
    navigation::NavBar,
    payment::{PaymentBalance, get_panini_total_payment_to_user, get_user_payment_balance},
    timezone::{get_timezone, local_day_bounds, local_now, month_containing, parse_date},
    transaction::{
        CategoryTotal, get_panini_total_spent, get_panini_total_spent_by_category,
        get_total_spent, get_user_spent_on_panini, get_user_total_spent,
    },
    user::{User, get_all_users},
};

const CARD_STYLE: &str = "bg-white dark:bg-gray-800 border border-gray-200 \
    dark:border-gray-700 rounded-lg p-4 shadow-md flex flex-col gap-2";

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading the ledger.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The date range for the per-category table, as `YYYY-MM-DD` local dates.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// The first day of the range.
    pub start: Option<String>,
    /// The last day of the range, inclusive.
    pub end: Option<String>,
}

/// A range of local dates and the UTC instants that bound it.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DateRange {
    start: Date,
    end: Date,
    /// The first moment of `start`, in UTC.
    start_utc: OffsetDateTime,
    /// The last moment of `end`, in UTC.
    end_utc: OffsetDateTime,
}

impl DashboardQuery {
    /// The requested range, falling back to the month containing `today`
    /// for a bound that is missing, malformed or cannot be represented in
    /// UTC. A reversed range is swapped.
    ///
    /// Returns `None` if the month containing `today` cannot be represented either.
    fn date_range(&self, today: Date, timezone: &Tz) -> Option<DateRange> {
        let (month_start, month_end) = month_containing(today);
        let parse_bound = |bound: Option<&str>| {
            bound
                .and_then(parse_date)
                .filter(|date| local_day_bounds(*date, *date, timezone).is_some())
        };
        let start = parse_bound(self.start.as_deref()).unwrap_or(month_start);
        let end = parse_bound(self.end.as_deref()).unwrap_or(month_end);
        let (start, end) = if start <= end {
            (start, end)
        } else {
            (end, start)
        };

        let (start_utc, end_utc) = local_day_bounds(start, end, timezone)?;

        Some(DateRange {
            start,
            end,
            start_utc,
            end_utc,
        })
    }
}

/// The figures shown on a user's card.
#[derive(Debug, Clone, PartialEq)]
struct UserSummary {
    user: User,
    balance: PaymentBalance,
    total_spent: f64,
    spent_on_panini: f64,
    panini_payments: f64,
}

/// Panini spending for one category, with the category's display details.
#[derive(Debug, Clone, PartialEq)]
struct CategoryRow {
    name: String,
    icon: String,
    color: String,
    amount: f64,
}

struct DashboardData {
    users: Vec<UserSummary>,
    total_spent: f64,
    panini_total_spent: f64,
    categories: Vec<CategoryRow>,
    start: Date,
    end: Date,
}

/// Display a page with an overview of the household's ledger.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, Error> {
    let timezone = get_timezone(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;
    let now = local_now(timezone);
    let range = query.date_range(now.date(), timezone).ok_or_else(|| {
        tracing::error!("could not convert the dashboard date range around {now} to UTC");
        Error::DateOutOfRangeError(now)
    })?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let users = get_all_users(&connection)
        .inspect_err(|error| tracing::error!("could not get users: {error}"))?
        .into_iter()
        .map(|user| summarise_user(user, &connection))
        .collect::<Result<Vec<_>, _>>()?;

    let category_totals =
        get_panini_total_spent_by_category(range.start_utc, range.end_utc, &connection).inspect_err(
            |error| tracing::error!("could not get panini spending by category: {error}"),
        )?;
    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;

    let data = DashboardData {
        users,
        total_spent: get_total_spent(&connection)?,
        panini_total_spent: get_panini_total_spent(&connection)?,
        categories: join_category_totals(category_totals, categories),
        start: range.start,
        end: range.end,
    };

    Ok(dashboard_view(&data).into_response())
}

fn summarise_user(user: User, connection: &Connection) -> Result<UserSummary, Error> {
    Ok(UserSummary {
        balance: get_user_payment_balance(&user.id, connection)?,
        total_spent: get_user_total_spent(&user.id, connection)?,
        spent_on_panini: get_user_spent_on_panini(&user.id, connection)?,
        panini_payments: get_panini_total_payment_to_user(&user.id, connection)?,
        user,
    })
}

/// Attach each category's name to its total, keeping the totals' order.
fn join_category_totals(totals: Vec<CategoryTotal>, categories: Vec<Category>) -> Vec<CategoryRow> {
    let mut categories_by_id: HashMap<String, Category> = categories
        .into_iter()
        .map(|category| (category.id.clone(), category))
        .collect();

    totals
        .into_iter()
        .map(|total| match categories_by_id.remove(&total.category_id) {
            Some(category) => CategoryRow {
                name: category.name,
                icon: category.icon,
                color: category.color,
                amount: total.amount,
            },
            None => CategoryRow {
                name: total.category_id,
                icon: String::new(),
                color: String::from("transparent"),
                amount: total.amount,
            },
        })
        .collect()
}

fn user_card(summary: &UserSummary) -> Markup {
    let net = summary.balance.sent - summary.balance.received;
    let net_style = if net >= 0.0 {
        "text-right tabular-nums text-green-600 dark:text-green-400"
    } else {
        "text-right tabular-nums text-red-600 dark:text-red-400"
    };

    html! {
        div class=(CARD_STYLE) data-user-id=(summary.user.id)
        {
            h3 class="text-lg font-semibold text-gray-900 dark:text-white" { (summary.user.email) }

            dl class="grid grid-cols-2 gap-x-4 gap-y-1 text-sm"
            {
                dt { "Payments sent" }
                dd class="text-right tabular-nums" { (format_currency(summary.balance.sent)) }
                dt { "Payments received" }
                dd class="text-right tabular-nums" { (format_currency(summary.balance.received)) }
                dt { "Net paid" }
                dd class=(net_style) { (format_currency(net)) }
                dt { "Total spent" }
                dd class="text-right tabular-nums" { (format_currency(summary.total_spent)) }
                dt { "Spent on panini" }
                dd class="text-right tabular-nums" { (format_currency(summary.spent_on_panini)) }
                dt { "Panini payments" }
                dd class="text-right tabular-nums" { (format_currency(summary.panini_payments)) }
            }
        }
    }
}

fn date_range_form(start: Date, end: Date) -> Markup {
    html! {
        form
            method="get"
            action=(endpoints::DASHBOARD_VIEW)
            class="flex flex-wrap items-end gap-4"
        {
            div
            {
                label for="start" class=(FORM_LABEL_STYLE) { "From" }
                input type="date" name="start" id="start" value=(start) class=(text_input_style(None));
            }

            div
            {
                label for="end" class=(FORM_LABEL_STYLE) { "To" }
                input type="date" name="end" id="end" value=(end) class=(text_input_style(None));
            }

            div
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update" }
            }
        }
    }
}

fn category_table(categories: &[CategoryRow]) -> Markup {
    html! {
        div class="w-full overflow-x-auto rounded-lg shadow"
        {
            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class="px-6 py-3 text-right" { "Panini spent" }
                    }
                }

                tbody
                {
                    @for row in categories {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            th scope="row" class=(TABLE_CELL_STYLE)
                            {
                                span
                                    class=(CATEGORY_BADGE_STYLE)
                                    style={ "background-color: " (row.color) ";" }
                                {
                                    (row.icon) " " (row.name)
                                }
                            }
                            td class="px-6 py-4 text-right tabular-nums" { (format_currency(row.amount)) }
                        }
                    }

                    @if categories.is_empty() {
                        tr
                        {
                            td colspan="2" class="px-6 py-4 text-center"
                            {
                                "No panini spending in this period."
                            }
                        }
                    }
                }
            }
        }
    }
}

fn dashboard_view(data: &DashboardData) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full lg:max-w-5xl space-y-8"
            {
                section id="user-summaries"
                {
                    h2 class="text-xl font-semibold mb-4" { "Household" }

                    div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-3 gap-4"
                    {
                        @for summary in &data.users {
                            (user_card(summary))
                        }
                    }
                }

                section id="totals" class="grid grid-cols-1 sm:grid-cols-2 gap-4"
                {
                    div class=(CARD_STYLE)
                    {
                        span class="text-sm text-gray-600 dark:text-gray-400" { "Total spent" }
                        span class="text-2xl font-bold tabular-nums" { (format_currency(data.total_spent)) }
                    }
                    div class=(CARD_STYLE)
                    {
                        span class="text-sm text-gray-600 dark:text-gray-400" { "Panini total spent" }
                        span class="text-2xl font-bold tabular-nums" { (format_currency(data.panini_total_spent)) }
                    }
                }

                section id="panini-by-category" class="space-y-4"
                {
                    h2 class="text-xl font-semibold" { "Panini spending by category" }

                    (date_range_form(data.start, data.end))
                    (category_table(&data.categories))
                }
            }
        }
    };

    base("Dashboard", &[], &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::macros::{date, datetime};
    use time_tz::Tz;

    use crate::{
        Error,
        category::{Category, NewCategory, create_category},
        db::initialize,
        html::format_currency,
        payment::{Payment, create_payment},
        test_utils::{assert_status_ok, assert_valid_html, parse_html_document},
        timezone::get_timezone,
        transaction::{CategoryTotal, Transaction, create_transaction},
        user::create_user,
    };

    use super::{DashboardQuery, DashboardState, get_dashboard_page, join_category_totals};

    fn get_test_state() -> DashboardState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        create_user(Some("u1"), "alice@example.com", &conn).unwrap();
        create_user(Some("u2"), "bob@example.com", &conn).unwrap();
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

        DashboardState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn utc() -> &'static Tz {
        get_timezone("Etc/UTC").unwrap()
    }

    fn query(start: &str, end: &str) -> DashboardQuery {
        DashboardQuery {
            start: Some(start.to_owned()),
            end: Some(end.to_owned()),
        }
    }

    fn text_of(document: &Html, selector: &str) -> String {
        document
            .select(&Selector::parse(selector).unwrap())
            .map(|element| element.text().collect::<String>())
            .collect()
    }

    #[tokio::test]
    async fn shows_card_per_user_and_totals() {
        let state = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_payment(Payment::build("Rent", 250.0, "u1", "u2"), &connection).unwrap();
            create_transaction(
                Transaction::build("Milk", 4.0, datetime!(2024-01-03 10:00 UTC), "u1", "c1")
                    .panini(true),
                &connection,
            )
            .unwrap();
            create_transaction(
                Transaction::build("Bus", 6.0, datetime!(2024-01-04 10:00 UTC), "u2", "c2"),
                &connection,
            )
            .unwrap();
        }

        let response = get_dashboard_page(State(state), Query(query("2024-01-01", "2024-01-31")))
            .await
            .unwrap();

        assert_status_ok(&response);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let cards = document
            .select(&Selector::parse("[data-user-id]").unwrap())
            .count();
        assert_eq!(cards, 2);
        let alice = text_of(&document, "[data-user-id=u1]");
        assert!(alice.contains(&format_currency(250.0)), "got {alice:?}");
        let totals = text_of(&document, "#totals");
        assert!(totals.contains(&format_currency(10.0)), "got {totals:?}");
        assert!(totals.contains(&format_currency(4.0)), "got {totals:?}");
        let categories = text_of(&document, "#panini-by-category tbody");
        assert!(categories.contains("Groceries"), "got {categories:?}");
        assert!(!categories.contains("Eating Out"), "got {categories:?}");
    }

    #[tokio::test]
    async fn category_table_respects_date_range() {
        let state = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                Transaction::build("Milk", 4.0, datetime!(2024-02-01 0:00 UTC), "u1", "c1")
                    .panini(true),
                &connection,
            )
            .unwrap();
        }

        let response = get_dashboard_page(State(state), Query(query("2024-01-01", "2024-01-31")))
            .await
            .unwrap();

        let document = parse_html_document(response).await;
        let categories = text_of(&document, "#panini-by-category tbody");
        assert!(
            categories.contains("No panini spending in this period."),
            "got {categories:?}"
        );
    }

    #[tokio::test]
    async fn invalid_timezone_is_an_error() {
        let state = DashboardState {
            local_timezone: "Mars/Olympus_Mons".to_owned(),
            ..get_test_state()
        };

        let result = get_dashboard_page(State(state), Query(DashboardQuery::default())).await;

        assert_eq!(
            result.err(),
            Some(Error::InvalidTimezoneError("Mars/Olympus_Mons".to_owned()))
        );
    }

    fn dates_of(range: Option<super::DateRange>) -> Option<(time::Date, time::Date)> {
        range.map(|range| (range.start, range.end))
    }

    #[test]
    fn missing_range_defaults_to_current_month() {
        let got = DashboardQuery::default().date_range(date!(2024 - 02 - 14), utc());

        assert_eq!(
            dates_of(got),
            Some((date!(2024 - 02 - 01), date!(2024 - 02 - 29)))
        );
    }

    #[test]
    fn reversed_range_is_swapped() {
        let got = query("2024-03-31", "2024-03-01").date_range(date!(2024 - 01 - 01), utc());

        assert_eq!(
            dates_of(got),
            Some((date!(2024 - 03 - 01), date!(2024 - 03 - 31)))
        );
    }

    #[test]
    fn malformed_bound_falls_back_to_month() {
        let got = query("yesterday", "2024-02-20").date_range(date!(2024 - 02 - 14), utc());

        assert_eq!(
            dates_of(got),
            Some((date!(2024 - 02 - 01), date!(2024 - 02 - 20)))
        );
    }

    #[test]
    fn bounds_outside_supported_years_fall_back_to_month() {
        let new_york = get_timezone("America/New_York").unwrap();
        let auckland = get_timezone("Pacific/Auckland").unwrap();

        let today = date!(2024 - 02 - 14);

        let far_future = query("2024-02-10", "9999-12-31").date_range(today, new_york);
        let far_past = query("-9999-01-01", "2024-02-20").date_range(today, auckland);

        assert_eq!(
            dates_of(far_future),
            Some((date!(2024 - 02 - 10), date!(2024 - 02 - 29)))
        );
        assert_eq!(
            dates_of(far_past),
            Some((date!(2024 - 02 - 01), date!(2024 - 02 - 20)))
        );
    }

    #[test]
    fn range_bounds_use_offset_on_each_day() {
        let auckland = get_timezone("Pacific/Auckland").unwrap();

        let got = query("2024-06-01", "2024-06-30")
            .date_range(date!(2024 - 10 - 19), auckland)
            .unwrap();

        assert_eq!(got.start_utc, datetime!(2024-05-31 12:00 UTC));
        assert_eq!(got.end_utc, datetime!(2024-06-30 11:59:59.999999999 UTC));
    }

    #[tokio::test]
    async fn late_night_panini_on_last_day_is_in_range() {
        let state = DashboardState {
            local_timezone: "Pacific/Auckland".to_owned(),
            ..get_test_state()
        };
        {
            let connection = state.db_connection.lock().unwrap();
            // 23:30 on 30 June in Auckland (+12).
            create_transaction(
                Transaction::build("Pizza", 30.0, datetime!(2024-06-30 11:30 UTC), "u1", "c2")
                    .panini(true),
                &connection,
            )
            .unwrap();
        }

        let response = get_dashboard_page(State(state), Query(query("2024-06-01", "2024-06-30")))
            .await
            .unwrap();

        let document = parse_html_document(response).await;
        let categories = text_of(&document, "#panini-by-category tbody");
        assert!(categories.contains("Eating Out"), "got {categories:?}");
    }

    #[test]
    fn unknown_category_falls_back_to_id() {
        let totals = vec![
            CategoryTotal {
                category_id: "c1".to_owned(),
                amount: 1.0,
            },
            CategoryTotal {
                category_id: "gone".to_owned(),
                amount: 2.0,
            },
        ];
        let categories = vec![Category {
            id: "c1".to_owned(),
            name: "Groceries".to_owned(),
            icon: "🛒".to_owned(),
            color: "#16a34a".to_owned(),
        }];

        let rows = join_category_totals(totals, categories);

        assert_eq!(rows[0].name, "Groceries");
        assert_eq!(rows[1].name, "gone");
        assert_eq!(rows[1].amount, 2.0);
    }
}
