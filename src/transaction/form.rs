//! The transaction intake form: its wire format, validation and markup.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time_tz::Tz;

use crate::{
    category::Category,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, form_error_message, loading_spinner,
        text_input_style,
    },
    timezone::parse_local_date_time,
    transaction::{Transaction, TransactionBuilder},
    user::User,
};

pub(crate) const DESCRIPTION_REQUIRED: &str = "Description is required";
pub(crate) const AMOUNT_REQUIRED: &str = "Amount is required";
pub(crate) const AMOUNT_INVALID: &str = "Amount must be a number";
pub(crate) const DATE_REQUIRED: &str = "Date is required";
pub(crate) const DATE_INVALID: &str = "Date must be a valid date and time";
pub(crate) const USER_REQUIRED: &str = "User is required";
pub(crate) const CATEGORY_REQUIRED: &str = "Category is required";

/// The raw fields submitted by the new transaction form.
///
/// Every field is optional here so that a missing field is reported back to
/// the user instead of rejecting the whole request.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TransactionForm {
    /// Text detailing the transaction.
    pub description: Option<String>,
    /// The amount spent, as typed by the user.
    pub amount: Option<String>,
    /// When the transaction happened, in the server's local time.
    pub date: Option<String>,
    /// The ID of the user who spent the money.
    pub user_id: Option<String>,
    /// The ID of the transaction's category.
    pub category_id: Option<String>,
}

/// The validation message for each field of a [TransactionForm], if any.
///
/// Serializes to a map containing only the fields with errors.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFormErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<&'static str>,
}

impl TransactionForm {
    /// Check that every field is present and well formed.
    ///
    /// The date is read in `timezone`. The resulting transaction is
    /// not panini and has no notes.
    ///
    /// # Errors
    /// Returns the message for every invalid field if any field is invalid.
    pub fn validate(&self, timezone: &Tz) -> Result<TransactionBuilder, TransactionFormErrors> {
        let mut errors = TransactionFormErrors::default();

        let description = non_blank(&self.description);
        if description.is_none() {
            errors.description = Some(DESCRIPTION_REQUIRED);
        }

        let amount = match non_blank(&self.amount) {
            None => {
                errors.amount = Some(AMOUNT_REQUIRED);
                None
            }
            Some(amount) => match amount.parse::<f64>() {
                Ok(amount) if amount.is_finite() => Some(amount),
                _ => {
                    errors.amount = Some(AMOUNT_INVALID);
                    None
                }
            },
        };

        let date = match non_blank(&self.date) {
            None => {
                errors.date = Some(DATE_REQUIRED);
                None
            }
            Some(date) => {
                let date = parse_local_date_time(date, timezone);
                if date.is_none() {
                    errors.date = Some(DATE_INVALID);
                }
                date
            }
        };

        let user_id = non_blank(&self.user_id);
        if user_id.is_none() {
            errors.user_id = Some(USER_REQUIRED);
        }

        let category_id = non_blank(&self.category_id);
        if category_id.is_none() {
            errors.category_id = Some(CATEGORY_REQUIRED);
        }

        match (description, amount, date, user_id, category_id) {
            (Some(description), Some(amount), Some(date), Some(user_id), Some(category_id)) => {
                Ok(
                    Transaction::build(description, amount, date, user_id, category_id)
                        .panini(false)
                        .notes(None),
                )
            }
            _ => Err(errors),
        }
    }
}

/// The trimmed value of a field, treating blank text as missing.
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Render the new transaction form with the submitted `values` and any `errors`.
pub fn transaction_form(
    values: &TransactionForm,
    errors: &TransactionFormErrors,
    users: &[User],
    categories: &[Category],
) -> Markup {
    let spinner = loading_spinner();

    html! {
        form
            id="transaction-form"
            hx-post=(endpoints::TRANSACTIONS_API)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            h2 class="text-xl font-bold" { "New Transaction" }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    name="description"
                    id="description"
                    type="text"
                    placeholder="Description"
                    required
                    autofocus
                    value=[values.description.as_deref()]
                    class=(text_input_style(errors.description));

                (form_error_message(errors.description))
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                // w-full needed to ensure input takes the full width when prefilled with a value
                div class="input-wrapper w-full"
                {
                    input
                        name="amount"
                        id="amount"
                        type="number"
                        step="0.01"
                        placeholder="0.00"
                        required
                        value=[values.amount.as_deref()]
                        class=(text_input_style(errors.amount));
                }

                (form_error_message(errors.amount))
            }

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    name="date"
                    id="date"
                    type="datetime-local"
                    required
                    value=[values.date.as_deref()]
                    class=(text_input_style(errors.date));

                (form_error_message(errors.date))
            }

            div
            {
                label for="userId" class=(FORM_LABEL_STYLE) { "User" }

                select
                    name="userId"
                    id="userId"
                    required
                    class=(text_input_style(errors.user_id))
                {
                    option value="" { "Select a user" }

                    @for user in users {
                        option
                            value=(user.id)
                            selected[values.user_id.as_deref() == Some(user.id.as_str())]
                        {
                            (user.email)
                        }
                    }
                }

                (form_error_message(errors.user_id))
            }

            div
            {
                label for="categoryId" class=(FORM_LABEL_STYLE) { "Category" }

                select
                    name="categoryId"
                    id="categoryId"
                    required
                    class=(text_input_style(errors.category_id))
                {
                    option value="" { "Select a category" }

                    @for category in categories {
                        option
                            value=(category.id)
                            selected[values.category_id.as_deref() == Some(category.id.as_str())]
                        {
                            (category.icon) " " (category.name)
                        }
                    }
                }

                (form_error_message(errors.category_id))
            }

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span id="indicator" class="inline htmx-indicator"
                {
                    (spinner)
                }
                " Create Transaction"
            }
        }
    }
}
