//! The payment intake form: its wire format, validation and markup.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CHECKBOX_STYLE, FORM_LABEL_STYLE, form_error_message,
        loading_spinner, text_input_style,
    },
    payment::{Payment, PaymentBuilder},
    transaction::form::{AMOUNT_INVALID, AMOUNT_REQUIRED, DESCRIPTION_REQUIRED, non_blank},
    user::User,
};

pub(crate) const SENDER_REQUIRED: &str = "Sender is required";
pub(crate) const RECEIVER_REQUIRED: &str = "Receiver is required";

/// The raw fields submitted by the new payment form.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PaymentForm {
    /// What the payment was for.
    pub description: Option<String>,
    /// The amount paid, as typed by the user.
    pub amount: Option<String>,
    /// The ID of the user who paid.
    pub sender_id: Option<String>,
    /// The ID of the user who was paid.
    pub receiver_id: Option<String>,
    /// The panini checkbox. Browsers only send it when it is ticked.
    pub panini: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// The validation message for each field of a [PaymentForm], if any.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFormErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_id: Option<&'static str>,
}

impl PaymentForm {
    /// Whether the panini checkbox was ticked.
    pub fn is_panini(&self) -> bool {
        non_blank(&self.panini).is_some_and(|value| {
            !matches!(value.to_ascii_lowercase().as_str(), "false" | "off" | "0")
        })
    }

    /// Check that every required field is present and well formed.
    ///
    /// A panini payment does not need a receiver since it is always stored as
    /// paid to the sender.
    ///
    /// # Errors
    /// Returns the message for every invalid field if any field is invalid.
    pub fn validate(&self) -> Result<PaymentBuilder, PaymentFormErrors> {
        let mut errors = PaymentFormErrors::default();
        let panini = self.is_panini();

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

        let sender_id = non_blank(&self.sender_id);
        if sender_id.is_none() {
            errors.sender_id = Some(SENDER_REQUIRED);
        }

        let receiver_id = match non_blank(&self.receiver_id) {
            Some(receiver_id) => Some(receiver_id),
            None if panini => sender_id,
            None => {
                errors.receiver_id = Some(RECEIVER_REQUIRED);
                None
            }
        };

        match (description, amount, sender_id, receiver_id) {
            (Some(description), Some(amount), Some(sender_id), Some(receiver_id)) => Ok(
                Payment::build(description, amount, sender_id, receiver_id)
                    .panini(panini)
                    .notes(non_blank(&self.notes).map(str::to_owned)),
            ),
            _ => Err(errors),
        }
    }
}

fn user_select(
    name: &str,
    label: &str,
    selected_id: Option<&str>,
    error: Option<&str>,
    users: &[User],
) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            select name=(name) id=(name) class=(text_input_style(error))
            {
                option value="" { "Select a user" }

                @for user in users {
                    option value=(user.id) selected[selected_id == Some(user.id.as_str())]
                    {
                        (user.email)
                    }
                }
            }

            (form_error_message(error))
        }
    }
}

/// Render the new payment form with the submitted `values` and any `errors`.
pub fn payment_form(values: &PaymentForm, errors: &PaymentFormErrors, users: &[User]) -> Markup {
    html! {
        form
            id="payment-form"
            hx-post=(endpoints::PAYMENTS_API)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            h2 class="text-xl font-bold" { "New Payment" }

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

            (user_select("senderId", "From", values.sender_id.as_deref(), errors.sender_id, users))
            (user_select("receiverId", "To", values.receiver_id.as_deref(), errors.receiver_id, users))

            div class="flex items-center gap-2"
            {
                input
                    name="panini"
                    id="panini"
                    type="checkbox"
                    value="on"
                    checked[values.is_panini()]
                    class=(FORM_CHECKBOX_STYLE);

                label for="panini" class="text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Panini (contribution to shared expenses, paid to the sender)"
                }
            }

            div
            {
                label for="notes" class=(FORM_LABEL_STYLE) { "Notes" }

                textarea
                    name="notes"
                    id="notes"
                    rows="3"
                    class=(text_input_style(None))
                {
                    (values.notes.as_deref().unwrap_or_default())
                }
            }

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span id="indicator" class="inline htmx-indicator"
                {
                    (loading_spinner())
                }
                " Create Payment"
            }
        }
    }
}

#[cfg(test)]
mod validation_tests {
    use serde_json::json;

    use crate::{
        payment::Payment,
        transaction::form::{AMOUNT_INVALID, DESCRIPTION_REQUIRED},
    };

    use super::{PaymentForm, RECEIVER_REQUIRED, SENDER_REQUIRED};

    fn complete_form() -> PaymentForm {
        PaymentForm {
            description: Some("Rent".to_owned()),
            amount: Some("250".to_owned()),
            sender_id: Some("u1".to_owned()),
            receiver_id: Some("u2".to_owned()),
            panini: None,
            notes: None,
        }
    }

    #[test]
    fn complete_form_builds_payment() {
        let got = complete_form().validate();

        assert_eq!(got, Ok(Payment::build("Rent", 250.0, "u1", "u2")));
    }

    #[test]
    fn panini_checkbox_and_notes_are_kept() {
        let form = PaymentForm {
            panini: Some("on".to_owned()),
            notes: Some("  March  ".to_owned()),
            ..complete_form()
        };

        let builder = form.validate().unwrap();

        assert!(builder.panini);
        assert_eq!(builder.notes.as_deref(), Some("March"));
    }

    #[test]
    fn panini_payment_does_not_need_receiver() {
        let form = PaymentForm {
            receiver_id: None,
            panini: Some("on".to_owned()),
            ..complete_form()
        };

        let builder = form.validate().unwrap();

        assert_eq!(builder.receiver_id, "u1");
    }

    #[test]
    fn empty_form_reports_every_required_field() {
        let errors = PaymentForm::default().validate().unwrap_err();

        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            json!({
                "description": "Description is required",
                "amount": "Amount is required",
                "senderId": "Sender is required",
                "receiverId": "Receiver is required",
            })
        );
    }

    #[test]
    fn reports_only_invalid_fields() {
        let form = PaymentForm {
            description: Some(" ".to_owned()),
            amount: Some("ten".to_owned()),
            sender_id: None,
            ..complete_form()
        };

        let errors = form.validate().unwrap_err();

        assert_eq!(errors.description, Some(DESCRIPTION_REQUIRED));
        assert_eq!(errors.amount, Some(AMOUNT_INVALID));
        assert_eq!(errors.sender_id, Some(SENDER_REQUIRED));
        assert_eq!(errors.receiver_id, None);
    }

    #[test]
    fn missing_receiver_is_reported_without_panini() {
        let form = PaymentForm {
            receiver_id: Some(String::new()),
            ..complete_form()
        };

        let errors = form.validate().unwrap_err();

        assert_eq!(errors.receiver_id, Some(RECEIVER_REQUIRED));
    }

    #[test]
    fn unticked_checkbox_values_are_not_panini() {
        for value in ["false", "off", "0", ""] {
            let form = PaymentForm {
                panini: Some(value.to_owned()),
                ..complete_form()
            };

            assert!(!form.is_panini(), "{value:?} should not be panini");
        }
    }

    #[test]
    fn deserializes_checkbox_form() {
        let form: PaymentForm = serde_html_form::from_str(
            "description=Pizza&amount=10&senderId=u1&receiverId=u2&panini=on",
        )
        .unwrap();

        assert!(form.is_panini());
        assert_eq!(form.receiver_id.as_deref(), Some("u2"));
    }

    #[test]
    fn rejects_unknown_fields() {
        let result = serde_html_form::from_str::<PaymentForm>("description=Pizza&categoryId=c1");

        assert!(result.is_err(), "want error for unknown field, got {result:?}");
    }
}

#[cfg(test)]
mod markup_tests {
    use scraper::{Html, Selector};

    use crate::{
        endpoints,
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, must_get_form,
        },
        user::User,
    };

    use super::{PaymentForm, PaymentFormErrors, SENDER_REQUIRED, payment_form};

    fn users() -> Vec<User> {
        vec![
            User {
                id: "u1".to_owned(),
                email: "alice@example.com".to_owned(),
            },
            User {
                id: "u2".to_owned(),
                email: "bob@example.com".to_owned(),
            },
        ]
    }

    #[test]
    fn form_posts_to_payments_api() {
        let html = Html::parse_fragment(
            &payment_form(&PaymentForm::default(), &PaymentFormErrors::default(), &users())
                .into_string(),
        );
        let form = must_get_form(&html);

        assert_hx_endpoint(&form, endpoints::PAYMENTS_API, "hx-post");
        assert_form_input(&form, "description", "text");
        assert_form_input(&form, "amount", "number");
        assert_form_submit_button(&form);

        let checkbox = form
            .select(&Selector::parse("input[name=panini]").unwrap())
            .next()
            .expect("No panini checkbox found");
        assert_eq!(checkbox.value().attr("type"), Some("checkbox"));
        assert_eq!(checkbox.value().attr("required"), None);

        for name in ["senderId", "receiverId"] {
            let selector = Selector::parse(&format!("select[name={name}] option[value]")).unwrap();
            // The placeholder option plus one per user.
            assert_eq!(form.select(&selector).count(), 3, "options for {name}");
        }
    }

    #[test]
    fn form_keeps_checkbox_and_shows_errors() {
        let values = PaymentForm {
            panini: Some("on".to_owned()),
            ..Default::default()
        };
        let errors = PaymentFormErrors {
            sender_id: Some(SENDER_REQUIRED),
            ..Default::default()
        };

        let html = Html::parse_fragment(&payment_form(&values, &errors, &users()).into_string());
        let form = must_get_form(&html);

        let checked = form
            .select(&Selector::parse("input[name=panini][checked]").unwrap())
            .count();
        assert_eq!(checked, 1);
        let messages = form
            .select(&Selector::parse("p").unwrap())
            .map(|p| p.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(messages, vec![SENDER_REQUIRED]);
    }
}
