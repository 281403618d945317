//! Alerts for reporting failed HTMX requests.
//!
//! Alerts are swapped into the `#alert-container` element of the page
//! layout and can be dismissed by the user.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::{Markup, html};

/// An error message with a heading and some details on how to fix it.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    message: String,
    details: String,
}

impl Alert {
    /// Create a new error alert.
    pub fn error(message: &str, details: &str) -> Self {
        Self {
            message: message.to_owned(),
            details: details.to_owned(),
        }
    }

    pub fn into_html(self) -> Markup {
        html! {
            div
                class="flex items-start gap-3 p-4 mb-4 text-red-800 rounded-lg bg-red-50 \
                    dark:bg-gray-800 dark:text-red-400"
                role="alert"
            {
                div class="text-sm"
                {
                    p class="font-medium" { (self.message) }

                    @if !self.details.is_empty() {
                        p { (self.details) }
                    }
                }

                button
                    type="button"
                    class="ms-auto bg-transparent"
                    aria-label="Close"
                    onclick="this.parentElement.remove()"
                {
                    "✕"
                }
            }
        }
    }

    /// Render the alert as an HTML fragment response with `status`.
    pub fn into_response_with_status(self, status: StatusCode) -> Response {
        (status, Html(self.into_html().into_string())).into_response()
    }
}
