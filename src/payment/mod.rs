//! Payments between members of the household.
//!
//! This module contains the `Payment` model, its database functions and
//! aggregates, the payment intake form and the payment web pages.

mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod form;
mod payments_page;

pub use self::core::{
    Payment, PaymentBalance, PaymentBuilder, PaymentListItem, create_payment,
    create_payment_table, delete_payment, get_panini_total_payment_to_user, get_payment,
    get_user_payment_balance, list_payments, update_payment,
};
pub use create_endpoint::create_payment_endpoint;
pub use create_page::get_create_payment_page;
pub use delete_endpoint::delete_payment_endpoint;
pub use payments_page::get_payments_page;
