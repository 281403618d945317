//! Transaction management for the ledger.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying and totalling transactions
//! - The intake form and its validation
//! - View handlers for transaction-related web pages

mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
pub(crate) mod form;
mod transactions_page;

pub use self::core::{
    CategoryTotal, Transaction, TransactionBuilder, TransactionListItem, create_transaction,
    create_transaction_table, delete_transaction, get_panini_total_spent,
    get_panini_total_spent_by_category, get_total_spent, get_transaction,
    get_user_spent_on_panini, get_user_total_spent, list_transactions, update_transaction,
};
pub use create_endpoint::create_transaction_endpoint;
pub use create_page::get_create_transaction_page;
pub use delete_endpoint::delete_transaction_endpoint;
pub use transactions_page::get_transactions_page;

