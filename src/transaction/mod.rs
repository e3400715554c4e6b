//! Transactions and the account balance bookkeeping that goes with them.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod form_endpoint;
mod list_endpoint;

pub use core::{
    NewTransaction, Transaction, add_transaction, create_transaction_table, delete_transaction,
    list_transactions,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use form_endpoint::{create_transaction_form_endpoint, delete_transaction_form_endpoint};
pub use list_endpoint::list_transactions_endpoint;
