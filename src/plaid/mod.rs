//! Linking bank accounts and pulling their transactions through the Plaid aggregation API.

mod client;
mod credential;
mod exchange_endpoint;
mod link_token_endpoint;
mod provider;
mod transactions_endpoint;

pub use client::{DEFAULT_PLAID_TIMEOUT, PlaidClient, PlaidConfig, PlaidEnvironment};
pub use credential::{count_credentials, create_plaid_integration_table};
pub use exchange_endpoint::exchange_token_endpoint;
pub use link_token_endpoint::create_link_token_endpoint;
pub use provider::{AggregationProvider, ExchangedToken, TransactionWindow};
pub use transactions_endpoint::get_linked_transactions_endpoint;
