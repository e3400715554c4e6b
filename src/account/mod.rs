//! Bank accounts and their running balances.

mod core;
mod create_endpoint;
mod list_endpoint;

pub use core::{
    Account, create_account, create_account_table, get_account, get_total_account_balance,
    list_accounts, list_budget_accounts,
};
pub use create_endpoint::create_account_endpoint;
pub use list_endpoint::{list_accounts_endpoint, list_budget_accounts_endpoint};
