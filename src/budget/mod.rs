//! Spending limits set against a user's accounts.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod form_endpoint;
mod list_endpoint;

pub use core::{
    Budget, BudgetUpdate, NewBudget, create_budget, create_budget_table, delete_budget,
    get_budget, list_budgets, update_budget,
};
pub use create_endpoint::create_budget_endpoint;
pub use delete_endpoint::delete_budget_endpoint;
pub use edit_endpoint::update_budget_endpoint;
pub use edit_page::{get_edit_budget_page, post_edit_budget_page};
pub use form_endpoint::{create_budget_form_endpoint, delete_budget_form_endpoint};
pub use list_endpoint::list_budgets_endpoint;
