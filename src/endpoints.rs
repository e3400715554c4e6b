//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/budgets/{id}', use [format_endpoint].

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The route for getting the log in page and submitting its form.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The route for logging out from the browser.
pub const LOG_OUT_VIEW: &str = "/log_out";
/// The route for getting the sign up page and submitting its form.
pub const SIGN_UP_VIEW: &str = "/sign_up";
/// The dashboard form for recording a transaction.
pub const TRANSACTIONS_FORM: &str = "/dashboard/transactions";
/// The dashboard form for deleting a transaction.
pub const DELETE_TRANSACTION_FORM: &str = "/dashboard/transactions/{transaction_id}/delete";
/// The dashboard form for creating a budget.
pub const BUDGETS_FORM: &str = "/dashboard/budgets";
/// The page for editing a budget and submitting its form.
pub const EDIT_BUDGET_VIEW: &str = "/dashboard/budgets/{budget_id}/edit";
/// The dashboard form for deleting a budget.
pub const DELETE_BUDGET_FORM: &str = "/dashboard/budgets/{budget_id}/delete";

/// The route for registering a new user.
pub const SIGN_UP: &str = "/users/signup";
/// The route for logging in a user.
pub const LOG_IN_API: &str = "/users/login";
/// The route for the client to log out the current user.
pub const LOG_OUT_API: &str = "/users/logout";

/// The route to create an account.
pub const ACCOUNTS_API: &str = "/db/accounts";
/// The route to list a user's accounts.
pub const USER_ACCOUNTS: &str = "/db/accounts/{user_id}";
/// The route to list the accounts a user can budget against.
pub const USER_BUDGET_ACCOUNTS: &str = "/db/budgets/accounts/{user_id}";
/// The route to create a transaction.
pub const TRANSACTIONS_API: &str = "/db/transactions";
/// The route to list a user's transactions (GET, the parameter is a user ID)
/// or delete a transaction (DELETE, the parameter is a transaction ID).
pub const TRANSACTION: &str = "/db/transactions/{id}";
/// The route to create a budget.
pub const BUDGETS_API: &str = "/budgets";
/// The route to list a user's budgets (GET, the parameter is a user ID) or
/// update or delete a budget (PUT and DELETE, the parameter is a budget ID).
pub const BUDGET: &str = "/budgets/{id}";

/// The route to mint a link token for the bank linking widget.
pub const PLAID_LINK_TOKEN: &str = "/plaid/create-link-token";
/// The route to exchange a public token for a stored access token.
pub const PLAID_EXCHANGE_TOKEN: &str = "/plaid/exchange-token";
/// The route to fetch a user's transactions from their linked bank.
pub const PLAID_TRANSACTIONS: &str = "/plaid/sandbox-transactions/{user_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/budgets/{id}', '{id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
