//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{get, post},
};

use crate::{
    AppState,
    account::{create_account_endpoint, list_accounts_endpoint, list_budget_accounts_endpoint},
    auth::{
        auth_guard, auth_guard_page, get_log_in_page, get_log_out, get_sign_up_page, log_in,
        log_out, post_log_in_page, post_sign_up_page, sign_up,
    },
    budget::{
        create_budget_endpoint, create_budget_form_endpoint, delete_budget_endpoint,
        delete_budget_form_endpoint, get_edit_budget_page, list_budgets_endpoint,
        post_edit_budget_page, update_budget_endpoint,
    },
    dashboard::get_dashboard_page,
    endpoints,
    logging::logging_middleware,
    not_found::get_404_not_found,
    plaid::{
        create_link_token_endpoint, exchange_token_endpoint, get_linked_transactions_endpoint,
    },
    transaction::{
        create_transaction_endpoint, create_transaction_form_endpoint,
        delete_transaction_endpoint, delete_transaction_form_endpoint,
        list_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::SIGN_UP, post(sign_up))
        .route(endpoints::LOG_IN_API, post(log_in))
        .route(endpoints::LOG_OUT_API, post(log_out))
        .route(
            endpoints::LOG_IN_VIEW,
            get(get_log_in_page).post(post_log_in_page),
        )
        .route(endpoints::LOG_OUT_VIEW, get(get_log_out))
        .route(
            endpoints::SIGN_UP_VIEW,
            get(get_sign_up_page).post(post_sign_up_page),
        );

    let protected_pages = Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(
            endpoints::TRANSACTIONS_FORM,
            post(create_transaction_form_endpoint),
        )
        .route(
            endpoints::DELETE_TRANSACTION_FORM,
            post(delete_transaction_form_endpoint),
        )
        .route(endpoints::BUDGETS_FORM, post(create_budget_form_endpoint))
        .route(
            endpoints::EDIT_BUDGET_VIEW,
            get(get_edit_budget_page).post(post_edit_budget_page),
        )
        .route(
            endpoints::DELETE_BUDGET_FORM,
            post(delete_budget_form_endpoint),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard_page));

    // The parameter of the transaction and budget routes is a user ID for GET
    // and the row's own ID for every other method.
    let protected_api = Router::new()
        .route(endpoints::ACCOUNTS_API, post(create_account_endpoint))
        .route(endpoints::USER_ACCOUNTS, get(list_accounts_endpoint))
        .route(
            endpoints::USER_BUDGET_ACCOUNTS,
            get(list_budget_accounts_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS_API,
            post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(list_transactions_endpoint).delete(delete_transaction_endpoint),
        )
        .route(endpoints::BUDGETS_API, post(create_budget_endpoint))
        .route(
            endpoints::BUDGET,
            get(list_budgets_endpoint)
                .put(update_budget_endpoint)
                .delete(delete_budget_endpoint),
        )
        .route(
            endpoints::PLAID_LINK_TOKEN,
            post(create_link_token_endpoint),
        )
        .route(endpoints::PLAID_EXCHANGE_TOKEN, post(exchange_token_endpoint))
        .route(
            endpoints::PLAID_TRANSACTIONS,
            get(get_linked_transactions_endpoint),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_api
        .merge(protected_pages)
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
