//! The dashboard page: an overview of the logged in user's accounts, recent
//! transactions, budgets and linked banks.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, display, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, Money, UserID,
    account::{Account, get_total_account_balance, list_accounts},
    auth::get_user_by_id,
    budget::{Budget, list_budgets},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        amount_input, base, date_input, format_currency, link,
    },
    plaid::count_credentials,
    transaction::{Transaction, list_transactions},
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading the user's data.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

struct DashboardData {
    username: String,
    accounts: Vec<Account>,
    total_balance: Money,
    transactions: Vec<Transaction>,
    budgets: Vec<Budget>,
    linked_banks: usize,
}

/// Display a page with an overview of the user's data.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let data = build_dashboard_data(user_id, &connection)?;

    Ok(dashboard_view(&data, None).into_response())
}

/// Render the dashboard with a message saying why a form submission failed.
///
/// The status code is the one `error` would have as an API response, internal
/// errors are logged and shown with a generic message.
pub(crate) fn dashboard_error_response(
    user_id: UserID,
    connection: &Connection,
    error: Error,
) -> Response {
    let status_code = error.status_code();
    let message = if status_code == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("Unhandled error while handling a dashboard form: {error}");
        "An internal error occurred. Please try again later.".to_owned()
    } else {
        error.to_string()
    };

    match build_dashboard_data(user_id, connection) {
        Ok(data) => (status_code, dashboard_view(&data, Some(&message))).into_response(),
        Err(error) => error.into_response(),
    }
}

fn build_dashboard_data(user_id: UserID, connection: &Connection) -> Result<DashboardData, Error> {
    let user = get_user_by_id(user_id, connection)?;

    let transactions = match list_transactions(user_id, connection) {
        Ok(transactions) => transactions,
        Err(Error::NoAccounts) => Vec::new(),
        Err(error) => return Err(error),
    };

    Ok(DashboardData {
        username: user.username,
        accounts: list_accounts(user_id, connection)?,
        total_balance: get_total_account_balance(user_id, connection)?,
        transactions,
        budgets: list_budgets(user_id, connection)?,
        linked_banks: count_credentials(user_id, connection)?,
    })
}

fn section(heading: &str, content: Markup) -> Markup {
    html! {
        section class="w-full max-w-3xl mb-8"
        {
            h2 class="text-xl font-semibold mb-4" { (heading) }
            (content)
        }
    }
}

fn accounts_table(accounts: &[Account], total_balance: Money) -> Markup {
    html! {
        @if accounts.is_empty() {
            p { "No accounts yet." }
        } @else {
            table class="w-full text-sm text-left"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr { th class=(TABLE_CELL_STYLE) { "Account" } th class=(TABLE_CELL_STYLE) { "Balance" } }
                }
                tbody
                {
                    @for account in accounts {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (account.account_type) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(account.balance.as_dollars())) }
                        }
                    }
                }
            }
        }

        p id="total-balance" class="mt-4 font-semibold"
        {
            "Total balance: " (format_currency(total_balance.as_dollars()))
        }
    }
}

fn transactions_table(transactions: &[Transaction]) -> Markup {
    html! {
        @if transactions.is_empty() {
            p { "No transactions yet." }
        } @else {
            table class="w-full text-sm text-left"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th class=(TABLE_CELL_STYLE) { "Date" }
                        th class=(TABLE_CELL_STYLE) { "Description" }
                        th class=(TABLE_CELL_STYLE) { "Amount" }
                        th class=(TABLE_CELL_STYLE) { span class="sr-only" { "Actions" } }
                    }
                }
                tbody
                {
                    @for transaction in transactions {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (display(transaction.transaction_date)) }
                            td class=(TABLE_CELL_STYLE) { (transaction.description) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(transaction.amount.as_dollars())) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                (delete_button(&format_endpoint(
                                    endpoints::DELETE_TRANSACTION_FORM,
                                    transaction.transaction_id,
                                )))
                            }
                        }
                    }
                }
            }
        }
    }
}

fn budgets_table(budgets: &[Budget]) -> Markup {
    html! {
        @if budgets.is_empty() {
            p { "No budgets yet." }
        } @else {
            table class="w-full text-sm text-left"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th class=(TABLE_CELL_STYLE) { "Category" }
                        th class=(TABLE_CELL_STYLE) { "Amount" }
                        th class=(TABLE_CELL_STYLE) { "From" }
                        th class=(TABLE_CELL_STYLE) { "To" }
                        th class=(TABLE_CELL_STYLE) { span class="sr-only" { "Actions" } }
                    }
                }
                tbody
                {
                    @for budget in budgets {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (budget.category_id) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(budget.amount.as_dollars())) }
                            td class=(TABLE_CELL_STYLE) { (display(budget.start_date)) }
                            td class=(TABLE_CELL_STYLE) { (display(budget.end_date)) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                div class="flex gap-4"
                                {
                                    a
                                        href=(format_endpoint(endpoints::EDIT_BUDGET_VIEW, budget.budget_id))
                                        class=(LINK_STYLE)
                                    {
                                        "Edit"
                                    }

                                    (delete_button(&format_endpoint(
                                        endpoints::DELETE_BUDGET_FORM,
                                        budget.budget_id,
                                    )))
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn delete_button(action: &str) -> Markup {
    html! {
        form method="post" action=(action)
        {
            button type="submit" class="text-red-600 hover:underline" { "Delete" }
        }
    }
}

fn account_select(id: &str, accounts: &[Account]) -> Markup {
    html! {
        div
        {
            label for=(id) class=(FORM_LABEL_STYLE) { "Account" }

            select name="account_id" id=(id) class=(FORM_TEXT_INPUT_STYLE) required
            {
                @for account in accounts {
                    option value=(account.account_id)
                    {
                        (account.account_type) " (" (format_currency(account.balance.as_dollars())) ")"
                    }
                }
            }
        }
    }
}

fn add_transaction_form(accounts: &[Account]) -> Markup {
    html! {
        form
            method="post"
            action=(endpoints::TRANSACTIONS_FORM)
            id="add-transaction-form"
            class="mt-6 space-y-4"
        {
            h3 class="text-lg font-semibold" { "Add transaction" }

            (account_select("transaction-account", accounts))
            (amount_input("transaction-amount", None))
            (date_input("transaction-date", "transaction_date", "Date", None))

            div
            {
                label for="transaction-description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    type="text"
                    name="description"
                    id="transaction-description"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add transaction" }
        }
    }
}

fn add_budget_form(accounts: &[Account]) -> Markup {
    html! {
        form
            method="post"
            action=(endpoints::BUDGETS_FORM)
            id="add-budget-form"
            class="mt-6 space-y-4"
        {
            h3 class="text-lg font-semibold" { "Add budget" }

            (account_select("budget-account", accounts))

            div
            {
                label for="budget-category" class=(FORM_LABEL_STYLE) { "Category" }

                input
                    type="number"
                    name="category_id"
                    id="budget-category"
                    step="1"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required;
            }

            (amount_input("budget-amount", None))
            (date_input("budget-start-date", "start_date", "From", None))
            (date_input("budget-end-date", "end_date", "To", None))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add budget" }
        }
    }
}

fn dashboard_view(data: &DashboardData, error_message: Option<&str>) -> Markup {
    let content = html! {
        div class=(PAGE_CONTAINER_STYLE)
        {
            header class="w-full max-w-3xl flex justify-between mb-8"
            {
                h1 class="text-2xl font-bold" { "Welcome, " (data.username) }
                (link(endpoints::LOG_OUT_VIEW, "Log out"))
            }

            @if let Some(error_message) = error_message {
                p id="form-error" class="w-full max-w-3xl mb-8 text-red-500" { (error_message) }
            }

            (section("Accounts", accounts_table(&data.accounts, data.total_balance)))
            (section("Transactions", html! {
                (transactions_table(&data.transactions))

                @if !data.accounts.is_empty() {
                    (add_transaction_form(&data.accounts))
                }
            }))
            (section("Budgets", html! {
                (budgets_table(&data.budgets))

                @if !data.accounts.is_empty() {
                    (add_budget_form(&data.accounts))
                }
            }))
            (section("Linked Banks", html! {
                p id="linked-banks" { (data.linked_banks) " linked" }
            }))
        }
    };

    base("Dashboard", &content)
}
