//! The page for changing a budget's amount and date range from the browser.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    budget::{Budget, BudgetUpdate, get_budget, update_budget},
    dashboard::dashboard_error_response,
    database_id::BudgetId,
    endpoints::{self, format_endpoint},
    html::{BUTTON_PRIMARY_STYLE, amount_input, base, date_input, link, log_in_card},
};

/// The state needed for the edit budget page.
#[derive(Debug, Clone)]
pub struct EditBudgetPageState {
    /// The database connection for managing budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditBudgetPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn edit_budget_page(budget: &Budget, error_message: Option<&str>) -> Markup {
    let form = html! {
        form
            method="post"
            action=(format_endpoint(endpoints::EDIT_BUDGET_VIEW, budget.budget_id))
            class="space-y-4 md:space-y-6"
        {
            p id="budget-category" { "Category " (budget.category_id) }

            (amount_input("budget-amount", Some(budget.amount)))
            (date_input("budget-start-date", "start_date", "From", Some(budget.start_date)))
            (date_input("budget-end-date", "end_date", "To", Some(budget.end_date)))

            @if let Some(error_message) = error_message {
                p id="form-error" class="text-red-500 text-base" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save" }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                (link(endpoints::DASHBOARD_VIEW, "Back to dashboard"))
            }
        }
    };

    base("Edit Budget", &log_in_card("Edit budget", &form))
}

/// Display the form for editing one of the user's budgets.
///
/// A budget that does not exist or belongs to another user shows the dashboard
/// with a 404 status.
pub async fn get_edit_budget_page(
    State(state): State<EditBudgetPageState>,
    Extension(user_id): Extension<UserID>,
    Path(budget_id): Path<BudgetId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match get_budget(budget_id, user_id, &connection) {
        Ok(budget) => edit_budget_page(&budget, None).into_response(),
        Err(error) => dashboard_error_response(user_id, &connection, error),
    }
}

/// Handler for the edit budget form.
///
/// Redirects to the dashboard on success. A reversed date range shows the form
/// again with the submitted values and an error message.
pub async fn post_edit_budget_page(
    State(state): State<EditBudgetPageState>,
    Extension(user_id): Extension<UserID>,
    Path(budget_id): Path<BudgetId>,
    Form(update): Form<BudgetUpdate>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match update_budget(budget_id, user_id, update.clone(), &connection) {
        Ok(()) => Redirect::to(endpoints::DASHBOARD_VIEW).into_response(),
        Err(Error::InvalidDateRange) => match get_budget(budget_id, user_id, &connection) {
            Ok(budget) => {
                let submitted = Budget {
                    amount: update.amount,
                    start_date: update.start_date,
                    end_date: update.end_date,
                    ..budget
                };
                let message = Error::InvalidDateRange.to_string();

                (
                    StatusCode::BAD_REQUEST,
                    edit_budget_page(&submitted, Some(&message)),
                )
                    .into_response()
            }
            Err(error) => dashboard_error_response(user_id, &connection, error),
        },
        Err(error) => dashboard_error_response(user_id, &connection, error),
    }
}

#[cfg(test)]
mod edit_budget_page_tests {
    use axum::http::{StatusCode, header::LOCATION};
    use scraper::{Html, Selector};

    use crate::{
        Money,
        budget::Budget,
        endpoints::{self, format_endpoint},
        test_utils::{
            assert_valid_html, create_test_budget, get_test_server, parse_html_text,
            sign_up_and_log_in,
        },
    };

    fn input_value(html: &Html, name: &str) -> String {
        let selector = Selector::parse(&format!("input[name={name}]")).unwrap();
        html.select(&selector)
            .next()
            .and_then(|input| input.value().attr("value"))
            .unwrap_or_else(|| panic!("No value for input {name}"))
            .to_owned()
    }

    #[tokio::test]
    async fn form_is_filled_with_current_values() {
        let server = get_test_server();
        let (user_id, cookie) = sign_up_and_log_in(&server, "alice", "hunter2").await;
        let budget_id = create_test_budget(&server, &cookie, user_id).await;

        let response = server
            .get(&format_endpoint(endpoints::EDIT_BUDGET_VIEW, budget_id))
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        let html = parse_html_text(&response.text());
        assert_valid_html(&html);
        assert_eq!(input_value(&html, "amount"), "400.00");
        assert_eq!(input_value(&html, "start_date"), "2024-01-01");
        assert_eq!(input_value(&html, "end_date"), "2024-01-31");
    }

    #[tokio::test]
    async fn saving_updates_budget_and_redirects() {
        let server = get_test_server();
        let (user_id, cookie) = sign_up_and_log_in(&server, "alice", "hunter2").await;
        let budget_id = create_test_budget(&server, &cookie, user_id).await;

        let response = server
            .post(&format_endpoint(endpoints::EDIT_BUDGET_VIEW, budget_id))
            .add_cookie(cookie.clone())
            .form(&[
                ("amount", "120.10"),
                ("start_date", "2024-02-01"),
                ("end_date", "2024-02-29"),
            ])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header(LOCATION), endpoints::DASHBOARD_VIEW);
        let budgets: Vec<Budget> = server
            .get(&format_endpoint(endpoints::BUDGET, user_id.as_i64()))
            .add_cookie(cookie)
            .await
            .json();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].amount, Money::from_cents(12010));
        assert_eq!(budgets[0].start_date.to_string(), "2024-02-01");
    }

    #[tokio::test]
    async fn reversed_dates_show_form_again() {
        let server = get_test_server();
        let (user_id, cookie) = sign_up_and_log_in(&server, "alice", "hunter2").await;
        let budget_id = create_test_budget(&server, &cookie, user_id).await;

        let response = server
            .post(&format_endpoint(endpoints::EDIT_BUDGET_VIEW, budget_id))
            .add_cookie(cookie.clone())
            .form(&[
                ("amount", "120"),
                ("start_date", "2024-02-29"),
                ("end_date", "2024-02-01"),
            ])
            .await;

        response.assert_status_bad_request();
        let html = parse_html_text(&response.text());
        assert_valid_html(&html);
        assert_eq!(input_value(&html, "amount"), "120.00");
        assert_eq!(input_value(&html, "start_date"), "2024-02-29");
        let selector = Selector::parse("#form-error").unwrap();
        assert_eq!(html.select(&selector).count(), 1);

        let budgets: Vec<Budget> = server
            .get(&format_endpoint(endpoints::BUDGET, user_id.as_i64()))
            .add_cookie(cookie)
            .await
            .json();
        assert_eq!(budgets[0].amount, Money::from_cents(40000));
    }

    #[tokio::test]
    async fn another_users_budget_is_not_found() {
        let server = get_test_server();
        let (alice_id, alice_cookie) = sign_up_and_log_in(&server, "alice", "hunter2").await;
        let (_, bob_cookie) = sign_up_and_log_in(&server, "bob", "hunter3").await;
        let budget_id = create_test_budget(&server, &alice_cookie, alice_id).await;
        let path = format_endpoint(endpoints::EDIT_BUDGET_VIEW, budget_id);

        server
            .get(&path)
            .add_cookie(bob_cookie.clone())
            .await
            .assert_status_not_found();
        server
            .post(&path)
            .add_cookie(bob_cookie)
            .form(&[
                ("amount", "1"),
                ("start_date", "2024-02-01"),
                ("end_date", "2024-02-29"),
            ])
            .await
            .assert_status_not_found();
    }
}
