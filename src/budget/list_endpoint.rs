//! Defines the endpoint for listing a user's budgets.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    auth::require_same_user,
    budget::core::{Budget, list_budgets},
    extract::{Json, Path},
};

/// The state needed to list budgets.
#[derive(Debug, Clone)]
pub struct ListBudgetsState {
    /// The database connection for managing budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListBudgetsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that returns every budget the user has set.
///
/// A user with no budgets gets an empty list.
pub async fn list_budgets_endpoint(
    State(state): State<ListBudgetsState>,
    Extension(session_user): Extension<UserID>,
    Path(user_id): Path<UserID>,
) -> Result<Json<Vec<Budget>>, Error> {
    require_same_user(session_user, user_id)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    list_budgets(user_id, &connection).map(Json)
}

#[cfg(test)]
mod list_budgets_endpoint_tests {
    use axum::http::StatusCode;
    use axum_extra::extract::cookie::Cookie;
    use axum_test::TestServer;
    use serde_json::json;
    use time::macros::date;

    use crate::{
        Money, UserID,
        budget::Budget,
        endpoints::{self, format_endpoint},
        test_utils::{create_test_account, get_test_server, sign_up_and_log_in},
    };

    async fn get_budgets(
        server: &TestServer,
        cookie: &Cookie<'static>,
        user_id: UserID,
    ) -> Vec<Budget> {
        let response = server
            .get(&format_endpoint(endpoints::BUDGET, user_id.as_i64()))
            .add_cookie(cookie.clone())
            .await;
        response.assert_status_ok();

        response.json()
    }

    #[tokio::test]
    async fn user_without_budgets_gets_empty_list() {
        let server = get_test_server();
        let (user_id, cookie) = sign_up_and_log_in(&server, "alice", "hunter2").await;

        let response = server
            .get(&format_endpoint(endpoints::BUDGET, user_id.as_i64()))
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        let budgets: Vec<Budget> = response.json();
        assert!(budgets.is_empty());
    }

    #[tokio::test]
    async fn other_users_budgets_are_forbidden() {
        let server = get_test_server();
        let (alice, _) = sign_up_and_log_in(&server, "alice", "hunter2").await;
        let (_, bob_cookie) = sign_up_and_log_in(&server, "bob", "hunter3").await;

        let response = server
            .get(&format_endpoint(endpoints::BUDGET, alice.as_i64()))
            .add_cookie(bob_cookie)
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn list_reflects_create_update_and_delete() {
        let server = get_test_server();
        let (user_id, cookie) = sign_up_and_log_in(&server, "alice", "hunter2").await;
        let account_id = create_test_account(&server, &cookie, user_id, 0.0).await;

        server
            .post(endpoints::BUDGETS_API)
            .add_cookie(cookie.clone())
            .json(&json!({
                "user_id": user_id,
                "account_id": account_id,
                "category_id": 3,
                "amount": 0.7,
                "start_date": "2024-05-01",
                "end_date": "2024-05-31"
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let budgets = get_budgets(&server, &cookie, user_id).await;
        assert_eq!(budgets.len(), 1);
        let budget = &budgets[0];
        assert_eq!(budget.user_id, user_id);
        assert_eq!(budget.account_id, account_id);
        assert_eq!(budget.category_id, 3);
        assert_eq!(budget.amount, Money::from_cents(70));
        assert_eq!(budget.start_date, date!(2024 - 05 - 01));
        assert_eq!(budget.end_date, date!(2024 - 05 - 31));
        let budget_id = budget.budget_id;

        server
            .put(&format_endpoint(endpoints::BUDGET, budget_id))
            .add_cookie(cookie.clone())
            .json(&json!({
                "amount": 0.3,
                "start_date": "2024-06-01",
                "end_date": "2024-06-30"
            }))
            .await
            .assert_status_ok();

        let budgets = get_budgets(&server, &cookie, user_id).await;
        assert_eq!(
            budgets,
            vec![Budget {
                budget_id,
                user_id,
                account_id,
                category_id: 3,
                amount: Money::from_cents(30),
                start_date: date!(2024 - 06 - 01),
                end_date: date!(2024 - 06 - 30),
            }]
        );

        server
            .delete(&format_endpoint(endpoints::BUDGET, budget_id))
            .add_cookie(cookie.clone())
            .await
            .assert_status_ok();

        assert!(get_budgets(&server, &cookie, user_id).await.is_empty());
    }
}
