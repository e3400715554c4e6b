use std::sync::Arc;

use axum::http::StatusCode;
use axum_extra::extract::cookie::Cookie;
use axum_test::TestServer;
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{
    AppState, UserID,
    auth::{COOKIE_TOKEN, LogInResponse},
    build_router,
    database_id::{AccountId, BudgetId},
    endpoints,
    plaid::TransactionWindow,
    test_utils::StubProvider,
};

pub(crate) fn get_test_state() -> AppState {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    let mut state = AppState::new(
        connection,
        "42",
        Arc::new(StubProvider),
        TransactionWindow::default(),
    )
    .expect("Could not create app state.");
    // The lowest cost bcrypt allows, keeps the tests fast.
    state.password_hash_cost = 4;

    state
}

pub(crate) fn get_test_server() -> TestServer {
    get_test_server_with_state(get_test_state())
}

pub(crate) fn get_test_server_with_state(state: AppState) -> TestServer {
    TestServer::try_new(build_router(state)).expect("Could not create test server.")
}

pub(crate) async fn sign_up(server: &TestServer, username: &str, password: &str) {
    server
        .post(endpoints::SIGN_UP)
        .json(&json!({ "username": username, "password": password }))
        .await
        .assert_status(StatusCode::CREATED);
}

pub(crate) async fn sign_up_and_log_in(
    server: &TestServer,
    username: &str,
    password: &str,
) -> (UserID, Cookie<'static>) {
    sign_up(server, username, password).await;

    let response = server
        .post(endpoints::LOG_IN_API)
        .json(&json!({ "username": username, "password": password }))
        .await;
    response.assert_status_ok();

    let body: LogInResponse = response.json();
    let cookie = response.cookie(COOKIE_TOKEN);

    (body.user_id, cookie)
}

pub(crate) async fn create_test_account(
    server: &TestServer,
    cookie: &Cookie<'static>,
    user_id: UserID,
    balance: f64,
) -> AccountId {
    let response = server
        .post(endpoints::ACCOUNTS_API)
        .add_cookie(cookie.clone())
        .json(&json!({ "user_id": user_id, "account_type": "Checking", "balance": balance }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let account: Value = response.json();
    account["account_id"]
        .as_i64()
        .expect("Account ID missing from response.")
}

pub(crate) async fn create_test_budget(
    server: &TestServer,
    cookie: &Cookie<'static>,
    user_id: UserID,
) -> BudgetId {
    let account_id = create_test_account(server, cookie, user_id, 100.0).await;

    let response = server
        .post(endpoints::BUDGETS_API)
        .add_cookie(cookie.clone())
        .json(&json!({
            "user_id": user_id,
            "account_id": account_id,
            "category_id": 1,
            "amount": 400.0,
            "start_date": "2024-01-01",
            "end_date": "2024-01-31"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    body["budget"]["budget_id"]
        .as_i64()
        .expect("Budget ID missing from response.")
}
