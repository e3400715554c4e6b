//! Defines the endpoint for fetching a user's transactions from their linked bank.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    AppState, Error, UserID,
    auth::require_same_user,
    extract::{Json, Path},
    plaid::{
        credential::get_first_access_token,
        provider::{AggregationProvider, TransactionWindow},
    },
};

/// The state needed to fetch linked transactions.
#[derive(Clone)]
pub struct LinkedTransactionsState {
    pub provider: Arc<dyn AggregationProvider>,
    pub db_connection: Arc<Mutex<Connection>>,
    pub transaction_window: TransactionWindow,
}

impl FromRef<AppState> for LinkedTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            provider: state.aggregation_provider.clone(),
            db_connection: state.db_connection.clone(),
            transaction_window: state.transaction_window,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LinkedTransactions {
    pub transactions: Vec<Value>,
}

/// A route handler that returns the transactions the provider reports for the
/// user's first linked item within the configured window.
pub async fn get_linked_transactions_endpoint(
    State(state): State<LinkedTransactionsState>,
    Extension(session_user): Extension<UserID>,
    Path(user_id): Path<UserID>,
) -> Result<Json<LinkedTransactions>, Error> {
    require_same_user(session_user, user_id)?;

    // The lock must be released before awaiting the provider.
    let access_token = {
        let connection = state.db_connection.lock().map_err(|error| {
            tracing::error!("Could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

        get_first_access_token(user_id, &connection)?
    };

    let TransactionWindow { start, end } = state.transaction_window;
    let transactions = state
        .provider
        .get_transactions(&access_token, start, end)
        .await?;

    Ok(Json(LinkedTransactions { transactions }))
}

#[cfg(test)]
mod linked_transactions_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        Error, ErrorResponse, endpoints,
        endpoints::format_endpoint,
        test_utils::{get_test_server, sign_up_and_log_in},
    };

    use super::LinkedTransactions;

    #[tokio::test]
    async fn fetch_before_exchange_is_not_found() {
        let server = get_test_server();
        let (user_id, cookie) = sign_up_and_log_in(&server, "alice", "hunter2").await;

        let response = server
            .get(&format_endpoint(endpoints::PLAID_TRANSACTIONS, user_id.as_i64()))
            .add_cookie(cookie)
            .await;

        response.assert_status_not_found();
        let body: ErrorResponse = response.json();
        assert_eq!(body.error, Error::MissingAccessToken.to_string());
    }

    #[tokio::test]
    async fn returns_transactions_for_first_linked_item() {
        let server = get_test_server();
        let (user_id, cookie) = sign_up_and_log_in(&server, "alice", "hunter2").await;
        for public_token in ["public-sandbox-1", "public-sandbox-2"] {
            server
                .post(endpoints::PLAID_EXCHANGE_TOKEN)
                .add_cookie(cookie.clone())
                .json(&json!({ "public_token": public_token, "user_id": user_id }))
                .await
                .assert_status_ok();
        }

        let response = server
            .get(&format_endpoint(endpoints::PLAID_TRANSACTIONS, user_id.as_i64()))
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        let body: LinkedTransactions = response.json();
        assert_eq!(body.transactions.len(), 2);
        assert_eq!(body.transactions[0]["access_token"], "access-public-sandbox-1");
        assert_eq!(body.transactions[0]["start_date"], "2024-01-01");
        assert_eq!(body.transactions[0]["end_date"], "2024-12-31");
    }

    #[tokio::test]
    async fn rejects_other_users() {
        let server = get_test_server();
        let (user_id, cookie) = sign_up_and_log_in(&server, "alice", "hunter2").await;

        let response = server
            .get(&format_endpoint(endpoints::PLAID_TRANSACTIONS, user_id.as_i64() + 1))
            .add_cookie(cookie)
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
    }
}
