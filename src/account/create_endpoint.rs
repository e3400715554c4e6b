//! Defines the endpoint for creating a new account.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, Money, UserID,
    account::{Account, create_account},
    auth::require_same_user,
    extract::Json,
};

/// The state needed to create an account.
#[derive(Debug, Clone)]
pub struct CreateAccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating an account.
#[derive(Debug, Deserialize)]
pub struct AccountRequest {
    /// The user that will own the account.
    pub user_id: UserID,
    /// The kind of account, e.g. "Checking".
    pub account_type: String,
    /// The opening balance in dollars.
    pub balance: Money,
}

/// A route handler for creating a new account, responds with the created account.
pub async fn create_account_endpoint(
    State(state): State<CreateAccountState>,
    Extension(session_user): Extension<UserID>,
    Json(request): Json<AccountRequest>,
) -> Result<(StatusCode, Json<Account>), Error> {
    require_same_user(session_user, request.user_id)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let account = create_account(
        request.user_id,
        &request.account_type,
        request.balance,
        &connection,
    )?;
    tracing::info!(
        "Created account {} for user {}",
        account.account_id,
        account.user_id
    );

    Ok((StatusCode::CREATED, Json(account)))
}
