//! Defines the endpoints for listing a user's accounts.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    account::{Account, list_accounts, list_budget_accounts},
    auth::require_same_user,
    extract::{Json, Path},
};

/// The state needed to list accounts.
#[derive(Debug, Clone)]
pub struct ListAccountsState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListAccountsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that returns every account of `user_id`, possibly none.
pub async fn list_accounts_endpoint(
    State(state): State<ListAccountsState>,
    Extension(session_user): Extension<UserID>,
    Path(user_id): Path<UserID>,
) -> Result<Json<Vec<Account>>, Error> {
    require_same_user(session_user, user_id)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    list_accounts(user_id, &connection).map(Json)
}

/// A route handler that returns the accounts `user_id` can budget against,
/// or 404 if the user has no accounts.
pub async fn list_budget_accounts_endpoint(
    State(state): State<ListAccountsState>,
    Extension(session_user): Extension<UserID>,
    Path(user_id): Path<UserID>,
) -> Result<Json<Vec<Account>>, Error> {
    require_same_user(session_user, user_id)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    list_budget_accounts(user_id, &connection).map(Json)
}
