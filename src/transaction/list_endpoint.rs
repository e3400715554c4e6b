//! Defines the endpoint for listing a user's transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    auth::require_same_user,
    extract::{Json, Path},
    transaction::core::{Transaction, list_transactions},
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that returns every transaction on the user's accounts, oldest first.
///
/// Responds with 404 if the user has no accounts.
pub async fn list_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    Extension(session_user): Extension<UserID>,
    Path(user_id): Path<UserID>,
) -> Result<Json<Vec<Transaction>>, Error> {
    require_same_user(session_user, user_id)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    list_transactions(user_id, &connection).map(Json)
}
