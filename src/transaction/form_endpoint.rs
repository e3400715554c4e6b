//! The dashboard forms for recording and deleting transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    dashboard::dashboard_error_response,
    database_id::TransactionId,
    endpoints,
    transaction::{NewTransaction, add_transaction, delete_transaction},
};

/// The state needed by the transaction forms on the dashboard.
#[derive(Debug, Clone)]
pub struct TransactionFormState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionFormState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handler for the dashboard's add transaction form.
///
/// Redirects back to the dashboard on success, otherwise the dashboard is shown
/// with the error.
pub async fn create_transaction_form_endpoint(
    State(state): State<TransactionFormState>,
    Extension(user_id): Extension<UserID>,
    Form(new_transaction): Form<NewTransaction>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match add_transaction(new_transaction, user_id, &connection) {
        Ok(transaction) => {
            tracing::debug!(
                "Created transaction {} on account {}",
                transaction.transaction_id,
                transaction.account_id
            );
            Redirect::to(endpoints::DASHBOARD_VIEW).into_response()
        }
        Err(error) => dashboard_error_response(user_id, &connection, error),
    }
}

/// Handler for the delete buttons in the dashboard's transaction table.
pub async fn delete_transaction_form_endpoint(
    State(state): State<TransactionFormState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match delete_transaction(transaction_id, user_id, &connection) {
        Ok(_) => Redirect::to(endpoints::DASHBOARD_VIEW).into_response(),
        Err(error) => dashboard_error_response(user_id, &connection, error),
    }
}
