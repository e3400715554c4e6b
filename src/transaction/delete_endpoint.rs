//! Defines the endpoint for deleting a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    database_id::TransactionId,
    extract::{Json, Path},
    message::{MessageResponse, message},
    transaction::core::delete_transaction,
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a transaction and reversing its effect on the account balance.
///
/// Responds with 404 if the transaction does not exist or is on another user's account.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<MessageResponse>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transaction = delete_transaction(transaction_id, user_id, &connection)?;
    tracing::debug!(
        "Deleted transaction {} from account {}",
        transaction.transaction_id,
        transaction.account_id
    );

    Ok(message("Transaction deleted and balance updated successfully!"))
}
