//! Defines the endpoint for recording a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, UserID,
    extract::Json,
    transaction::core::{NewTransaction, Transaction, add_transaction},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The body returned after a transaction is recorded.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedTransaction {
    pub message: String,
    pub transaction: Transaction,
}

/// A route handler for recording a transaction against one of the logged in user's accounts.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Json(new_transaction): Json<NewTransaction>,
) -> Result<(StatusCode, Json<CreatedTransaction>), Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transaction = add_transaction(new_transaction, user_id, &connection)?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedTransaction {
            message: "Transaction added and balance updated successfully!".to_owned(),
            transaction,
        }),
    ))
}
