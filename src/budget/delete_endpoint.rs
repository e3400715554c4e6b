//! Defines the endpoint for deleting a budget.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    budget::core::delete_budget,
    database_id::BudgetId,
    extract::{Json, Path},
    message::{MessageResponse, message},
};

/// The state needed to delete a budget.
#[derive(Debug, Clone)]
pub struct DeleteBudgetState {
    /// The database connection for managing budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting one of the logged in user's budgets.
pub async fn delete_budget_endpoint(
    State(state): State<DeleteBudgetState>,
    Extension(user_id): Extension<UserID>,
    Path(budget_id): Path<BudgetId>,
) -> Result<Json<MessageResponse>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    delete_budget(budget_id, user_id, &connection)?;

    Ok(message("Budget deleted successfully!"))
}
