//! Defines the endpoint for changing a budget's amount and dates.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    budget::core::{BudgetUpdate, update_budget},
    database_id::BudgetId,
    extract::{Json, Path},
    message::{MessageResponse, message},
};

/// The state needed to update a budget.
#[derive(Debug, Clone)]
pub struct UpdateBudgetState {
    /// The database connection for managing budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for updating the amount and date range of a budget.
///
/// The account and category of a budget cannot be changed.
pub async fn update_budget_endpoint(
    State(state): State<UpdateBudgetState>,
    Extension(user_id): Extension<UserID>,
    Path(budget_id): Path<BudgetId>,
    Json(update): Json<BudgetUpdate>,
) -> Result<Json<MessageResponse>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    update_budget(budget_id, user_id, update, &connection)?;

    Ok(message("Budget updated successfully!"))
}
