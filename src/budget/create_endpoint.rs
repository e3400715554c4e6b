//! Defines the endpoint for creating a budget.

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
    auth::require_same_user,
    budget::core::{Budget, NewBudget, create_budget},
    extract::Json,
};

/// The state needed to create a budget.
#[derive(Debug, Clone)]
pub struct CreateBudgetState {
    /// The database connection for managing budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The body returned after a budget is created.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedBudget {
    pub message: String,
    pub budget: Budget,
}

/// A route handler for creating a budget on one of the logged in user's accounts.
pub async fn create_budget_endpoint(
    State(state): State<CreateBudgetState>,
    Extension(session_user): Extension<UserID>,
    Json(new_budget): Json<NewBudget>,
) -> Result<(StatusCode, Json<CreatedBudget>), Error> {
    require_same_user(session_user, new_budget.user_id)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let budget = create_budget(new_budget, &connection)?;
    tracing::debug!(
        "Created budget {} on account {}",
        budget.budget_id,
        budget.account_id
    );

    Ok((
        StatusCode::CREATED,
        Json(CreatedBudget {
            message: "Budget added successfully!".to_owned(),
            budget,
        }),
    ))
}
