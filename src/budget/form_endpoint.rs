//! The dashboard forms for creating and deleting budgets.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error, Money, UserID,
    budget::{NewBudget, create_budget, delete_budget},
    dashboard::dashboard_error_response,
    database_id::{AccountId, BudgetId, CategoryId},
    endpoints,
};

/// The state needed by the budget forms on the dashboard.
#[derive(Debug, Clone)]
pub struct BudgetFormState {
    /// The database connection for managing budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetFormState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The fields of the add budget form, the owner is the logged in user.
#[derive(Debug, Serialize, Deserialize)]
pub struct BudgetForm {
    pub account_id: AccountId,
    pub category_id: CategoryId,
    pub amount: Money,
    pub start_date: Date,
    pub end_date: Date,
}

/// Handler for the dashboard's add budget form.
pub async fn create_budget_form_endpoint(
    State(state): State<BudgetFormState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<BudgetForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let new_budget = NewBudget {
        user_id,
        account_id: form.account_id,
        category_id: form.category_id,
        amount: form.amount,
        start_date: form.start_date,
        end_date: form.end_date,
    };

    match create_budget(new_budget, &connection) {
        Ok(budget) => {
            tracing::debug!("Created budget {} for user {user_id}", budget.budget_id);
            Redirect::to(endpoints::DASHBOARD_VIEW).into_response()
        }
        Err(error) => dashboard_error_response(user_id, &connection, error),
    }
}

/// Handler for the delete buttons in the dashboard's budget table.
pub async fn delete_budget_form_endpoint(
    State(state): State<BudgetFormState>,
    Extension(user_id): Extension<UserID>,
    Path(budget_id): Path<BudgetId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match delete_budget(budget_id, user_id, &connection) {
        Ok(()) => Redirect::to(endpoints::DASHBOARD_VIEW).into_response(),
        Err(error) => dashboard_error_response(user_id, &connection, error),
    }
}
