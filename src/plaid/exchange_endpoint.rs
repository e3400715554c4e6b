//! Defines the endpoint for exchanging a public token and storing the resulting access token.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, UserID,
    auth::require_same_user,
    extract::Json,
    message::{MessageResponse, message},
    plaid::{credential::insert_credential, provider::AggregationProvider},
};

/// The state needed to link a bank connection.
#[derive(Clone)]
pub struct ExchangeTokenState {
    pub provider: Arc<dyn AggregationProvider>,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExchangeTokenState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            provider: state.aggregation_provider.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExchangeTokenRequest {
    pub public_token: String,
    pub user_id: UserID,
}

/// A route handler that swaps a public token for an access token and stores it for the user.
pub async fn exchange_token_endpoint(
    State(state): State<ExchangeTokenState>,
    Extension(session_user): Extension<UserID>,
    Json(request): Json<ExchangeTokenRequest>,
) -> Result<Json<MessageResponse>, Error> {
    require_same_user(session_user, request.user_id)?;

    let token = state
        .provider
        .exchange_public_token(&request.public_token)
        .await?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;
    insert_credential(request.user_id, &token, &connection)?;
    tracing::info!("User {} linked item {}", request.user_id, token.item_id);

    Ok(message("Access token stored successfully"))
}
