//! Defines the endpoint for minting a link token for the bank linking widget.

use std::sync::Arc;

use axum::{
    Extension,
    extract::{FromRef, State},
};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    AppState, Error, UserID, auth::require_same_user, extract::Json,
    plaid::provider::AggregationProvider,
};

/// The state needed to mint link tokens.
#[derive(Clone)]
pub struct LinkTokenState {
    pub provider: Arc<dyn AggregationProvider>,
}

impl FromRef<AppState> for LinkTokenState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            provider: state.aggregation_provider.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LinkTokenRequest {
    pub user_id: UserID,
}

/// A route handler that returns the provider's link token payload unmodified.
pub async fn create_link_token_endpoint(
    State(state): State<LinkTokenState>,
    Extension(session_user): Extension<UserID>,
    Json(request): Json<LinkTokenRequest>,
) -> Result<Json<Value>, Error> {
    require_same_user(session_user, request.user_id)?;

    let payload = state.provider.create_link_token(request.user_id).await?;

    Ok(Json(payload))
}
