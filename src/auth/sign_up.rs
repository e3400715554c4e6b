//! Route handler for registering a new user through the JSON API.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::{PasswordHash, create_user},
    extract::Json,
    message::message,
};

/// The state needed to register a new user.
#[derive(Debug, Clone)]
pub struct SignUpState {
    /// The bcrypt cost used when hashing new passwords.
    pub password_hash_cost: u32,
    /// The database connection for storing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SignUpState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            password_hash_cost: state.password_hash_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The username and raw password sent by a client to sign up or log in.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// The name the user logs in with.
    pub username: String,
    /// The raw password. Never stored or logged.
    pub password: String,
}

/// Create a new user from a username and password.
///
/// Responds with 201 on success, 409 if the username is taken, or 400 if
/// the username or password is empty.
pub async fn sign_up(
    State(state): State<SignUpState>,
    Json(credentials): Json<Credentials>,
) -> Response {
    // Hashing is slow, keep it outside the lock.
    let password_hash =
        match PasswordHash::from_raw_password(&credentials.password, state.password_hash_cost) {
            Ok(password_hash) => password_hash,
            Err(error) => return error.into_response(),
        };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(_) => return Error::DatabaseLockError.into_response(),
    };

    match create_user(&credentials.username, password_hash, &connection) {
        Ok(user) => {
            tracing::info!("Registered user {} with ID {}", user.username, user.id);
            (StatusCode::CREATED, message("User registered successfully!")).into_response()
        }
        Err(error) => error.into_response(),
    }
}
