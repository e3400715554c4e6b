//! This file defines the routes for logging in through the JSON API, displaying the log-in
//! page, and handling log-in form submissions.
//! The auth module handles the lower level authentication and cookie auth logic.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{User, UserID, get_user_by_username, set_auth_cookie, sign_up::Credentials},
    endpoints,
    extract::Json,
    html::{BUTTON_PRIMARY_STYLE, base, link, log_in_card, password_input, username_input},
};

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The body returned by a successful log-in through the JSON API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogInResponse {
    pub message: String,
    pub user_id: UserID,
    pub username: String,
}

/// Look up `credentials.username` and check the password against the stored hash.
///
/// # Errors
///
/// Returns an [Error::InvalidCredentials] if there is no such user or the
/// password does not match, [Error::DatabaseLockError] if the database lock is
/// poisoned, or [Error::HashingError] if the hash could not be checked.
fn verify_credentials(
    credentials: &Credentials,
    db_connection: &Arc<Mutex<Connection>>,
) -> Result<User, Error> {
    let user = {
        let connection = db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        match get_user_by_username(&credentials.username, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => return Err(Error::InvalidCredentials),
            Err(error) => return Err(error),
        }
    };

    let is_password_valid = user
        .password_hash
        .verify(&credentials.password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if is_password_valid {
        Ok(user)
    } else {
        Err(Error::InvalidCredentials)
    }
}

/// Handler for log-in requests through the JSON API.
///
/// On success the auth cookie is set and the user's ID and username are returned.
/// Otherwise a 401 error is returned, without saying whether the username or the password was wrong.
pub async fn log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Json(credentials): Json<Credentials>,
) -> Response {
    let user = match verify_credentials(&credentials, &state.db_connection) {
        Ok(user) => user,
        Err(error) => return error.into_response(),
    };

    match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(jar) => {
            tracing::info!("User {} logged in", user.id);
            let body = LogInResponse {
                message: "Login successful".to_owned(),
                user_id: user.id,
                username: user.username,
            };

            (jar, Json(body)).into_response()
        }
        Err(error) => error.into_response(),
    }
}

fn log_in_form(username: &str, error_message: Option<&str>) -> Markup {
    html! {
        form
            method="post"
            action=(endpoints::LOG_IN_VIEW)
            class="space-y-4 md:space-y-6"
        {
            (username_input(username))

            (password_input(error_message))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                "Log in"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Don't have an account? "
                (link(endpoints::SIGN_UP_VIEW, "Sign up here"))
            }
        }
    }
}

fn log_in_page(username: &str, error_message: Option<&str>) -> Markup {
    let form = log_in_form(username, error_message);
    let content = log_in_card("Log in to your account", &form);
    base("Log In", &content)
}

/// Display the log-in page.
pub async fn get_log_in_page() -> Response {
    log_in_page("", None).into_response()
}

pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect username or password.";

/// Handler for log-in form submissions from the log-in page.
///
/// On a successful log-in request, the auth cookie set and the client is redirected to the dashboard page.
/// Otherwise, the page is returned with an error message explaining the problem.
pub async fn post_log_in_page(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(credentials): Form<Credentials>,
) -> Response {
    let user = match verify_credentials(&credentials, &state.db_connection) {
        Ok(user) => user,
        Err(Error::InvalidCredentials) => {
            return (
                StatusCode::UNAUTHORIZED,
                log_in_page(&credentials.username, Some(INVALID_CREDENTIALS_ERROR_MSG)),
            )
                .into_response();
        }
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                log_in_page(
                    &credentials.username,
                    Some("An internal error occurred. Please try again later."),
                ),
            )
                .into_response();
        }
    };

    match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(jar) => (jar, Redirect::to(endpoints::DASHBOARD_VIEW)).into_response(),
        Err(error) => {
            tracing::error!("Error setting auth cookie: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                log_in_page(
                    &credentials.username,
                    Some("An internal error occurred. Please try again later."),
                ),
            )
                .into_response()
        }
    }
}
