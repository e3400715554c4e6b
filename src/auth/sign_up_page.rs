//! The sign up page for creating an account from the browser.

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
    auth::{PasswordHash, create_user, set_auth_cookie},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, link, log_in_card,
        password_input, username_input,
    },
};

pub const PASSWORD_MISMATCH_ERROR_MSG: &str = "Passwords do not match.";

/// The state needed for signing up from the browser.
#[derive(Debug, Clone)]
pub struct SignUpPageState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The bcrypt cost used when hashing new passwords.
    pub password_hash_cost: u32,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SignUpPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            password_hash_cost: state.password_hash_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<SignUpPageState> for Key {
    fn from_ref(state: &SignUpPageState) -> Self {
        state.cookie_key.clone()
    }
}

/// The fields of the sign up form.
#[derive(Serialize, Deserialize)]
pub struct SignUpForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

fn confirm_password_input(error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label for="confirm-password" class=(FORM_LABEL_STYLE) { "Confirm Password" }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required;

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

fn sign_up_form(
    username: &str,
    password_error_message: Option<&str>,
    confirm_password_error_message: Option<&str>,
) -> Markup {
    html! {
        form
            method="post"
            action=(endpoints::SIGN_UP_VIEW)
            class="space-y-4 md:space-y-6"
        {
            (username_input(username))

            (password_input(password_error_message))

            (confirm_password_input(confirm_password_error_message))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                "Sign up"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                (link(endpoints::LOG_IN_VIEW, "Log in here"))
            }
        }
    }
}

fn sign_up_page(
    username: &str,
    password_error_message: Option<&str>,
    confirm_password_error_message: Option<&str>,
) -> Markup {
    let form = sign_up_form(
        username,
        password_error_message,
        confirm_password_error_message,
    );
    let content = log_in_card("Create an account", &form);
    base("Sign Up", &content)
}

/// Display the sign up page.
pub async fn get_sign_up_page() -> Response {
    sign_up_page("", None, None).into_response()
}

/// Handler for sign up form submissions.
///
/// On success the user is created, logged in and redirected to the dashboard.
/// Otherwise the page is returned with an error message explaining the problem.
pub async fn post_sign_up_page(
    State(state): State<SignUpPageState>,
    jar: PrivateCookieJar,
    Form(form): Form<SignUpForm>,
) -> Response {
    if form.password != form.confirm_password {
        return (
            StatusCode::BAD_REQUEST,
            sign_up_page(&form.username, None, Some(PASSWORD_MISMATCH_ERROR_MSG)),
        )
            .into_response();
    }

    let user = PasswordHash::from_raw_password(&form.password, state.password_hash_cost)
        .and_then(|password_hash| {
            let connection = state
                .db_connection
                .lock()
                .map_err(|_| Error::DatabaseLockError)?;

            create_user(&form.username, password_hash, &connection)
        });

    let user = match user {
        Ok(user) => user,
        Err(error @ (Error::EmptyCredentials | Error::DuplicateUsername(_))) => {
            let status_code = error.status_code();
            return (
                status_code,
                sign_up_page(&form.username, Some(&error.to_string()), None),
            )
                .into_response();
        }
        Err(error) => {
            tracing::error!("Unhandled error while signing up: {error}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                sign_up_page(
                    &form.username,
                    Some("An internal error occurred. Please try again later."),
                    None,
                ),
            )
                .into_response();
        }
    };

    tracing::info!("Registered user {} with ID {}", user.username, user.id);

    match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(jar) => (jar, Redirect::to(endpoints::DASHBOARD_VIEW)).into_response(),
        Err(error) => {
            tracing::error!("Error setting auth cookie: {error}");
            Redirect::to(endpoints::LOG_IN_VIEW).into_response()
        }
    }
}
