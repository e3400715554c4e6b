//! Tally is a web app for tracking bank accounts, transactions and budgets.
//!
//! This library provides a JSON API over a SQLite ledger, a thin server-rendered
//! dashboard, and a gateway to the Plaid aggregation API for pulling in
//! transactions from linked bank accounts.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::{Deserialize, Serialize};
use tokio::signal;

mod account;
mod app_state;
mod auth;
mod budget;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod extract;
mod html;
mod logging;
mod message;
mod money;
mod not_found;
mod plaid;
mod routing;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use account::{Account, create_account, list_accounts};
pub use app_state::{AppState, create_cookie_key};
pub use auth::{PasswordHash, User, UserID, create_user};
pub use budget::{Budget, NewBudget, create_budget};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use money::Money;
pub use plaid::{
    AggregationProvider, DEFAULT_PLAID_TIMEOUT, ExchangedToken, PlaidClient, PlaidConfig,
    PlaidEnvironment, TransactionWindow,
};
pub use routing::build_router;
pub use transaction::{NewTransaction, Transaction, add_transaction};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The username or password given at log-in did not match a registered user.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The request did not carry a valid, unexpired session cookie.
    #[error("you must be logged in to access this resource")]
    Unauthenticated,

    /// The session belongs to a different user than the one addressed by the request.
    #[error("you do not have permission to access this resource")]
    Forbidden,

    /// Sign up was attempted with an empty username or password.
    #[error("username and password must not be empty")]
    EmptyCredentials,

    /// The username is already taken by another user.
    #[error("the username \"{0}\" is already taken")]
    DuplicateUsername(String),

    /// The external item has already been linked for this user.
    #[error("this bank connection has already been linked")]
    DuplicateLink,

    /// An account was created without an account type.
    #[error("the account type must not be empty")]
    EmptyAccountType,

    /// A budget was given an end date that comes before its start date.
    #[error("the budget end date must not be before its start date")]
    InvalidDateRange,

    /// The request body or path could not be read, e.g. a JSON field was missing.
    #[error("{message}")]
    InvalidRequest {
        /// The status axum chose for the rejection, usually 400 or 422.
        status: StatusCode,
        /// What was wrong with the request.
        message: String,
    },

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// A user has no accounts, so there is nothing to list.
    #[error("No accounts found for this user")]
    NoAccounts,

    /// Tried to delete a transaction that does not exist
    #[error("Transaction not found")]
    DeleteMissingTransaction,

    /// Tried to update a budget that does not exist
    #[error("tried to update a budget that is not in the database")]
    UpdateMissingBudget,

    /// Tried to delete a budget that does not exist
    #[error("tried to delete a budget that is not in the database")]
    DeleteMissingBudget,

    /// The user has not linked a bank account through the aggregation provider.
    #[error("No Plaid access token found for this user")]
    MissingAccessToken,

    /// The aggregation provider failed, timed out or returned an unexpected payload.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("the bank data provider could not complete the request: {0}")]
    UpstreamError(String),

    /// The server was started with configuration that cannot be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            Error::UpstreamError("the request timed out".to_owned())
        } else {
            Error::UpstreamError(value.to_string())
        }
    }
}

/// The JSON body sent to the client when a request fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// A human readable description of what went wrong.
    pub error: String,
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCredentials | Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::InvalidRequest { status, .. } => *status,
            Error::EmptyCredentials | Error::EmptyAccountType | Error::InvalidDateRange => {
                StatusCode::BAD_REQUEST
            }
            Error::DuplicateUsername(_) | Error::DuplicateLink => StatusCode::CONFLICT,
            Error::NotFound
            | Error::NoAccounts
            | Error::DeleteMissingTransaction
            | Error::UpdateMissingBudget
            | Error::DeleteMissingBudget
            | Error::MissingAccessToken => StatusCode::NOT_FOUND,
            Error::UpstreamError(_) => StatusCode::BAD_GATEWAY,
            Error::InvalidConfig(_)
            | Error::HashingError(_)
            | Error::JSONSerializationError(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let message = match self {
            Error::UpstreamError(ref details) => {
                tracing::error!("The bank data provider failed: {details}");
                "The bank data provider could not complete the request".to_owned()
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            ref error if status_code == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("An unexpected error occurred: {}", error);
                "An internal error occurred. Please try again later.".to_owned()
            }
            error => error.to_string(),
        };

        (status_code, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{Error, ErrorResponse};

    async fn get_error_body(error: Error) -> (StatusCode, ErrorResponse) {
        let response = error.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Could not get response body");

        (status, serde_json::from_slice(&body).unwrap())
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        assert_eq!(
            Error::from(rusqlite::Error::QueryReturnedNoRows),
            Error::NotFound
        );
    }

    #[tokio::test]
    async fn not_found_errors_render_their_message() {
        let (status, body) = get_error_body(Error::NoAccounts).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "No accounts found for this user");
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let (status, body) =
            get_error_body(Error::HashingError("bcrypt exploded".to_owned())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.error.contains("bcrypt"));
    }

    #[tokio::test]
    async fn upstream_errors_hide_provider_details() {
        let (status, body) =
            get_error_body(Error::UpstreamError("INVALID_API_KEYS".to_owned())).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!body.error.contains("INVALID_API_KEYS"));
    }

    #[tokio::test]
    async fn invalid_requests_keep_their_status() {
        let (status, body) = get_error_body(Error::InvalidRequest {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: "missing field `amount`".to_owned(),
        })
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.error, "missing field `amount`");
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let (status, _) = get_error_body(Error::DuplicateUsername("alice".to_owned())).await;

        assert_eq!(status, StatusCode::CONFLICT);
    }
}
