//! The seam between the route handlers and the bank data aggregator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{Date, macros::date};

use crate::{Error, UserID};

/// The durable credentials returned when a public token is exchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangedToken {
    /// The token used for all later requests for the linked item.
    pub access_token: String,
    /// The aggregator's ID for the linked bank connection.
    pub item_id: String,
}

/// The inclusive date range that linked transactions are fetched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionWindow {
    /// The first day to fetch transactions for.
    pub start: Date,
    /// The last day to fetch transactions for.
    pub end: Date,
}

impl TransactionWindow {
    /// Create a window from `start` to `end`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidDateRange] if `end` comes before `start`.
    pub fn new(start: Date, end: Date) -> Result<Self, Error> {
        if end < start {
            return Err(Error::InvalidDateRange);
        }

        Ok(Self { start, end })
    }
}

impl Default for TransactionWindow {
    fn default() -> Self {
        Self {
            start: date!(2024 - 01 - 01),
            end: date!(2024 - 12 - 31),
        }
    }
}

/// A service that links bank accounts and reports their transactions.
///
/// Implementations must map timeouts, transport failures and error responses
/// to [Error::UpstreamError].
#[async_trait]
pub trait AggregationProvider: Send + Sync {
    /// Mint a short-lived token that the client uses to start linking a bank account for `user_id`.
    ///
    /// The provider's payload is returned as is.
    async fn create_link_token(&self, user_id: UserID) -> Result<Value, Error>;

    /// Exchange the public token from a finished link flow for durable credentials.
    async fn exchange_public_token(&self, public_token: &str) -> Result<ExchangedToken, Error>;

    /// Fetch every transaction for the item behind `access_token` between
    /// `start` and `end`, inclusive.
    async fn get_transactions(
        &self,
        access_token: &str,
        start: Date,
        end: Date,
    ) -> Result<Vec<Value>, Error>;
}
