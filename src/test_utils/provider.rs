use async_trait::async_trait;
use serde_json::{Value, json};
use time::Date;

use crate::{
    Error, UserID,
    plaid::{AggregationProvider, ExchangedToken},
};

/// An aggregation provider that answers from memory.
///
/// Exchanging the public token "bad" fails like an upstream error would.
#[derive(Debug, Clone, Default)]
pub(crate) struct StubProvider;

#[async_trait]
impl AggregationProvider for StubProvider {
    async fn create_link_token(&self, user_id: UserID) -> Result<Value, Error> {
        Ok(json!({
            "link_token": format!("link-sandbox-{user_id}"),
            "expiration": "2024-01-01T04:00:00Z",
            "request_id": "stub"
        }))
    }

    async fn exchange_public_token(&self, public_token: &str) -> Result<ExchangedToken, Error> {
        if public_token == "bad" {
            return Err(Error::UpstreamError("INVALID_PUBLIC_TOKEN".to_owned()));
        }

        Ok(ExchangedToken {
            access_token: format!("access-{public_token}"),
            item_id: format!("item-{public_token}"),
        })
    }

    async fn get_transactions(
        &self,
        access_token: &str,
        start: Date,
        end: Date,
    ) -> Result<Vec<Value>, Error> {
        Ok([12.5, -3.0]
            .into_iter()
            .map(|amount| {
                json!({
                    "access_token": access_token,
                    "start_date": start.to_string(),
                    "end_date": end.to_string(),
                    "amount": amount
                })
            })
            .collect())
    }
}
