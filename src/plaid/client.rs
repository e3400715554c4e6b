//! An HTTP client for the Plaid API.

use std::{fmt::Display, str::FromStr, time::Duration};

use async_trait::async_trait;
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use time::Date;

use crate::{
    Error, UserID,
    plaid::provider::{AggregationProvider, ExchangedToken},
};

/// The maximum number of transactions Plaid returns per page.
const TRANSACTIONS_PAGE_SIZE: usize = 500;

/// The default time to wait for Plaid before giving up on a request.
pub const DEFAULT_PLAID_TIMEOUT: Duration = Duration::from_secs(10);

/// The Plaid deployment that requests are sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaidEnvironment {
    /// Test data and test credentials.
    Sandbox,
    /// Real banks with a limited number of items.
    Development,
    /// Real banks.
    Production,
}

impl PlaidEnvironment {
    /// The base URL of the Plaid API for this environment.
    pub fn base_url(&self) -> &'static str {
        match self {
            PlaidEnvironment::Sandbox => "https://sandbox.plaid.com",
            PlaidEnvironment::Development => "https://development.plaid.com",
            PlaidEnvironment::Production => "https://production.plaid.com",
        }
    }
}

impl FromStr for PlaidEnvironment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sandbox" => Ok(PlaidEnvironment::Sandbox),
            "development" => Ok(PlaidEnvironment::Development),
            "production" => Ok(PlaidEnvironment::Production),
            other => Err(Error::InvalidConfig(format!(
                "unknown Plaid environment \"{other}\", expected one of sandbox, development or production"
            ))),
        }
    }
}

impl Display for PlaidEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PlaidEnvironment::Sandbox => "sandbox",
            PlaidEnvironment::Development => "development",
            PlaidEnvironment::Production => "production",
        };

        write!(f, "{name}")
    }
}

/// Everything needed to talk to Plaid.
#[derive(Clone)]
pub struct PlaidConfig {
    /// The client ID from the Plaid dashboard, sent as `PLAID-CLIENT-ID`.
    pub client_id: String,
    /// The secret for the chosen environment, sent as `PLAID-SECRET`. Never logged.
    pub secret: String,
    /// The API root, normally [PlaidEnvironment::base_url].
    pub base_url: String,
    /// The name shown to users in the bank linking widget.
    pub client_name: String,
    /// How long to wait for a response before failing with [Error::UpstreamError].
    pub timeout: Duration,
}

impl PlaidConfig {
    /// Create a config for `environment` with the default client name and timeout.
    pub fn new(client_id: &str, secret: &str, environment: PlaidEnvironment) -> Self {
        Self {
            client_id: client_id.to_owned(),
            secret: secret.to_owned(),
            base_url: environment.base_url().to_owned(),
            client_name: "Tally".to_owned(),
            timeout: DEFAULT_PLAID_TIMEOUT,
        }
    }
}

/// The error body Plaid sends with non-2xx responses.
#[derive(Debug, Deserialize)]
struct PlaidErrorBody {
    error_code: String,
    error_message: String,
}

#[derive(Debug, Serialize)]
struct TransactionsRequest<'a> {
    access_token: &'a str,
    #[serde(with = "plaid_date")]
    start_date: Date,
    #[serde(with = "plaid_date")]
    end_date: Date,
    options: TransactionsOptions,
}

#[derive(Debug, Serialize)]
struct TransactionsOptions {
    count: usize,
    offset: usize,
}

#[derive(Debug, Deserialize)]
struct TransactionsPage {
    transactions: Vec<Value>,
    total_transactions: usize,
}

mod plaid_date {
    //! Plaid expects dates as "YYYY-MM-DD".
    use serde::Serializer;
    use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

    const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = date.format(DATE_FORMAT).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }
}

/// An [AggregationProvider] backed by the Plaid REST API.
pub struct PlaidClient {
    http: Client,
    base_url: String,
    client_name: String,
}

impl PlaidClient {
    /// Build a client that authenticates every request with the credentials in `config`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidConfig] if the credentials cannot be sent as
    /// headers or the HTTP client could not be built.
    pub fn new(config: PlaidConfig) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "plaid-client-id",
            HeaderValue::from_str(&config.client_id)
                .map_err(|_| Error::InvalidConfig("PLAID_CLIENT_ID is not a valid header value".to_owned()))?,
        );
        let mut secret = HeaderValue::from_str(&config.secret)
            .map_err(|_| Error::InvalidConfig("PLAID_SECRET is not a valid header value".to_owned()))?;
        secret.set_sensitive(true);
        headers.insert("plaid-secret", secret);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|error| Error::InvalidConfig(format!("could not build HTTP client: {error}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            client_name: config.client_name,
        })
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, Error>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("POST {url}");

        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let details = match serde_json::from_str::<PlaidErrorBody>(&text) {
                Ok(body) => format!("{}: {}", body.error_code, body.error_message),
                Err(_) => text,
            };

            return Err(Error::UpstreamError(format!(
                "{path} returned {status}: {details}"
            )));
        }

        response
            .json::<R>()
            .await
            .map_err(|error| Error::UpstreamError(format!("{path} returned an unexpected body: {error}")))
    }
}

#[async_trait]
impl AggregationProvider for PlaidClient {
    async fn create_link_token(&self, user_id: UserID) -> Result<Value, Error> {
        let body = json!({
            "user": { "client_user_id": user_id.to_string() },
            "client_name": self.client_name,
            "products": ["transactions"],
            "country_codes": ["US"],
            "language": "en",
        });

        self.post("/link/token/create", &body).await
    }

    async fn exchange_public_token(&self, public_token: &str) -> Result<ExchangedToken, Error> {
        self.post(
            "/item/public_token/exchange",
            &json!({ "public_token": public_token }),
        )
        .await
    }

    async fn get_transactions(
        &self,
        access_token: &str,
        start: Date,
        end: Date,
    ) -> Result<Vec<Value>, Error> {
        let mut transactions = Vec::new();

        loop {
            let request = TransactionsRequest {
                access_token,
                start_date: start,
                end_date: end,
                options: TransactionsOptions {
                    count: TRANSACTIONS_PAGE_SIZE,
                    offset: transactions.len(),
                },
            };
            let page: TransactionsPage = self.post("/transactions/get", &request).await?;
            let page_len = page.transactions.len();
            transactions.extend(page.transactions);

            if page_len == 0 || transactions.len() >= page.total_transactions {
                break;
            }
        }

        Ok(transactions)
    }
}
