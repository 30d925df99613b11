//! Typed HTTP client for the budget tracker API.
//!
//! One method per backend endpoint, no retries and no caching. Errors
//! distinguish "the server answered with an error" ([`ClientError::Api`],
//! which carries the HTTP status) from "the server could not be reached
//! or its reply could not be decoded" ([`ClientError::Network`], which
//! reports status `0`).
//!
//! ```no_run
//! # use budget_tracker_client::BudgetClient;
//! # use shared::{Category, Month, UpdateAmountRequest};
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = BudgetClient::new("http://localhost:3001")?;
//! client.create_item(Category::Income, "Salary").await?;
//! client
//!     .update_amount(Category::Income, "Salary", Month::Jan, &UpdateAmountRequest::planned(5000.0))
//!     .await?;
//! let summary = client.summary().await?;
//! # Ok(())
//! # }
//! ```

use serde::de::DeserializeOwned;
use shared::{
    BudgetData, BudgetSummary, Category, CreateItemRequest, CreateItemResponse,
    DeleteItemResponse, ErrorResponse, HealthResponse, Month, MonthAmounts, UpdateAmountRequest,
};

/// Client-side API error.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered with a non-success status. The message comes
    /// from the `{"error": ...}` body when one was sent.
    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// The request never completed, or a success response could not be
    /// decoded.
    #[error("Network error or server unavailable")]
    Network(#[from] reqwest::Error),

    /// The base URL handed to the constructor is unusable.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ClientError {
    /// HTTP status behind this error; `0` when the server never
    /// produced a usable response.
    pub fn status(&self) -> u16 {
        match self {
            ClientError::Api { status, .. } => *status,
            _ => 0,
        }
    }
}

/// Thin wrapper over the REST API.
#[derive(Debug)]
pub struct BudgetClient {
    http: reqwest::Client,
    base_url: reqwest::Url,
}

impl BudgetClient {
    /// Create a client for the API at `base_url`
    /// (e.g. `http://localhost:3001`).
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let parsed = reqwest::Url::parse(base_url)
            .map_err(|e| ClientError::InvalidBaseUrl(e.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(format!(
                "'{}' cannot be used as a base URL",
                base_url
            )));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: parsed,
        })
    }

    /// Fetch the full budget grid.
    pub async fn budget(&self) -> Result<BudgetData, ClientError> {
        let response = self.http.get(self.url(&["budget"])).send().await?;
        Self::parse(response).await
    }

    /// Update one month cell for an item. Build the patch with
    /// [`UpdateAmountRequest::planned`] or [`UpdateAmountRequest::actual`]
    /// to touch just one side.
    pub async fn update_amount(
        &self,
        category: Category,
        item_name: &str,
        month: Month,
        patch: &UpdateAmountRequest,
    ) -> Result<MonthAmounts, ClientError> {
        let url = self.url(&["budget", category.as_str(), item_name, month.as_str()]);
        let response = self.http.put(url).json(patch).send().await?;
        Self::parse(response).await
    }

    /// Add a budget line item; the server seeds all twelve months at
    /// zero.
    pub async fn create_item(
        &self,
        category: Category,
        item_name: &str,
    ) -> Result<CreateItemResponse, ClientError> {
        let request = CreateItemRequest {
            category,
            item_name: item_name.to_string(),
        };
        let response = self
            .http
            .post(self.url(&["budget", "items"]))
            .json(&request)
            .send()
            .await?;
        Self::parse(response).await
    }

    /// Remove an item and all of its month rows.
    pub async fn delete_item(
        &self,
        category: Category,
        item_name: &str,
    ) -> Result<DeleteItemResponse, ClientError> {
        let url = self.url(&["budget", "items", category.as_str(), item_name]);
        let response = self.http.delete(url).send().await?;
        Self::parse(response).await
    }

    /// Fetch yearly totals and the net position.
    pub async fn summary(&self) -> Result<BudgetSummary, ClientError> {
        let response = self.http.get(self.url(&["budget", "summary"])).send().await?;
        Self::parse(response).await
    }

    /// Check that the server is up.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self.http.get(self.url(&["health"])).send().await?;
        Self::parse(response).await
    }

    /// URL for an API route given as raw path segments. Each segment is
    /// percent-encoded, so item names survive spaces and slashes.
    fn url(&self, segments: &[&str]) -> reqwest::Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was checked in the constructor
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.push("api");
            path.extend(segments);
        }
        url
    }

    /// Turn a response into the expected body, mapping non-success
    /// statuses to [`ClientError::Api`].
    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let code = status.as_u16();
            let fallback = format!(
                "HTTP {}: {}",
                code,
                status.canonical_reason().unwrap_or("Unknown")
            );
            let message = match response.json::<ErrorResponse>().await {
                Ok(body) => body.error,
                Err(_) => fallback,
            };
            return Err(ClientError::Api {
                status: code,
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }
}
