//! Homework review API client.
//!
//! One GET per poll cycle; retrying is left to the driver loop.

use crate::config::BotConfig;
use crate::error::BotError;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Message reported for any transport level failure
pub const REQUEST_FAILED: &str = "Сбой при запросе к эндпоинту";

/// Source of homework status updates
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HomeworkSource: Send + Sync {
    /// Fetch updates changed since `from_date` (Unix seconds, zero means now)
    async fn fetch_updates(&self, from_date: i64) -> Result<Value, BotError>;
}

/// HTTP client for the homework statuses endpoint
pub struct PracticumClient {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl PracticumClient {
    /// Create a client from the validated bot configuration.
    #[must_use]
    pub fn new(config: &BotConfig) -> Self {
        Self::with_endpoint(
            &config.endpoint,
            &config.practicum_token,
            config.request_timeout,
        )
    }

    /// Create a client for an explicit endpoint and token.
    #[must_use]
    pub fn with_endpoint(endpoint: &str, token: &str, timeout: Duration) -> Self {
        let client = match reqwest::Client::builder().timeout(timeout).build() {
            Ok(client) => client,
            Err(_) => reqwest::Client::new(),
        };

        Self {
            client,
            endpoint: endpoint.to_string(),
            token: token.to_string(),
        }
    }
}

#[async_trait]
impl HomeworkSource for PracticumClient {
    async fn fetch_updates(&self, from_date: i64) -> Result<Value, BotError> {
        let from_date = resolve_from_date(from_date);
        debug!(endpoint = %self.endpoint, from_date, "Requesting homework statuses");

        let response = self
            .client
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Homework API request failed");
                BotError::Connectivity(REQUEST_FAILED.to_string())
            })?;

        check_status(response.status(), &self.endpoint)?;

        response.json::<Value>().await.map_err(|e| {
            warn!(error = %e, "Homework API returned a body that is not JSON");
            BotError::Connectivity(format!("Ответ API не является корректным JSON: {e}"))
        })
    }
}

/// Zero or negative cursors mean "now".
fn resolve_from_date(from_date: i64) -> i64 {
    if from_date > 0 {
        from_date
    } else {
        Utc::now().timestamp()
    }
}

/// Accepts only `200 OK`; anything else is a connectivity error naming the endpoint and code.
///
/// # Errors
///
/// Returns [`BotError::Connectivity`] for every status other than 200.
pub fn check_status(status: StatusCode, endpoint: &str) -> Result<(), BotError> {
    if status == StatusCode::OK {
        return Ok(());
    }
    Err(BotError::Connectivity(format!(
        "Эндпоинт {endpoint} недоступен. Код ответа API: {}",
        status.as_u16()
    )))
}
