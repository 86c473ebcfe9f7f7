use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};
use url::Url;

use crate::recipe::{parse_recipe_payload, RecipeRecord};

/// Default generation backend.
pub const DEFAULT_API_BASE: &str = "https://api.savorly.app";

/// Transport-level request timeout. The reconciliation layer never enforces
/// one of its own; a hung socket surfaces here as a failed fetch instead.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Pause before the single retry of an idempotent GET.
const RETRY_PAUSE: Duration = Duration::from_millis(400);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API base URL '{0}' is invalid")]
    BadBaseUrl(String),

    #[error("API request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API answered {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("API answered with an unreadable payload: {0}")]
    Decode(String),
}

/// Request body for the generation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub ingredients: Vec<String>,
    /// "ingredients" or "dish".
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dish_name: Option<String>,
    /// "with" or "without".
    pub oven_option: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_option: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_option: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calorie_option: Option<u32>,
    pub user_id: String,
}

/// The seam between the reconciler and the network, so tests can substitute
/// a scripted fetcher.
pub trait RecipeFetcher: Send + Sync {
    fn fetch_recipe(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<RecipeRecord, ApiError>> + Send;
}

/// Typed client for the recipe service.
///
/// The base URL lives behind a mutex so the settings page can repoint a
/// running client; everything else on the client is immutable.
pub struct ApiClient {
    client: reqwest::Client,
    base: Mutex<Url>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base = parse_base(base_url)?;
        let client = reqwest::Client::builder()
            .user_agent("Savorly/1.0")
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base: Mutex::new(base),
        })
    }

    /// Point the client at a different backend.
    pub fn set_base_url(&self, base_url: &str) -> Result<(), ApiError> {
        let base = parse_base(base_url)?;
        *self.base.lock().unwrap() = base;
        Ok(())
    }

    pub fn base_url(&self) -> String {
        self.base.lock().unwrap().to_string()
    }

    /// Build an endpoint URL; segments are percent-encoded as path pieces,
    /// so user keys with spaces or slashes stay single segments.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.lock().unwrap().clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::BadBaseUrl(self.base_url()))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    /// Submit a generation request. Generation is not idempotent, so this is
    /// never retried automatically; the user resubmits from the form.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<RecipeRecord, ApiError> {
        let url = self.endpoint(&["generate-recipe", ""])?;
        info!("Requesting generation from {}", url);

        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    warn!("Generation request timed out");
                } else {
                    warn!("Generation request failed: {}", e);
                }
                e
            })?;
        let value = read_json(response).await?;

        let mut record = parse_recipe_payload(unwrap_payload(&value));
        if record.id.is_empty() {
            if let Some(id) = value.get("id").and_then(id_string) {
                record.id = id;
            }
        }
        if record.id.is_empty() {
            record.id = placeholder_id();
            info!("Server issued no recipe id, assigned '{}'", record.id);
        }
        if record.created_at.is_none() {
            record.created_at = Some(Value::String(Utc::now().to_rfc3339()));
        }
        Ok(record)
    }

    /// Fetch the canonical record for one recipe id.
    pub async fn recipe_by_id(&self, id: &str) -> Result<RecipeRecord, ApiError> {
        let url = self.endpoint(&["recipe", id])?;
        let value = self.get_json_with_retry(url).await?;

        let mut record = parse_recipe_payload(unwrap_payload(&value));
        if record.id.is_empty() {
            record.id = id.to_string();
        }
        Ok(record)
    }

    /// Past generations for a user key, newest-first as the server orders
    /// them.
    pub async fn history(&self, user_key: &str) -> Result<Vec<RecipeRecord>, ApiError> {
        let url = self.endpoint(&["history", user_key])?;
        let value = self.get_json_with_retry(url).await?;
        Ok(history_items(&value))
    }

    /// One retry on connection-level failures; GETs here are idempotent.
    async fn get_json_with_retry(&self, url: Url) -> Result<Value, ApiError> {
        match self.get_json(url.clone()).await {
            Err(ApiError::Network(e)) if e.is_connect() || e.is_timeout() => {
                warn!("GET {} failed ({}), retrying once", url, e);
                tokio::time::sleep(RETRY_PAUSE).await;
                self.get_json(url).await
            }
            other => other,
        }
    }

    async fn get_json(&self, url: Url) -> Result<Value, ApiError> {
        let response = self.client.get(url).send().await?;
        read_json(response).await
    }
}

impl RecipeFetcher for ApiClient {
    fn fetch_recipe(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<RecipeRecord, ApiError>> + Send {
        self.recipe_by_id(id)
    }
}

impl<T: RecipeFetcher> RecipeFetcher for std::sync::Arc<T> {
    fn fetch_recipe(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<RecipeRecord, ApiError>> + Send {
        (**self).fetch_recipe(id)
    }
}

fn parse_base(base_url: &str) -> Result<Url, ApiError> {
    let url = Url::parse(base_url.trim())
        .map_err(|_| ApiError::BadBaseUrl(base_url.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::BadBaseUrl(base_url.to_string()));
    }
    Ok(url)
}

/// Check status and parse the body as JSON.
async fn read_json(response: reqwest::Response) -> Result<Value, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read body>".to_string());
        let truncated: String = body.chars().take(1024).collect();
        error!("API error: {} - {}", status, truncated);
        return Err(ApiError::Status {
            status,
            body: truncated,
        });
    }
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Responses sometimes wrap the record under "response"; unwrap when so.
fn unwrap_payload(value: &Value) -> &Value {
    value.get("response").unwrap_or(value)
}

/// Items of a history response: `{"history": [...]}` or a bare array.
fn history_items(value: &Value) -> Vec<RecipeRecord> {
    let items = value
        .get("history")
        .and_then(Value::as_array)
        .or_else(|| value.as_array())
        .map(|a| a.as_slice())
        .unwrap_or_default();
    items.iter().map(parse_recipe_payload).collect()
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Locally issued id for generations the server answered without one.
pub fn placeholder_id() -> String {
    format!(
        "local-{}-{:08x}",
        Utc::now().timestamp_millis(),
        rand::random::<u32>()
    )
}
