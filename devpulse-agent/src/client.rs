//! HTTP client wrapper for the rewards API
//!
//! Builds the request envelope shared by every remote call: bearer token,
//! fixed browser-like user agent, referer, JSON content type, and an
//! optional per-agent proxy.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, REFERER, USER_AGENT};
use reqwest::{Client, Proxy, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Default base URL of the rewards API
pub const DEFAULT_API_BASE: &str = "https://www.aeropres.in";

const TOGGLE_PATH: &str = "/sec-api/api/toggle";
const HEARTBEAT_PATH: &str = "/sec-api/api/produce-to-kafka";
const WALLET_DETAILS_PATH: &str = "/testnet-api/api/testnet/walletDetails";

/// Kafka topic the heartbeat events are produced to
pub const HEARTBEAT_TOPIC: &str = "device-heartbeat";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

// No retries anywhere; the only transport hardening is this request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from a single remote call
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected status: {0}")]
    Status(StatusCode),

    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid client configuration: {0}")]
    Build(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Requested device state for a toggle call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    On,
    Off,
}

impl DeviceState {
    /// Wire representation expected by the toggle endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceState::On => "ON",
            DeviceState::Off => "OFF",
        }
    }

    pub fn is_on(&self) -> bool {
        matches!(self, DeviceState::On)
    }
}

/// Prefix `http://` onto proxy entries that carry no scheme
pub fn normalize_proxy(raw: &str) -> String {
    let raw = raw.trim();
    if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToggleRequest<'a> {
    wallet_address: &'a str,
    state: &'a str,
    device_hash: &'a str,
}

/// Inner payload of a heartbeat event
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatEvent {
    pub wallet_address: String,
    pub device_hash: String,
    pub is_installed: bool,
    pub toggle_state: bool,
    pub whitelisted_urls: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HeartbeatRequest {
    topic: &'static str,
    input_data: HeartbeatEvent,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WalletDetailsRequest<'a> {
    wallet_address: &'a str,
}

/// Earnings figures reported by the wallet-details endpoint
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletDetails {
    #[serde(default)]
    pub total_earnings: f64,
    #[serde(default)]
    pub today_earnings: f64,
    #[serde(default)]
    pub active_rate_per_minute: f64,
}

#[derive(Debug, Deserialize)]
struct WalletDetailsResponse {
    #[serde(default)]
    error: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<WalletDetails>,
}

/// Authenticated client for one account, optionally routed through a proxy
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client for the given bearer token and optional proxy endpoint
    pub fn new(token: &str, proxy: Option<&str>) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| ApiError::Build(format!("invalid token: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(REFERER, HeaderValue::from_static(DEFAULT_API_BASE));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT);

        if let Some(proxy) = proxy {
            builder = builder.proxy(Proxy::all(normalize_proxy(proxy))?);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: DEFAULT_API_BASE.to_string(),
        })
    }

    /// Override the API base URL (tests point this at a mock server)
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        self.base_url = base.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a device state-change request, returning the raw response body
    pub async fn toggle(
        &self,
        wallet_address: &str,
        state: DeviceState,
        device_hash: &str,
    ) -> ApiResult<Value> {
        let body = ToggleRequest {
            wallet_address,
            state: state.as_str(),
            device_hash,
        };
        self.post_json(TOGGLE_PATH, &body).await
    }

    /// Produce one heartbeat event to the ingestion endpoint
    pub async fn produce_heartbeat(&self, event: HeartbeatEvent) -> ApiResult<Value> {
        let body = HeartbeatRequest {
            topic: HEARTBEAT_TOPIC,
            input_data: event,
        };
        self.post_json(HEARTBEAT_PATH, &body).await
    }

    /// Fetch earnings data for the wallet
    pub async fn wallet_details(&self, wallet_address: &str) -> ApiResult<WalletDetails> {
        let body = WalletDetailsRequest { wallet_address };
        let raw: Value = self.post_json(WALLET_DETAILS_PATH, &body).await?;

        let parsed: WalletDetailsResponse =
            serde_json::from_value(raw).map_err(|e| ApiError::Api(e.to_string()))?;
        if parsed.error {
            return Err(ApiError::Api(
                parsed
                    .message
                    .unwrap_or_else(|| "wallet details reported an error".to_string()),
            ));
        }
        parsed
            .details
            .ok_or_else(|| ApiError::Api("wallet details missing from response".to_string()))
    }

    async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> ApiResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http.post(&url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }

        let value: Value = response.json().await?;
        if let Some(message) = api_error_message(&value) {
            return Err(ApiError::Api(message));
        }
        Ok(value)
    }
}

/// Extract an API-reported error from a 2xx response body, if any
fn api_error_message(body: &Value) -> Option<String> {
    match body.get("error") {
        Some(Value::Bool(true)) => Some(
            body.get("message")
                .and_then(Value::as_str)
                .unwrap_or("unspecified API error")
                .to_string(),
        ),
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}
