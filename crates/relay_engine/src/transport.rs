use std::time::Duration;

use relay_core::{RawResponse, RelayError};
use relay_logging::{relay_debug, relay_warn};
use reqwest::header::CONTENT_TYPE;

use crate::RequestConfig;

const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("snippet-relay/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: RequestConfig) -> Result<RawResponse, RelayError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(settings: TransportSettings) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .user_agent(settings.user_agent)
            .build()
            .map_err(|err| RelayError::network(err.to_string()))?;
        Ok(Self { client })
    }

    async fn exchange(&self, request: &RequestConfig) -> Result<RawResponse, RelayError> {
        let url = url::Url::parse(&request.endpoint).map_err(|err| {
            RelayError::network(format!("invalid endpoint {}: {err}", request.endpoint))
        })?;

        let mut builder = self.client.request(request.method.as_reqwest(), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            let bytes = serde_json::to_vec(body)
                .map_err(|err| RelayError::network(format!("unencodable body: {err}")))?;
            builder = builder.header(CONTENT_TYPE, "application/json").body(bytes);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| map_reqwest_error(err, request.timeout))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        let text = response
            .text()
            .await
            .map_err(|err| map_reqwest_error(err, request.timeout))?;

        if !status.is_success() {
            let body = text.trim();
            let message = if body.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                truncate(body, MAX_ERROR_BODY)
            };
            return Err(RelayError::Http {
                status: status.as_u16(),
                message,
            });
        }

        decode_body(content_type.as_deref(), text)
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: RequestConfig) -> Result<RawResponse, RelayError> {
        relay_debug!(
            "{:?} {} (timeout {} ms)",
            request.method,
            request.endpoint,
            request.timeout.as_millis()
        );
        // One timer per call; dropping the exchange on expiry aborts the request.
        match tokio::time::timeout(request.timeout, self.exchange(&request)).await {
            Ok(result) => result,
            Err(_) => {
                relay_warn!(
                    "{} aborted after {} ms",
                    request.endpoint,
                    request.timeout.as_millis()
                );
                Err(RelayError::Timeout {
                    timeout: request.timeout,
                })
            }
        }
    }
}

/// JSON when the content type says so, raw text otherwise.
pub fn decode_body(content_type: Option<&str>, text: String) -> Result<RawResponse, RelayError> {
    let is_json = content_type
        .map(|ct| ct.to_ascii_lowercase().contains("json"))
        .unwrap_or(false);
    if !is_json || text.trim().is_empty() {
        return Ok(RawResponse::Text(text));
    }
    serde_json::from_str(&text)
        .map(RawResponse::Json)
        .map_err(|err| RelayError::network(format!("malformed JSON body: {err}")))
}

fn map_reqwest_error(err: reqwest::Error, timeout: Duration) -> RelayError {
    if err.is_timeout() {
        return RelayError::Timeout { timeout };
    }
    RelayError::network(err.to_string())
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &text[..end])
}
