use std::time::Duration;

use relay_core::{PageMetadata, RelayError, RequestId, Selection, SourceInfo, TemplateKey};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub(crate) fn as_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

/// One outbound call. `timeout` bounds the whole exchange, body included.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestConfig {
    pub endpoint: String,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
    pub timeout: Duration,
}

impl RequestConfig {
    pub fn get(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: HttpMethod::Get,
            headers: Vec::new(),
            body: None,
            timeout,
        }
    }

    pub fn post(endpoint: impl Into<String>, body: Value, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: HttpMethod::Post,
            headers: Vec::new(),
            body: Some(body),
            timeout,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A trigger accepted by the core, ready for the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendJob {
    pub request_id: RequestId,
    pub selection: Selection,
    pub page: Option<PageMetadata>,
    pub template: Option<TemplateKey>,
}

/// Everything a backend needs to deliver one selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub request_id: RequestId,
    pub selection: Selection,
    pub page: Option<PageMetadata>,
    pub prompt: String,
    pub source: SourceInfo,
    /// RFC 3339 creation time.
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    SendCompleted {
        request_id: RequestId,
        result: Result<String, RelayError>,
    },
}
