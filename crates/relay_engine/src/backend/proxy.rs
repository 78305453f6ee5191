use std::sync::Arc;
use std::time::Duration;

use relay_core::{BackendKind, PageMetadata, RawResponse, RelayError};
use serde_json::{json, Value};

use super::Backend;
use crate::{RequestConfig, Submission, Transport};

/// Forwards the selection, prompt and page context to an HTTPS proxy.
pub struct ProxyBackend {
    transport: Arc<dyn Transport>,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl ProxyBackend {
    pub fn new(
        transport: Arc<dyn Transport>,
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            timeout,
        }
    }

    pub fn payload(submission: &Submission) -> Value {
        let page = submission.page.clone().unwrap_or_default();
        json!({
            "createdAt": submission.created_at,
            "selection": submission.selection.as_str(),
            "prompt": submission.prompt,
            "metadata": metadata_json(&page),
            "source": {
                "extension": submission.source.name,
                "version": submission.source.version,
            },
        })
    }
}

fn metadata_json(page: &PageMetadata) -> Value {
    json!({
        "pageUrl": page.url,
        "pageTitle": page.title,
        "language": page.language,
        "description": page.description,
        "ogTitle": page.og_title,
        "ogDescription": page.og_description,
        "referrer": page.referrer,
        "userAgent": page.user_agent,
    })
}

#[async_trait::async_trait]
impl Backend for ProxyBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Proxy
    }

    async fn deliver(&self, submission: &Submission) -> Result<RawResponse, RelayError> {
        let mut request =
            RequestConfig::post(&self.endpoint, Self::payload(submission), self.timeout);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }
        self.transport.send(request).await
    }
}
