use std::sync::Arc;
use std::time::Duration;

use relay_core::{BackendKind, RawResponse, RelayError};
use serde_json::json;

use super::{join_url, Backend};
use crate::{RequestConfig, Submission, Transport};

/// Non-streaming generate call against a local model server.
pub struct LocalModelBackend {
    transport: Arc<dyn Transport>,
    endpoint: String,
    model: String,
    timeout: Duration,
}

impl LocalModelBackend {
    pub fn new(
        transport: Arc<dyn Transport>,
        base_url: &str,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            endpoint: join_url(base_url, "api/generate"),
            model: model.into(),
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl Backend for LocalModelBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::LocalModel
    }

    async fn deliver(&self, submission: &Submission) -> Result<RawResponse, RelayError> {
        let body = json!({
            "model": self.model,
            "prompt": submission.prompt,
            "stream": false,
        });
        self.transport
            .send(RequestConfig::post(&self.endpoint, body, self.timeout))
            .await
    }
}
