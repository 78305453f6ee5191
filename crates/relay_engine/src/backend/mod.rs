//! Backends turn a submission into one (or, for assistants, a short
//! sequence of) outbound calls.
mod assistant;
mod local_model;
mod proxy;

use std::sync::Arc;

use relay_core::{BackendKind, RawResponse, RelayConfig, RelayError};
use serde_json::Value;

use crate::{PollSettings, Submission, Transport};

pub use assistant::{AssistantBackend, ASSISTANT_VERSION_HEADER};
pub use local_model::LocalModelBackend;
pub use proxy::ProxyBackend;

#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    fn kind(&self) -> BackendKind;

    async fn deliver(&self, submission: &Submission) -> Result<RawResponse, RelayError>;
}

/// Build the backend selected by a validated config.
pub fn backend_for(config: &RelayConfig, transport: Arc<dyn Transport>) -> Arc<dyn Backend> {
    match config.backend {
        BackendKind::Proxy => Arc::new(ProxyBackend::new(
            transport,
            config.base_url.trim(),
            config.api_key.clone(),
            config.timeout(),
        )),
        BackendKind::LocalModel => Arc::new(LocalModelBackend::new(
            transport,
            config.base_url.trim(),
            config.model.clone().unwrap_or_default(),
            config.timeout(),
        )),
        BackendKind::Assistant => Arc::new(AssistantBackend::new(
            transport,
            config.base_url.trim(),
            config.api_key.clone().unwrap_or_default(),
            config.assistant_id.clone().unwrap_or_default(),
            config.timeout(),
            PollSettings {
                interval: config.poll_interval(),
                deadline: config.poll_deadline(),
            },
        )),
    }
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

pub(crate) fn required_str(
    raw: &RawResponse,
    field: &str,
    call: &str,
) -> Result<String, RelayError> {
    raw.as_json()
        .and_then(|value| value.get(field))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| RelayError::network(format!("{call} reply is missing `{field}`")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn join_url_normalizes_slashes() {
        assert_eq!(join_url("http://h/v1/", "/threads"), "http://h/v1/threads");
        assert_eq!(join_url("http://h", "api/generate"), "http://h/api/generate");
    }

    #[test]
    fn required_str_reports_missing_field() {
        let raw = RawResponse::Json(json!({"id": 5}));
        let err = required_str(&raw, "id", "create thread").unwrap_err();
        assert_eq!(
            err,
            RelayError::network("create thread reply is missing `id`")
        );
    }
}
