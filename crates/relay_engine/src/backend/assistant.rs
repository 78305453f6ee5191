use std::sync::Arc;
use std::time::Duration;

use relay_core::{BackendKind, RawResponse, RelayError, RunStatus};
use relay_logging::relay_info;
use serde_json::{json, Value};

use super::{join_url, required_str, Backend};
use crate::poll::{poll_until_terminal, settle, RunHandle, RunSnapshot, RunStatusSource};
use crate::{PollSettings, RequestConfig, Submission, Transport};

pub const ASSISTANT_VERSION_HEADER: (&str, &str) = ("OpenAI-Beta", "assistants=v2");

/// Thread/run assistant API. Calls are strictly sequential:
/// create thread, post message, start run, poll run, list messages.
pub struct AssistantBackend {
    transport: Arc<dyn Transport>,
    base_url: String,
    api_key: String,
    assistant_id: String,
    timeout: Duration,
    poll: PollSettings,
}

impl AssistantBackend {
    pub fn new(
        transport: Arc<dyn Transport>,
        base_url: &str,
        api_key: impl Into<String>,
        assistant_id: impl Into<String>,
        timeout: Duration,
        poll: PollSettings,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            assistant_id: assistant_id.into(),
            timeout,
            poll,
        }
    }

    fn authorized(&self, request: RequestConfig) -> RequestConfig {
        request
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header(ASSISTANT_VERSION_HEADER.0, ASSISTANT_VERSION_HEADER.1)
    }

    async fn post(&self, path: &str, body: Value) -> Result<RawResponse, RelayError> {
        let request = RequestConfig::post(join_url(&self.base_url, path), body, self.timeout);
        self.transport.send(self.authorized(request)).await
    }

    async fn get(&self, path: &str) -> Result<RawResponse, RelayError> {
        let request = RequestConfig::get(join_url(&self.base_url, path), self.timeout);
        self.transport.send(self.authorized(request)).await
    }

    async fn create_thread(&self) -> Result<String, RelayError> {
        let raw = self.post("threads", json!({})).await?;
        required_str(&raw, "id", "create thread")
    }

    async fn post_message(&self, thread_id: &str, prompt: &str) -> Result<(), RelayError> {
        self.post(
            &format!("threads/{thread_id}/messages"),
            json!({ "role": "user", "content": prompt }),
        )
        .await
        .map(|_| ())
    }

    async fn start_run(&self, thread_id: &str) -> Result<(RunHandle, RunSnapshot), RelayError> {
        let raw = self
            .post(
                &format!("threads/{thread_id}/runs"),
                json!({ "assistant_id": self.assistant_id }),
            )
            .await?;
        let run_id = required_str(&raw, "id", "create run")?;
        let snapshot = parse_snapshot(&raw)?;
        Ok((
            RunHandle {
                thread_id: thread_id.to_string(),
                run_id,
            },
            snapshot,
        ))
    }

    async fn reply_parts(&self, run: &RunHandle) -> Result<Vec<Value>, RelayError> {
        let raw = self
            .get(&format!(
                "threads/{}/messages?run_id={}&order=asc",
                run.thread_id, run.run_id
            ))
            .await?;
        let messages = raw
            .as_json()
            .and_then(|value| value.get("data"))
            .and_then(Value::as_array)
            .ok_or_else(|| RelayError::network("list messages reply is missing `data`"))?;

        Ok(messages
            .iter()
            .filter(|message| message.get("role").and_then(Value::as_str) == Some("assistant"))
            .filter_map(|message| message.get("content").and_then(Value::as_array))
            .flatten()
            .cloned()
            .collect())
    }
}

fn parse_snapshot(raw: &RawResponse) -> Result<RunSnapshot, RelayError> {
    let value = raw
        .as_json()
        .ok_or_else(|| RelayError::network("run reply is not JSON"))?;
    let status_value = value
        .get("status")
        .cloned()
        .ok_or_else(|| RelayError::network("run reply is missing `status`"))?;
    let status: RunStatus = serde_json::from_value(status_value.clone())
        .map_err(|_| RelayError::network(format!("unrecognized run status {status_value}")))?;
    let last_error = value.get("last_error").and_then(|err| {
        err.get("message")
            .or_else(|| err.get("code"))
            .and_then(Value::as_str)
            .map(str::to_string)
    });
    Ok(RunSnapshot { status, last_error })
}

#[async_trait::async_trait]
impl RunStatusSource for AssistantBackend {
    async fn read_status(&self, run: &RunHandle) -> Result<RunSnapshot, RelayError> {
        let raw = self
            .get(&format!("threads/{}/runs/{}", run.thread_id, run.run_id))
            .await?;
        parse_snapshot(&raw)
    }
}

#[async_trait::async_trait]
impl Backend for AssistantBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Assistant
    }

    async fn deliver(&self, submission: &Submission) -> Result<RawResponse, RelayError> {
        let thread_id = self.create_thread().await?;
        self.post_message(&thread_id, &submission.prompt).await?;
        let (run, initial) = self.start_run(&thread_id).await?;
        relay_info!(
            "request {} started run {} on thread {}",
            submission.request_id,
            run.run_id,
            thread_id
        );

        // A run that is already final is never polled.
        if initial.status.is_terminal() {
            settle(initial)?;
        } else {
            poll_until_terminal(self, &run, self.poll).await?;
        }

        let parts = self.reply_parts(&run).await?;
        Ok(RawResponse::Json(json!({ "message": { "content": parts } })))
    }
}
