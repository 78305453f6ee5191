use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{RelayError, SourceInfo};

pub const DEFAULT_MENU_TITLE: &str = "Send to ChatGPT (via Proxy)";
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;
pub const DEFAULT_POLL_DEADLINE_MS: u64 = 60_000;

/// Which kind of backend a send goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Generic HTTPS proxy receiving a structured payload.
    #[default]
    Proxy,
    /// Local model server with a `/api/generate` endpoint.
    LocalModel,
    /// Hosted assistant API driven through threads and runs.
    Assistant,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Proxy => "proxy",
            BackendKind::LocalModel => "local_model",
            BackendKind::Assistant => "assistant",
        }
    }
}

/// How results are surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenterKind {
    /// Native OS notification with at most one button.
    #[default]
    Notification,
    /// In-page toast with auto-dismiss and copy support.
    Toast,
}

/// Named prompt templates shipped alongside the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKey {
    Summarize,
    Format,
}

impl TemplateKey {
    pub const ALL: [TemplateKey; 2] = [TemplateKey::Summarize, TemplateKey::Format];

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateKey::Summarize => "summarize",
            TemplateKey::Format => "format",
        }
    }

    /// Path of the template file relative to the prompts directory.
    pub fn relative_path(self) -> &'static str {
        match self {
            TemplateKey::Summarize => "prompts/summarize.txt",
            TemplateKey::Format => "prompts/format.txt",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(key.trim()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub backend: BackendKind,
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub assistant_id: Option<String>,
    pub timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub poll_deadline_ms: u64,
    pub presenter: PresenterKind,
    pub success_link_url: Option<String>,
    pub failure_link_url: Option<String>,
    pub menu_title: String,
    pub source_name: String,
    pub source_version: String,
    pub prompts_dir: Option<PathBuf>,
    pub default_template: Option<TemplateKey>,
    pub log_dir: Option<PathBuf>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Proxy,
            base_url: "https://your-proxy.example.com/api/ingest".to_string(),
            api_key: None,
            model: None,
            assistant_id: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            poll_deadline_ms: DEFAULT_POLL_DEADLINE_MS,
            presenter: PresenterKind::Notification,
            success_link_url: None,
            failure_link_url: None,
            menu_title: DEFAULT_MENU_TITLE.to_string(),
            source_name: "Snippet Relay".to_string(),
            source_version: "0.1.0".to_string(),
            prompts_dir: None,
            default_template: None,
            log_dir: None,
        }
    }
}

impl RelayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn poll_deadline(&self) -> Duration {
        Duration::from_millis(self.poll_deadline_ms)
    }

    pub fn source(&self) -> SourceInfo {
        SourceInfo::new(&self.source_name, &self.source_version)
    }

    /// Menu title with the built-in fallback for blank values.
    pub fn menu_title(&self) -> &str {
        let title = self.menu_title.trim();
        if title.is_empty() {
            DEFAULT_MENU_TITLE
        } else {
            title
        }
    }

    /// Apply `RELAY_*` overrides. `lookup` is usually `std::env::var(..).ok()`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(base_url) = lookup("RELAY_BASE_URL") {
            self.base_url = base_url;
        }
        if let Some(api_key) = lookup("RELAY_API_KEY") {
            self.api_key = Some(api_key);
        }
        if let Some(model) = lookup("RELAY_MODEL") {
            self.model = Some(model);
        }
        if let Some(assistant_id) = lookup("RELAY_ASSISTANT_ID") {
            self.assistant_id = Some(assistant_id);
        }
    }

    /// Fail fast on missing or placeholder values, with a remediation message.
    pub fn validate(&self) -> Result<(), RelayError> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            return Err(RelayError::configuration(format!(
                "Set `base_url` in the relay config to your {} endpoint before sending.",
                self.backend.as_str()
            )));
        }
        let parsed = Url::parse(base_url).map_err(|err| {
            RelayError::configuration(format!(
                "`base_url` ({base_url}) is not a valid URL: {err}. Update the relay config."
            ))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RelayError::configuration(format!(
                "`base_url` must use http or https, found `{}`.",
                parsed.scheme()
            )));
        }
        if parsed.host_str().is_some_and(is_placeholder_host) {
            return Err(RelayError::configuration(format!(
                "Update `base_url` in the relay config with your {} endpoint before sending.",
                self.backend.as_str()
            )));
        }

        match self.backend {
            BackendKind::Proxy => {
                // Optional, but a template value must not go out as a bearer token.
                let key = self.api_key.as_deref().map(str::trim);
                if key.is_some_and(|key| !key.is_empty()) && is_missing(key) {
                    return Err(RelayError::configuration(
                        "Replace the placeholder `api_key` (or RELAY_API_KEY) or remove it.",
                    ));
                }
            }
            BackendKind::LocalModel => {
                if is_missing(self.model.as_deref()) {
                    return Err(RelayError::configuration(
                        "Set `model` (or RELAY_MODEL) to the local model name, for example `llama3`.",
                    ));
                }
            }
            BackendKind::Assistant => {
                if is_missing(self.api_key.as_deref()) {
                    return Err(RelayError::configuration(
                        "Set `api_key` (or RELAY_API_KEY) to your assistant API key before sending.",
                    ));
                }
                if is_missing(self.assistant_id.as_deref()) {
                    return Err(RelayError::configuration(
                        "Set `assistant_id` (or RELAY_ASSISTANT_ID) to the assistant that should answer.",
                    ));
                }
                if self.poll_interval_ms == 0 || self.poll_deadline_ms < self.poll_interval_ms {
                    return Err(RelayError::configuration(
                        "`poll_interval_ms` must be non-zero and no larger than `poll_deadline_ms`.",
                    ));
                }
            }
        }

        if self.timeout_ms == 0 {
            return Err(RelayError::configuration(
                "`timeout_ms` must be greater than zero.",
            ));
        }
        Ok(())
    }
}

fn is_placeholder_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    host == "example.com" || host.ends_with(".example.com") || host.starts_with("your-")
}

fn is_missing(value: Option<&str>) -> bool {
    let Some(value) = value.map(str::trim) else {
        return true;
    };
    let lower = value.to_ascii_lowercase();
    value.is_empty()
        || lower.starts_with("your")
        || lower.contains("replace")
        || (value.starts_with('<') && value.ends_with('>'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assistant_config() -> RelayConfig {
        RelayConfig {
            backend: BackendKind::Assistant,
            base_url: "https://api.openai.com/v1".into(),
            api_key: Some("sk-live-0123456789".into()),
            assistant_id: Some("asst_123".into()),
            ..RelayConfig::default()
        }
    }

    #[test]
    fn default_config_is_rejected_as_placeholder() {
        let err = RelayConfig::default().validate().unwrap_err();
        assert!(matches!(err, RelayError::Configuration { .. }));
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn assistant_requires_real_api_key() {
        let mut config = assistant_config();
        assert_eq!(config.validate(), Ok(()));

        config.api_key = Some("YOUR_API_KEY".into());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("api_key"));

        config.api_key = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn assistant_requires_assistant_id() {
        let mut config = assistant_config();
        config.assistant_id = Some("<assistant-id>".into());
        assert!(config.validate().unwrap_err().to_string().contains("assistant_id"));
    }

    #[test]
    fn proxy_rejects_placeholder_api_key() {
        let mut config = RelayConfig {
            base_url: "https://relay.internal/api/ingest".into(),
            api_key: Some("YOUR_API_KEY".into()),
            ..RelayConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(RelayError::Configuration { .. })
        ));

        config.api_key = None;
        assert_eq!(config.validate(), Ok(()));
        config.api_key = Some("   ".into());
        assert_eq!(config.validate(), Ok(()));
        config.api_key = Some("pk-live-7f3a".into());
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn local_model_requires_model() {
        let mut config = RelayConfig {
            backend: BackendKind::LocalModel,
            base_url: "http://127.0.0.1:11434".into(),
            ..RelayConfig::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("model"));
        config.model = Some("llama3".into());
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_non_http_scheme_and_zero_timeout() {
        let mut config = RelayConfig {
            base_url: "ftp://files.internal".into(),
            ..RelayConfig::default()
        };
        assert!(config.validate().is_err());
        config.base_url = "https://relay.internal/ingest".into();
        config.timeout_ms = 0;
        assert!(config.validate().unwrap_err().to_string().contains("timeout_ms"));
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = RelayConfig::default();
        config.apply_overrides(|key| match key {
            "RELAY_BASE_URL" => Some("https://relay.internal".into()),
            "RELAY_API_KEY" => Some("secret".into()),
            _ => None,
        });
        assert_eq!(config.base_url, "https://relay.internal");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.model, None);
    }

    #[test]
    fn template_keys_parse_case_insensitively() {
        assert_eq!(TemplateKey::parse(" Summarize "), Some(TemplateKey::Summarize));
        assert_eq!(TemplateKey::parse("format"), Some(TemplateKey::Format));
        assert_eq!(TemplateKey::parse("translate"), None);
    }

    #[test]
    fn blank_menu_title_falls_back() {
        let config = RelayConfig {
            menu_title: "  ".into(),
            ..RelayConfig::default()
        };
        assert_eq!(config.menu_title(), DEFAULT_MENU_TITLE);
    }
}
