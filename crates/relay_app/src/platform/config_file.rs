use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::Context;
use relay_core::RelayConfig;
use relay_logging::{redact_secret, relay_info, relay_warn};

/// Load the RON config at `path`, then apply `RELAY_*` environment overrides.
///
/// A missing file is not an error: defaults are used and validation later
/// reports exactly what still needs to be set.
pub(crate) fn load_config(path: &Path) -> anyhow::Result<RelayConfig> {
    let config = match fs::read_to_string(path) {
        Ok(text) => parse_config(&text)
            .with_context(|| format!("failed to parse relay config {}", path.display()))?,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            relay_warn!("No relay config at {:?}; using defaults", path);
            RelayConfig::default()
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read relay config {}", path.display()))
        }
    };

    let mut config = config;
    config.apply_overrides(|key| std::env::var(key).ok());
    relay_info!("Loaded relay config: {}", describe(&config));
    Ok(config)
}

pub(crate) fn parse_config(text: &str) -> Result<RelayConfig, ron::error::SpannedError> {
    ron::from_str(text)
}

/// One-line summary safe for logs.
pub(crate) fn describe(config: &RelayConfig) -> String {
    format!(
        "backend={} base_url={} api_key={} timeout_ms={} presenter={:?}",
        config.backend.as_str(),
        config.base_url,
        config
            .api_key
            .as_deref()
            .map(redact_secret)
            .unwrap_or_else(|| "none".to_string()),
        config.timeout_ms,
        config.presenter
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::{BackendKind, PresenterKind, TemplateKey, DEFAULT_TIMEOUT_MS};

    #[test]
    fn parses_partial_config_with_defaults() {
        let config = parse_config(
            r#"(
                backend: assistant,
                base_url: "https://api.openai.com/v1",
                api_key: Some("sk-live-0123456789"),
                assistant_id: Some("asst_1"),
                presenter: toast,
                default_template: Some(summarize),
            )"#,
        )
        .unwrap();
        assert_eq!(config.backend, BackendKind::Assistant);
        assert_eq!(config.presenter, PresenterKind::Toast);
        assert_eq!(config.default_template, Some(TemplateKey::Summarize));
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_unknown_backend() {
        assert!(parse_config("(backend: carrier_pigeon)").is_err());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = load_config(&dir.path().join("absent.ron")).unwrap();
        assert_eq!(config.backend, BackendKind::Proxy);
    }

    #[test]
    fn describe_redacts_api_key() {
        let config = RelayConfig {
            api_key: Some("sk-live-0123456789".into()),
            ..RelayConfig::default()
        };
        let line = describe(&config);
        assert!(line.contains("****6789"));
        assert!(!line.contains("sk-live"));
    }
}
