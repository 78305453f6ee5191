use std::time::Duration;

use thiserror::Error;

use crate::RunStatus;

/// Every way a send can fail. All variants end up as an error presentation;
/// none propagate past the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Missing or placeholder configuration. Reported before any network call.
    #[error("{message}")]
    Configuration { message: String },
    /// Selection was empty after trimming. Reported before any network call.
    #[error("Select some text before using \u{201c}{menu_title}\u{201d}.")]
    EmptyInput { menu_title: String },
    #[error("no response within {} ms", .timeout.as_millis())]
    Timeout { timeout: Duration },
    #[error("backend responded with {status}: {message}")]
    Http { status: u16, message: String },
    #[error("network error: {message}")]
    Network { message: String },
    #[error("run did not reach a final state within {} s", .waited.as_secs())]
    PollTimeout { waited: Duration },
    #[error(
        "run ended with status {status}{}",
        .detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
    )]
    RunFailed {
        status: RunStatus,
        detail: Option<String>,
    },
    /// The run paused waiting for tool output; never retried.
    #[error("run is waiting for an action ({status}), which the relay does not support")]
    UnsupportedCapability { status: RunStatus },
}

impl RelayError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Short user-facing heading for the error presentation.
    pub fn title(&self) -> &'static str {
        match self {
            RelayError::Configuration { .. } => "Backend not configured",
            RelayError::EmptyInput { .. } => "Nothing to send",
            RelayError::Timeout { .. } => "Request timed out",
            RelayError::Http { .. } => "Backend error",
            RelayError::Network { .. } => "Network error",
            RelayError::PollTimeout { .. } => "Run timed out",
            RelayError::RunFailed { status, .. } => match status {
                RunStatus::Cancelled => "Run cancelled",
                RunStatus::Expired => "Run expired",
                _ => "Run failed",
            },
            RelayError::UnsupportedCapability { .. } => "Action required",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_failures_have_distinct_titles() {
        let titles: Vec<_> = [RunStatus::Failed, RunStatus::Cancelled, RunStatus::Expired]
            .into_iter()
            .map(|status| {
                RelayError::RunFailed {
                    status,
                    detail: None,
                }
                .title()
            })
            .collect();
        assert_eq!(titles, vec!["Run failed", "Run cancelled", "Run expired"]);
    }

    #[test]
    fn run_failed_message_includes_detail() {
        let err = RelayError::RunFailed {
            status: RunStatus::Failed,
            detail: Some("rate_limit_exceeded".into()),
        };
        assert_eq!(
            err.to_string(),
            "run ended with status failed: rate_limit_exceeded"
        );
    }

    #[test]
    fn timeout_message_reports_millis() {
        let err = RelayError::Timeout {
            timeout: Duration::from_millis(1500),
        };
        assert_eq!(err.to_string(), "no response within 1500 ms");
    }
}
