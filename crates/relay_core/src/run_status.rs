use std::fmt;

use serde::{Deserialize, Serialize};

/// Status of an asynchronous assistant run, as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    Cancelling,
    RequiresAction,
    Completed,
    Failed,
    Cancelled,
    Expired,
    Incomplete,
}

impl RunStatus {
    /// A terminal status is final; the run is never polled again.
    ///
    /// `RequiresAction` counts as terminal here because the relay cannot
    /// supply tool output, so waiting longer would never help.
    pub fn is_terminal(self) -> bool {
        !matches!(
            self,
            RunStatus::Queued | RunStatus::InProgress | RunStatus::Cancelling
        )
    }

    pub fn is_success(self) -> bool {
        self == RunStatus::Completed
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::Cancelling => "cancelling",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Expired => "expired",
            RunStatus::Incomplete => "incomplete",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::RunStatus;

    #[test]
    fn decodes_wire_names() {
        let status: RunStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(status, RunStatus::InProgress);
        let status: RunStatus = serde_json::from_str("\"requires_action\"").unwrap();
        assert_eq!(status, RunStatus::RequiresAction);
        assert!(serde_json::from_str::<RunStatus>("\"paused\"").is_err());
    }

    #[test]
    fn only_active_states_are_non_terminal() {
        assert!(!RunStatus::Queued.is_terminal());
        assert!(!RunStatus::InProgress.is_terminal());
        assert!(!RunStatus::Cancelling.is_terminal());
        assert!(RunStatus::Completed.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
        assert!(RunStatus::RequiresAction.is_terminal());
        assert!(RunStatus::Completed.is_success());
        assert!(!RunStatus::Expired.is_success());
    }
}
