//! Fixed-interval polling of a remote run until it reaches a final state.

use std::time::Duration;

use relay_core::{RelayError, RunStatus};
use relay_logging::relay_debug;
use tokio::time::{sleep, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub deadline: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunHandle {
    pub thread_id: String,
    pub run_id: String,
}

/// One status read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSnapshot {
    pub status: RunStatus,
    pub last_error: Option<String>,
}

impl RunSnapshot {
    pub fn new(status: RunStatus) -> Self {
        Self {
            status,
            last_error: None,
        }
    }
}

#[async_trait::async_trait]
pub trait RunStatusSource: Send + Sync {
    async fn read_status(&self, run: &RunHandle) -> Result<RunSnapshot, RelayError>;
}

/// Read the run status until it is terminal or `deadline` has passed.
///
/// After each non-terminal read the loop sleeps `interval`, cut short at the
/// deadline; once the deadline has passed it fails with `PollTimeout`
/// without reading again.
pub async fn poll_until_terminal(
    source: &dyn RunStatusSource,
    run: &RunHandle,
    settings: PollSettings,
) -> Result<RunStatus, RelayError> {
    let started = Instant::now();
    let mut reads: u32 = 0;
    loop {
        let snapshot = source.read_status(run).await?;
        reads += 1;
        relay_debug!("run {} read #{reads}: {}", run.run_id, snapshot.status);
        if snapshot.status.is_terminal() {
            return settle(snapshot);
        }

        let until_deadline = settings.deadline.saturating_sub(started.elapsed());
        sleep(settings.interval.min(until_deadline)).await;
        let waited = started.elapsed();
        if waited >= settings.deadline {
            relay_debug!("run {} still pending after {reads} reads", run.run_id);
            return Err(RelayError::PollTimeout { waited });
        }
    }
}

/// Map a terminal snapshot to the send outcome.
pub fn settle(snapshot: RunSnapshot) -> Result<RunStatus, RelayError> {
    match snapshot.status {
        RunStatus::Completed => Ok(RunStatus::Completed),
        RunStatus::RequiresAction => Err(RelayError::UnsupportedCapability {
            status: snapshot.status,
        }),
        status => Err(RelayError::RunFailed {
            status,
            detail: snapshot.last_error,
        }),
    }
}
