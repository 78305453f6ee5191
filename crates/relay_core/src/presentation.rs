use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::PresenterKind;

pub type PresentationId = u64;

/// How long a toast stays up without interaction.
pub const TOAST_DISPLAY: Duration = Duration::from_secs(8);
/// How long the copy acknowledgement replaces the copy label.
pub const COPY_ACK_DISPLAY: Duration = Duration::from_secs(2);

/// Largest message or copy text carried by a presentation. Even fully
/// escaped as JSON it stays well inside one 1 MiB host frame.
pub const MAX_PRESENTED_BYTES: usize = 128 * 1024;
/// Appended to text cut at `MAX_PRESENTED_BYTES`.
pub const CLIPPED_MARKER: &str = "\n[reply truncated]";

pub const OPEN_LINK_LABEL: &str = "Open link";
pub const COPY_LABEL: &str = "Copy";
pub const COPIED_LABEL: &str = "Copied!";
pub const COPY_FAILED_LABEL: &str = "Copy failed";

/// What a finished send should tell the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub title: String,
    pub message: String,
    pub is_error: bool,
    pub target_url: Option<String>,
    pub copy_text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    OpenLink,
    Copy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionButton {
    pub action: ActionKind,
    pub label: String,
}

/// Rendered form of a presentation, handed to the host for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presentation {
    pub id: PresentationId,
    pub style: PresenterKind,
    pub title: String,
    pub message: String,
    pub is_error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionButton>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Shown,
    Dismissed,
    Expired,
}

/// `Shown -> Dismissed | Expired`; both end states are final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lifecycle {
    state: LifecycleState,
    remaining: Option<Duration>,
    suspended: bool,
}

impl Lifecycle {
    /// Native notifications expire on the platform's schedule, not ours.
    pub fn untimed() -> Self {
        Self {
            state: LifecycleState::Shown,
            remaining: None,
            suspended: false,
        }
    }

    pub fn timed(display: Duration) -> Self {
        Self {
            state: LifecycleState::Shown,
            remaining: Some(display),
            suspended: false,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_shown(&self) -> bool {
        self.state == LifecycleState::Shown
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.remaining
    }

    /// Hover or focus pauses the countdown.
    pub fn suspend(&mut self) {
        if self.is_shown() {
            self.suspended = true;
        }
    }

    pub fn resume(&mut self) {
        self.suspended = false;
    }

    /// Advance the countdown; returns true on the tick that expires it.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        if !self.is_shown() || self.suspended {
            return false;
        }
        let Some(remaining) = self.remaining else {
            return false;
        };
        let left = remaining.saturating_sub(elapsed);
        self.remaining = Some(left);
        if left.is_zero() {
            self.state = LifecycleState::Expired;
            return true;
        }
        false
    }

    /// Returns true if this call ended the presentation.
    pub fn dismiss(&mut self) -> bool {
        if !self.is_shown() {
            return false;
        }
        self.state = LifecycleState::Dismissed;
        true
    }
}

/// Transient state of the copy button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CopyAck {
    #[default]
    Idle,
    Copied { remaining: Duration },
    Failed { remaining: Duration },
}

impl CopyAck {
    pub fn acknowledge(ok: bool) -> Self {
        if ok {
            CopyAck::Copied {
                remaining: COPY_ACK_DISPLAY,
            }
        } else {
            CopyAck::Failed {
                remaining: COPY_ACK_DISPLAY,
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CopyAck::Idle => COPY_LABEL,
            CopyAck::Copied { .. } => COPIED_LABEL,
            CopyAck::Failed { .. } => COPY_FAILED_LABEL,
        }
    }

    /// Returns true when the acknowledgement reverted to the idle label.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        let remaining = match self {
            CopyAck::Idle => return false,
            CopyAck::Copied { remaining } | CopyAck::Failed { remaining } => remaining,
        };
        *remaining = remaining.saturating_sub(elapsed);
        if remaining.is_zero() {
            *self = CopyAck::Idle;
            return true;
        }
        false
    }
}

/// Per-presentation record owned by the core state. It lives exactly as
/// long as the presentation is on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationSession {
    pub id: PresentationId,
    pub style: PresenterKind,
    pub outcome: Outcome,
    pub lifecycle: Lifecycle,
    pub copy_ack: CopyAck,
}

impl PresentationSession {
    pub fn new(id: PresentationId, style: PresenterKind, mut outcome: Outcome) -> Self {
        outcome.message = clip_text(outcome.message);
        outcome.copy_text = outcome.copy_text.map(clip_text);
        let lifecycle = match style {
            PresenterKind::Notification => Lifecycle::untimed(),
            PresenterKind::Toast => Lifecycle::timed(TOAST_DISPLAY),
        };
        Self {
            id,
            style,
            outcome,
            lifecycle,
            copy_ack: CopyAck::Idle,
        }
    }

    pub fn target_url(&self) -> Option<&str> {
        self.outcome.target_url.as_deref()
    }

    /// Copy is a toast affordance for successful replies only.
    pub fn copy_text(&self) -> Option<&str> {
        match self.style {
            PresenterKind::Toast if !self.outcome.is_error => self.outcome.copy_text.as_deref(),
            _ => None,
        }
    }

    pub fn render(&self) -> Presentation {
        let mut actions = Vec::new();
        if self.target_url().is_some() {
            actions.push(ActionButton {
                action: ActionKind::OpenLink,
                label: OPEN_LINK_LABEL.to_string(),
            });
        }
        if self.copy_text().is_some() {
            actions.push(ActionButton {
                action: ActionKind::Copy,
                label: self.copy_ack.label().to_string(),
            });
        }
        Presentation {
            id: self.id,
            style: self.style,
            title: self.outcome.title.clone(),
            message: self.outcome.message.clone(),
            is_error: self.outcome.is_error,
            target_url: self.outcome.target_url.clone(),
            actions,
        }
    }
}

/// Cut `text` to `MAX_PRESENTED_BYTES` on a char boundary.
fn clip_text(mut text: String) -> String {
    if text.len() <= MAX_PRESENTED_BYTES {
        return text;
    }
    let mut end = MAX_PRESENTED_BYTES - CLIPPED_MARKER.len();
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
    text.push_str(CLIPPED_MARKER);
    text
}
