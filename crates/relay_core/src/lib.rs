//! Relay core: pure state machine, prompt assembly and reply extraction.
mod config;
mod effect;
mod error;
mod extract;
mod msg;
mod presentation;
mod prompt;
mod run_status;
mod selection;
mod state;
mod update;
mod view_model;

pub use config::{
    BackendKind, PresenterKind, RelayConfig, TemplateKey, DEFAULT_MENU_TITLE, DEFAULT_TIMEOUT_MS,
};
pub use effect::Effect;
pub use error::RelayError;
pub use extract::{extract, matched_shape, RawResponse, SHAPE_MATCHERS};
pub use msg::Msg;
pub use presentation::{
    ActionButton, ActionKind, CopyAck, Lifecycle, LifecycleState, Outcome, Presentation,
    PresentationId, PresentationSession, CLIPPED_MARKER, COPIED_LABEL, COPY_ACK_DISPLAY,
    COPY_FAILED_LABEL, COPY_LABEL, MAX_PRESENTED_BYTES, OPEN_LINK_LABEL, TOAST_DISPLAY,
};
pub use prompt::{build_prompt, source_line, METADATA_LABEL, SNIPPET_LABEL};
pub use run_status::RunStatus;
pub use selection::{PageMetadata, Selection, SourceInfo};
pub use state::{AppState, RequestId};
pub use update::{update, FORWARDED_MESSAGE, FORWARDED_TITLE, SUCCESS_TITLE};
pub use view_model::AppViewModel;
