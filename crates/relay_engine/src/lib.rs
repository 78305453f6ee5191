//! Relay engine: transport, backends, polling and effect execution.
mod backend;
mod engine;
mod pipeline;
mod poll;
mod request_log;
mod templates;
mod transport;
mod types;

pub use backend::{
    backend_for, AssistantBackend, Backend, LocalModelBackend, ProxyBackend,
    ASSISTANT_VERSION_HEADER,
};
pub use engine::{ChannelEventSink, EngineHandle, EventSink};
pub use pipeline::{Clock, RelayPipeline};
pub use poll::{poll_until_terminal, settle, PollSettings, RunHandle, RunSnapshot, RunStatusSource};
pub use request_log::{ensure_log_dir, LoggedError, PersistError, RequestLogEntry, RequestLogger};
pub use templates::PromptLibrary;
pub use transport::{decode_body, ReqwestTransport, Transport, TransportSettings};
pub use types::{EngineEvent, HttpMethod, RequestConfig, SendJob, Submission};
