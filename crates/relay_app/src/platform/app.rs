use std::io::{self, Write};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use relay_core::{
    update, AppState, BackendKind, Msg, PageMetadata, Presentation, RelayConfig, TemplateKey,
};
use relay_engine::{
    EngineEvent, EngineHandle, EventSink, ReqwestTransport, RelayPipeline, TransportSettings,
};
use relay_logging::{relay_debug, relay_error, relay_info, relay_warn};

use super::effects::{EffectRunner, Presenter};
use super::native_messaging::{decode_event, read_frame};
use super::render::{HostPresenter, TerminalPresenter};

const TICK_INTERVAL: Duration = Duration::from_millis(250);
const WAIT_MARGIN: Duration = Duration::from_secs(5);

enum Inbound {
    Msg(Msg),
    HostClosed,
}

struct InboundSink {
    tx: mpsc::Sender<Inbound>,
}

impl EventSink for InboundSink {
    fn emit(&self, event: EngineEvent) {
        match event {
            EngineEvent::SendCompleted { request_id, result } => {
                if let Err(err) = &result {
                    relay_warn!("Request {} failed: {}", request_id, err);
                }
                let _ = self
                    .tx
                    .send(Inbound::Msg(Msg::SendFinished { request_id, result }));
            }
        }
    }
}

fn start_engine(config: &RelayConfig, tx: mpsc::Sender<Inbound>) -> anyhow::Result<EngineHandle> {
    let transport = ReqwestTransport::new(TransportSettings::default())
        .context("failed to build HTTP client")?;
    let pipeline = RelayPipeline::from_config(config, Arc::new(transport));
    EngineHandle::new(pipeline, Arc::new(InboundSink { tx })).context("failed to start engine")
}

fn dispatch<P: Presenter>(state: AppState, msg: Msg, runner: &mut EffectRunner<P>) -> AppState {
    let (mut state, effects) = update(state, msg);
    runner.enqueue(effects);
    if state.consume_dirty() {
        let view = state.view();
        relay_debug!(
            "in_flight={} presentations={}",
            view.in_flight,
            view.presentations.len()
        );
    }
    state
}

/// Serve the browser over native messaging until stdin closes.
pub(crate) fn run_host(config: RelayConfig) -> anyhow::Result<()> {
    let (tx, rx) = mpsc::channel::<Inbound>();
    let engine = start_engine(&config, tx.clone())?;
    let mut runner = EffectRunner::new(engine, HostPresenter::new(io::stdout()));

    spawn_stdin_reader(tx.clone())?;
    spawn_ticker(tx)?;

    relay_info!("Host ready (backend={})", config.backend.as_str());
    let mut state = AppState::new(config);
    while let Ok(inbound) = rx.recv() {
        match inbound {
            Inbound::Msg(msg) => state = dispatch(state, msg, &mut runner),
            Inbound::HostClosed => break,
        }
    }

    let abandoned = state.view().in_flight;
    if abandoned > 0 {
        relay_warn!("Host closed with {} request(s) in flight", abandoned);
    }
    relay_info!("Host stopped");
    Ok(())
}

fn spawn_stdin_reader(tx: mpsc::Sender<Inbound>) -> io::Result<()> {
    thread::Builder::new()
        .name("relay-stdin".into())
        .spawn(move || {
            let mut reader = io::stdin().lock();
            loop {
                match read_frame(&mut reader) {
                    Ok(Some(payload)) => match decode_event(&payload) {
                        Ok(event) => {
                            if tx.send(Inbound::Msg(event.into_msg())).is_err() {
                                return;
                            }
                        }
                        Err(err) => relay_warn!("Ignoring malformed host message: {}", err),
                    },
                    Ok(None) => break,
                    Err(err) => {
                        relay_error!("Host input failed: {}", err);
                        break;
                    }
                }
            }
            let _ = tx.send(Inbound::HostClosed);
        })?;
    Ok(())
}

fn spawn_ticker(tx: mpsc::Sender<Inbound>) -> io::Result<()> {
    thread::Builder::new()
        .name("relay-tick".into())
        .spawn(move || {
            let mut last = Instant::now();
            loop {
                thread::sleep(TICK_INTERVAL);
                let now = Instant::now();
                let elapsed = now.duration_since(last);
                last = now;
                if tx.send(Inbound::Msg(Msg::Tick { elapsed })).is_err() {
                    break;
                }
            }
        })?;
    Ok(())
}

/// A single selection sent from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SendRequest {
    pub text: String,
    pub page_url: Option<String>,
    pub page_title: Option<String>,
    pub template: Option<TemplateKey>,
}

/// Upper bound on how long one send can take given the configured limits.
fn send_budget(config: &RelayConfig) -> Duration {
    match config.backend {
        BackendKind::Assistant => {
            let interval_ms = config.poll_interval_ms.max(1);
            let reads = u32::try_from(config.poll_deadline_ms / interval_ms)
                .unwrap_or(u32::MAX)
                .saturating_add(1);
            config
                .timeout()
                .saturating_mul(reads.saturating_add(4))
                .saturating_add(config.poll_deadline())
                .saturating_add(WAIT_MARGIN)
        }
        BackendKind::Proxy | BackendKind::LocalModel => {
            config.timeout().saturating_add(WAIT_MARGIN)
        }
    }
}

/// Send one selection and print the resulting presentation to `out`.
///
/// Returns the final presentation, or `None` when nothing was shown.
pub(crate) fn run_send<W: Write>(
    config: RelayConfig,
    request: SendRequest,
    out: W,
) -> anyhow::Result<Option<Presentation>> {
    let budget = send_budget(&config);
    let (tx, rx) = mpsc::channel::<Inbound>();
    let engine = start_engine(&config, tx)?;
    let mut runner = EffectRunner::new(engine, TerminalPresenter::new(out));

    let page = PageMetadata::from_tab(request.page_url, request.page_title);
    let trigger = Msg::SelectionTriggered {
        selection_text: request.text,
        page: (!page.is_empty()).then_some(page),
        template: request.template,
    };
    let mut state = dispatch(AppState::new(config), trigger, &mut runner);

    let started = Instant::now();
    while state.view().in_flight > 0 {
        let remaining = budget.saturating_sub(started.elapsed());
        match rx.recv_timeout(remaining) {
            Ok(Inbound::Msg(msg)) => state = dispatch(state, msg, &mut runner),
            Ok(Inbound::HostClosed) => break,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                anyhow::bail!("no result within {} ms", budget.as_millis())
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                anyhow::bail!("engine stopped before the request finished")
            }
        }
    }

    Ok(runner.presenter().last().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::RelayError;

    fn request(text: &str) -> SendRequest {
        SendRequest {
            text: text.to_string(),
            page_url: None,
            page_title: None,
            template: None,
        }
    }

    #[test]
    fn unconfigured_send_reports_without_network() {
        let mut out = Vec::new();
        let shown = run_send(RelayConfig::default(), request("hello"), &mut out)
            .unwrap()
            .unwrap();
        assert!(shown.is_error);
        assert_eq!(
            shown.title,
            RelayError::configuration("x").title()
        );
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.starts_with("Backend not configured\n"));
    }

    #[test]
    fn blank_selection_is_rejected() {
        let config = RelayConfig {
            base_url: "http://127.0.0.1:9/ingest".into(),
            ..RelayConfig::default()
        };
        let shown = run_send(config, request("   "), Vec::new()).unwrap().unwrap();
        assert!(shown.is_error);
        assert_eq!(shown.title, "Nothing to send");
    }

    #[test]
    fn assistant_budget_covers_polling() {
        let config = RelayConfig {
            backend: BackendKind::Assistant,
            timeout_ms: 1_000,
            poll_interval_ms: 1_000,
            poll_deadline_ms: 10_000,
            ..RelayConfig::default()
        };
        assert_eq!(send_budget(&config), Duration::from_secs(15 + 10 + 5));
        assert_eq!(
            send_budget(&RelayConfig::default()),
            Duration::from_millis(15_000) + WAIT_MARGIN
        );
    }

    #[test]
    fn budget_saturates_on_huge_limits() {
        let config = RelayConfig {
            backend: BackendKind::Assistant,
            timeout_ms: u64::MAX,
            poll_interval_ms: 1,
            poll_deadline_ms: u64::MAX,
            ..RelayConfig::default()
        };
        assert_eq!(send_budget(&config), Duration::MAX);
        let proxy = RelayConfig {
            timeout_ms: u64::MAX,
            ..RelayConfig::default()
        };
        assert!(send_budget(&proxy) >= Duration::from_millis(u64::MAX));
    }
}
