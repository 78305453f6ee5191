use std::io;
use std::sync::{mpsc, Arc};
use std::thread;

use relay_logging::relay_debug;

use crate::{EngineEvent, RelayPipeline, SendJob};

/// Receives engine events; implementations must not block.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

enum EngineCommand {
    Send(SendJob),
}

/// Runs sends on a dedicated tokio runtime thread. Each send is its own task;
/// overlapping sends share nothing.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(pipeline: RelayPipeline, sink: Arc<dyn EventSink>) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let pipeline = Arc::new(pipeline);
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("relay-engine")
            .build()?;

        thread::Builder::new()
            .name("relay-dispatch".into())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let pipeline = pipeline.clone();
                    let sink = sink.clone();
                    runtime.spawn(async move {
                        handle_command(pipeline.as_ref(), command, sink.as_ref()).await;
                    });
                }
                relay_debug!("engine command channel closed");
            })?;

        Ok(Self { cmd_tx })
    }

    pub fn send(&self, job: SendJob) {
        let _ = self.cmd_tx.send(EngineCommand::Send(job));
    }
}

async fn handle_command(pipeline: &RelayPipeline, command: EngineCommand, sink: &dyn EventSink) {
    match command {
        EngineCommand::Send(job) => {
            let request_id = job.request_id;
            let result = pipeline.run(job).await;
            sink.emit(EngineEvent::SendCompleted { request_id, result });
        }
    }
}
