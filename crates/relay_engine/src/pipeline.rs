use std::sync::Arc;

use chrono::{DateTime, Utc};
use relay_core::{
    build_prompt, extract, matched_shape, RelayConfig, RelayError, SourceInfo, TemplateKey,
};
use relay_logging::{relay_debug, relay_info, relay_warn};

use crate::backend::{backend_for, Backend};
use crate::request_log::{LoggedError, RequestLogEntry, RequestLogger};
use crate::templates::PromptLibrary;
use crate::{SendJob, Submission, Transport};

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Template lookup, prompt assembly, delivery, extraction and logging for one send.
pub struct RelayPipeline {
    backend: Arc<dyn Backend>,
    templates: Arc<PromptLibrary>,
    source: SourceInfo,
    logger: Option<Arc<RequestLogger>>,
    clock: Clock,
}

impl RelayPipeline {
    pub fn new(
        backend: Arc<dyn Backend>,
        templates: Arc<PromptLibrary>,
        source: SourceInfo,
    ) -> Self {
        Self {
            backend,
            templates,
            source,
            logger: None,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn from_config(config: &RelayConfig, transport: Arc<dyn Transport>) -> Self {
        let templates = Arc::new(PromptLibrary::new(config.prompts_dir.clone()));
        let pipeline = Self::new(backend_for(config, transport), templates, config.source());
        match &config.log_dir {
            Some(dir) => pipeline.with_logger(RequestLogger::new(dir.clone())),
            None => pipeline,
        }
    }

    pub fn with_logger(mut self, logger: RequestLogger) -> Self {
        self.logger = Some(Arc::new(logger));
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub async fn run(&self, job: SendJob) -> Result<String, RelayError> {
        let template = match job.template {
            Some(key) => Some(self.load_template(key).await),
            None => None,
        };
        let prompt = build_prompt(
            &job.selection,
            template.as_deref(),
            job.page.as_ref(),
            &self.source,
        );
        let submission = Submission {
            request_id: job.request_id,
            selection: job.selection,
            page: job.page,
            prompt,
            source: self.source.clone(),
            created_at: (self.clock)().to_rfc3339(),
        };

        relay_info!(
            "request {} -> {} backend ({} chars)",
            submission.request_id,
            self.backend.kind().as_str(),
            submission.prompt.len()
        );
        let result = self.backend.deliver(&submission).await.map(|raw| {
            relay_debug!(
                "request {} reply shape: {}",
                submission.request_id,
                matched_shape(&raw).unwrap_or("none")
            );
            extract(&raw)
        });
        if let Err(err) = &result {
            relay_warn!("request {} failed: {}", submission.request_id, err);
        }

        self.record(&submission, &result).await;
        result
    }

    // Template files are read on the blocking pool.
    async fn load_template(&self, key: TemplateKey) -> String {
        let templates = Arc::clone(&self.templates);
        match tokio::task::spawn_blocking(move || templates.get(key)).await {
            Ok(template) => template,
            Err(err) => {
                relay_warn!("Prompt template {:?} load task failed: {}", key, err);
                String::new()
            }
        }
    }

    // Log-writing failures only reach the diagnostic log.
    async fn record(&self, submission: &Submission, result: &Result<String, RelayError>) {
        let Some(logger) = &self.logger else {
            return;
        };
        let at = (self.clock)();
        let entry = RequestLogEntry {
            timestamp: at.to_rfc3339(),
            request_id: submission.request_id,
            backend: self.backend.kind(),
            selection: submission.selection.as_str().to_string(),
            prompt: submission.prompt.clone(),
            reply: result.as_ref().ok().cloned(),
            error: result.as_ref().err().map(LoggedError::from),
        };
        let writer = Arc::clone(logger);
        let written = tokio::task::spawn_blocking(move || writer.write(at, &entry)).await;
        match written {
            Ok(Ok(path)) => relay_debug!("request {} logged to {:?}", submission.request_id, path),
            Ok(Err(err)) => relay_warn!(
                "Failed to write request log for {} into {:?}: {}",
                submission.request_id,
                logger.dir(),
                err
            ),
            Err(err) => relay_warn!(
                "Request log task for {} failed: {}",
                submission.request_id,
                err
            ),
        }
    }
}
