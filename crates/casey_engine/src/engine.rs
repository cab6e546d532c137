use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use casey_core::{
    ExecutionRequest, ExportKind, GenerationRequest, ReportDraft, RequestToken, TestCase,
    TestResult,
};
use chrono::{DateTime, Utc};
use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use tokio_util::sync::CancellationToken;

use crate::client::{ApiSettings, PipelineApi, ReqwestApi};
use crate::export::{ExportError, Exporter};
use crate::{ApiError, EngineEvent};

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Clone)]
pub struct EngineConfig {
    pub api: ApiSettings,
    pub output_dir: PathBuf,
    /// Source of report timestamps; swapped out in tests.
    pub clock: Clock,
}

impl EngineConfig {
    pub fn default_with_output(output_dir: PathBuf) -> Self {
        Self {
            api: ApiSettings::default(),
            output_dir,
            clock: Arc::new(Utc::now),
        }
    }
}

enum EngineCommand {
    Generate {
        token: RequestToken,
        request: GenerationRequest,
    },
    Execute {
        token: RequestToken,
        request: ExecutionRequest,
    },
    ParseUpload {
        token: RequestToken,
        path: PathBuf,
        file_name: String,
    },
    Cancel {
        token: RequestToken,
    },
    DownloadTests {
        test_cases: Vec<TestCase>,
    },
    DownloadResults {
        results: Vec<TestResult>,
    },
    SaveReport {
        draft: ReportDraft,
    },
}

impl EngineCommand {
    fn request_token(&self) -> Option<RequestToken> {
        match self {
            EngineCommand::Generate { token, .. }
            | EngineCommand::Execute { token, .. }
            | EngineCommand::ParseUpload { token, .. } => Some(*token),
            _ => None,
        }
    }
}

/// In-flight requests that can still be cancelled.
type Inflight = Arc<Mutex<HashMap<RequestToken, CancellationToken>>>;

/// Handle to the background engine thread. Cloning shares the same thread;
/// the thread ends once every handle is dropped.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, ApiError> {
        let api = Arc::new(ReqwestApi::new(config.api)?);
        Ok(Self::with_api(
            api,
            Exporter::new(config.output_dir),
            config.clock,
        ))
    }

    /// Starts the engine around any [`PipelineApi`] implementation.
    pub fn with_api(api: Arc<dyn PipelineApi>, exporter: Exporter, clock: Clock) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    engine_error!("Engine runtime failed to start: {}", err);
                    return;
                }
            };
            let inflight: Inflight = Arc::new(Mutex::new(HashMap::new()));
            while let Ok(command) = cmd_rx.recv() {
                if let EngineCommand::Cancel { token } = command {
                    cancel(&inflight, token);
                    continue;
                }
                // Registered before the task starts so a cancel sent right
                // after the request always finds it.
                let cancel_token = command.request_token().map(|token| {
                    let cancel_token = CancellationToken::new();
                    if let Ok(mut map) = inflight.lock() {
                        map.insert(token, cancel_token.clone());
                    }
                    cancel_token
                });
                let worker = Worker {
                    api: api.clone(),
                    exporter: exporter.clone(),
                    clock: clock.clone(),
                    inflight: inflight.clone(),
                    cancel: cancel_token.unwrap_or_default(),
                    event_tx: event_tx.clone(),
                };
                runtime.spawn(async move {
                    worker.handle(command).await;
                });
            }
            engine_debug!("Engine command channel closed; shutting down");
        });

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    pub fn generate(&self, token: RequestToken, request: GenerationRequest) {
        self.send(EngineCommand::Generate { token, request });
    }

    pub fn execute(&self, token: RequestToken, request: ExecutionRequest) {
        self.send(EngineCommand::Execute { token, request });
    }

    pub fn parse_upload(&self, token: RequestToken, path: PathBuf, file_name: String) {
        self.send(EngineCommand::ParseUpload {
            token,
            path,
            file_name,
        });
    }

    /// Aborts the request if it is still running. Its reply is never sent.
    pub fn cancel(&self, token: RequestToken) {
        self.send(EngineCommand::Cancel { token });
    }

    pub fn download_tests(&self, test_cases: Vec<TestCase>) {
        self.send(EngineCommand::DownloadTests { test_cases });
    }

    pub fn download_results(&self, results: Vec<TestResult>) {
        self.send(EngineCommand::DownloadResults { results });
    }

    pub fn save_report(&self, draft: ReportDraft) {
        self.send(EngineCommand::SaveReport { draft });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            engine_warn!("Engine thread is gone; command dropped");
        }
    }
}

fn cancel(inflight: &Inflight, token: RequestToken) {
    let cancelled = inflight
        .lock()
        .ok()
        .and_then(|mut map| map.remove(&token));
    match cancelled {
        Some(cancel) => {
            engine_info!("Cancelling request {:?}", token);
            cancel.cancel();
        }
        None => engine_debug!("Cancel for {:?} arrived after it finished", token),
    }
}

struct Worker {
    api: Arc<dyn PipelineApi>,
    exporter: Exporter,
    clock: Clock,
    inflight: Inflight,
    cancel: CancellationToken,
    event_tx: mpsc::Sender<EngineEvent>,
}

impl Worker {
    async fn handle(self, command: EngineCommand) {
        match command {
            EngineCommand::Generate { token, request } => {
                let api = self.api.clone();
                let result = self
                    .cancellable(token, async move { api.generate(&request).await })
                    .await;
                if let Some(result) = result {
                    self.emit(EngineEvent::Generated { token, result });
                }
            }
            EngineCommand::Execute { token, request } => {
                let api = self.api.clone();
                let result = self
                    .cancellable(token, async move { api.run(&request).await })
                    .await;
                if let Some(result) = result {
                    self.emit(EngineEvent::Executed { token, result });
                }
            }
            EngineCommand::ParseUpload {
                token,
                path,
                file_name,
            } => {
                let api = self.api.clone();
                let result = self
                    .cancellable(token, async move { api.parse_file(&path, &file_name).await })
                    .await;
                if let Some(result) = result {
                    self.emit(EngineEvent::Parsed { token, result });
                }
            }
            EngineCommand::DownloadTests { test_cases } => {
                let result = match self.api.download_tests(&test_cases).await {
                    Ok(document) => {
                        self.save(move |exporter| exporter.save_test_cases(&document)).await
                    }
                    Err(err) => Err(err.into()),
                };
                self.emit_export(ExportKind::TestCases, result);
            }
            EngineCommand::DownloadResults { results } => {
                let result = match self.api.download_results(&results).await {
                    Ok(document) => {
                        self.save(move |exporter| exporter.save_test_results(&document)).await
                    }
                    Err(err) => Err(err.into()),
                };
                self.emit_export(ExportKind::TestResults, result);
            }
            EngineCommand::SaveReport { draft } => {
                let now = (self.clock)();
                let result = self
                    .save(move |exporter| exporter.save_report(draft, now))
                    .await;
                self.emit_export(ExportKind::Report, result);
            }
            EngineCommand::Cancel { token } => cancel(&self.inflight, token),
        }
    }

    /// Runs `work` until it finishes or its token is cancelled. Returns
    /// `None` when cancelled.
    async fn cancellable<T>(
        &self,
        token: RequestToken,
        work: impl std::future::Future<Output = Result<T, ApiError>>,
    ) -> Option<Result<T, ApiError>> {
        let outcome = tokio::select! {
            _ = self.cancel.cancelled() => None,
            result = work => Some(result),
        };

        if let Ok(mut map) = self.inflight.lock() {
            map.remove(&token);
        }
        match &outcome {
            None => engine_info!("Request {:?} cancelled", token),
            Some(Err(err)) => engine_warn!("Request {:?} failed: {}", token, err),
            Some(Ok(_)) => engine_debug!("Request {:?} completed", token),
        }
        outcome
    }

    /// File writes fsync and rename, so they run on the blocking pool.
    async fn save<F>(&self, write: F) -> Result<PathBuf, ExportError>
    where
        F: FnOnce(&Exporter) -> Result<PathBuf, ExportError> + Send + 'static,
    {
        let exporter = self.exporter.clone();
        tokio::task::spawn_blocking(move || write(&exporter)).await?
    }

    fn emit_export(&self, kind: ExportKind, result: Result<PathBuf, ExportError>) {
        let result = result.map_err(|err| match err {
            ExportError::Api(api) => api
                .server_message()
                .map_or_else(|| api.kind.to_string(), str::to_owned),
            other => other.to_string(),
        });
        if let Err(err) = &result {
            engine_warn!("{} export failed: {}", kind.label(), err);
        }
        self.emit(EngineEvent::Exported { kind, result });
    }

    fn emit(&self, event: EngineEvent) {
        let _ = self.event_tx.send(event);
    }
}
