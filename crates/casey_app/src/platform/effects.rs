use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use casey_core::{Effect, LoadingOverlay, Msg, Toast, ToastId, ToastQueue};
use casey_engine::{ApiError, EngineEvent, EngineHandle};
use engine_logging::{engine_info, engine_warn};

/// Everything the app loop reacts to, serialised through one channel.
#[derive(Debug)]
pub enum LoopEvent {
    Msg(Msg),
    Line(String),
    InputClosed,
    Tick,
}

/// Presentation state owned by the shell rather than the wizard.
#[derive(Debug, Default)]
pub struct UiState {
    pub toasts: ToastQueue,
    pub overlay: LoadingOverlay,
}

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, loop_tx: mpsc::Sender<LoopEvent>) -> Self {
        let runner = Self { engine };
        runner.spawn_event_loop(loop_tx);
        runner
    }

    /// Applies UI effects directly and forwards the rest to the engine.
    /// Returns the notifications raised by this batch.
    pub fn run(
        &self,
        effects: Vec<Effect>,
        ui: &mut UiState,
        now: Instant,
    ) -> Vec<(ToastId, Toast)> {
        let mut raised = Vec::new();
        for effect in effects {
            match effect {
                Effect::Notify(toast) => {
                    let id = ui.toasts.push(toast.clone(), now);
                    raised.push((id, toast));
                }
                Effect::ShowLoading { message } => ui.overlay.show(message),
                Effect::HideLoading => ui.overlay.hide(),
                Effect::Generate { token, request } => {
                    engine_info!("Generate {:?} test_type={}", token, request.test_type);
                    self.engine.generate(token, request);
                }
                Effect::Execute { token, request } => {
                    engine_info!(
                        "Execute {:?} tests={} live={}",
                        token,
                        request.test_cases.len(),
                        request.live_testing
                    );
                    self.engine.execute(token, request);
                }
                Effect::ParseUpload {
                    token,
                    path,
                    file_name,
                } => self.engine.parse_upload(token, path, file_name),
                Effect::CancelRequest { token } => self.engine.cancel(token),
                Effect::DownloadTests { test_cases } => self.engine.download_tests(test_cases),
                Effect::DownloadResults { results } => self.engine.download_results(results),
                Effect::SaveReport { draft } => self.engine.save_report(draft),
            }
        }
        raised
    }

    fn spawn_event_loop(&self, loop_tx: mpsc::Sender<LoopEvent>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            if let Some(event) = engine.try_recv() {
                if loop_tx.send(LoopEvent::Msg(map_event(event))).is_err() {
                    break;
                }
            } else {
                thread::sleep(Duration::from_millis(20));
            }
        });
    }
}

/// Empty when the backend gave no reason; the wizard then shows its own
/// generic message.
fn server_text(err: &ApiError) -> String {
    err.server_message().unwrap_or_default().to_string()
}

pub fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Generated { token, result } => Msg::GenerationFinished {
            token,
            result: result.map_err(|err| {
                engine_warn!("Generation {:?} failed: {}", token, err);
                server_text(&err)
            }),
        },
        EngineEvent::Executed { token, result } => Msg::ExecutionFinished {
            token,
            result: result.map_err(|err| {
                engine_warn!("Execution {:?} failed: {}", token, err);
                server_text(&err)
            }),
        },
        EngineEvent::Parsed { token, result } => Msg::UploadParsed {
            token,
            result: result.map_err(|err| {
                engine_warn!("Upload parse {:?} failed: {}", token, err);
                server_text(&err)
            }),
        },
        EngineEvent::Exported { kind, result } => Msg::ExportFinished {
            kind,
            result: result.map(|path| path.display().to_string()),
        },
    }
}
