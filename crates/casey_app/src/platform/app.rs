use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context};
use casey_core::landing::{ContactForm, ContactMeta};
use casey_core::{
    update, Effect, ExportKind, FileSelection, InputSource, Msg, Step, TargetChoice, TestId,
    Toast, ToastId, ToastLevel, WizardState,
};
use casey_engine::{ContactClient, EngineHandle};
use chrono::{SecondsFormat, Utc};
use colored::Colorize;
use engine_logging::{engine_info, engine_warn, set_step_context};

use super::commands::{parse_command, Command, HELP};
use super::config::AppConfig;
use super::effects::{EffectRunner, LoopEvent, UiState};
use super::ui::render;

const TICK_INTERVAL: Duration = Duration::from_millis(400);
/// Slack on top of the request timeout before a scripted run gives up.
const SETTLE_GRACE: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Ids(Vec<TestId>),
}

/// Scripted generation flow: source → review → target → results.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub source: InputSource,
    /// Figma key, document path, requirements text or website URL.
    pub input: String,
    pub target: Option<String>,
    pub live: bool,
    pub selection: Selection,
    pub exports: Vec<ExportKind>,
}

#[derive(Debug, Clone)]
pub struct DirectPlan {
    pub file: PathBuf,
    pub target: String,
    pub live: bool,
    pub exports: Vec<ExportKind>,
}

#[derive(Debug, Clone)]
pub struct ContactRequest {
    pub form: ContactForm,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct Session {
    state: WizardState,
    ui: UiState,
    runner: EffectRunner,
    events: mpsc::Receiver<LoopEvent>,
    pending_exports: usize,
    settle_limit: Duration,
    last_progress: Option<String>,
}

impl Session {
    fn start(config: &AppConfig) -> anyhow::Result<(Self, mpsc::Sender<LoopEvent>)> {
        let engine =
            EngineHandle::new(config.engine_config()).context("failed to start the engine")?;
        let (loop_tx, events) = mpsc::channel();
        let runner = EffectRunner::new(engine, loop_tx.clone());
        engine_info!(
            "Session started against {} (output {:?})",
            config.api_base_url,
            config.output_dir
        );

        let session = Self {
            state: WizardState::with_features(config.features()),
            ui: UiState::default(),
            runner,
            events,
            pending_exports: 0,
            settle_limit: config.request_timeout() + SETTLE_GRACE,
            last_progress: None,
        };
        spawn_ticker(loop_tx.clone());
        Ok((session, loop_tx))
    }

    fn dispatch(&mut self, msg: Msg) -> Vec<(ToastId, Toast)> {
        let is_tick = matches!(msg, Msg::Tick);
        if matches!(msg, Msg::ExportFinished { .. }) {
            self.pending_exports = self.pending_exports.saturating_sub(1);
        }

        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        set_step_context(self.state.step().map(Step::number).unwrap_or(0));

        self.pending_exports += effects.iter().filter(|e| is_export(e)).count();
        let overlay_before = self.ui.overlay.message().map(str::to_owned);
        let raised = self.runner.run(effects, &mut self.ui, Instant::now());

        if self.state.consume_dirty() {
            let view = self.state.view();
            if is_tick {
                let line = render::progress_line(&view);
                if line.is_some() && line != self.last_progress {
                    if let Some(text) = &line {
                        println!("{}", text.dimmed());
                    }
                }
                self.last_progress = line;
            } else {
                self.last_progress = None;
                print_frame(&render::render(&view));
            }
        }
        for (id, toast) in &raised {
            print_toast(*id, toast);
        }
        if let Some(message) = self.ui.overlay.message() {
            if overlay_before.as_deref() != Some(message) {
                println!("{}", format!("... {message}").cyan());
            }
        }
        raised
    }

    fn tick(&mut self) {
        self.dispatch(Msg::Tick);
        self.ui.toasts.expire(Instant::now());
    }

    fn handle_line(&mut self, line: &str) -> Flow {
        let line = line.trim();
        if line.is_empty() {
            return Flow::Continue;
        }
        let command = match parse_command(line) {
            Ok(command) => command,
            Err(err) => {
                println!("{}", err.red());
                return Flow::Continue;
            }
        };

        let touches_wizard = matches!(
            command,
            Command::Dispatch(_) | Command::Document(_) | Command::Upload(_)
        );
        if touches_wizard {
            if let Some(message) = self.ui.overlay.message() {
                println!("Busy: {message}");
                return Flow::Continue;
            }
        }

        match command {
            Command::Dispatch(msgs) => {
                for msg in msgs {
                    self.dispatch(msg);
                }
            }
            Command::Document(path) => match file_selection(&path) {
                Ok(file) => {
                    self.dispatch(Msg::DocumentChosen(file));
                }
                Err(err) => println!("{}", format!("{err:#}").red()),
            },
            Command::Upload(path) => match file_selection(&path) {
                Ok(file) => {
                    self.dispatch(Msg::UploadChosen(file));
                }
                Err(err) => println!("{}", format!("{err:#}").red()),
            },
            Command::Dismiss(id) => {
                if !self.ui.toasts.dismiss(id) {
                    println!("Notification #{id} is already gone.");
                }
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Dispatches one scripted message and stops on any warning or error.
    fn step(&mut self, msg: Msg) -> anyhow::Result<()> {
        let raised = self.dispatch(msg);
        fail_on(&raised)
    }

    /// Waits until no request or export is outstanding.
    fn settle(&mut self) -> anyhow::Result<()> {
        let deadline = Instant::now() + self.settle_limit;
        while self.state.is_busy() || self.pending_exports > 0 {
            let remaining = deadline
                .checked_duration_since(Instant::now())
                .ok_or_else(|| anyhow!("timed out waiting for the backend"))?;
            match self.events.recv_timeout(remaining) {
                Ok(LoopEvent::Msg(msg)) => {
                    let raised = self.dispatch(msg);
                    fail_on(&raised)?;
                }
                Ok(LoopEvent::Tick) => self.tick(),
                Ok(LoopEvent::Line(_) | LoopEvent::InputClosed) => {}
                Err(RecvTimeoutError::Timeout) => bail!("timed out waiting for the backend"),
                Err(RecvTimeoutError::Disconnected) => bail!("engine event channel closed"),
            }
        }
        Ok(())
    }

    fn expect_step(&self, step: Step) -> anyhow::Result<()> {
        match self.state.step() {
            Some(current) if current == step => Ok(()),
            other => bail!(
                "wizard is at {:?}, expected step {} ({})",
                other.map(Step::title),
                step.number(),
                step.title()
            ),
        }
    }

    fn export_all(&mut self, exports: &[ExportKind]) -> anyhow::Result<()> {
        for kind in exports {
            let msg = match kind {
                ExportKind::TestCases => Msg::ExportTests,
                ExportKind::TestResults => Msg::ExportResults,
                ExportKind::Report => Msg::ExportReport,
            };
            self.step(msg)?;
            self.settle()
                .with_context(|| format!("{} export failed", kind.label()))?;
        }
        Ok(())
    }
}

fn is_export(effect: &Effect) -> bool {
    matches!(
        effect,
        Effect::DownloadTests { .. } | Effect::DownloadResults { .. } | Effect::SaveReport { .. }
    )
}

fn fail_on(raised: &[(ToastId, Toast)]) -> anyhow::Result<()> {
    match raised
        .iter()
        .find(|(_, t)| matches!(t.level, ToastLevel::Warning | ToastLevel::Error))
    {
        Some((_, toast)) => bail!("{}", toast.message),
        None => Ok(()),
    }
}

fn print_frame(lines: &[String]) {
    println!();
    for line in lines {
        println!("{line}");
    }
}

fn print_toast(id: ToastId, toast: &Toast) {
    let tag = format!("[{}]", toast.level.title());
    let tag = match toast.level {
        ToastLevel::Success => tag.green(),
        ToastLevel::Error => tag.red(),
        ToastLevel::Warning => tag.yellow(),
        ToastLevel::Info => tag.cyan(),
    };
    println!("{tag} {} {}", toast.message, format!("#{id}").dimmed());
}

fn spawn_ticker(loop_tx: mpsc::Sender<LoopEvent>) {
    thread::spawn(move || {
        while loop_tx.send(LoopEvent::Tick).is_ok() {
            thread::sleep(TICK_INTERVAL);
        }
    });
}

fn spawn_stdin_reader(loop_tx: mpsc::Sender<LoopEvent>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if loop_tx.send(LoopEvent::Line(line)).is_err() {
                        return;
                    }
                }
                Err(err) => {
                    engine_warn!("stdin read failed: {}", err);
                    break;
                }
            }
        }
        let _ = loop_tx.send(LoopEvent::InputClosed);
    });
}

/// Collects the metadata the wizard validates uploads against.
pub fn file_selection(path: &Path) -> anyhow::Result<FileSelection> {
    let metadata =
        fs::metadata(path).with_context(|| format!("cannot read {}", path.display()))?;
    if !metadata.is_file() {
        bail!("{} is not a file", path.display());
    }
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))?;
    Ok(FileSelection {
        path: path.to_path_buf(),
        file_name,
        size_bytes: metadata.len(),
    })
}

pub fn run_wizard(config: &AppConfig) -> anyhow::Result<()> {
    let (mut session, loop_tx) = Session::start(config)?;
    spawn_stdin_reader(loop_tx);

    print_frame(&render::render(&session.state.view()));
    println!("Type 'help' for commands.");

    while let Ok(event) = session.events.recv() {
        match event {
            LoopEvent::Line(line) => {
                if session.handle_line(&line) == Flow::Quit {
                    break;
                }
            }
            LoopEvent::Msg(msg) => {
                session.dispatch(msg);
            }
            LoopEvent::Tick => session.tick(),
            LoopEvent::InputClosed => break,
        }
    }
    engine_info!("Wizard session ended");
    Ok(())
}

pub fn run_generation(config: &AppConfig, plan: RunPlan) -> anyhow::Result<()> {
    let (mut session, _loop_tx) = Session::start(config)?;

    session.step(Msg::ChooseGeneration)?;
    session.step(Msg::SourceSelected(plan.source))?;
    let input = match plan.source {
        InputSource::Figma => Msg::FigmaKeyChanged(plan.input),
        InputSource::Manual => Msg::ManualPromptChanged(plan.input),
        InputSource::Website => Msg::SourceUrlChanged(plan.input),
        InputSource::Document => Msg::DocumentChosen(file_selection(Path::new(&plan.input))?),
    };
    session.step(input)?;
    session.step(Msg::Next)?;
    session.settle().context("test generation failed")?;
    session.expect_step(Step::ReviewTests)?;

    match plan.selection {
        Selection::All => session.step(Msg::SelectAll)?,
        Selection::Ids(ids) => {
            session.step(Msg::ClearSelection)?;
            for id in ids {
                if !session.state.generated().iter().any(|t| t.id == id) {
                    bail!("no generated test has id {id}");
                }
                session.step(Msg::ToggleTest(id))?;
            }
        }
    }
    session.step(Msg::Next)?;
    session.expect_step(Step::ConfigureTarget)?;

    if let Some(url) = plan.target {
        session.step(Msg::TargetChoiceChanged(TargetChoice::DifferentUrl))?;
        session.step(Msg::TargetUrlChanged(url))?;
    }
    execute_and_export(&mut session, plan.live, &plan.exports)
}

pub fn run_direct(config: &AppConfig, plan: DirectPlan) -> anyhow::Result<()> {
    let (mut session, _loop_tx) = Session::start(config)?;

    session.step(Msg::ChooseDirectTesting)?;
    session.step(Msg::UploadChosen(file_selection(&plan.file)?))?;
    session.settle().context("parsing the test-case file failed")?;
    if session.state.selected().is_empty() {
        bail!("{} produced no test cases", plan.file.display());
    }
    session.step(Msg::TargetUrlChanged(plan.target))?;
    execute_and_export(&mut session, plan.live, &plan.exports)
}

fn execute_and_export(session: &mut Session, live: bool, exports: &[ExportKind]) -> anyhow::Result<()> {
    if live {
        session.step(Msg::LiveTestingToggled(true))?;
    }
    session.step(Msg::Next)?;
    session.settle().context("test execution failed")?;
    session.expect_step(Step::Results)?;
    session.export_all(exports)
}

pub fn submit_contact(config: &AppConfig, request: ContactRequest) -> anyhow::Result<()> {
    let endpoint = request
        .endpoint
        .or_else(|| config.contact_endpoint.clone())
        .context("no contact endpoint; pass --endpoint or set contact_endpoint in the config")?;
    let client = ContactClient::new(&endpoint, config.request_timeout())
        .with_context(|| format!("invalid contact endpoint {endpoint}"))?;
    let meta = ContactMeta {
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        user_agent: format!("casey/{}", env!("CARGO_PKG_VERSION")),
        referrer: None,
    };
    client
        .submit_blocking(request.form, meta)
        .context("contact submission failed")?;
    println!(
        "{}",
        "Thank you! Your message has been sent successfully. We'll get back to you within 24 hours."
            .green()
    );
    Ok(())
}
