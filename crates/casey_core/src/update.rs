use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};

use crate::demo::demo_tests;
use crate::msg::{ExecutionReply, GenerationReply};
use crate::validate::{check_upload, validate_source};
use crate::{
    Effect, EntryPath, ExecutionRequest, ExportKind, FileSelection, GenerationRequest, Msg,
    RequestToken, SourceInput, Step, TargetChoice, TestCase, Toast, WizardState,
};

/// Per-tick increment of the generation progress indicator.
pub const PROGRESS_STEP: u8 = 8;
/// The indicator never passes this value until the reply arrives.
pub const PROGRESS_CAP: u8 = 90;

const GENERATION_FAILED: &str = "Failed to generate test cases. Please try again.";
const EXECUTION_FAILED: &str = "Failed to execute test cases. Please try again.";
const UPLOAD_FAILED: &str = "Failed to parse test cases from the uploaded file.";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: WizardState, msg: Msg) -> (WizardState, Vec<Effect>) {
    let effects = match msg {
        Msg::ChooseGeneration => choose_entry(&mut state, EntryPath::Generation),
        Msg::ChooseDirectTesting => choose_entry(&mut state, EntryPath::DirectTesting),
        Msg::SourceSelected(source) => {
            state.set_source(source);
            Vec::new()
        }
        Msg::FigmaKeyChanged(raw) => {
            state.fields_mut().figma_key = raw;
            Vec::new()
        }
        Msg::ManualPromptChanged(raw) => {
            state.fields_mut().manual_prompt = raw;
            Vec::new()
        }
        Msg::SourceUrlChanged(raw) => {
            state.fields_mut().website_url = raw;
            Vec::new()
        }
        Msg::DocumentChosen(file) => match check_upload(&file) {
            Ok(()) => {
                let message = format!("Selected {}.", file.file_name);
                state.set_document(file);
                vec![Effect::Notify(Toast::success(message))]
            }
            Err(rejection) => vec![Effect::Notify(Toast::error(rejection.message()))],
        },
        Msg::Next => advance_from_current(&mut state),
        Msg::GoToStep(n) => go_to_step(&mut state, n),
        Msg::GoBackToStep(n) => go_back_to_step(&mut state, n),
        Msg::ToggleTest(id) => {
            if !state.toggle_selected(id) {
                engine_debug!("ToggleTest ignored: no generated test with id {}", id);
            }
            Vec::new()
        }
        Msg::SelectAll => {
            state.select_all();
            Vec::new()
        }
        Msg::ClearSelection => {
            state.clear_selection();
            Vec::new()
        }
        Msg::TargetChoiceChanged(choice) => {
            state.set_target_choice(choice);
            Vec::new()
        }
        Msg::TargetUrlChanged(raw) => {
            state.set_target_url_input(raw);
            Vec::new()
        }
        Msg::LiveTestingToggled(enabled) => {
            state.set_live_testing(enabled);
            Vec::new()
        }
        Msg::UploadChosen(file) => choose_upload(&mut state, file),
        Msg::ExportTests => {
            let tests = state.exportable_tests();
            if tests.is_empty() {
                vec![Effect::Notify(Toast::warning("No test cases to download."))]
            } else {
                vec![Effect::DownloadTests {
                    test_cases: tests.to_vec(),
                }]
            }
        }
        Msg::ExportResults => {
            if state.results().is_empty() {
                vec![Effect::Notify(Toast::warning("No results to download."))]
            } else {
                vec![Effect::DownloadResults {
                    results: state.results().to_vec(),
                }]
            }
        }
        Msg::ExportReport => {
            if state.results().is_empty() {
                vec![Effect::Notify(Toast::warning("No results to download."))]
            } else {
                vec![Effect::SaveReport {
                    draft: state.report_draft(),
                }]
            }
        }
        Msg::ExportFinished { kind, result } => vec![export_finished(kind, result)],
        Msg::Tick => {
            if state.pending().generation.is_some() {
                let progress = state.generation_progress().unwrap_or(0);
                let next = progress.saturating_add(PROGRESS_STEP).min(PROGRESS_CAP);
                state.set_generation_progress(Some(next));
            }
            Vec::new()
        }
        Msg::GenerationFinished { token, result } => finish_generation(&mut state, token, result),
        Msg::ExecutionFinished { token, result } => finish_execution(&mut state, token, result),
        Msg::UploadParsed { token, result } => finish_upload(&mut state, token, result),
    };

    (state, effects)
}

fn warn(message: &str) -> Vec<Effect> {
    vec![Effect::Notify(Toast::warning(message))]
}

fn choose_entry(state: &mut WizardState, entry: EntryPath) -> Vec<Effect> {
    // The fork happens once per session.
    if state.entry().is_some() {
        engine_debug!("Entry path already chosen; ignoring {:?}", entry);
        return Vec::new();
    }
    engine_info!("Wizard started on {:?} path", entry);
    state.enter(entry);
    Vec::new()
}

fn advance_from_current(state: &mut WizardState) -> Vec<Effect> {
    match state.step() {
        None => warn("Choose how you want to start first."),
        Some(Step::ChooseInput) => start_generation(state),
        Some(Step::ReviewTests) => proceed_to_target(state),
        Some(Step::ConfigureTarget) => start_execution(state),
        Some(Step::Results) => Vec::new(),
    }
}

fn go_to_step(state: &mut WizardState, n: u8) -> Vec<Effect> {
    let Some(target) = Step::from_number(n) else {
        engine_debug!("GoToStep({}) out of range", n);
        return Vec::new();
    };
    let (Some(current), Some(furthest)) = (state.step(), state.furthest_step()) else {
        return warn("Choose how you want to start first.");
    };
    if target < state.first_step() {
        return warn("This step is not part of direct testing.");
    }
    if target <= current {
        return navigate_to(state, target);
    }
    if target <= furthest {
        // Forward re-entry shows earlier output, but only while the data
        // that produced it still passes every guard on the way.
        if let Err(warning) = check_reentry(state, target) {
            return warn(warning);
        }
        return navigate_to(state, target);
    }
    if target.number() == current.number() + 1 {
        return advance_from_current(state);
    }
    warn("Please complete the current step first.")
}

fn check_reentry(state: &WizardState, target: Step) -> Result<(), &'static str> {
    if target >= Step::ConfigureTarget && state.selected().is_empty() {
        return Err(if state.is_direct_testing_mode() {
            "Please upload a test case file first."
        } else {
            "Please select at least one test case."
        });
    }
    if target == Step::Results {
        state.resolve_target()?;
    }
    Ok(())
}

fn go_back_to_step(state: &mut WizardState, n: u8) -> Vec<Effect> {
    let (Some(target), Some(current)) = (Step::from_number(n), state.step()) else {
        return Vec::new();
    };
    if target > current {
        engine_debug!("GoBackToStep({}) is ahead of step {}", n, current.number());
        return Vec::new();
    }
    if target < state.first_step() {
        return warn("This step is not part of direct testing.");
    }
    navigate_to(state, target)
}

/// Shows an already reached step. Leaving the step that issued a request
/// abandons that request.
fn navigate_to(state: &mut WizardState, target: Step) -> Vec<Effect> {
    let mut effects = Vec::new();
    if target != Step::ChooseInput {
        if let Some((token, _)) = state.pending_mut().generation.take() {
            engine_info!("Leaving step 1; cancelling generation {:?}", token);
            state.set_generation_progress(None);
            effects.push(Effect::CancelRequest { token });
        }
    }
    if target != Step::ConfigureTarget {
        if let Some(token) = state.pending_mut().execution.take() {
            engine_info!("Leaving step 3; cancelling execution {:?}", token);
            effects.push(Effect::CancelRequest { token });
        }
        if let Some((token, _)) = state.pending_mut().upload.take() {
            effects.push(Effect::CancelRequest { token });
        }
    }
    if !effects.is_empty() {
        state.mark_dirty();
        effects.push(Effect::HideLoading);
    }
    state.show_step(target);
    effects
}

fn start_generation(state: &mut WizardState) -> Vec<Effect> {
    let input = match validate_source(state.source(), state.fields()) {
        Ok(input) => input,
        Err(warning) => return warn(warning),
    };

    let mut effects = Vec::with_capacity(3);
    if let Some((previous, _)) = state.pending_mut().generation.take() {
        engine_info!("Superseding generation {:?}", previous);
        effects.push(Effect::CancelRequest { token: previous });
    }

    if let SourceInput::Website { website_url } = &input {
        state.set_source_url(website_url.clone());
    }

    let token = state.issue_token();
    let source = input.source();
    state.pending_mut().generation = Some((token, source));
    state.set_generation_progress(Some(0));
    state.mark_dirty();
    engine_info!("Generating tests from {} as {:?}", source, token);

    effects.push(Effect::ShowLoading {
        message: "Analyzing input and generating test cases...".to_string(),
    });
    effects.push(Effect::Generate {
        token,
        request: GenerationRequest::new(input),
    });
    effects
}

fn finish_generation(
    state: &mut WizardState,
    token: RequestToken,
    result: Result<GenerationReply, String>,
) -> Vec<Effect> {
    let source = match state.pending().generation {
        Some((pending, source)) if pending == token => source,
        _ => {
            engine_debug!("Discarding stale generation reply {:?}", token);
            return Vec::new();
        }
    };
    state.pending_mut().generation = None;
    state.set_generation_progress(None);
    state.mark_dirty();

    let mut effects = vec![Effect::HideLoading];
    let reply = match result {
        Ok(reply) => reply,
        Err(err) => {
            engine_error!("Generation {:?} failed: {}", token, err);
            effects.push(Effect::Notify(Toast::error(GENERATION_FAILED)));
            return effects;
        }
    };

    let (tests, from_demo) = match reply.tests {
        Some(tests) => (tests, false),
        None if state.features().mock_fallback => {
            engine_warn!(
                "Generation reply carried no tests; using demo cases for {}",
                source
            );
            (demo_tests(source), true)
        }
        None => {
            engine_error!("Generation reply carried no tests and demo fallback is off");
            effects.push(Effect::Notify(Toast::error(GENERATION_FAILED)));
            return effects;
        }
    };

    let count = tests.len();
    state.replace_generated(tests, from_demo);
    state.set_generation_progress(Some(100));
    state.reach_step(Step::ReviewTests);
    effects.push(Effect::Notify(Toast::success(format!(
        "Successfully generated {count} test cases!"
    ))));
    if from_demo {
        effects.push(Effect::Notify(Toast::info(
            "The server returned no test cases; showing demo data.",
        )));
    }
    effects
}

fn proceed_to_target(state: &mut WizardState) -> Vec<Effect> {
    if state.selected().is_empty() {
        return warn("Please select at least one test case.");
    }
    prepare_target(state);
    state.reach_step(Step::ConfigureTarget);
    Vec::new()
}

/// Defaults the target to the source URL when there is one.
fn prepare_target(state: &mut WizardState) {
    match state.source_url().map(str::to_owned) {
        Some(url) => {
            if state.target_url_input().trim().is_empty() {
                state.set_target_url_input(url);
            }
        }
        None => state.set_target_choice(TargetChoice::DifferentUrl),
    }
}

fn start_execution(state: &mut WizardState) -> Vec<Effect> {
    if state.selected().is_empty() {
        return if state.is_direct_testing_mode() {
            warn("Please upload a test case file first.")
        } else {
            warn("No test cases available for execution.")
        };
    }
    let website_url = match state.resolve_target() {
        Ok(url) => url,
        Err(warning) => return warn(warning),
    };

    let mut effects = Vec::with_capacity(3);
    if let Some(previous) = state.pending_mut().execution.take() {
        effects.push(Effect::CancelRequest { token: previous });
    }

    let token = state.issue_token();
    state.pending_mut().execution = Some(token);
    state.set_execution_url(website_url.clone());
    state.mark_dirty();
    engine_info!(
        "Executing {} tests against {} as {:?}",
        state.selected().len(),
        website_url,
        token
    );

    effects.push(Effect::ShowLoading {
        message: "Running test cases on target website...".to_string(),
    });
    effects.push(Effect::Execute {
        token,
        request: ExecutionRequest {
            website_url,
            test_cases: state.selected().to_vec(),
            live_testing: state.live_testing(),
        },
    });
    effects
}

fn finish_execution(
    state: &mut WizardState,
    token: RequestToken,
    result: Result<ExecutionReply, String>,
) -> Vec<Effect> {
    if state.pending().execution != Some(token) {
        engine_debug!("Discarding stale execution reply {:?}", token);
        return Vec::new();
    }
    state.pending_mut().execution = None;
    state.mark_dirty();

    let mut effects = vec![Effect::HideLoading];
    match result {
        Ok(ExecutionReply {
            results: Some(results),
            ..
        }) => {
            state.set_results(results);
            state.reach_step(Step::Results);
            effects.push(Effect::Notify(Toast::success(
                "Test execution completed successfully!",
            )));
        }
        Ok(ExecutionReply { results: None, .. }) => {
            engine_error!("Execution {:?} reply carried no results", token);
            effects.push(Effect::Notify(Toast::error(EXECUTION_FAILED)));
        }
        Err(err) => {
            engine_error!("Execution {:?} failed: {}", token, err);
            effects.push(Effect::Notify(Toast::error(EXECUTION_FAILED)));
        }
    }
    effects
}

fn choose_upload(state: &mut WizardState, file: FileSelection) -> Vec<Effect> {
    if !state.is_direct_testing_mode() {
        engine_debug!("Upload ignored outside direct testing: {}", file.file_name);
        return Vec::new();
    }
    if let Err(rejection) = check_upload(&file) {
        engine_warn!("Rejected upload {}: {:?}", file.file_name, rejection);
        return vec![Effect::Notify(Toast::error(rejection.message()))];
    }

    let mut effects = Vec::with_capacity(3);
    if let Some((previous, _)) = state.pending_mut().upload.take() {
        effects.push(Effect::CancelRequest { token: previous });
    }
    let token = state.issue_token();
    state.pending_mut().upload = Some((token, file.file_name.clone()));
    state.mark_dirty();

    effects.push(Effect::ShowLoading {
        message: "Parsing test cases from file...".to_string(),
    });
    effects.push(Effect::ParseUpload {
        token,
        path: file.path,
        file_name: file.file_name,
    });
    effects
}

fn finish_upload(
    state: &mut WizardState,
    token: RequestToken,
    result: Result<Vec<TestCase>, String>,
) -> Vec<Effect> {
    let file_name = match &state.pending().upload {
        Some((pending, name)) if *pending == token => name.clone(),
        _ => {
            engine_debug!("Discarding stale upload reply {:?}", token);
            return Vec::new();
        }
    };
    state.pending_mut().upload = None;

    let mut effects = vec![Effect::HideLoading];
    match result {
        Ok(tests) if !tests.is_empty() => {
            let count = tests.len();
            state.set_upload(file_name.clone(), tests);
            effects.push(Effect::Notify(Toast::success(format!(
                "Loaded {count} test cases from {file_name}."
            ))));
        }
        Ok(_) => {
            state.clear_upload();
            effects.push(Effect::Notify(Toast::error(
                "No valid test cases could be extracted from the document.",
            )));
        }
        Err(err) => {
            engine_error!("Parsing {} failed: {}", file_name, err);
            state.clear_upload();
            let message = if err.trim().is_empty() {
                UPLOAD_FAILED.to_string()
            } else {
                err
            };
            effects.push(Effect::Notify(Toast::error(message)));
        }
    }
    effects
}

fn export_finished(kind: ExportKind, result: Result<String, String>) -> Effect {
    match result {
        Ok(location) => {
            engine_info!("{} saved to {}", kind.label(), location);
            Effect::Notify(Toast::success(format!(
                "{} downloaded to {location}.",
                kind.label()
            )))
        }
        Err(err) => {
            engine_error!("{} export failed: {}", kind.label(), err);
            Effect::Notify(Toast::error(format!(
                "Failed to download {}. {err}",
                kind.label().to_lowercase()
            )))
        }
    }
}
