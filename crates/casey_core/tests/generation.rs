use std::path::PathBuf;

use casey_core::{
    demo_tests, update, Effect, Features, FileSelection, GenerationReply, GenerationRequest,
    InputSource, Msg, RequestToken, SelectionMode, SourceInput, Step, TestCase, ToastLevel,
    WizardState, PROGRESS_CAP,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    engine_logging::initialize_for_tests();
}

fn toasts(effects: &[Effect], level: ToastLevel) -> Vec<String> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Notify(toast) if toast.level == level => Some(toast.message.clone()),
            _ => None,
        })
        .collect()
}

fn generate_token(effects: &[Effect]) -> RequestToken {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::Generate { token, .. } => Some(*token),
            _ => None,
        })
        .expect("generate effect")
}

fn with_source(source: InputSource) -> WizardState {
    let (state, _) = update(WizardState::new(), Msg::ChooseGeneration);
    let (state, _) = update(state, Msg::SourceSelected(source));
    state
}

fn success(tests: Option<Vec<TestCase>>) -> Result<GenerationReply, String> {
    Ok(GenerationReply {
        tests,
        message: Some("Test cases generated successfully!".to_string()),
    })
}

#[test]
fn each_source_requires_its_field() {
    init_logging();
    let cases = [
        (InputSource::Figma, "Please enter a Figma file key."),
        (InputSource::Document, "Please select a document file."),
        (InputSource::Manual, "Please provide manual requirements."),
        (InputSource::Website, "Please enter a website URL."),
    ];
    for (source, expected) in cases {
        let state = with_source(source);
        let (next, effects) = update(state.clone(), Msg::Next);
        assert_eq!(next, state, "{source} changed state");
        assert_eq!(toasts(&effects, ToastLevel::Warning), vec![expected]);
    }
}

#[test]
fn missing_source_selection_warns() {
    init_logging();
    let (state, _) = update(WizardState::new(), Msg::ChooseGeneration);
    let (next, effects) = update(state.clone(), Msg::Next);
    assert_eq!(next, state);
    assert_eq!(
        toasts(&effects, ToastLevel::Warning),
        vec!["Please select an input source."]
    );
}

#[test]
fn whitespace_only_fields_count_as_empty() {
    init_logging();
    let (state, _) = update(
        with_source(InputSource::Manual),
        Msg::ManualPromptChanged("   \n ".to_string()),
    );
    let (next, effects) = update(state.clone(), Msg::Next);
    assert_eq!(next, state);
    assert_eq!(toasts(&effects, ToastLevel::Warning).len(), 1);
}

#[test]
fn unparseable_website_url_is_rejected() {
    init_logging();
    let (state, _) = update(
        with_source(InputSource::Website),
        Msg::SourceUrlChanged("shop.example.com".to_string()),
    );
    let (next, effects) = update(state.clone(), Msg::Next);
    assert_eq!(next, state);
    assert_eq!(
        toasts(&effects, ToastLevel::Warning),
        vec!["Please enter a valid URL."]
    );
}

#[test]
fn valid_input_issues_one_generation_request() {
    init_logging();
    let (state, _) = update(
        with_source(InputSource::Figma),
        Msg::FigmaKeyChanged("  AbC123  ".to_string()),
    );
    let (state, effects) = update(state, Msg::Next);

    assert_eq!(state.step(), Some(Step::ChooseInput));
    assert!(state.is_busy());
    let token = generate_token(&effects);
    assert_eq!(
        effects,
        vec![
            Effect::ShowLoading {
                message: "Analyzing input and generating test cases...".to_string()
            },
            Effect::Generate {
                token,
                request: GenerationRequest::new(SourceInput::Figma {
                    figma_key: "AbC123".to_string()
                }),
            },
        ]
    );
    assert_eq!(state.view().progress.map(|p| p.percent), Some(0));
}

#[test]
fn document_source_sends_placeholder_content() {
    init_logging();
    let file = FileSelection {
        path: PathBuf::from("/tmp/srs.docx"),
        file_name: "srs.docx".to_string(),
        size_bytes: 2048,
    };
    let (state, effects) = update(with_source(InputSource::Document), Msg::DocumentChosen(file));
    assert_eq!(toasts(&effects, ToastLevel::Success).len(), 1);

    let (_, effects) = update(state, Msg::Next);
    let request = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::Generate { request, .. } => Some(request.clone()),
            _ => None,
        })
        .expect("generate effect");
    assert_eq!(
        request.input,
        SourceInput::Document {
            file_name: "srs.docx".to_string(),
            file_content: "File content will be processed".to_string(),
        }
    );
}

#[test]
fn success_reply_replaces_generated_set_and_advances() {
    init_logging();
    let (state, _) = update(
        with_source(InputSource::Website),
        Msg::SourceUrlChanged("https://shop.example.com".to_string()),
    );
    let (state, effects) = update(state, Msg::Next);
    let token = generate_token(&effects);

    let (state, effects) = update(
        state,
        Msg::GenerationFinished {
            token,
            result: success(Some(vec![TestCase::new(1, "A")])),
        },
    );

    assert_eq!(state.generated(), &[TestCase::new(1, "A")]);
    assert_eq!(state.step(), Some(Step::ReviewTests));
    assert_eq!(state.source_url(), Some("https://shop.example.com"));
    assert!(!state.is_busy());
    assert!(effects.contains(&Effect::HideLoading));
    assert_eq!(
        toasts(&effects, ToastLevel::Success),
        vec!["Successfully generated 1 test cases!"]
    );

    // The wizard can still move on once something is selected.
    let (state, _) = update(state, Msg::ToggleTest(1));
    let (state, effects) = update(state, Msg::Next);
    assert!(toasts(&effects, ToastLevel::Warning).is_empty());
    assert_eq!(state.step(), Some(Step::ConfigureTarget));
}

#[test]
fn missing_tests_fall_back_to_demo_cases_and_flag_the_view() {
    init_logging();
    let (state, _) = update(
        with_source(InputSource::Manual),
        Msg::ManualPromptChanged("Login with SSO".to_string()),
    );
    let (state, effects) = update(state, Msg::Next);
    let token = generate_token(&effects);
    let (state, effects) = update(
        state,
        Msg::GenerationFinished {
            token,
            result: success(None),
        },
    );

    assert_eq!(state.generated(), demo_tests(InputSource::Manual).as_slice());
    assert!(state.view().demo_data);
    assert_eq!(toasts(&effects, ToastLevel::Info).len(), 1);
}

#[test]
fn missing_tests_without_fallback_is_a_failure() {
    init_logging();
    let features = Features {
        mock_fallback: false,
        ..Features::default()
    };
    let (state, _) = update(WizardState::with_features(features), Msg::ChooseGeneration);
    let (state, _) = update(state, Msg::SourceSelected(InputSource::Figma));
    let (state, _) = update(state, Msg::FigmaKeyChanged("key".to_string()));
    let (state, effects) = update(state, Msg::Next);
    let token = generate_token(&effects);

    let (state, effects) = update(
        state,
        Msg::GenerationFinished {
            token,
            result: success(None),
        },
    );
    assert!(state.generated().is_empty());
    assert_eq!(state.step(), Some(Step::ChooseInput));
    assert_eq!(
        toasts(&effects, ToastLevel::Error),
        vec!["Failed to generate test cases. Please try again."]
    );
}

#[test]
fn failure_keeps_previous_generated_set() {
    init_logging();
    let (state, _) = update(
        with_source(InputSource::Figma),
        Msg::FigmaKeyChanged("key".to_string()),
    );
    let (state, effects) = update(state, Msg::Next);
    let token = generate_token(&effects);
    let (state, _) = update(
        state,
        Msg::GenerationFinished {
            token,
            result: success(Some(vec![TestCase::new(7, "Kept")])),
        },
    );

    let (state, _) = update(state, Msg::GoBackToStep(1));
    let (state, effects) = update(state, Msg::Next);
    let token = generate_token(&effects);
    let (state, effects) = update(
        state,
        Msg::GenerationFinished {
            token,
            result: Err("http status 500".to_string()),
        },
    );

    assert_eq!(state.generated(), &[TestCase::new(7, "Kept")]);
    assert_eq!(state.step(), Some(Step::ChooseInput));
    assert_eq!(toasts(&effects, ToastLevel::Error).len(), 1);
    assert!(effects.contains(&Effect::HideLoading));
}

#[test]
fn second_click_supersedes_first_request() {
    init_logging();
    let (state, _) = update(
        with_source(InputSource::Figma),
        Msg::FigmaKeyChanged("key".to_string()),
    );
    let (state, effects) = update(state, Msg::Next);
    let first = generate_token(&effects);
    let (state, effects) = update(state, Msg::Next);
    let second = generate_token(&effects);

    assert_ne!(first, second);
    assert_eq!(effects[0], Effect::CancelRequest { token: first });

    let (state, effects) = update(
        state,
        Msg::GenerationFinished {
            token: first,
            result: success(Some(vec![TestCase::new(1, "Stale")])),
        },
    );
    assert!(effects.is_empty());
    assert!(state.generated().is_empty());
    assert!(state.is_busy());

    let (state, _) = update(
        state,
        Msg::GenerationFinished {
            token: second,
            result: success(Some(vec![TestCase::new(1, "Fresh")])),
        },
    );
    assert_eq!(state.generated()[0].name, "Fresh");
}

#[test]
fn ticks_advance_progress_up_to_cap() {
    init_logging();
    let (state, _) = update(
        with_source(InputSource::Figma),
        Msg::FigmaKeyChanged("key".to_string()),
    );
    let (mut state, _) = update(state, Msg::Next);
    for _ in 0..30 {
        state = update(state, Msg::Tick).0;
    }
    let progress = state.view().progress.expect("progress while generating");
    assert_eq!(progress.percent, PROGRESS_CAP);
    assert_eq!(progress.status_text(), "Optimizing test cases...");
}

#[test]
fn completed_generation_reports_full_progress() {
    init_logging();
    let (state, _) = update(
        with_source(InputSource::Figma),
        Msg::FigmaKeyChanged("key".to_string()),
    );
    let (state, effects) = update(state, Msg::Next);
    let token = generate_token(&effects);
    let (state, _) = update(state, Msg::Tick);
    let (state, _) = update(
        state,
        Msg::GenerationFinished {
            token,
            result: success(Some(vec![TestCase::new(1, "Login")])),
        },
    );

    let progress = state.view().progress.expect("progress after completion");
    assert_eq!(progress.percent, 100);
    assert_eq!(progress.status_text(), "Test cases generated successfully!");

    // Ticks after completion leave the indicator alone.
    let (next, _) = update(state.clone(), Msg::Tick);
    assert_eq!(next.view().progress, state.view().progress);
}

#[test]
fn failed_generation_clears_progress() {
    init_logging();
    let (state, _) = update(
        with_source(InputSource::Figma),
        Msg::FigmaKeyChanged("key".to_string()),
    );
    let (state, effects) = update(state, Msg::Next);
    let token = generate_token(&effects);
    let (state, _) = update(
        state,
        Msg::GenerationFinished {
            token,
            result: Err("upstream down".to_string()),
        },
    );
    assert_eq!(state.view().progress, None);
}

#[test]
fn new_generation_resets_selection_in_accordion_mode() {
    init_logging();
    let (state, _) = update(
        with_source(InputSource::Figma),
        Msg::FigmaKeyChanged("key".to_string()),
    );
    let (state, effects) = update(state, Msg::Next);
    let token = generate_token(&effects);
    let (state, _) = update(
        state,
        Msg::GenerationFinished {
            token,
            result: success(Some(vec![TestCase::new(1, "A"), TestCase::new(2, "B")])),
        },
    );
    assert_eq!(state.features().selection, SelectionMode::Accordion);
    assert!(state.selected().is_empty());
    assert_eq!(state.furthest_step(), Some(Step::ReviewTests));
}
