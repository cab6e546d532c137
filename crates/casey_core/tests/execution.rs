use casey_core::{
    update, Effect, ExecutionReply, ExecutionRequest, GenerationReply, InputSource, Msg,
    RequestToken, ResultSummary, Step, TargetChoice, TestCase, TestResult, TestStatus,
    ToastLevel, WizardState,
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

fn token_of(effects: &[Effect]) -> RequestToken {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::Generate { token, .. } | Effect::Execute { token, .. } => Some(*token),
            _ => None,
        })
        .expect("request effect")
}

/// Generated from the given source and moved to the target step with
/// every test selected.
fn target_state(source: InputSource, raw: &str) -> WizardState {
    let (state, _) = update(WizardState::new(), Msg::ChooseGeneration);
    let (state, _) = update(state, Msg::SourceSelected(source));
    let msg = match source {
        InputSource::Website => Msg::SourceUrlChanged(raw.to_string()),
        InputSource::Figma => Msg::FigmaKeyChanged(raw.to_string()),
        _ => Msg::ManualPromptChanged(raw.to_string()),
    };
    let (state, _) = update(state, msg);
    let (state, effects) = update(state, Msg::Next);
    let token = token_of(&effects);
    let (state, _) = update(
        state,
        Msg::GenerationFinished {
            token,
            result: Ok(GenerationReply {
                tests: Some(vec![TestCase::new(1, "Login"), TestCase::new(2, "Logout")]),
                message: None,
            }),
        },
    );
    let (state, _) = update(state, Msg::SelectAll);
    let (state, _) = update(state, Msg::Next);
    assert_eq!(state.step(), Some(Step::ConfigureTarget));
    state
}

#[test]
fn website_source_prefills_target() {
    init_logging();
    let state = target_state(InputSource::Website, "https://shop.example.com");
    let target = state.view().target;
    assert_eq!(target.choice, TargetChoice::UseSourceUrl);
    assert_eq!(target.resolved.as_deref(), Some("https://shop.example.com"));
}

#[test]
fn non_website_source_defaults_to_different_url() {
    init_logging();
    let state = target_state(InputSource::Figma, "key");
    let target = state.view().target;
    assert_eq!(target.choice, TargetChoice::DifferentUrl);
    assert_eq!(target.resolved, None);

    let (state, effects) = update(state, Msg::Next);
    assert_eq!(
        toasts(&effects, ToastLevel::Warning),
        vec!["Please enter a target website URL."]
    );
    assert!(!state.is_busy());
}

#[test]
fn use_source_url_without_one_warns() {
    init_logging();
    let state = target_state(InputSource::Manual, "Checkout");
    let (state, _) = update(state, Msg::TargetChoiceChanged(TargetChoice::UseSourceUrl));
    let (_, effects) = update(state, Msg::Next);
    assert_eq!(
        toasts(&effects, ToastLevel::Warning),
        vec!["No source URL available. Please select a different website."]
    );
}

#[test]
fn invalid_target_url_is_rejected() {
    init_logging();
    let state = target_state(InputSource::Figma, "key");
    let (state, _) = update(state, Msg::TargetUrlChanged("not a url".to_string()));
    let (next, effects) = update(state.clone(), Msg::Next);
    assert_eq!(next, state);
    assert_eq!(
        toasts(&effects, ToastLevel::Warning),
        vec!["Please enter a valid URL."]
    );
}

#[test]
fn execution_request_carries_selection_and_live_flag() {
    init_logging();
    let state = target_state(InputSource::Figma, "key");
    let (state, _) = update(state, Msg::TargetUrlChanged(" https://staging.example.com ".into()));
    let (state, _) = update(state, Msg::LiveTestingToggled(true));
    let (state, effects) = update(state, Msg::Next);

    let token = token_of(&effects);
    assert_eq!(
        effects,
        vec![
            Effect::ShowLoading {
                message: "Running test cases on target website...".to_string()
            },
            Effect::Execute {
                token,
                request: ExecutionRequest {
                    website_url: "https://staging.example.com".to_string(),
                    test_cases: vec![TestCase::new(1, "Login"), TestCase::new(2, "Logout")],
                    live_testing: true,
                },
            },
        ]
    );
    assert!(state.is_busy());
}

#[test]
fn mixed_results_are_summarized() {
    init_logging();
    let state = target_state(InputSource::Website, "https://shop.example.com");
    let (state, effects) = update(state, Msg::Next);
    let token = token_of(&effects);

    let results = vec![
        TestResult::new(1, "Login", TestStatus::Passed).with_duration_ms(1200),
        TestResult::new(2, "Logout", TestStatus::Failed)
            .with_duration_ms(800)
            .with_message("button not found"),
    ];
    let (state, effects) = update(
        state,
        Msg::ExecutionFinished {
            token,
            result: Ok(ExecutionReply {
                results: Some(results.clone()),
                message: Some("done".to_string()),
            }),
        },
    );

    assert_eq!(state.step(), Some(Step::Results));
    assert_eq!(state.results(), results.as_slice());
    assert_eq!(
        toasts(&effects, ToastLevel::Success),
        vec!["Test execution completed successfully!"]
    );

    let summary = state.view().summary.expect("summary");
    assert_eq!(
        summary,
        ResultSummary {
            total: 2,
            passed: 1,
            failed: 1,
            success_rate: 50,
            duration_secs: 2,
        }
    );
}

#[test]
fn failed_execution_leaves_results_untouched() {
    init_logging();
    let state = target_state(InputSource::Website, "https://shop.example.com");
    let (state, effects) = update(state, Msg::Next);
    let token = token_of(&effects);
    let (state, effects) = update(
        state,
        Msg::ExecutionFinished {
            token,
            result: Err("connection refused".to_string()),
        },
    );

    assert!(state.results().is_empty());
    assert_eq!(state.step(), Some(Step::ConfigureTarget));
    assert!(effects.contains(&Effect::HideLoading));
    assert_eq!(
        toasts(&effects, ToastLevel::Error),
        vec!["Failed to execute test cases. Please try again."]
    );
}

#[test]
fn reply_without_results_is_a_failure() {
    init_logging();
    let state = target_state(InputSource::Website, "https://shop.example.com");
    let (state, effects) = update(state, Msg::Next);
    let token = token_of(&effects);
    let (state, effects) = update(
        state,
        Msg::ExecutionFinished {
            token,
            result: Ok(ExecutionReply {
                results: None,
                message: None,
            }),
        },
    );
    assert!(state.results().is_empty());
    assert_eq!(toasts(&effects, ToastLevel::Error).len(), 1);
}

#[test]
fn direct_mode_requires_upload_before_execution() {
    init_logging();
    let (state, _) = update(WizardState::new(), Msg::ChooseDirectTesting);
    let (state, _) = update(
        state,
        Msg::TargetUrlChanged("https://shop.example.com".to_string()),
    );
    let (next, effects) = update(state.clone(), Msg::Next);
    assert_eq!(next, state);
    assert_eq!(
        toasts(&effects, ToastLevel::Warning),
        vec!["Please upload a test case file first."]
    );
}
