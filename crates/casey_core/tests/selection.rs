use casey_core::{
    update, Effect, Features, GenerationReply, InputSource, Msg, RequestToken, SelectionMode,
    TestCase, WizardState,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    engine_logging::initialize_for_tests();
}

fn three_tests() -> Vec<TestCase> {
    vec![
        TestCase::new(1, "Homepage loads").with_priority("High"),
        TestCase::new(2, "Search returns results"),
        TestCase::new(3, "Cart persists").with_kind("Functional"),
    ]
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

fn generated_state(features: Features) -> WizardState {
    let (state, _) = update(WizardState::with_features(features), Msg::ChooseGeneration);
    let (state, _) = update(state, Msg::SourceSelected(InputSource::Manual));
    let (state, _) = update(state, Msg::ManualPromptChanged("Shop flow".to_string()));
    let (state, effects) = update(state, Msg::Next);
    let token = generate_token(&effects);
    let (state, _) = update(
        state,
        Msg::GenerationFinished {
            token,
            result: Ok(GenerationReply {
                tests: Some(three_tests()),
                message: None,
            }),
        },
    );
    state
}

fn selected_ids(state: &WizardState) -> Vec<u64> {
    let mut ids: Vec<u64> = state.selected().iter().map(|t| t.id).collect();
    ids.sort_unstable();
    ids
}

#[test]
fn toggling_twice_restores_membership() {
    init_logging();
    let state = generated_state(Features::default());
    let (once, _) = update(state.clone(), Msg::ToggleTest(2));
    assert!(once.is_selected(2));

    let (twice, effects) = update(once, Msg::ToggleTest(2));
    assert!(effects.is_empty());
    assert!(!twice.is_selected(2));
    assert_eq!(selected_ids(&twice), selected_ids(&state));
}

#[test]
fn select_all_then_deselect_one() {
    init_logging();
    let (state, _) = update(generated_state(Features::default()), Msg::SelectAll);
    assert_eq!(selected_ids(&state), vec![1, 2, 3]);

    let (state, _) = update(state, Msg::ToggleTest(1));
    assert_eq!(selected_ids(&state), vec![2, 3]);
    assert_eq!(state.view().selected_count, 2);
}

#[test]
fn clear_selection_empties_the_set() {
    init_logging();
    let (state, _) = update(generated_state(Features::default()), Msg::SelectAll);
    let (state, _) = update(state, Msg::ClearSelection);
    assert!(state.selected().is_empty());

    let (_, effects) = update(state, Msg::Next);
    assert!(effects.iter().any(|effect| matches!(
        effect,
        Effect::Notify(toast) if toast.message == "Please select at least one test case."
    )));
}

#[test]
fn unknown_id_is_ignored() {
    init_logging();
    let state = generated_state(Features::default());
    let (next, effects) = update(state.clone(), Msg::ToggleTest(99));
    assert_eq!(next, state);
    assert!(effects.is_empty());
}

#[test]
fn selected_copies_match_generated_entries() {
    init_logging();
    let (state, _) = update(generated_state(Features::default()), Msg::ToggleTest(3));
    assert_eq!(state.selected(), &[three_tests()[2].clone()]);

    let rows = state.view().generated;
    let flags: Vec<bool> = rows.iter().map(|row| row.selected).collect();
    assert_eq!(flags, vec![false, false, true]);
    assert_eq!(rows[0].priority, "High");
    assert_eq!(rows[1].priority, "Medium");
}

#[test]
fn flat_mode_selects_everything_after_generation() {
    init_logging();
    let features = Features {
        selection: SelectionMode::Flat,
        ..Features::default()
    };
    let state = generated_state(features);
    assert_eq!(selected_ids(&state), vec![1, 2, 3]);

    // The review step can be passed straight away.
    let (state, _) = update(state, Msg::Next);
    assert_eq!(state.step().map(|s| s.number()), Some(3));
}
