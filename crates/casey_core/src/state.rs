use serde::{Deserialize, Serialize};

use crate::validate::SourceFields;
use crate::view_model::{
    GenerationProgress, ResultRowView, StepMarker, TargetView, TestRowView, WizardViewModel,
};
use crate::{
    FileSelection, InputSource, ReportDraft, ResultSummary, TestCase, TestId, TestResult,
    UploadSummary,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    ChooseInput = 1,
    ReviewTests = 2,
    ConfigureTarget = 3,
    Results = 4,
}

impl Step {
    pub const ALL: [Step; 4] = [
        Step::ChooseInput,
        Step::ReviewTests,
        Step::ConfigureTarget,
        Step::Results,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.number() == n)
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::ChooseInput => "Choose input",
            Step::ReviewTests => "Review tests",
            Step::ConfigureTarget => "Configure target",
            Step::Results => "Results",
        }
    }
}

/// Which path the user took at the initial fork.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPath {
    Generation,
    DirectTesting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetChoice {
    #[default]
    UseSourceUrl,
    DifferentUrl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Collapsible rows with a per-test toggle; nothing selected initially.
    #[default]
    Accordion,
    /// Plain list; every generated test is selected.
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Features {
    pub selection: SelectionMode,
    /// Substitute demo cases when a successful generation reply omits `tests`.
    pub mock_fallback: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            selection: SelectionMode::Accordion,
            mock_fallback: true,
        }
    }
}

/// Identifies one in-flight request. Replies carrying any other token are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct PendingRequests {
    /// Token plus the source the request was built from.
    pub(crate) generation: Option<(RequestToken, InputSource)>,
    pub(crate) execution: Option<RequestToken>,
    /// Token plus the uploaded file name.
    pub(crate) upload: Option<(RequestToken, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WizardState {
    features: Features,
    entry: Option<EntryPath>,
    step: Option<Step>,
    furthest: Option<Step>,
    source: Option<InputSource>,
    fields: SourceFields,
    source_url: Option<String>,
    generated: Vec<TestCase>,
    generated_from_demo: bool,
    selected: Vec<TestCase>,
    upload: Option<UploadSummary>,
    target_choice: TargetChoice,
    target_url_input: String,
    execution_url: Option<String>,
    live_testing: bool,
    results: Vec<TestResult>,
    pending: PendingRequests,
    generation_progress: Option<u8>,
    next_token: u64,
    dirty: bool,
}

impl WizardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_features(features: Features) -> Self {
        Self {
            features,
            ..Self::default()
        }
    }

    pub fn features(&self) -> Features {
        self.features
    }

    pub fn entry(&self) -> Option<EntryPath> {
        self.entry
    }

    pub fn is_direct_testing_mode(&self) -> bool {
        self.entry == Some(EntryPath::DirectTesting)
    }

    pub fn step(&self) -> Option<Step> {
        self.step
    }

    pub fn furthest_step(&self) -> Option<Step> {
        self.furthest
    }

    pub fn source(&self) -> Option<InputSource> {
        self.source
    }

    pub fn fields(&self) -> &SourceFields {
        &self.fields
    }

    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    pub fn generated(&self) -> &[TestCase] {
        &self.generated
    }

    pub fn selected(&self) -> &[TestCase] {
        &self.selected
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    pub fn is_selected(&self, id: TestId) -> bool {
        self.selected.iter().any(|t| t.id == id)
    }

    /// True while any request this state is waiting for is in flight.
    pub fn is_busy(&self) -> bool {
        self.pending.generation.is_some()
            || self.pending.execution.is_some()
            || self.pending.upload.is_some()
    }

    /// Returns whether the state changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn view(&self) -> WizardViewModel {
        let markers = Step::ALL
            .into_iter()
            .map(|s| match self.step {
                Some(current) if s == current => StepMarker::Active,
                Some(current) if s < current => StepMarker::Completed,
                _ => StepMarker::Pending,
            })
            .collect();
        let current = self.step.map(Step::number).unwrap_or(0);
        let connectors = (1..Step::ALL.len() as u8).map(|i| i < current).collect();

        let generated = self
            .generated
            .iter()
            .map(|test| TestRowView {
                id: test.id,
                name: test.name.clone(),
                kind: test.kind.clone(),
                description: test.description.clone(),
                selector: test.selector.clone(),
                priority: test.priority_label().to_string(),
                selected: self.is_selected(test.id),
            })
            .collect();

        let results = self
            .results
            .iter()
            .map(|r| ResultRowView {
                name: r.name.clone(),
                status: r.status,
                duration_ms: r.duration_ms,
                message: r.message.clone(),
            })
            .collect();

        WizardViewModel {
            entry: self.entry,
            step: self.step,
            markers,
            connectors,
            source: self.source,
            source_url: self.source_url.clone(),
            generated,
            demo_data: self.generated_from_demo,
            selected_count: self.selected.len(),
            upload: self.upload.clone(),
            target: TargetView {
                choice: self.target_choice,
                url_input: self.target_url_input.clone(),
                resolved: self.resolve_target().ok(),
            },
            live_testing: self.live_testing,
            results,
            summary: (!self.results.is_empty())
                .then(|| ResultSummary::from_results(&self.results)),
            progress: self.generation_progress.map(GenerationProgress::new),
            busy: self.is_busy(),
            dirty: self.dirty,
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn issue_token(&mut self) -> RequestToken {
        self.next_token += 1;
        RequestToken(self.next_token)
    }

    pub(crate) fn pending_mut(&mut self) -> &mut PendingRequests {
        &mut self.pending
    }

    pub(crate) fn pending(&self) -> &PendingRequests {
        &self.pending
    }

    pub(crate) fn enter(&mut self, entry: EntryPath) {
        self.entry = Some(entry);
        let first = match entry {
            EntryPath::Generation => Step::ChooseInput,
            EntryPath::DirectTesting => {
                // There is no source URL to reuse without generation.
                self.target_choice = TargetChoice::DifferentUrl;
                Step::ConfigureTarget
            }
        };
        self.step = Some(first);
        self.furthest = Some(first);
        self.mark_dirty();
    }

    /// First step that belongs to the chosen path.
    pub(crate) fn first_step(&self) -> Step {
        if self.is_direct_testing_mode() {
            Step::ConfigureTarget
        } else {
            Step::ChooseInput
        }
    }

    pub(crate) fn show_step(&mut self, step: Step) {
        if self.step != Some(step) {
            self.step = Some(step);
            self.mark_dirty();
        }
    }

    /// Moves forward after a passed guard and records the step as reached.
    pub(crate) fn reach_step(&mut self, step: Step) {
        self.show_step(step);
        if self.furthest.map_or(true, |f| f < step) {
            self.furthest = Some(step);
        }
    }

    pub(crate) fn set_source(&mut self, source: InputSource) {
        if self.source != Some(source) {
            self.source = Some(source);
            self.mark_dirty();
        }
    }

    pub(crate) fn fields_mut(&mut self) -> &mut SourceFields {
        self.mark_dirty();
        &mut self.fields
    }

    pub(crate) fn set_document(&mut self, file: FileSelection) {
        self.fields_mut().document = Some(file);
    }

    pub(crate) fn set_source_url(&mut self, url: String) {
        self.source_url = Some(url);
        self.mark_dirty();
    }

    /// Replaces the generated set. Also resets the selection and forgets how
    /// far the user got, since later steps described the previous set.
    pub(crate) fn replace_generated(&mut self, tests: Vec<TestCase>, from_demo: bool) {
        self.selected = match self.features.selection {
            SelectionMode::Accordion => Vec::new(),
            SelectionMode::Flat => tests.clone(),
        };
        self.generated = tests;
        self.generated_from_demo = from_demo;
        self.furthest = Some(Step::ChooseInput);
        self.mark_dirty();
    }

    pub(crate) fn toggle_selected(&mut self, id: TestId) -> bool {
        if let Some(pos) = self.selected.iter().position(|t| t.id == id) {
            self.selected.remove(pos);
            self.mark_dirty();
            return true;
        }
        match self.generated.iter().find(|t| t.id == id) {
            Some(test) => {
                self.selected.push(test.clone());
                self.mark_dirty();
                true
            }
            None => false,
        }
    }

    pub(crate) fn select_all(&mut self) {
        self.selected = self.generated.clone();
        self.mark_dirty();
    }

    pub(crate) fn clear_selection(&mut self) {
        if !self.selected.is_empty() {
            self.selected.clear();
            self.mark_dirty();
        }
    }

    pub(crate) fn set_upload(&mut self, file_name: String, tests: Vec<TestCase>) {
        self.upload = Some(UploadSummary {
            file_name,
            test_count: tests.len(),
        });
        self.selected = tests;
        self.mark_dirty();
    }

    pub(crate) fn clear_upload(&mut self) {
        self.upload = None;
        self.selected.clear();
        self.mark_dirty();
    }

    pub(crate) fn set_target_choice(&mut self, choice: TargetChoice) {
        if self.target_choice != choice {
            self.target_choice = choice;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_target_url_input(&mut self, raw: String) {
        self.target_url_input = raw;
        self.mark_dirty();
    }

    pub(crate) fn target_url_input(&self) -> &str {
        &self.target_url_input
    }

    pub(crate) fn set_live_testing(&mut self, enabled: bool) {
        if self.live_testing != enabled {
            self.live_testing = enabled;
            self.mark_dirty();
        }
    }

    pub(crate) fn live_testing(&self) -> bool {
        self.live_testing
    }

    /// Execution target for the current choice, or the warning to show.
    pub(crate) fn resolve_target(&self) -> Result<String, &'static str> {
        match self.target_choice {
            TargetChoice::UseSourceUrl => self
                .source_url
                .clone()
                .ok_or("No source URL available. Please select a different website."),
            TargetChoice::DifferentUrl => {
                let raw = self.target_url_input.trim();
                if raw.is_empty() {
                    Err("Please enter a target website URL.")
                } else if !crate::validate::is_valid_url(raw) {
                    Err("Please enter a valid URL.")
                } else {
                    Ok(raw.to_string())
                }
            }
        }
    }

    pub(crate) fn set_execution_url(&mut self, url: String) {
        self.execution_url = Some(url);
    }

    pub(crate) fn set_results(&mut self, results: Vec<TestResult>) {
        self.results = results;
        self.mark_dirty();
    }

    pub(crate) fn generation_progress(&self) -> Option<u8> {
        self.generation_progress
    }

    pub(crate) fn set_generation_progress(&mut self, progress: Option<u8>) {
        if self.generation_progress != progress {
            self.generation_progress = progress;
            self.mark_dirty();
        }
    }

    /// Test cases offered for export: the generated set, or the uploaded one
    /// in direct-testing mode.
    pub(crate) fn exportable_tests(&self) -> &[TestCase] {
        if self.generated.is_empty() {
            &self.selected
        } else {
            &self.generated
        }
    }

    pub(crate) fn report_draft(&self) -> ReportDraft {
        ReportDraft {
            generation_method: if self.is_direct_testing_mode() {
                None
            } else {
                self.source
            },
            source_url: self.source_url.clone(),
            execution_url: self.execution_url.clone(),
            tests: self.exportable_tests().to_vec(),
            results: self.results.clone(),
        }
    }
}
