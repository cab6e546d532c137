use crate::{
    EntryPath, InputSource, ResultSummary, Step, TargetChoice, TestId, TestStatus, UploadSummary,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMarker {
    Active,
    Completed,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRowView {
    pub id: TestId,
    pub name: String,
    pub kind: String,
    pub description: String,
    pub selector: Option<String>,
    pub priority: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRowView {
    pub name: String,
    pub status: TestStatus,
    pub duration_ms: u64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetView {
    pub choice: TargetChoice,
    pub url_input: String,
    /// Target the execute button would use right now, if valid.
    pub resolved: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationProgress {
    pub percent: u8,
}

impl GenerationProgress {
    pub fn new(percent: u8) -> Self {
        Self {
            percent: percent.min(100),
        }
    }

    pub fn status_text(&self) -> &'static str {
        match self.percent {
            100.. => "Test cases generated successfully!",
            60.. => "Optimizing test cases...",
            30.. => "Generating test scenarios...",
            _ => "Analyzing input source...",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardViewModel {
    pub entry: Option<EntryPath>,
    pub step: Option<Step>,
    /// One marker per step, in step order.
    pub markers: Vec<StepMarker>,
    /// Connector `i` joins step `i + 1` and `i + 2`.
    pub connectors: Vec<bool>,
    pub source: Option<InputSource>,
    pub source_url: Option<String>,
    pub generated: Vec<TestRowView>,
    pub demo_data: bool,
    pub selected_count: usize,
    pub upload: Option<UploadSummary>,
    pub target: TargetView,
    pub live_testing: bool,
    pub results: Vec<ResultRowView>,
    pub summary: Option<ResultSummary>,
    pub progress: Option<GenerationProgress>,
    pub busy: bool,
    pub dirty: bool,
}
