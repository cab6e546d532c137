use crate::{
    ExportKind, FileSelection, InputSource, RequestToken, TargetChoice, TestCase, TestId,
    TestResult,
};

/// Reply from the generation endpoint after `status == "success"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReply {
    pub tests: Option<Vec<TestCase>>,
    pub message: Option<String>,
}

/// Reply from the execution endpoint after `status == "success"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReply {
    pub results: Option<Vec<TestResult>>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Initial fork: generate tests from a source.
    ChooseGeneration,
    /// Initial fork: upload a ready-made test-case file.
    ChooseDirectTesting,
    /// User picked an input source card.
    SourceSelected(InputSource),
    FigmaKeyChanged(String),
    ManualPromptChanged(String),
    SourceUrlChanged(String),
    /// User picked the requirements document for the document source.
    DocumentChosen(FileSelection),
    /// Forward button on the current step.
    Next,
    /// User clicked a step marker in the progress indicator.
    GoToStep(u8),
    /// Back button targeting an earlier step.
    GoBackToStep(u8),
    ToggleTest(TestId),
    SelectAll,
    ClearSelection,
    TargetChoiceChanged(TargetChoice),
    TargetUrlChanged(String),
    LiveTestingToggled(bool),
    /// User picked a test-case file in direct-testing mode.
    UploadChosen(FileSelection),
    ExportTests,
    ExportResults,
    ExportReport,
    /// Render/progress tick.
    Tick,
    GenerationFinished {
        token: RequestToken,
        result: Result<GenerationReply, String>,
    },
    ExecutionFinished {
        token: RequestToken,
        result: Result<ExecutionReply, String>,
    },
    UploadParsed {
        token: RequestToken,
        result: Result<Vec<TestCase>, String>,
    },
    ExportFinished {
        kind: ExportKind,
        result: Result<String, String>,
    },
}
