//! Casey core: pure pipeline wizard state machine and view-model helpers.
mod demo;
mod effect;
pub mod landing;
mod msg;
mod notify;
mod state;
mod types;
mod update;
pub mod validate;
mod view_model;

pub use demo::demo_tests;
pub use effect::Effect;
pub use msg::{ExecutionReply, GenerationReply, Msg};
pub use notify::{
    ActiveToast, LoadingOverlay, Toast, ToastId, ToastLevel, ToastQueue, TOAST_LIFETIME,
};
pub use state::{EntryPath, Features, RequestToken, SelectionMode, Step, TargetChoice, WizardState};
pub use types::{
    ExecutionRequest, ExportKind, FileSelection, GenerationRequest, InputSource, PipelineReport,
    ReportDraft, ReportSummary, ResultSummary, SourceInput, TestCase, TestId, TestResult,
    TestStatus, UploadSummary,
};
pub use update::{update, PROGRESS_CAP, PROGRESS_STEP};
pub use view_model::{
    GenerationProgress, ResultRowView, StepMarker, TargetView, TestRowView, WizardViewModel,
};
