use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub type TestId = u64;

/// Where the generation flow takes its requirements from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    Figma,
    Document,
    Manual,
    Website,
}

impl InputSource {
    pub const ALL: [InputSource; 4] = [
        InputSource::Figma,
        InputSource::Document,
        InputSource::Manual,
        InputSource::Website,
    ];

    /// Value of the `test_type` field sent to the generation endpoint.
    pub fn test_type(self) -> &'static str {
        match self {
            InputSource::Figma => "figma",
            InputSource::Document => "document",
            InputSource::Manual => "manual",
            InputSource::Website => "website",
        }
    }

    pub fn from_test_type(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|source| source.test_type().eq_ignore_ascii_case(raw))
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.test_type())
    }
}

/// Validated, request-ready input for one source. Serialises to the
/// variant-specific fields of the generation request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SourceInput {
    Figma {
        figma_key: String,
    },
    Document {
        file_name: String,
        file_content: String,
    },
    Manual {
        manual_prompt: String,
    },
    Website {
        website_url: String,
    },
}

impl SourceInput {
    pub fn source(&self) -> InputSource {
        match self {
            SourceInput::Figma { .. } => InputSource::Figma,
            SourceInput::Document { .. } => InputSource::Document,
            SourceInput::Manual { .. } => InputSource::Manual,
            SourceInput::Website { .. } => InputSource::Website,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub test_type: InputSource,
    #[serde(flatten)]
    pub input: SourceInput,
}

impl GenerationRequest {
    pub fn new(input: SourceInput) -> Self {
        Self {
            test_type: input.source(),
            input,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionRequest {
    pub website_url: String,
    pub test_cases: Vec<TestCase>,
    pub live_testing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: TestId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    /// Backend-specific fields (`endpoint`, `method`, `expected_status`, ...)
    /// passed back untouched when the case is executed.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TestCase {
    pub fn new(id: TestId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            kind: String::new(),
            selector: None,
            priority: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn priority_label(&self) -> &str {
        self.priority.as_deref().unwrap_or("Medium")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
}

impl TestStatus {
    pub fn label(self) -> &'static str {
        match self {
            TestStatus::Passed => "PASSED",
            TestStatus::Failed => "FAILED",
            TestStatus::Skipped => "SKIPPED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    #[serde(default)]
    pub id: Option<TestId>,
    pub name: String,
    pub status: TestStatus,
    #[serde(rename = "duration", default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub message: String,
}

impl TestResult {
    pub fn new(id: TestId, name: impl Into<String>, status: TestStatus) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            status,
            duration_ms: 0,
            message: String::new(),
        }
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

/// Aggregate counters shown on the results step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResultSummary {
    pub total: usize,
    pub passed: usize,
    /// Everything that did not pass, skipped cases included.
    pub failed: usize,
    pub success_rate: u32,
    pub duration_secs: u64,
}

impl ResultSummary {
    pub fn from_results(results: &[TestResult]) -> Self {
        let total = results.len();
        let passed = results
            .iter()
            .filter(|r| r.status == TestStatus::Passed)
            .count();
        let success_rate = if total > 0 {
            ((passed as f64 / total as f64) * 100.0).round() as u32
        } else {
            0
        };
        let total_ms: u64 = results.iter().map(|r| r.duration_ms).sum();
        Self {
            total,
            passed,
            failed: total - passed,
            success_rate,
            duration_secs: (total_ms as f64 / 1000.0).round() as u64,
        }
    }
}

/// A file picked by the user, with the metadata needed for validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSelection {
    pub path: PathBuf,
    pub file_name: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSummary {
    pub file_name: String,
    pub test_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    TestCases,
    TestResults,
    Report,
}

impl ExportKind {
    pub fn label(self) -> &'static str {
        match self {
            ExportKind::TestCases => "Test cases",
            ExportKind::TestResults => "Test results",
            ExportKind::Report => "Test report",
        }
    }
}

/// Everything the JSON report needs except the export timestamp, which the
/// engine stamps when it writes the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDraft {
    pub generation_method: Option<InputSource>,
    pub source_url: Option<String>,
    pub execution_url: Option<String>,
    pub tests: Vec<TestCase>,
    pub results: Vec<TestResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineReport {
    pub generation_method: Option<InputSource>,
    pub source_url: Option<String>,
    pub execution_url: Option<String>,
    pub tests: Vec<TestCase>,
    pub results: Vec<TestResult>,
    pub summary: ReportSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub timestamp: String,
}

impl PipelineReport {
    pub fn assemble(draft: ReportDraft, timestamp: impl Into<String>) -> Self {
        let counts = ResultSummary::from_results(&draft.results);
        Self {
            generation_method: draft.generation_method,
            source_url: draft.source_url,
            execution_url: draft.execution_url,
            tests: draft.tests,
            results: draft.results,
            summary: ReportSummary {
                total: counts.total,
                passed: counts.passed,
                failed: counts.failed,
                timestamp: timestamp.into(),
            },
        }
    }
}
