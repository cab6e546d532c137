use std::path::{Path, PathBuf};

use casey_core::{PipelineReport, ReportDraft};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::persist::{AtomicFileWriter, PersistError};
use crate::ApiError;

pub const TEST_CASES_FILENAME: &str = "generated_test_cases.docx";
pub const TEST_RESULTS_FILENAME: &str = "test_execution_results.docx";
pub const REPORT_PREFIX: &str = "casey-ai-test-report";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("download failed: {0}")]
    Api(#[from] ApiError),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("report serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("export task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// `casey-ai-test-report-<unix millis>.json`
pub fn report_filename(now: DateTime<Utc>) -> String {
    format!("{REPORT_PREFIX}-{}.json", now.timestamp_millis())
}

/// Saves exports under the configured output directory.
#[derive(Debug, Clone)]
pub struct Exporter {
    writer: AtomicFileWriter,
}

impl Exporter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(output_dir),
        }
    }

    pub fn output_dir(&self) -> &Path {
        self.writer.dir()
    }

    pub fn save_test_cases(&self, document: &[u8]) -> Result<PathBuf, ExportError> {
        Ok(self.writer.write_bytes(TEST_CASES_FILENAME, document)?)
    }

    pub fn save_test_results(&self, document: &[u8]) -> Result<PathBuf, ExportError> {
        Ok(self.writer.write_bytes(TEST_RESULTS_FILENAME, document)?)
    }

    /// Stamps the draft with `now` and writes it as pretty-printed JSON.
    pub fn save_report(
        &self,
        draft: ReportDraft,
        now: DateTime<Utc>,
    ) -> Result<PathBuf, ExportError> {
        let timestamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
        let report = PipelineReport::assemble(draft, timestamp);
        let json = serde_json::to_string_pretty(&report)?;
        Ok(self.writer.write(&report_filename(now), &json)?)
    }
}
