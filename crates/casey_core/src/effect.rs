use std::path::PathBuf;

use crate::{ExecutionRequest, GenerationRequest, ReportDraft, RequestToken, TestCase, TestResult, Toast};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Generate {
        token: RequestToken,
        request: GenerationRequest,
    },
    Execute {
        token: RequestToken,
        request: ExecutionRequest,
    },
    ParseUpload {
        token: RequestToken,
        path: PathBuf,
        file_name: String,
    },
    /// Abandon an in-flight request; any late reply is ignored anyway.
    CancelRequest { token: RequestToken },
    DownloadTests { test_cases: Vec<TestCase> },
    DownloadResults { results: Vec<TestResult> },
    SaveReport { draft: ReportDraft },
    Notify(Toast),
    ShowLoading { message: String },
    HideLoading,
}
