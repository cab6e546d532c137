use std::fmt;
use std::path::PathBuf;

use casey_core::{ExecutionReply, ExportKind, GenerationReply, RequestToken, TestCase};

/// Completion notices sent from the engine thread back to the app loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Generated {
        token: RequestToken,
        result: Result<GenerationReply, ApiError>,
    },
    Executed {
        token: RequestToken,
        result: Result<ExecutionReply, ApiError>,
    },
    Parsed {
        token: RequestToken,
        result: Result<Vec<TestCase>, ApiError>,
    },
    Exported {
        kind: ExportKind,
        result: Result<PathBuf, String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The backend's own explanation, when it sent one. Transport failures
    /// have none, so callers fall back to their generic wording.
    pub fn server_message(&self) -> Option<&str> {
        match self.kind {
            FailureKind::Rejected { .. } | FailureKind::HttpStatus(_)
                if !self.message.trim().is_empty() =>
            {
                Some(&self.message)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    /// The backend answered with `status != "success"`.
    Rejected { status_code: u16 },
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Decode,
    Io,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Rejected { status_code } => {
                write!(f, "request rejected by server (http {status_code})")
            }
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::Io => write!(f, "io error"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
