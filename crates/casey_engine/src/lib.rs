//! Casey engine: backend client, request execution and export persistence.
mod client;
mod contact;
mod engine;
mod export;
mod persist;
mod types;

pub use client::{
    ApiSettings, PipelineApi, ReqwestApi, DOWNLOAD_RESULTS_PATH, DOWNLOAD_TESTS_PATH,
    GENERATE_PATH, PARSE_FILE_PATH, RUN_PATH,
};
pub use contact::{ContactClient, ContactError};
pub use engine::{Clock, EngineConfig, EngineHandle};
pub use export::{
    report_filename, ExportError, Exporter, REPORT_PREFIX, TEST_CASES_FILENAME,
    TEST_RESULTS_FILENAME,
};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use types::{ApiError, EngineEvent, FailureKind};
