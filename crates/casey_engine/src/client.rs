use std::path::Path;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use casey_core::{
    ExecutionReply, ExecutionRequest, GenerationReply, GenerationRequest, TestCase, TestResult,
};
use engine_logging::{engine_debug, engine_warn};
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use crate::{ApiError, FailureKind};

pub const GENERATE_PATH: &str = "api/generate-test";
pub const RUN_PATH: &str = "api/run-test";
pub const PARSE_FILE_PATH: &str = "api/parse-tests-from-file";
pub const DOWNLOAD_TESTS_PATH: &str = "api/download-tests";
pub const DOWNLOAD_RESULTS_PATH: &str = "api/download-results";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Generation and execution run headless browsers server-side, so this
    /// is far longer than a page fetch would need.
    pub request_timeout: Duration,
    pub max_download_bytes: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(180),
            max_download_bytes: 50 * 1024 * 1024,
        }
    }
}

/// The backend operations the wizard depends on.
#[async_trait::async_trait]
pub trait PipelineApi: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationReply, ApiError>;

    async fn run(&self, request: &ExecutionRequest) -> Result<ExecutionReply, ApiError>;

    /// Uploads a test-case document and returns the cases the server found.
    async fn parse_file(&self, path: &Path, file_name: &str) -> Result<Vec<TestCase>, ApiError>;

    async fn download_tests(&self, tests: &[TestCase]) -> Result<Bytes, ApiError>;

    async fn download_results(&self, results: &[TestResult]) -> Result<Bytes, ApiError>;
}

/// JSON envelope shared by every non-binary endpoint.
#[derive(Debug, Default, Deserialize)]
struct ApiEnvelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    tests: Option<Vec<TestCase>>,
    #[serde(default)]
    results: Option<Vec<TestResult>>,
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    settings: ApiSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let mut base = Url::parse(settings.base_url.trim())
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        // Endpoint paths are joined relative to the base, which needs a trailing slash.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            base,
            client,
        })
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiEnvelope, ApiError> {
        let url = self.endpoint(path)?;
        engine_debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_envelope(response).await
    }

    async fn post_for_bytes<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Bytes, ApiError> {
        let url = self.endpoint(path)?;
        engine_debug!("POST {} (binary)", url);
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let message = serde_json::from_slice::<ApiEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.message)
                .unwrap_or_default();
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                message,
            ));
        }

        let max_bytes = self.settings.max_download_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(ApiError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "download too large",
                ));
            }
        }

        let mut buffer = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = buffer.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(ApiError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "download too large",
                ));
            }
            buffer.extend_from_slice(&chunk);
        }
        Ok(buffer.freeze())
    }
}

#[async_trait::async_trait]
impl PipelineApi for ReqwestApi {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationReply, ApiError> {
        let envelope = self.post_json(GENERATE_PATH, request).await?;
        Ok(GenerationReply {
            tests: envelope.tests,
            message: envelope.message,
        })
    }

    async fn run(&self, request: &ExecutionRequest) -> Result<ExecutionReply, ApiError> {
        let envelope = self.post_json(RUN_PATH, request).await?;
        Ok(ExecutionReply {
            results: envelope.results,
            message: envelope.message,
        })
    }

    async fn parse_file(&self, path: &Path, file_name: &str) -> Result<Vec<TestCase>, ApiError> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|err| ApiError::new(FailureKind::Io, format!("{}: {err}", path.display())))?;
        let part = Part::bytes(data).file_name(file_name.to_string());
        let form = Form::new().part("file", part);

        let url = self.endpoint(PARSE_FILE_PATH)?;
        engine_debug!("POST {} with {}", url, file_name);
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let envelope = read_envelope(response).await?;
        Ok(envelope.tests.unwrap_or_default())
    }

    async fn download_tests(&self, tests: &[TestCase]) -> Result<Bytes, ApiError> {
        self.post_for_bytes(DOWNLOAD_TESTS_PATH, &json!({ "test_cases": tests }))
            .await
    }

    async fn download_results(&self, results: &[TestResult]) -> Result<Bytes, ApiError> {
        self.post_for_bytes(DOWNLOAD_RESULTS_PATH, &json!({ "test_results": results }))
            .await
    }
}

/// Decodes the body even for error statuses so the server's message survives.
async fn read_envelope(response: reqwest::Response) -> Result<ApiEnvelope, ApiError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_reqwest_error)?;
    let envelope = match serde_json::from_slice::<ApiEnvelope>(&body) {
        Ok(envelope) => envelope,
        Err(err) if status.is_success() => {
            return Err(ApiError::new(FailureKind::Decode, err.to_string()));
        }
        Err(_) => ApiEnvelope::default(),
    };

    if !status.is_success() {
        let message = envelope.message.unwrap_or_default();
        return Err(ApiError::new(
            FailureKind::HttpStatus(status.as_u16()),
            message,
        ));
    }
    if envelope.status.as_deref() != Some("success") {
        engine_warn!(
            "Backend answered {:?} with status {:?}",
            status,
            envelope.status
        );
        let message = envelope.message.unwrap_or_default();
        return Err(ApiError::new(
            FailureKind::Rejected {
                status_code: status.as_u16(),
            },
            message,
        ));
    }
    Ok(envelope)
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::Decode, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
