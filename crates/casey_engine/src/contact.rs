use std::time::Duration;

use casey_core::landing::{ContactForm, ContactMeta, ContactSubmission};
use engine_logging::engine_info;
use url::Url;

use crate::{ApiError, FailureKind};

#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    #[error("{0}")]
    Invalid(&'static str),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Posts landing-page contact submissions to a document-store endpoint.
#[derive(Debug, Clone)]
pub struct ContactClient {
    endpoint: Url,
    client: reqwest::Client,
}

impl ContactClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ApiError> {
        let endpoint = Url::parse(endpoint.trim())
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { endpoint, client })
    }

    pub async fn submit(
        &self,
        form: ContactForm,
        meta: ContactMeta,
    ) -> Result<ContactSubmission, ContactError> {
        let submission = form.into_submission(meta).map_err(ContactError::Invalid)?;
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&submission)
            .send()
            .await
            .map_err(|err| {
                let kind = if err.is_timeout() {
                    FailureKind::Timeout
                } else {
                    FailureKind::Network
                };
                ApiError::new(kind, err.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let err = ApiError::new(FailureKind::HttpStatus(status.as_u16()), status.to_string());
            return Err(err.into());
        }
        engine_info!("Contact submission from {} stored", submission.email);
        Ok(submission)
    }

    /// Runs [`ContactClient::submit`] on a private runtime for callers that
    /// are not async themselves.
    pub fn submit_blocking(
        &self,
        form: ContactForm,
        meta: ContactMeta,
    ) -> Result<ContactSubmission, ContactError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| ApiError::new(FailureKind::Io, err.to_string()))?;
        runtime.block_on(self.submit(form, meta))
    }
}
