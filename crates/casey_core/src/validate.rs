//! Input checks applied before any request leaves the wizard.

use url::Url;

use crate::{FileSelection, InputSource, SourceInput};

/// Largest document accepted for upload or generation (16 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

pub const ALLOWED_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];

/// Stand-in sent as `file_content` for the document source; the backend
/// does not receive the document body through this endpoint.
pub const DOCUMENT_CONTENT_PLACEHOLDER: &str = "File content will be processed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadRejection {
    Extension,
    TooLarge { size_bytes: u64 },
}

impl UploadRejection {
    pub fn message(&self) -> &'static str {
        match self {
            UploadRejection::Extension => "Please select a PDF, DOC, or DOCX file.",
            UploadRejection::TooLarge { .. } => "File size must be less than 16MB.",
        }
    }
}

/// Raw form fields for every source. Switching sources keeps what was typed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceFields {
    pub figma_key: String,
    pub document: Option<FileSelection>,
    pub manual_prompt: String,
    pub website_url: String,
}

/// Accepts absolute URLs only; `example.com` without a scheme fails.
pub fn is_valid_url(raw: &str) -> bool {
    Url::parse(raw.trim()).is_ok()
}

pub fn check_upload(file: &FileSelection) -> Result<(), UploadRejection> {
    let extension = file
        .file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(UploadRejection::Extension);
    }
    if file.size_bytes > MAX_UPLOAD_BYTES {
        return Err(UploadRejection::TooLarge {
            size_bytes: file.size_bytes,
        });
    }
    Ok(())
}

/// Builds the request input for `source`, or the warning to show instead.
pub fn validate_source(
    source: Option<InputSource>,
    fields: &SourceFields,
) -> Result<SourceInput, &'static str> {
    let Some(source) = source else {
        return Err("Please select an input source.");
    };
    match source {
        InputSource::Figma => {
            let figma_key = fields.figma_key.trim();
            if figma_key.is_empty() {
                return Err("Please enter a Figma file key.");
            }
            Ok(SourceInput::Figma {
                figma_key: figma_key.to_string(),
            })
        }
        InputSource::Document => match &fields.document {
            Some(file) => Ok(SourceInput::Document {
                file_name: file.file_name.clone(),
                file_content: DOCUMENT_CONTENT_PLACEHOLDER.to_string(),
            }),
            None => Err("Please select a document file."),
        },
        InputSource::Manual => {
            let prompt = fields.manual_prompt.trim();
            if prompt.is_empty() {
                return Err("Please provide manual requirements.");
            }
            Ok(SourceInput::Manual {
                manual_prompt: prompt.to_string(),
            })
        }
        InputSource::Website => {
            let website_url = fields.website_url.trim();
            if website_url.is_empty() {
                return Err("Please enter a website URL.");
            }
            if !is_valid_url(website_url) {
                return Err("Please enter a valid URL.");
            }
            Ok(SourceInput::Website {
                website_url: website_url.to_string(),
            })
        }
    }
}
