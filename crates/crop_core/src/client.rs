//! HTTP client for the remote `/predict` endpoint.

use crate::model::{PredictionResult, SelectedFile};
use reqwest::StatusCode;
use reqwest::Url;
use reqwest::blocking::{Client, multipart};
use std::io::Cursor;
use thiserror::Error;

/// Name of the multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service answered {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Anything that turns an uploaded file into a prediction.
pub trait PredictionService: Send + Sync {
    fn predict(&self, file: &SelectedFile) -> Result<PredictionResult, PredictError>;
}

/// Posts the file as `multipart/form-data` to a fixed endpoint.
pub struct HttpPredictionClient {
    http: Client,
    endpoint: Url,
}

impl HttpPredictionClient {
    pub fn new(endpoint: Url) -> Result<Self, PredictError> {
        let http = Client::builder().build()?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl PredictionService for HttpPredictionClient {
    fn predict(&self, file: &SelectedFile) -> Result<PredictionResult, PredictError> {
        // Reads straight from the shared buffer instead of copying it into the part.
        let len = file.bytes.len() as u64;
        let part = multipart::Part::reader_with_length(Cursor::new(file.bytes.clone()), len)
            .file_name(file.file_name.clone())
            .mime_str(&file.mime)?;
        let form = multipart::Form::new().part(FILE_FIELD, part);

        tracing::debug!(
            "POST {} ({}, {} bytes)",
            self.endpoint,
            file.file_name,
            file.bytes.len()
        );
        let response = self.http.post(self.endpoint.clone()).multipart(form).send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(PredictError::Status { status, body });
        }
        Ok(serde_json::from_str(&body)?)
    }
}
