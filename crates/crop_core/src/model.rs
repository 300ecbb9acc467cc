//! Data carried between the file picker, the prediction service and the view.

use anyhow::{Context, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Message shown to the user when a submission fails for any reason.
pub const PREDICTION_FAILED_MESSAGE: &str = "Failed to get prediction. Please try again.";

/// A file chosen by the user, held in memory until the next selection.
///
/// Cloning shares the file contents; pending requests never copy the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Bytes,
}

impl SelectedFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = mime_for_name(&file_name).to_string();
        Self {
            file_name,
            mime,
            bytes: Bytes::from(bytes),
        }
    }

    /// Reads the file at `path` into memory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .with_context(|| format!("cannot read selected file: {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, bytes))
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

fn mime_for_name(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        Some("tif" | "tiff") => "image/tiff",
        _ => "application/octet-stream",
    }
}

/// Body of a successful `/predict` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    #[serde(rename = "Predicted Disease")]
    pub disease: String,
    /// Model confidence in [0,1].
    #[serde(rename = "Confidence")]
    pub confidence: f64,
    #[serde(rename = "Pesticides")]
    pub pesticides: String,
    #[serde(rename = "Shop")]
    pub shop: String,
}

impl PredictionResult {
    /// Confidence as a percentage with two decimals, e.g. `87.34%`.
    ///
    /// Exact midpoints round away from zero.
    pub fn confidence_percent(&self) -> String {
        format!("{}%", fixed_2(self.confidence * 100.0))
    }
}

/// Two-decimal rendering of `value` with midpoints rounded away from zero.
///
/// `{:.2}` rounds the exact binary value and breaks ties to even. A finite
/// double lies exactly halfway between two hundredths only when it is an odd
/// multiple of 1/8 (x.125, x.375, x.625, x.875), and scaling by 8 is exact,
/// so those are the only values that need a push.
fn fixed_2(value: f64) -> String {
    let eighths = value * 8.0;
    let is_midpoint = eighths.fract() == 0.0 && eighths % 2.0 != 0.0;
    if is_midpoint {
        format!("{:.2}", value + value.signum() * 0.0025)
    } else {
        format!("{value:.2}")
    }
}
