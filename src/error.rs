use thiserror::Error;

use crate::body_type::Measurement;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid image buffer: expected {expected} bytes, got {actual}")]
    InvalidBuffer { expected: usize, actual: usize },

    #[error("Insufficient region '{region}': {reason}")]
    InsufficientRegion { region: String, reason: String },

    #[error("Insufficient landmarks: need {required} visible, have {available}")]
    InsufficientLandmarks { required: usize, available: usize },

    #[error("Missing measurement: {0}")]
    MissingMeasurement(Measurement),

    #[error("Missing landmark at index {index}")]
    MissingLandmark { index: usize },

    #[error("Invalid hex color: {0:?}")]
    InvalidHex(String),
}

impl Error {
    pub(crate) fn region(region: &str, reason: impl Into<String>) -> Self {
        Error::InsufficientRegion {
            region: region.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
