use image::ImageError;
use thiserror::Error;

use crate::model::PixelRect;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("{0}")]
    Validation(String),

    #[error("no face detected in s3://{bucket}/{key}")]
    NoFaceDetected { bucket: String, key: String },

    #[error("image s3://{bucket}/{key} not found")]
    ImageNotFound { bucket: String, key: String },

    #[error("failed to decode image: {source}")]
    ImageDecode {
        #[source]
        source: ImageError,
    },

    #[error("failed to encode cropped face: {source}")]
    ImageEncode {
        #[source]
        source: ImageError,
    },

    #[error("crop {rect} lies outside the {width}x{height} image")]
    CropOutOfBounds {
        rect: PixelRect,
        width: u32,
        height: u32,
    },

    // Upstream faults keep the SDK error as the source only; Display stays
    // generic because it is returned to callers.
    #[error("image store request failed")]
    ImageStore(#[source] BoxError),

    #[error("face index request failed")]
    FaceIndex(#[source] BoxError),

    #[error("record store request failed")]
    RecordStore(#[source] BoxError),

    #[error("invalid configuration {name}: {message}")]
    Config { name: &'static str, message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AttendanceError {
    pub fn status_code(&self) -> u16 {
        match self {
            AttendanceError::Validation(_) => 400,
            AttendanceError::ImageNotFound { .. } => 404,
            AttendanceError::NoFaceDetected { .. } => 422,
            _ => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Full `source()` chain, for logs only.
    pub fn detailed(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(inner) = source {
            message.push_str(": ");
            message.push_str(&inner.to_string());
            source = inner.source();
        }
        message
    }

    pub(crate) fn image_store(err: impl Into<BoxError>) -> Self {
        AttendanceError::ImageStore(err.into())
    }

    pub(crate) fn face_index(err: impl Into<BoxError>) -> Self {
        AttendanceError::FaceIndex(err.into())
    }

    pub(crate) fn record_store(err: impl Into<BoxError>) -> Self {
        AttendanceError::RecordStore(err.into())
    }
}

pub type AttendanceResult<T> = Result<T, AttendanceError>;
